use std::time::Duration;

use pretty_assertions::assert_eq;
use stock_core::Headers;
use stock_engine::{
    CatalogFetcher, CatalogScraper, FailureKind, FetchSettings, PageRequest, ReqwestCatalogFetcher,
    ScrapeError,
};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/products.json", server.uri())).unwrap()
}

fn page_body(titles: &[&str]) -> serde_json::Value {
    let products: Vec<_> = titles
        .iter()
        .map(|title| {
            serde_json::json!({
                "title": title,
                "handle": title.to_lowercase(),
                "images": [{ "src": format!("https://cdn.example.com/{title}.png") }],
                "variants": [{ "title": "M", "available": true }]
            })
        })
        .collect();
    serde_json::json!({ "products": products })
}

async fn mount_page(server: &MockServer, page: &str, titles: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", page))
        .and(query_param("limit", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(titles)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn scraper_stops_at_first_empty_page() {
    let server = MockServer::start().await;
    mount_page(&server, "1", &["Tee", "Cap"]).await;
    mount_page(&server, "2", &["Hoodie"]).await;
    mount_page(&server, "3", &[]).await;

    let scraper = CatalogScraper::new(ReqwestCatalogFetcher::new(FetchSettings::default()));
    let products = scraper
        .scrape_all(&catalog_url(&server), None, &Headers::new())
        .await
        .expect("scrape ok");

    let titles: Vec<_> = products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Tee", "Cap", "Hoodie"]);
    assert_eq!(products[0].image_url, "https://cdn.example.com/Tee.png");
    assert_eq!(products[2].handle, "hoodie");
}

#[tokio::test]
async fn fetcher_sends_rotating_identity_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(header("user-agent", "StockTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReqwestCatalogFetcher::new(FetchSettings::default());
    let headers = Headers::from([("User-Agent".to_string(), "StockTest/1.0".to_string())]);
    let url = catalog_url(&server);

    let body = fetcher
        .fetch_page(&PageRequest {
            base_url: &url,
            page: 1,
            proxy: None,
            headers: &headers,
        })
        .await
        .expect("fetch ok");
    assert_eq!(body, br#"{"products":[]}"#.to_vec());
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let scraper = CatalogScraper::new(ReqwestCatalogFetcher::new(FetchSettings::default()));
    let err = scraper
        .scrape_all(&catalog_url(&server), None, &Headers::new())
        .await
        .unwrap_err();

    match err {
        ScrapeError::Transport(err) => assert_eq!(err.kind, FailureKind::HttpStatus(429)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_catalog_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(page_body(&[])),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestCatalogFetcher::new(settings);
    let url = catalog_url(&server);

    let err = fetcher
        .fetch_page(&PageRequest {
            base_url: &url,
            page: 1,
            proxy: None,
            headers: &Headers::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn malformed_page_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&server)
        .await;

    let scraper = CatalogScraper::new(ReqwestCatalogFetcher::new(FetchSettings::default()));
    let err = scraper
        .scrape_all(&catalog_url(&server), None, &Headers::new())
        .await
        .unwrap_err();

    match err {
        ScrapeError::Parse(err) => assert_eq!(err.page, 1),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unparsable_proxy_fails_before_sending() {
    let server = MockServer::start().await;
    let fetcher = ReqwestCatalogFetcher::new(FetchSettings::default());
    let url = catalog_url(&server);

    let err = fetcher
        .fetch_page(&PageRequest {
            base_url: &url,
            page: 1,
            proxy: Some("not a proxy"),
            headers: &Headers::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidProxy);
    assert!(server.received_requests().await.unwrap().is_empty());
}
