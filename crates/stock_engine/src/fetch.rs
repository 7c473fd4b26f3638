use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use stock_core::Headers;
use url::Url;

use crate::{FailureKind, TransportError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub page_size: u32,
    /// Storefronts are often CDN-fronted or self-signed.
    pub accept_invalid_certs: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(20),
            page_size: 250,
            accept_invalid_certs: true,
        }
    }
}

/// One catalog page request, with the identity of the current cycle.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub base_url: &'a Url,
    pub page: u32,
    pub proxy: Option<&'a str>,
    pub headers: &'a Headers,
}

/// Retrieves raw catalog pages. Implementations never retry; the caller recovers.
#[async_trait::async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Vec<u8>, TransportError>;
}

#[async_trait::async_trait]
impl<T: CatalogFetcher + ?Sized> CatalogFetcher for Arc<T> {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Vec<u8>, TransportError> {
        self.as_ref().fetch_page(request).await
    }
}

/// `base?page=<n>&limit=<size>`, keeping any query the base already carries.
pub fn page_url(base: &Url, page: u32, page_size: u32) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("limit", &page_size.to_string());
    url
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestCatalogFetcher {
    settings: FetchSettings,
}

impl ReqwestCatalogFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(
        &self,
        proxy: Option<&str>,
        headers: &Headers,
    ) -> Result<reqwest::Client, TransportError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .danger_accept_invalid_certs(self.settings.accept_invalid_certs)
            .default_headers(header_map(headers)?);

        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url(proxy))
                .map_err(|err| TransportError::new(FailureKind::InvalidProxy, err.to_string()))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl CatalogFetcher for ReqwestCatalogFetcher {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Vec<u8>, TransportError> {
        let url = page_url(request.base_url, request.page, self.settings.page_size);
        let client = self.build_client(request.proxy, request.headers)?;

        let response = client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(body.to_vec())
    }
}

fn proxy_url(entry: &str) -> String {
    let entry = entry.trim();
    if entry.contains("://") {
        entry.to_string()
    } else {
        format!("http://{entry}")
    }
}

fn header_map(headers: &Headers) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| TransportError::new(FailureKind::InvalidHeader, err.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| TransportError::new(FailureKind::InvalidHeader, err.to_string()))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return TransportError::new(FailureKind::InvalidUrl, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_appends_page_and_limit() {
        let base = Url::parse("https://shop.example.com/products.json").unwrap();
        assert_eq!(
            page_url(&base, 3, 250).as_str(),
            "https://shop.example.com/products.json?page=3&limit=250"
        );

        let filtered = Url::parse("https://shop.example.com/collections/all/products.json?sort=new").unwrap();
        assert_eq!(
            page_url(&filtered, 1, 250).as_str(),
            "https://shop.example.com/collections/all/products.json?sort=new&page=1&limit=250"
        );
    }

    #[test]
    fn bare_proxies_default_to_http() {
        assert_eq!(proxy_url("10.0.0.1:8080"), "http://10.0.0.1:8080");
        assert_eq!(proxy_url(" user:pw@10.0.0.1:8080 "), "http://user:pw@10.0.0.1:8080");
        assert_eq!(proxy_url("socks5://10.0.0.1:1080"), "socks5://10.0.0.1:1080");
    }

    #[test]
    fn invalid_header_is_rejected() {
        let headers = Headers::from([("Bad Header".to_string(), "x".to_string())]);
        let err = header_map(&headers).unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidHeader);
    }
}
