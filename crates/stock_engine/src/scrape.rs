use monitor_logging::monitor_debug;
use serde::Deserialize;
use stock_core::{Headers, Product, Variant};
use url::Url;

use crate::{CatalogFetcher, PageRequest, ParseError, ScrapeError};

#[derive(Debug, Deserialize)]
struct RawPage {
    products: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    title: String,
    handle: String,
    #[serde(default)]
    images: Vec<RawImage>,
    #[serde(default)]
    variants: Vec<RawVariant>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    src: String,
}

#[derive(Debug, Deserialize)]
struct RawVariant {
    title: String,
    #[serde(default)]
    available: bool,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Product {
            title: raw.title,
            image_url: raw
                .images
                .into_iter()
                .next()
                .map(|image| image.src)
                .unwrap_or_default(),
            handle: raw.handle,
            variants: raw
                .variants
                .into_iter()
                .map(|variant| Variant::new(variant.title, variant.available))
                .collect(),
        }
    }
}

/// Decodes one catalog page. An empty list marks the end of the catalog.
pub fn parse_page(page: u32, body: &[u8]) -> Result<Vec<Product>, ParseError> {
    let raw: RawPage = serde_json::from_slice(body).map_err(|err| ParseError {
        page,
        message: err.to_string(),
    })?;
    Ok(raw.products.into_iter().map(Product::from).collect())
}

/// Walks the paginated catalog until the remote returns an empty page.
pub struct CatalogScraper<F> {
    fetcher: F,
}

impl<F: CatalogFetcher> CatalogScraper<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Products in remote page order. Stops at the first error.
    pub async fn scrape_all(
        &self,
        url: &Url,
        proxy: Option<&str>,
        headers: &Headers,
    ) -> Result<Vec<Product>, ScrapeError> {
        let mut products = Vec::new();
        let mut page = 1;

        loop {
            let request = PageRequest {
                base_url: url,
                page,
                proxy,
                headers,
            };
            let body = self.fetcher.fetch_page(&request).await?;
            let listed = parse_page(page, &body)?;
            if listed.is_empty() {
                break;
            }
            monitor_debug!("Catalog page {} listed {} products", page, listed.len());
            products.extend(listed);
            page += 1;
        }

        monitor_debug!(
            "Scraped {} products across {} pages from {}",
            products.len(),
            page - 1,
            url
        );
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_page_takes_first_image_and_all_variants() {
        let body = br#"{"products":[{
            "title":"Tee","handle":"tee",
            "images":[{"src":"https://cdn/a.png"},{"src":"https://cdn/b.png"}],
            "variants":[{"title":"S","available":false},{"title":"M","available":true}]
        }]}"#;

        let products = parse_page(1, body).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].image_url, "https://cdn/a.png");
        assert_eq!(
            products[0].variants,
            vec![Variant::new("S", false), Variant::new("M", true)]
        );
    }

    #[test]
    fn product_without_images_has_empty_image_url() {
        let body = br#"{"products":[{"title":"Cap","handle":"cap","images":[],"variants":[]}]}"#;
        let products = parse_page(2, body).unwrap();
        assert_eq!(products[0].image_url, "");
    }

    #[test]
    fn missing_products_field_is_a_parse_error() {
        let err = parse_page(4, br#"{"items":[]}"#).unwrap_err();
        assert_eq!(err.page, 4);

        let err = parse_page(5, b"<html>blocked</html>").unwrap_err();
        assert_eq!(err.page, 5);
    }
}
