//! Stock engine: catalog retrieval, webhook delivery and the polling loop.
mod fetch;
mod monitor;
mod notify;
mod scrape;
mod types;
pub mod user_agent;

pub use fetch::{page_url, CatalogFetcher, FetchSettings, PageRequest, ReqwestCatalogFetcher};
pub use monitor::{validate_catalog_url, CycleReport, Monitor, MonitorSettings};
pub use notify::{
    build_restock_payload, build_self_test_payload, build_sold_out_payload, product_url, Embed,
    EmbedField, Footer, Notifier, Thumbnail, WebhookNotifier, WebhookPayload, WebhookSettings,
};
pub use scrape::{parse_page, CatalogScraper};
pub use types::{
    ConfigError, DeliveryError, DeliveryFailure, FailureKind, ParseError, ScrapeError,
    TransportError,
};
