use std::sync::Arc;
use std::time::Duration;

use monitor_logging::monitor_info;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use stock_core::{AvailableSize, Transition};

use crate::{DeliveryError, DeliveryFailure};

const SELF_TEST_TITLE: &str = "Testing Webhook";
const SELF_TEST_DESCRIPTION: &str =
    "This is a quick test to make sure the webhook works. The monitor is now running.";

/// Webhook endpoint and the presentation fields of every embed.
#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub webhook_url: String,
    /// Configured catalog URL; product links and call-to-action links derive from it.
    pub catalog_url: String,
    pub username: String,
    pub avatar_url: String,
    pub color: u32,
    pub footer: String,
    pub request_timeout: Duration,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            catalog_url: String::new(),
            username: "Stock Monitor".to_string(),
            avatar_url: String::new(),
            color: 0xFF_FF_FF,
            footer: "Stock Monitor".to_string(),
            request_timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub username: String,
    pub avatar_url: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    pub color: u32,
    pub footer: Footer,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footer {
    pub text: String,
}

/// Storefront page of a product: the listing URL with `.json` swapped for `/`, plus the handle.
pub fn product_url(catalog_url: &str, handle: &str) -> String {
    format!("{}{}", catalog_url.replace(".json", "/"), handle)
}

fn call_to_action(size: &AvailableSize) -> String {
    format!("[ATC]({})", size.action_url)
}

fn payload(settings: &WebhookSettings, embed: Embed) -> WebhookPayload {
    WebhookPayload {
        username: settings.username.clone(),
        avatar_url: settings.avatar_url.clone(),
        embeds: vec![embed],
    }
}

/// One embed per restock, one inline field per available size.
pub fn build_restock_payload(
    settings: &WebhookSettings,
    title: &str,
    handle: &str,
    thumbnail_url: &str,
    sizes: &[AvailableSize],
    timestamp: String,
) -> WebhookPayload {
    let fields = sizes
        .iter()
        .map(|size| EmbedField {
            name: size.title.clone(),
            value: call_to_action(size),
            inline: true,
        })
        .collect();

    payload(
        settings,
        Embed {
            title: title.to_string(),
            url: Some(product_url(&settings.catalog_url, handle)),
            description: None,
            thumbnail: Some(Thumbnail {
                url: thumbnail_url.to_string(),
            }),
            fields,
            color: settings.color,
            footer: Footer {
                text: settings.footer.clone(),
            },
            timestamp,
        },
    )
}

pub fn build_sold_out_payload(
    settings: &WebhookSettings,
    title: &str,
    handle: &str,
    thumbnail_url: &str,
    timestamp: String,
) -> WebhookPayload {
    payload(
        settings,
        Embed {
            title: format!("{title} (sold out)"),
            url: Some(product_url(&settings.catalog_url, handle)),
            description: None,
            thumbnail: Some(Thumbnail {
                url: thumbnail_url.to_string(),
            }),
            fields: Vec::new(),
            color: settings.color,
            footer: Footer {
                text: settings.footer.clone(),
            },
            timestamp,
        },
    )
}

pub fn build_self_test_payload(settings: &WebhookSettings, timestamp: String) -> WebhookPayload {
    payload(
        settings,
        Embed {
            title: SELF_TEST_TITLE.to_string(),
            url: None,
            description: Some(SELF_TEST_DESCRIPTION.to_string()),
            thumbnail: None,
            fields: Vec::new(),
            color: settings.color,
            footer: Footer {
                text: settings.footer.clone(),
            },
            timestamp,
        },
    )
}

/// Delivers transitions to the outside world.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, transition: &Transition) -> Result<(), DeliveryError>;

    /// Sent once at startup, before polling begins.
    async fn self_test(&self) -> Result<(), DeliveryError>;
}

#[async_trait::async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn notify(&self, transition: &Transition) -> Result<(), DeliveryError> {
        self.as_ref().notify(transition).await
    }

    async fn self_test(&self) -> Result<(), DeliveryError> {
        self.as_ref().self_test().await
    }
}

/// Posts JSON embeds to a chat webhook.
#[derive(Clone)]
pub struct WebhookNotifier {
    settings: WebhookSettings,
    clock: Arc<dyn Fn() -> String + Send + Sync>,
}

impl WebhookNotifier {
    pub fn new(settings: WebhookSettings) -> Self {
        Self {
            settings,
            clock: Arc::new(|| chrono::Utc::now().to_rfc3339()),
        }
    }

    /// Overrides the embed timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Fn() -> String + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn notify_restock(
        &self,
        title: &str,
        handle: &str,
        thumbnail_url: &str,
        sizes: &[AvailableSize],
    ) -> Result<(), DeliveryError> {
        let payload = build_restock_payload(
            &self.settings,
            title,
            handle,
            thumbnail_url,
            sizes,
            (self.clock)(),
        );
        self.send(&payload).await
    }

    async fn send(&self, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(payload)
            .map_err(|err| DeliveryError::new(DeliveryFailure::Encode, err.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| DeliveryError::new(DeliveryFailure::Network, err.to_string()))?;

        let response = client
            .post(self.settings.webhook_url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::new(
                DeliveryFailure::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        monitor_info!("Payload delivered successfully, code {}", status.as_u16());
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, transition: &Transition) -> Result<(), DeliveryError> {
        match transition {
            Transition::BecameAvailable { product, sizes } => {
                self.notify_restock(&product.title, &product.handle, &product.image_url, sizes)
                    .await
            }
            Transition::BecameUnavailable { product } => {
                let payload = build_sold_out_payload(
                    &self.settings,
                    &product.title,
                    &product.handle,
                    &product.image_url,
                    (self.clock)(),
                );
                self.send(&payload).await
            }
        }
    }

    async fn self_test(&self) -> Result<(), DeliveryError> {
        let payload = build_self_test_payload(&self.settings, (self.clock)());
        self.send(&payload).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> DeliveryError {
    if err.is_timeout() {
        return DeliveryError::new(DeliveryFailure::Timeout, err.to_string());
    }
    DeliveryError::new(DeliveryFailure::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_url_swaps_json_suffix_for_handle() {
        assert_eq!(
            product_url("https://shop.example.com/products.json", "tee"),
            "https://shop.example.com/products/tee"
        );
        assert_eq!(
            product_url("https://shop.example.com/collections/new/products.json", "cap"),
            "https://shop.example.com/collections/new/products/cap"
        );
    }

    #[test]
    fn self_test_embed_has_no_product_fields() {
        let settings = WebhookSettings::default();
        let payload = build_self_test_payload(&settings, "2026-01-01T00:00:00+00:00".into());
        let json = serde_json::to_value(&payload).unwrap();

        let embed = &json["embeds"][0];
        assert_eq!(embed["title"], SELF_TEST_TITLE);
        assert!(embed.get("fields").is_none());
        assert!(embed.get("url").is_none());
        assert!(embed.get("thumbnail").is_none());
        assert_eq!(embed["footer"]["text"], "Stock Monitor");
    }
}
