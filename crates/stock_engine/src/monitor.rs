use std::time::Duration;

use monitor_logging::{monitor_debug, monitor_error, monitor_info, monitor_warn};
use stock_core::{
    AvailabilityIndex, Backoff, ChangeDetector, CycleState, Headers, KeywordFilter, Transition,
};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::scrape::CatalogScraper;
use crate::user_agent::random_headers;
use crate::{CatalogFetcher, ConfigError, Notifier, ScrapeError};

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub catalog_url: String,
    pub keywords: Vec<String>,
    pub proxies: Vec<String>,
    pub poll_delay: Duration,
    pub backoff: Backoff,
    pub notify_out_of_stock: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            catalog_url: String::new(),
            keywords: Vec::new(),
            proxies: Vec::new(),
            poll_delay: Duration::from_secs(10),
            backoff: Backoff::default(),
            notify_out_of_stock: false,
        }
    }
}

/// Counters for one completed polling cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub products: usize,
    pub evaluated: usize,
    pub transitions: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
}

/// The catalog URL must parse and name a `products.json` listing.
pub fn validate_catalog_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidCatalogUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || !url.path().ends_with("products.json") {
        return Err(ConfigError::InvalidCatalogUrl(raw.to_string()));
    }
    Ok(url)
}

/// Scrape, detect, notify, sleep; on failure rotate identity and proxy and keep going.
pub struct Monitor<F, N> {
    catalog_url: Url,
    proxies: Vec<String>,
    poll_delay: Duration,
    backoff: Backoff,
    filter: KeywordFilter,
    detector: ChangeDetector,
    scraper: CatalogScraper<F>,
    notifier: N,
    index: AvailabilityIndex,
    state: CycleState,
    identity: fn() -> Headers,
}

impl<F: CatalogFetcher, N: Notifier> Monitor<F, N> {
    pub fn new(settings: MonitorSettings, fetcher: F, notifier: N) -> Result<Self, ConfigError> {
        let catalog_url = validate_catalog_url(&settings.catalog_url)?;
        let detector = ChangeDetector::new(settings.catalog_url.trim())
            .with_out_of_stock_notifications(settings.notify_out_of_stock);
        let proxies = settings
            .proxies
            .into_iter()
            .map(|proxy| proxy.trim().to_string())
            .filter(|proxy| !proxy.is_empty())
            .collect();

        Ok(Self {
            catalog_url,
            proxies,
            poll_delay: settings.poll_delay,
            backoff: settings.backoff,
            filter: KeywordFilter::new(&settings.keywords),
            detector,
            scraper: CatalogScraper::new(fetcher),
            notifier,
            index: AvailabilityIndex::new(),
            state: CycleState::new(random_headers()),
            identity: random_headers,
        })
    }

    /// Replaces the source of request identities used at startup and on rotation.
    pub fn with_identity(mut self, identity: fn() -> Headers) -> Self {
        self.identity = identity;
        self.state = CycleState::new(identity());
        self
    }

    pub fn cycle_state(&self) -> &CycleState {
        &self.state
    }

    pub fn index(&self) -> &AvailabilityIndex {
        &self.index
    }

    pub fn current_proxy(&self) -> Option<&str> {
        self.state.current_proxy(&self.proxies)
    }

    /// Sends the startup embed. A failure is logged and otherwise ignored.
    pub async fn startup(&self) {
        match self.notifier.self_test().await {
            Ok(()) => monitor_info!("Webhook self-test delivered"),
            Err(err) => monitor_error!("Webhook self-test failed: {}", err),
        }
    }

    /// One Polling iteration. Notifications stay suppressed until a cycle completes.
    pub async fn poll_once(&mut self) -> Result<CycleReport, ScrapeError> {
        let cycle = self.state.begin_cycle();
        monitor_logging::set_cycle(cycle);

        let proxy = self.state.current_proxy(&self.proxies);
        let products = self
            .scraper
            .scrape_all(&self.catalog_url, proxy, self.state.headers())
            .await?;

        let suppress = self.state.is_first_cycle();
        let mut report = CycleReport {
            products: products.len(),
            ..CycleReport::default()
        };

        for product in &products {
            if !self.filter.matches(&product.title) {
                continue;
            }
            report.evaluated += 1;

            let Some(transition) = self.detector.evaluate(product, &mut self.index, suppress)
            else {
                continue;
            };
            report.transitions += 1;

            match self.notifier.notify(&transition).await {
                Ok(()) => {
                    report.delivered += 1;
                    log_transition(&transition);
                }
                Err(err) => {
                    report.failed_deliveries += 1;
                    monitor_error!(
                        "Failed to deliver notification for {}: {}",
                        transition.product().title,
                        err
                    );
                }
            }
        }

        self.state.complete_cycle();
        Ok(report)
    }

    /// The Recovering state: new identity, next proxy. Returns how long to back off.
    pub fn recover(&mut self, err: &ScrapeError) -> Duration {
        monitor_error!("Polling cycle {} failed: {}", self.state.cycle(), err);
        self.state.rotate((self.identity)(), self.proxies.len());

        let failures = self.state.consecutive_failures();
        match self.current_proxy() {
            Some(proxy) => monitor_warn!(
                "Rotated identity and proxy to #{} ({}) after {} consecutive failures",
                self.state.proxy_index(),
                proxy,
                failures
            ),
            None => monitor_warn!(
                "Rotated identity after {} consecutive failures",
                failures
            ),
        }
        self.backoff.delay(failures)
    }

    /// Runs until `cancel` fires. Never returns on polling errors.
    pub async fn run(mut self, cancel: CancellationToken) {
        monitor_info!("Starting monitor for {}", self.catalog_url);
        self.startup().await;

        while !cancel.is_cancelled() {
            let pause = match self.poll_once().await {
                Ok(report) => {
                    monitor_info!(
                        "Cycle {}: {} products, {} evaluated, {} notifications ({} failed)",
                        monitor_logging::current_cycle(),
                        report.products,
                        report.evaluated,
                        report.delivered,
                        report.failed_deliveries
                    );
                    self.poll_delay
                }
                Err(err) => {
                    let backoff = self.recover(&err);
                    monitor_debug!("Backing off for {:?}", backoff);
                    backoff
                }
            };

            if pause.is_zero() {
                // A synchronous failure never suspends; let other tasks run.
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::task::yield_now() => {}
                }
                continue;
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        monitor_info!("Monitor stopped after {} cycles", self.state.cycle());
    }
}

fn log_transition(transition: &Transition) {
    match transition {
        Transition::BecameAvailable { product, sizes } => monitor_info!(
            "Notified restock of {} ({} sizes available)",
            product.title,
            sizes.len()
        ),
        Transition::BecameUnavailable { product } => {
            monitor_info!("Notified {} sold out", product.title)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_url_must_name_products_json() {
        assert!(validate_catalog_url("https://shop.example.com/products.json").is_ok());
        assert!(validate_catalog_url("https://shop.example.com/collections/all/products.json").is_ok());
        assert!(validate_catalog_url(" http://shop.example.com/products.json ").is_ok());

        for bad in [
            "https://shop.example.com/",
            "https://shop.example.com/products",
            "shop.example.com/products.json",
            "ftp://shop.example.com/products.json",
            "",
        ] {
            assert_eq!(
                validate_catalog_url(bad),
                Err(ConfigError::InvalidCatalogUrl(bad.to_string())),
                "{bad}"
            );
        }
    }
}
