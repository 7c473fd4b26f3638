//! Command-line and `.env` configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use stock_core::{Backoff, BackoffPolicy};
use stock_engine::{FetchSettings, MonitorSettings, WebhookSettings};

use crate::logging::LogDestination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackoffKind {
    /// Retry immediately after a failed cycle.
    None,
    /// Wait `--backoff-base-secs` after every failure.
    Fixed,
    /// Double the wait per consecutive failure, capped at `--backoff-max-secs`.
    Exponential,
}

/// Polls a storefront `products.json` listing and posts restocks to a webhook.
#[derive(Debug, Parser)]
#[command(name = "stock-monitor", version, about)]
pub struct Cli {
    /// Catalog listing, e.g. https://shop.example.com/products.json
    #[arg(long, env = "URL")]
    pub url: String,

    /// Chat webhook that receives the embeds.
    #[arg(long, env = "WEBHOOK")]
    pub webhook: String,

    /// Product titles to watch, separated by '%'. Empty watches everything.
    #[arg(long, env = "KEYWORDS", value_delimiter = '%')]
    pub keywords: Vec<String>,

    /// Proxies rotated after failures, separated by '%'.
    #[arg(long = "proxy", env = "PROXY", value_delimiter = '%')]
    pub proxies: Vec<String>,

    /// Seconds to sleep between successful cycles.
    #[arg(long, env = "DELAY", default_value_t = 10)]
    pub delay: u64,

    #[arg(long, env = "USERNAME", default_value = "Stock Monitor")]
    pub username: String,

    #[arg(long, env = "AVATAR_URL", default_value = "")]
    pub avatar_url: String,

    /// Embed colour as a decimal RGB integer.
    #[arg(long, env = "COLOUR", default_value_t = 16_777_215)]
    pub colour: u32,

    #[arg(long, env = "FOOTER", default_value = "Stock Monitor")]
    pub footer: String,

    /// Also post an embed when a watched product sells out.
    #[arg(long, env = "NOTIFY_OUT_OF_STOCK")]
    pub notify_out_of_stock: bool,

    #[arg(long, env = "BACKOFF", value_enum, default_value_t = BackoffKind::Exponential)]
    pub backoff: BackoffKind,

    #[arg(long, env = "BACKOFF_BASE_SECS", default_value_t = 2)]
    pub backoff_base_secs: u64,

    #[arg(long, env = "BACKOFF_MAX_SECS", default_value_t = 60)]
    pub backoff_max_secs: u64,

    #[arg(long, env = "BACKOFF_JITTER_MS", default_value_t = 500)]
    pub backoff_jitter_ms: u64,

    /// Per-request timeout for catalog pages and webhook posts.
    #[arg(long, env = "TIMEOUT", default_value_t = 20)]
    pub timeout_secs: u64,

    #[arg(long, env = "LOG_FILE", default_value = "logfile.log")]
    pub log_file: PathBuf,

    /// Where log lines go.
    #[arg(long, env = "LOG_TO", value_enum, default_value_t = LogDestination::Both)]
    pub log_to: LogDestination,

    #[arg(long, env = "LOG_LEVEL", default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

impl Cli {
    pub fn backoff(&self) -> Backoff {
        let base = Duration::from_secs(self.backoff_base_secs);
        let policy = match self.backoff {
            BackoffKind::None => BackoffPolicy::None,
            BackoffKind::Fixed => BackoffPolicy::Fixed(base),
            BackoffKind::Exponential => BackoffPolicy::Exponential {
                base,
                max: Duration::from_secs(self.backoff_max_secs).max(base),
            },
        };
        Backoff::new(policy).with_jitter(Duration::from_millis(self.backoff_jitter_ms))
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            catalog_url: self.url.clone(),
            keywords: self.keywords.clone(),
            proxies: self.proxies.clone(),
            poll_delay: Duration::from_secs(self.delay),
            backoff: self.backoff(),
            notify_out_of_stock: self.notify_out_of_stock,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: Duration::from_secs(self.timeout_secs),
            ..FetchSettings::default()
        }
    }

    pub fn webhook_settings(&self) -> WebhookSettings {
        WebhookSettings {
            webhook_url: self.webhook.clone(),
            catalog_url: self.url.trim().to_string(),
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
            color: self.colour,
            footer: self.footer.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
