mod cli;
mod logging;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use monitor_logging::{monitor_error, monitor_info};
use stock_engine::{Monitor, ReqwestCatalogFetcher, WebhookNotifier};
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;

// One polling loop; the cycle counter in `monitor_logging` is thread-local.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(err) if err.not_found() => {}
        Err(err) => return Err(err).context("failed to read .env"),
    }

    let cli = Cli::parse();
    logging::initialize(cli.log_to, cli.log_level, &cli.log_file);
    monitor_info!("Starting stock monitor {}", env!("CARGO_PKG_VERSION"));

    let fetcher = ReqwestCatalogFetcher::new(cli.fetch_settings());
    let notifier = WebhookNotifier::new(cli.webhook_settings());
    let monitor = match Monitor::new(cli.monitor_settings(), fetcher, notifier) {
        Ok(monitor) => monitor,
        Err(err) => {
            monitor_error!("{}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                monitor_info!("Shutdown requested");
                on_signal.cancel();
            }
            Err(err) => monitor_error!("Could not listen for Ctrl-C: {}", err),
        }
    });

    monitor.run(cancel).await;
    Ok(ExitCode::SUCCESS)
}
