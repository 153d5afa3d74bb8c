#![cfg(not(tarpaulin_include))]

use sales_dashboard::app;
use sales_dashboard::config::DashboardConfig;

/// Main entry point for the dashboard web server
///
/// Reads settings from command-line flags and their `DASHBOARD_*` environment
/// variables (see `dashboard --help`), sets up logging, then serves the page and
/// its API until the process is stopped.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DashboardConfig::load();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter()),
    )
    .init();

    log::info!(
        "starting sales dashboard in {} mode",
        if config.debug { "debug" } else { "run" }
    );
    app::run(config).await
}
