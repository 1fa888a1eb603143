//! Tollgate - quota-aware social gateway and resilient game store
//!
//! Loads configuration, starts the application context and logs a health
//! report every minute until Ctrl-C.

use std::process::ExitCode;
use std::time::Duration;

use tollgate_domain::constants::HEALTH_REPORT_INTERVAL_SECS;
use tollgate_domain::Result;
use tollgate_infra::config;
use tollgate_lib::utils::logging::init_tracing;
use tollgate_lib::{run_health_reporter, AppContext};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before the config loader reads the environment
    let dotenv = dotenvy::dotenv();

    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            // no subscriber yet: fall back to defaults so the failure is visible
            init_tracing(&Default::default());
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging);
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!(error = %e, "no .env file loaded"),
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "tollgate exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: tollgate_domain::Config) -> Result<()> {
    info!("Tollgate starting...");
    let context = AppContext::new(config).await?;
    info!("Tollgate initialized successfully");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
        }
    };
    let reports =
        run_health_reporter(&context, Duration::from_secs(HEALTH_REPORT_INTERVAL_SECS), shutdown)
            .await;

    info!(reports, "shutdown requested");
    context.shutdown().await
}
