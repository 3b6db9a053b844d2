//! Headless presentation director
//!
//! Polls the orchestrator, drives the presentation and serves the render
//! signals until interrupted.

use holo_core::HoloResult;
use holo_runtime::{init_logging, log_json_from_env, serve, Driver, DriverConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = init_logging(log_json_from_env()) {
        eprintln!("holo-director: {e}");
        std::process::exit(2);
    }
    if let Err(e) = run().await {
        error!(error = %e, "holo-director failed");
        std::process::exit(1);
    }
}

async fn run() -> HoloResult<()> {
    let config = DriverConfig::from_env()?;
    let driver = Driver::new(config.clone())?;

    let server = tokio::spawn(serve(config.signals_addr, driver.signals()));
    let stats = driver
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;
    server.abort();

    info!(
        ticks = stats.ticks,
        utterances = stats.utterances_completed,
        abandoned = stats.utterances_abandoned,
        "director stopped"
    );
    Ok(())
}
