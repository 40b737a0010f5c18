//! `pollvisor-api`: serves the product listing until SIGTERM/SIGINT.

use std::sync::Arc;

use clap::Parser;
use pollvisor::settings::ApiSettings;
use pollvisor::{HttpServer, StopSignal, Supervisor, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = ApiSettings::parse();
    let redactor = logging::init(&settings.log.to_log_settings()?)?;
    let server_cfg = settings.server()?;

    tracing::info!(
        address = %redactor.field("address", &server_cfg.address),
        allowed_origin = %server_cfg.allowed_origin,
        grace_secs = settings.grace.grace_secs,
        "starting api"
    );

    let sup = Supervisor::new(settings.grace.supervisor());
    sup.register(Arc::new(HttpServer::new(server_cfg)?));

    match sup.wait(StopSignal::DEFAULT).await {
        Ok(()) => {
            tracing::info!("api stopped");
            Ok(())
        }
        Err(e) => {
            for failure in e.failures() {
                tracing::error!(task = %failure.task, label = failure.error.as_label(), error = %failure.error, "task failed");
            }
            Err(e.into())
        }
    }
}
