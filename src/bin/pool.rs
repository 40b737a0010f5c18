//! `pollvisor-pool`: long-polls the bot API and logs every update it receives.

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use pollvisor::settings::PoolSettings;
use pollvisor::{
    HttpFetcher, LongPoll, RawPayload, StopSignal, Supervisor, TaskError, TaskFn, logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = PoolSettings::parse();
    let redactor = logging::init(&settings.log.to_log_settings()?)?.with_secret(settings.token.trim());
    let poll_cfg = settings.poll()?;

    tracing::info!(
        token = %redactor.field("token", &settings.token),
        endpoint = %redactor.field("endpoint", &poll_cfg.endpoint),
        limit = poll_cfg.effective_limit(),
        grace_secs = settings.grace.grace_secs,
        "starting pool"
    );

    let fetcher = HttpFetcher::<RawPayload>::new(&poll_cfg)?;
    let (poller, rx) = LongPoll::new("long-poll", fetcher, poll_cfg);
    let poller = poller.with_redactor(redactor);

    // Owned by the single run of the consumer; a second run finds it gone.
    let rx = Arc::new(tokio::sync::Mutex::new(Some(rx)));
    let consumer = TaskFn::arc("consumer", move |_lifetime: CancellationToken| {
        let rx = Arc::clone(&rx);
        async move {
            let mut rx = rx
                .lock()
                .await
                .take()
                .ok_or_else(|| TaskError::fatal("handoff receiver already taken"))?;
            // Runs until the poller drops its sender, so queued items are not lost.
            while let Some(payload) = rx.recv().await {
                let keys: Vec<&str> = payload.keys().map(String::as_str).collect();
                tracing::info!(kinds = ?keys, "update received");
                tracing::debug!(payload = %serde_json::Value::Object(payload), "update payload");
            }
            tracing::info!("handoff closed");
            Ok::<(), TaskError>(())
        }
    });

    let sup = Supervisor::new(settings.grace.supervisor());
    sup.register(Arc::new(poller));
    sup.register(consumer);

    match sup.wait(StopSignal::DEFAULT).await {
        Ok(()) => {
            tracing::info!("pool stopped");
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
