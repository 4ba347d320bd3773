use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Safe to call more than once.
pub fn init_metrics() -> anyhow::Result<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    // A concurrent initialiser may have won; its handle is equivalent.
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// A task accepted by the provider.
pub fn record_job_submitted(kind: &str, model: &str) {
    counter!(
        "stylize_jobs_submitted_total",
        "kind" => kind.to_string(),
        "model" => model.to_string()
    )
    .increment(1);
}

pub fn record_quota_rejection(subscription: &str) {
    counter!(
        "stylize_quota_rejections_total",
        "subscription" => subscription.to_string()
    )
    .increment(1);
}

pub fn record_upload(host: &str, outcome: &str) {
    counter!(
        "stylize_image_uploads_total",
        "host" => host.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

pub fn record_callback(status: &str) {
    counter!("stylize_callbacks_total", "status" => status.to_string()).increment(1);
}
