//! Placeholder for Metrics Export features.
//! As per Prompt #8: Prometheus export, custom metrics, aggregation, retention, alerting.

use tracing::warn;

pub fn init_metrics_export() {
    warn!("Metrics export system (e.g., Prometheus) is not yet fully implemented.");
}

pub fn export_metric(name: &str, value: f64, labels: Option<&[(&str, &str)]>) {
    // warn!("Exporting metric '{}': {} (Labels: {:?}) - feature not fully implemented.", name, value, labels);
}
