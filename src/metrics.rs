use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // Pre-register counters so they appear even before the first increment.
    counter!("signals_detected_total").absolute(0);
    counter!("signals_rejected_total").absolute(0);
    counter!("trades_opened_total").absolute(0);
    counter!("trades_closed_total").absolute(0);
    counter!("feed_rows_skipped_total").absolute(0);

    // Pre-register gauges at zero.
    gauge!("tracked_whales").set(0.0);
    gauge!("open_positions").set(0.0);
    gauge!("paper_balance").set(0.0);

    handle
}
