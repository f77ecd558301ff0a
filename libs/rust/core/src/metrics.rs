//! Prometheus collectors for the leaderboard query path.

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec, IntGauge,
};
use std::time::Duration;

pub struct QueryMetrics {
    pub queries_total: IntCounterVec,
    pub rejected_total: IntCounterVec,
    pub latency_ms: Histogram,
    pub rows_returned: Histogram,
    pub dataset_rows: IntGauge,
}

pub static QUERY_METRICS: Lazy<QueryMetrics> = Lazy::new(|| QueryMetrics {
    queries_total: register_int_counter_vec!(
        "gradboard_queries_total",
        "Leaderboard queries served",
        &["sort_key"]
    )
    .expect("gradboard_queries_total registers once"),
    rejected_total: register_int_counter_vec!(
        "gradboard_query_rejected_total",
        "Leaderboard queries rejected before execution",
        &["reason"]
    )
    .expect("gradboard_query_rejected_total registers once"),
    latency_ms: register_histogram!(
        "gradboard_query_latency_ms",
        "Filter/sort/group latency (ms)",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 25.0, 50.0]
    )
    .expect("gradboard_query_latency_ms registers once"),
    rows_returned: register_histogram!(
        "gradboard_query_rows_returned",
        "Rows returned per query",
        vec![0.0, 1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0]
    )
    .expect("gradboard_query_rows_returned registers once"),
    dataset_rows: register_int_gauge!("gradboard_dataset_rows", "Rows in the loaded leaderboard snapshot")
        .expect("gradboard_dataset_rows registers once"),
});

pub fn record_query(sort_key: &str, elapsed: Duration, rows: usize) {
    QUERY_METRICS.queries_total.with_label_values(&[sort_key]).inc();
    QUERY_METRICS.latency_ms.observe(elapsed.as_secs_f64() * 1000.0);
    QUERY_METRICS.rows_returned.observe(rows as f64);
}

pub fn record_rejected(reason: &str) {
    QUERY_METRICS.rejected_total.with_label_values(&[reason]).inc();
}

pub fn set_dataset_rows(rows: usize) {
    QUERY_METRICS.dataset_rows.set(rows as i64);
}
