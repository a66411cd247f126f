//! Metric series emitted by the research pipeline.
//!
//! Only the `metrics` facade is used here; installing a recorder
//! (Prometheus or otherwise) is left to the host application.

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time registration so series carry descriptions once a recorder exists.
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("research_runs_total", "Research requests started.");
        describe_counter!(
            "research_stage_failures_total",
            "Orchestrator stages that fell back to their empty default."
        );
        describe_counter!(
            "research_persist_failures_total",
            "Research records that could not be written to the store."
        );
        describe_counter!(
            "resolver_step_failures_total",
            "Instrument resolver strategies that errored."
        );
        describe_counter!(
            "news_source_errors_total",
            "News source fetch/parse errors."
        );
        describe_counter!(
            "news_items_collected_total",
            "News items returned by the aggregator."
        );
        describe_histogram!(
            "research_duration_ms",
            "Wall time of one research request in milliseconds."
        );
    });
}
