//! Operation metrics for the record store.

use std::time::Instant;

/// Records operation metrics for a store operation.
///
/// This function records two metrics for each operation:
/// 1. `litestore_operations_total` - Counter for operation count by status
/// 2. `litestore_operation_duration_ms` - Histogram for operation latency
///
/// Metrics go through the `metrics` facade; nothing is exported unless the
/// embedding application installs a recorder.
///
/// # Arguments
///
/// * `operation` - Operation name (e.g., "list", "create", "count")
/// * `start` - Operation start time from `Instant::now()`
/// * `status` - Operation status ("success" or "error")
pub fn record_operation_metrics(operation: &'static str, start: Instant, status: &'static str) {
    metrics::counter!(
        "litestore_operations_total",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "litestore_operation_duration_ms",
        "backend" => "sqlite",
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_record_operation_metrics_without_recorder() {
        let start = Instant::now();
        thread::sleep(Duration::from_millis(1));

        record_operation_metrics("list", start, "success");
        record_operation_metrics("create", start, "error");

        assert!(start.elapsed().as_millis() >= 1);
    }
}
