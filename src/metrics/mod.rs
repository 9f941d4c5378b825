//! Metrics module
//!
//! Prometheus counters and histograms for every remote-backed operation.

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec,
    Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    pub static ref OPERATIONS_TOTAL: CounterVec = register_counter_vec!(
        "aws_wrapper_operations_total",
        "Total number of facade operations",
        &["service", "operation", "status"]
    ).unwrap();

    pub static ref OPERATION_DURATION: HistogramVec = register_histogram_vec!(
        "aws_wrapper_operation_duration_seconds",
        "Facade operation duration in seconds",
        &["service", "operation"],
        vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    pub static ref UPLOAD_BYTES_TOTAL: Counter = register_counter!(
        "aws_wrapper_upload_bytes_total",
        "Total bytes uploaded to S3"
    ).unwrap();

    pub static ref BUCKETS_CREATED_TOTAL: Counter = register_counter!(
        "aws_wrapper_buckets_created_total",
        "Buckets created on demand during upload"
    ).unwrap();
}

/// Record the outcome and duration of a facade operation
pub fn record_operation(service: &str, operation: &str, success: bool, duration_secs: f64) {
    let status = if success { "success" } else { "failure" };
    OPERATIONS_TOTAL
        .with_label_values(&[service, operation, status])
        .inc();
    OPERATION_DURATION
        .with_label_values(&[service, operation])
        .observe(duration_secs);
}

/// Record the size of a completed upload
pub fn record_upload_bytes(bytes: u64) {
    UPLOAD_BYTES_TOTAL.inc_by(bytes as f64);
}

/// Record an on-demand bucket creation
pub fn record_bucket_created() {
    BUCKETS_CREATED_TOTAL.inc();
}

/// Render all registered metrics in the Prometheus text format
pub fn render() -> String {
    // Plain counters report zero even when nothing has fired yet
    lazy_static::initialize(&UPLOAD_BYTES_TOTAL);
    lazy_static::initialize(&BUCKETS_CREATED_TOTAL);
    lazy_static::initialize(&OPERATIONS_TOTAL);
    lazy_static::initialize(&OPERATION_DURATION);

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_operation() {
        record_operation("s3", "delete_file", true, 0.01);
        record_operation("s3", "delete_file", false, 0.02);
        // Just verify it doesn't panic
    }

    #[test]
    #[serial_test::serial(upload_bytes)]
    fn test_record_upload_bytes() {
        let before = UPLOAD_BYTES_TOTAL.get();
        record_upload_bytes(1024);
        assert!(UPLOAD_BYTES_TOTAL.get() >= before + 1024.0);
    }

    #[test]
    fn test_render_contains_operation_metrics() {
        record_operation("sqs", "purge_queue", true, 0.001);
        let text = render();
        assert!(text.contains("aws_wrapper_operations_total"));
        assert!(text.contains("purge_queue"));
        assert!(text.contains("aws_wrapper_buckets_created_total"));
    }
}
