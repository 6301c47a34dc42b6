// Metrics module for observability
// Provides counters and histograms for HTTP traffic, bookings and logins

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Initialize all metric descriptions
/// Should be called once at application startup
pub fn init_metrics() {
    // HTTP request metrics
    describe_counter!(
        "http_requests_total",
        "Total number of HTTP requests received"
    );
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // Booking metrics
    describe_counter!("bookings_created_total", "Total number of bookings created");
    describe_counter!(
        "bookings_rejected_total",
        "Total number of booking requests rejected, by reason"
    );
    describe_counter!(
        "bookings_cancelled_total",
        "Total number of bookings cancelled"
    );

    // Auth metrics
    describe_counter!("auth_logins_total", "Total number of login attempts, by result");

    tracing::info!("Metrics initialized");
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string(), "status" => status.to_string()).increment(1);
    histogram!("http_request_duration_seconds", "method" => method.to_string(), "path" => path.to_string()).record(duration_secs);

    if status >= 400 {
        counter!("http_requests_errors_total", "method" => method.to_string(), "path" => path.to_string(), "status" => status.to_string()).increment(1);
    }
}

pub fn record_booking_created() {
    counter!("bookings_created_total").increment(1);
}

/// `reason` is one of `overlap`, `too_many_guests`, `invalid_dates`
pub fn record_booking_rejected(reason: &'static str) {
    counter!("bookings_rejected_total", "reason" => reason).increment(1);
}

pub fn record_booking_cancelled() {
    counter!("bookings_cancelled_total").increment(1);
}

pub fn record_login(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("auth_logins_total", "result" => result).increment(1);
}

/// Timer helper for measuring operation duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
