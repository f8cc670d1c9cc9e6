use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

pub static REQ_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "siniestros_http_requests_total",
        "Allowed HTTP requests by resolved route",
        &["route"]
    )
        .expect("register siniestros_http_requests_total")
});

pub static BOT_BLOCKS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "siniestros_bot_blocks_total",
        "Requests rejected as automated-scanner traffic"
    )
        .expect("register siniestros_bot_blocks_total")
});

pub static PAYLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "siniestros_payloads_total",
        "Webhook bodies by decoded kind",
        &["kind"]
    )
        .expect("register siniestros_payloads_total")
});

pub static RESP_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "siniestros_http_responses_total",
        "HTTP responses by status code",
        &["code"]
    )
        .expect("register siniestros_http_responses_total")
});

pub static REQ_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.0005, 0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0];
    register_histogram_vec!(
        "siniestros_http_request_duration_seconds",
        "Request handling time in seconds",
        &["route"],
        buckets
    )
        .expect("register siniestros_http_request_duration_seconds")
});

#[inline]
pub fn on_request(route: &str) {
    REQ_TOTAL.with_label_values(&[route]).inc();
}

#[inline]
pub fn on_block() {
    BOT_BLOCKS_TOTAL.inc();
}

#[inline]
pub fn on_payload(kind: &str) {
    PAYLOADS_TOTAL.with_label_values(&[kind]).inc();
}

#[inline]
pub fn on_response(route: &str, code: u16, secs: f64) {
    let code = code.to_string();
    RESP_TOTAL.with_label_values(&[code.as_str()]).inc();
    REQ_DURATION.with_label_values(&[route]).observe(secs);
}
