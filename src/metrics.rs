use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};

use prometheus::{
    CounterVec, Encoder, Gauge, HistogramVec, TextEncoder, histogram_opts, opts,
    register_counter_vec, register_gauge, register_histogram_vec,
};

use std::sync::LazyLock;
use std::time::Instant;

use crate::domain::MessagePayload;

static HTTP_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter_vec!(
        opts!("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"]
    )
    .unwrap()
});

static HTTP_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .buckets(vec![
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0
        ]),
        &["method", "path"]
    )
    .unwrap()
});

static SESSIONS_ACTIVE: LazyLock<Gauge> = LazyLock::new(|| {
    register_gauge!(opts!("sessions_active", "Active WS sessions")).unwrap()
});

static MESSAGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter_vec!(
        opts!("live_messages_total", "Messages delivered"),
        &["payload"]
    )
    .unwrap()
});

static SHARE_TARGETS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter_vec!(
        opts!("share_targets_total", "Per-target share outcomes"),
        &["outcome"]
    )
    .unwrap()
});

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let duration = start.elapsed();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path])
        .observe(duration.as_secs_f64());

    response
}

pub async fn metrics_handler() -> Result<String, StatusCode> {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metrics, &mut buffer)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

pub struct Metrics;

impl Metrics {
    pub fn session_connected() {
        SESSIONS_ACTIVE.inc();
    }

    pub fn session_disconnected() {
        SESSIONS_ACTIVE.dec();
    }

    pub fn message_delivered(payload: &MessagePayload) {
        let label = match payload {
            MessagePayload::Text(_) => "text",
            MessagePayload::Shared(_) => "shared",
        };
        MESSAGES_TOTAL.with_label_values(&[label]).inc();
    }

    pub fn share_target(outcome: &str) {
        SHARE_TARGETS_TOTAL.with_label_values(&[outcome]).inc();
    }
}
