use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use pingora::server::ShutdownWatch;
use pingora_core::services::background::BackgroundService;
use prometheus::{Encoder, TextEncoder};

use crate::server::listener::{serve, HttpHandler};
use crate::server::response::HttpResponse;

/// Prometheus scrape endpoint on its own listener, outside the classifier.
#[derive(Clone)]
pub struct MetricsSvc {
    listen: String,
}

impl MetricsSvc {
    pub fn new(listen: impl Into<String>) -> Self {
        Self { listen: listen.into() }
    }
}

#[async_trait]
impl BackgroundService for MetricsSvc {
    async fn start(&self, shutdown: ShutdownWatch) {
        serve("metrics", &self.listen, Arc::new(MetricsHandler), shutdown).await;
    }
}

pub struct MetricsHandler;

#[async_trait]
impl HttpHandler for MetricsHandler {
    type Error = Infallible;

    async fn handle(&self, req: Request<Incoming>) -> Result<HttpResponse, Infallible> {
        Ok(render(req.uri().path()))
    }
}

fn render(path: &str) -> HttpResponse {
    let (status, content_type, body) = if path == "/metrics" {
        (
            StatusCode::OK,
            "text/plain; version=0.0.4; charset=utf-8",
            Bytes::from(gather_as_text()),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            "text/plain; charset=utf-8",
            Bytes::from_static(b"not found"),
        )
    };

    let mut resp = Response::new(Full::new(body));
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static(content_type),
    );
    resp
}

pub fn gather_as_text() -> String {
    let mf = prometheus::gather();
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&mf, &mut buf) {
        tracing::warn!("metrics encode failed: {}", e);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
