use std::sync::Arc;

use async_trait::async_trait;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use pingora::server::ShutdownWatch;
use pingora_core::services::background::BackgroundService;
use tokio::net::TcpListener;

use super::pipeline::{PipelineError, RequestPipeline};
use super::response::HttpResponse;

/// One request in, one response out. Implemented by every HTTP/1 listener
/// this process runs.
#[async_trait]
pub trait HttpHandler: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn handle(&self, req: Request<Incoming>) -> Result<HttpResponse, Self::Error>;
}

#[async_trait]
impl HttpHandler for RequestPipeline {
    type Error = PipelineError;

    async fn handle(&self, req: Request<Incoming>) -> Result<HttpResponse, PipelineError> {
        self.process(req).await
    }
}

/// Accept loop shared by the webhook and metrics listeners. Each connection
/// gets its own task; returns on shutdown or when the bind fails.
pub async fn serve<H: HttpHandler>(
    name: &'static str,
    listen: &str,
    handler: Arc<H>,
    mut shutdown: ShutdownWatch,
) {
    let listener = match TcpListener::bind(listen).await {
        Ok(l) => {
            tracing::info!("{} listening on {}", name, listen);
            l
        }
        Err(e) => {
            tracing::error!("{} bind {} failed: {}", name, listen, e);
            return;
        }
    };

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::info!("{} service shutdown", name);
                return;
            }
            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!("{} accept error: {}", name, e);
                        continue;
                    }
                };

                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let svc = service_fn(move |req| {
                        let handler = Arc::clone(&handler);
                        async move { handler.handle(req).await }
                    });

                    let builder = hyper::server::conn::http1::Builder::new();
                    if let Err(e) = builder.serve_connection(io, svc).await {
                        tracing::warn!(%peer, "{} conn error: {}", name, e);
                    }
                });
            }
        }
    }
}

/// The public listener: every inbound request goes through the pipeline.
pub struct WebhookSvc {
    listen: String,
    pipeline: Arc<RequestPipeline>,
}

impl WebhookSvc {
    pub fn new(listen: impl Into<String>, pipeline: Arc<RequestPipeline>) -> Self {
        Self {
            listen: listen.into(),
            pipeline,
        }
    }
}

#[async_trait]
impl BackgroundService for WebhookSvc {
    async fn start(&self, shutdown: ShutdownWatch) {
        serve("listener", &self.listen, Arc::clone(&self.pipeline), shutdown).await;
    }
}
