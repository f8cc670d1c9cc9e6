use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::Utc;
use http::{HeaderValue, Request, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Body;
use once_cell::sync::Lazy;

use crate::classify::{RequestClassifier, RequestContext, Verdict};
use crate::metrics::counters;
use crate::obs::{AccessLog, ObsSink};
use crate::webhook::{AccessLogger, BodyDecoder, MessageCatalog, MessageKey, ResponseEnvelope};

use super::cors;
use super::response::{self, HttpResponse, REQUEST_ID_HEADER};
use super::routes::{self, Route};
use super::static_files::StaticFiles;

static REQ_COUNTER: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(1));

fn gen_request_id() -> String {
    let n = REQ_COUNTER.fetch_add(1, Ordering::Relaxed);
    let ts = Utc::now().timestamp_millis();
    format!("req-{}-{:x}", ts, n)
}

/// Failures the pipeline does not absorb. Hyper turns these into an aborted
/// connection.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("read request body")]
    Body(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("encode response body")]
    Encode(#[from] serde_json::Error),

    #[error("build response")]
    Response(#[from] http::Error),
}

/// Per-request orchestration: classify, dispatch, decode, respond, log.
pub struct RequestPipeline {
    classifier: RequestClassifier,
    decoder: Arc<dyn BodyDecoder>,
    catalog: Arc<MessageCatalog>,
    static_files: StaticFiles,
    logger: AccessLogger,
    obs: Option<ObsSink>,
}

impl RequestPipeline {
    pub fn new(
        classifier: RequestClassifier,
        decoder: Arc<dyn BodyDecoder>,
        catalog: Arc<MessageCatalog>,
        static_files: StaticFiles,
    ) -> Self {
        Self {
            classifier,
            decoder,
            catalog,
            static_files,
            logger: AccessLogger,
            obs: None,
        }
    }

    pub fn with_obs(mut self, obs: ObsSink) -> Self {
        self.obs = Some(obs);
        self
    }

    /// The body is only polled on the webhook route, and only after the
    /// request has been classified.
    pub async fn process<B>(&self, req: Request<B>) -> Result<HttpResponse, PipelineError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let start = Instant::now();
        let request_id = gen_request_id();
        let (parts, body) = req.into_parts();
        let ctx = RequestContext::from_parts(&parts);

        if self.classifier.classify(&ctx).is_blocked() {
            drop(body);
            counters::on_block();
            let mut resp = response::blocked_response(self.catalog.get(MessageKey::Blocked))?;
            set_request_id(&mut resp, &request_id);
            self.record(&ctx, &request_id, Verdict::Blocked, "blocked", resp.status(), None, start);
            return Ok(resp);
        }

        let route = routes::resolve(&parts.method, &ctx.path, &parts.headers);
        let label = route.label();
        let is_preflight = matches!(route, Route::Preflight);
        counters::on_request(label);

        let mut payload_kind = None;
        let mut resp = match route {
            Route::Preflight => cors::preflight_response(&parts.headers)?,
            Route::Listener => {
                let (resp, kind) = self.receive(body, ctx.content_type.as_deref()).await?;
                payload_kind = Some(kind);
                resp
            }
            Route::Web { rel, head } => match self.static_files.load(rel).await {
                Some((bytes, content_type)) => response::file_response(bytes, content_type, head)?,
                None => self.not_found()?,
            },
            Route::MethodNotAllowed { allow } => {
                response::method_not_allowed(self.catalog.get(MessageKey::MethodNotAllowed), allow)?
            }
            Route::RedirectSlash { location } => match parts.uri.query() {
                Some(q) => response::redirect(&format!("{location}?{q}"))?,
                None => response::redirect(location)?,
            },
            Route::Unmatched => self.not_found()?,
        };

        if resp.status() == StatusCode::NOT_FOUND {
            self.logger.log_not_found(&ctx.path);
        }

        if !is_preflight {
            cors::apply(ctx.origin.as_ref(), ctx.has_cookie, resp.headers_mut());
        }
        set_request_id(&mut resp, &request_id);
        self.record(&ctx, &request_id, Verdict::Allowed, label, resp.status(), payload_kind, start);
        Ok(resp)
    }

    async fn receive<B>(
        &self,
        body: B,
        content_type: Option<&str>,
    ) -> Result<(HttpResponse, &'static str), PipelineError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let bytes = body
            .collect()
            .await
            .map_err(|e| PipelineError::Body(e.into()))?
            .to_bytes();

        let payload = self.decoder.decode(&bytes, content_type);
        let kind = payload.kind_str();
        counters::on_payload(kind);
        self.logger.log_inbound(&payload);

        let envelope = ResponseEnvelope::build(payload, &self.catalog);
        let resp = response::json_response(StatusCode::OK, &envelope)?;
        self.logger.log_outbound(&envelope);
        Ok((resp, kind))
    }

    fn not_found(&self) -> Result<HttpResponse, PipelineError> {
        response::detail_response(StatusCode::NOT_FOUND, self.catalog.get(MessageKey::NotFound))
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        ctx: &RequestContext,
        request_id: &str,
        verdict: Verdict,
        route: &'static str,
        status: StatusCode,
        payload_kind: Option<&'static str>,
        start: Instant,
    ) {
        let elapsed = start.elapsed().as_secs_f64();
        counters::on_response(route, status.as_u16(), elapsed);

        let Some(obs) = &self.obs else {
            return;
        };
        obs.write_access(&AccessLog {
            ts: Utc::now(),
            request_id: request_id.to_string(),
            action: verdict.kind_str().to_string(),
            method: ctx.method.to_string(),
            path: ctx.path.clone(),
            status: status.as_u16(),
            latency_ms: (elapsed * 1000.0) as u64,
            user_agent: (!ctx.user_agent.is_empty()).then(|| ctx.user_agent.clone()),
            payload_kind: payload_kind.map(str::to_string),
        });
    }
}

fn set_request_id(resp: &mut HttpResponse, request_id: &str) {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, v);
    }
}
