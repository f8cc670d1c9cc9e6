use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;

use super::pipeline::PipelineError;

pub type HttpResponse = Response<Full<Bytes>>;

/// Marker on classifier rejections, so they can be told apart from real 404s.
pub const BOT_BLOCKED_HEADER: &str = "x-bot-blocked";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const JSON: &str = "application/json";

#[derive(Serialize)]
struct Detail<'a> {
    detail: &'a str,
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<HttpResponse, PipelineError> {
    let bytes = Bytes::from(serde_json::to_vec(body)?);
    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON)
        .header(CONTENT_LENGTH, bytes.len())
        .body(Full::new(bytes))?)
}

/// `{"detail": ...}` error body.
pub fn detail_response(status: StatusCode, detail: &str) -> Result<HttpResponse, PipelineError> {
    json_response(status, &Detail { detail })
}

/// Scanner rejection: a plain-looking 404 plus the marker header.
pub fn blocked_response(detail: &str) -> Result<HttpResponse, PipelineError> {
    let mut resp = detail_response(StatusCode::NOT_FOUND, detail)?;
    resp.headers_mut()
        .insert(BOT_BLOCKED_HEADER, HeaderValue::from_static("True"));
    Ok(resp)
}

pub fn method_not_allowed(detail: &str, allow: &'static str) -> Result<HttpResponse, PipelineError> {
    let mut resp = detail_response(StatusCode::METHOD_NOT_ALLOWED, detail)?;
    resp.headers_mut()
        .insert(http::header::ALLOW, HeaderValue::from_static(allow));
    Ok(resp)
}

/// Temporary redirect that keeps the method and body.
pub fn redirect(location: &str) -> Result<HttpResponse, PipelineError> {
    Ok(Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(http::header::LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(Full::new(Bytes::new()))?)
}

pub fn file_response(bytes: Bytes, content_type: &'static str, head: bool) -> Result<HttpResponse, PipelineError> {
    let len = bytes.len();
    let body = if head { Bytes::new() } else { bytes };
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, len)
        .body(Full::new(body))?)
}
