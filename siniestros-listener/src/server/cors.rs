//! Permissive CORS: every origin, every method, every header, credentials on.

use bytes::Bytes;
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS,
    ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, ORIGIN, VARY,
};
use http::{HeaderMap, HeaderValue, Method, Response, StatusCode};
use http_body_util::Full;

use super::response::HttpResponse;

const ALL_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";
const MAX_AGE: &str = "600";

pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    *method == Method::OPTIONS
        && headers.contains_key(ORIGIN)
        && headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

pub fn preflight_response(headers: &HeaderMap) -> Result<HttpResponse, http::Error> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(ACCESS_CONTROL_ALLOW_METHODS, ALL_METHODS)
        .header(ACCESS_CONTROL_MAX_AGE, MAX_AGE)
        .header(ACCESS_CONTROL_ALLOW_CREDENTIALS, "true")
        .header(VARY, "Origin");

    if let Some(origin) = headers.get(ORIGIN) {
        builder = builder.header(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    }
    if let Some(requested) = headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
        builder = builder.header(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
    }

    builder.body(Full::new(Bytes::from_static(b"OK")))
}

/// Decorates a non-preflight response. No-op without an `Origin`.
/// Credentialed requests (cookies) get the origin echoed, since `*` is not
/// honored by browsers for those.
pub fn apply(origin: Option<&HeaderValue>, has_cookie: bool, headers: &mut HeaderMap) {
    let Some(origin) = origin else {
        return;
    };

    if has_cookie {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.append(VARY, HeaderValue::from_static("Origin"));
    } else {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
    headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
}
