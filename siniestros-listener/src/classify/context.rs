use http::header::{CONTENT_TYPE, ORIGIN, USER_AGENT};
use http::request::Parts;
use http::{HeaderMap, HeaderValue, Method};
use percent_encoding::percent_decode_str;

/// Header-derived view of an inbound request. Built from the request head
/// only; the body stays with the caller.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Request-line path, percent-decoded once. No dot-segment or case
    /// normalization; the query is dropped.
    pub path: String,
    /// Raw User-Agent, case preserved. Empty when the header is absent.
    pub user_agent: String,
    pub content_type: Option<String>,
    pub origin: Option<HeaderValue>,
    pub has_cookie: bool,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts) -> Self {
        let headers = &parts.headers;
        Self {
            method: parts.method.clone(),
            path: decode_path(parts.uri.path()),
            user_agent: header_lossy(headers, USER_AGENT.as_str()).unwrap_or_default(),
            content_type: header_lossy(headers, CONTENT_TYPE.as_str()),
            origin: headers.get(ORIGIN).cloned(),
            has_cookie: headers.contains_key(http::header::COOKIE),
        }
    }
}

// Invalid UTF-8 after decoding is replaced, not rejected.
fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

// Non-ASCII header bytes are kept (lossy) rather than dropped, so an agent
// string with stray bytes still gets classified.
fn header_lossy(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}
