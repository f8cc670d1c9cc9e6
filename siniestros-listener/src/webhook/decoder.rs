use serde::Serialize;
use serde_json::Value;

/// A request body after decoding. Serializes as the bare value (structured)
/// or as a JSON string (raw).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedPayload {
    Structured(Value),
    Raw(String),
}

impl DecodedPayload {
    pub fn kind_str(&self) -> &'static str {
        match self {
            DecodedPayload::Structured(_) => "json",
            DecodedPayload::Raw(_) => "text",
        }
    }
}

/// The body is not a JSON document. Only ever selects the raw fallback.
#[derive(Debug, thiserror::Error)]
#[error("body is not a structured document: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

pub trait BodyDecoder: Send + Sync {
    /// Must return exactly one variant for any input.
    fn decode(&self, body: &[u8], content_type: Option<&str>) -> DecodedPayload;
}

/// JSON first, text otherwise. The declared content type is only logged;
/// every body is tried as JSON regardless of its label.
#[derive(Debug, Default, Clone, Copy)]
pub struct TolerantBodyDecoder;

impl TolerantBodyDecoder {
    /// Numbers keep their source digits, so integers beyond 64 bits echo
    /// back unchanged. Nesting deeper than serde_json's recursion limit (128)
    /// is rejected and lands in the raw fallback.
    pub fn parse_structured(body: &[u8]) -> Result<Value, DecodeError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Valid UTF-8 is carried over unchanged. Anything else is decoded with
    /// U+FFFD replacement.
    pub fn to_text(body: &[u8]) -> String {
        match std::str::from_utf8(body) {
            Ok(s) => s.to_owned(),
            Err(e) => {
                tracing::warn!(
                    body_len = body.len(),
                    valid_up_to = e.valid_up_to(),
                    "body is not valid utf-8, replacing invalid sequences"
                );
                String::from_utf8_lossy(body).into_owned()
            }
        }
    }
}

impl BodyDecoder for TolerantBodyDecoder {
    fn decode(&self, body: &[u8], content_type: Option<&str>) -> DecodedPayload {
        match Self::parse_structured(body) {
            Ok(v) => DecodedPayload::Structured(v),
            Err(e) => {
                tracing::debug!(
                    content_type = content_type.unwrap_or("-"),
                    body_len = body.len(),
                    error = %e,
                    "falling back to plain text"
                );
                DecodedPayload::Raw(Self::to_text(body))
            }
        }
    }
}
