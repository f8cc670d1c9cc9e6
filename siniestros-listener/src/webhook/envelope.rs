use serde::Serialize;

use super::decoder::DecodedPayload;
use super::messages::{MessageCatalog, MessageKey};

/// Body of every `/listener` reply: `{"mensaje": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "mensaje")]
    pub message: String,
    pub data: DecodedPayload,
}

impl ResponseEnvelope {
    pub fn build(payload: DecodedPayload, catalog: &MessageCatalog) -> Self {
        let key = match payload {
            DecodedPayload::Structured(_) => MessageKey::ReceivedStructured,
            DecodedPayload::Raw(_) => MessageKey::ReceivedRaw,
        };
        Self {
            message: catalog.get(key).to_string(),
            data: payload,
        }
    }
}
