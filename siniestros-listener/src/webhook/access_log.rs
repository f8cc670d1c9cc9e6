use super::decoder::DecodedPayload;
use super::envelope::ResponseEnvelope;

const TARGET: &str = "siniestros";

/// Traffic hooks for the webhook route and genuine not-found responses.
/// Blocked requests never reach these.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLogger;

impl AccessLogger {
    pub fn log_inbound(&self, payload: &DecodedPayload) {
        tracing::info!(target: TARGET, kind = payload.kind_str(), "{}", render_inbound(payload));
    }

    pub fn log_outbound(&self, envelope: &ResponseEnvelope) {
        tracing::info!(target: TARGET, "Respuesta enviada: {}", pretty(envelope));
    }

    pub fn log_not_found(&self, path: &str) {
        tracing::warn!(target: TARGET, "404 para la ruta: {}", path);
    }
}

pub fn render_inbound(payload: &DecodedPayload) -> String {
    match payload {
        DecodedPayload::Structured(v) => format!("Recibido (JSON): {}", pretty(v)),
        DecodedPayload::Raw(t) => format!("Recibido (Texto Plano): {t}"),
    }
}

fn pretty<T: serde::Serialize>(v: &T) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}
