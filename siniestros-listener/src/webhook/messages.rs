use serde::Deserialize;

/// Locale-independent identifiers for every client-visible literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    ReceivedStructured,
    ReceivedRaw,
    Blocked,
    NotFound,
    MethodNotAllowed,
}

/// Wire text for each [`MessageKey`]. Defaults are the literals existing
/// consumers already match on; override them in the `messages:` config
/// section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessageCatalog {
    pub received_structured: String,
    pub received_raw: String,
    pub blocked: String,
    pub not_found: String,
    pub method_not_allowed: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            received_structured: "Recibido correctamente".to_string(),
            received_raw: "Recibido como texto plano".to_string(),
            blocked: "Recurso no encontrado".to_string(),
            not_found: "Not Found".to_string(),
            method_not_allowed: "Method Not Allowed".to_string(),
        }
    }
}

impl MessageCatalog {
    pub fn get(&self, key: MessageKey) -> &str {
        match key {
            MessageKey::ReceivedStructured => &self.received_structured,
            MessageKey::ReceivedRaw => &self.received_raw,
            MessageKey::Blocked => &self.blocked,
            MessageKey::NotFound => &self.not_found,
            MessageKey::MethodNotAllowed => &self.method_not_allowed,
        }
    }
}
