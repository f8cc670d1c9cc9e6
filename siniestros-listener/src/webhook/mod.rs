//! The `/listener` route: tolerant decoding, the echo envelope and the
//! traffic log hooks.

pub mod access_log;
pub mod decoder;
pub mod envelope;
pub mod messages;

pub use access_log::AccessLogger;
pub use decoder::{BodyDecoder, TolerantBodyDecoder};
pub use envelope::ResponseEnvelope;
pub use messages::{MessageCatalog, MessageKey};
