pub mod decode;
pub mod encode;
pub mod format;
pub mod grease;
pub mod parse;
pub mod registry;
pub mod spec;

use thiserror::Error;

/// Errors produced by the fingerprint codec.
///
/// A spec is either fully valid or not produced at all; none of these
/// come with a partial result attached.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("malformed fingerprint: expected 5 comma-separated fields, got {fields}")]
    MalformedFingerprint { fields: usize },
    #[error("invalid {width}-bit number {token:?}")]
    InvalidNumber { token: String, width: u8 },
    #[error("unsupported extension id {id:?}")]
    UnsupportedExtension { id: String },
    #[error("buffer out of range: wanted {wanted} bytes, got {got}")]
    OutOfRange { wanted: usize, got: usize },
    #[error("cannot read type code of extension at index {index}")]
    UnreadableExtensionType { index: usize },
    #[error("not a TLS handshake record")]
    NotHandshake,
    #[error("no ClientHello message in record")]
    NotClientHello,
    #[error("TLS parse error: {0}")]
    TlsParse(String),
}
