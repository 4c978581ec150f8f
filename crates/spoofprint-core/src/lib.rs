//! # spoofprint-core
//!
//! Codec for JA3-style TLS ClientHello fingerprints.
//!
//! The forward path turns a fingerprint string such as
//! `"769,47-53,0-10-11,23,0"` into a [`ClientHelloSpec`] ready to drive
//! a spoofed handshake. The reverse path decodes a raw ClientHello as
//! captured on the wire and renders it back into the canonical string.

pub mod fingerprint;

pub use fingerprint::decode::decode_client_hello;
pub use fingerprint::encode::encode_client_hello;
pub use fingerprint::format::{format_ja3, ja3_hash};
pub use fingerprint::parse::{
    parse_ja3, parse_ja3_with_policy, ANDROID_JA3, CHROME_JA3, SAFARI_JA3,
};
pub use fingerprint::registry::{build_extension, UnknownExtensionPolicy};
pub use fingerprint::spec::{ClientHelloSpec, Extension, GenericExtension};
pub use fingerprint::FingerprintError;
