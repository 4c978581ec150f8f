//! [`ClientHelloSpec`] → canonical JA3 fingerprint string.
//!
//! The inverse of parsing: version, ciphers, extension type ids, then
//! the curve and point lists pulled from whichever extensions carry
//! them, every sequence in spec order. `format(parse(s)) == s` for any
//! valid fingerprint whose ids the registry knows.

use md5::{Digest, Md5};

use crate::fingerprint::spec::{ClientHelloSpec, Extension};
use crate::fingerprint::FingerprintError;

/// Render the canonical fingerprint string.
///
/// Fails with [`FingerprintError::UnreadableExtensionType`] if an
/// extension at some position carries no recoverable type code (a
/// truncated fragment captured by the permissive decoder).
pub fn format_ja3(spec: &ClientHelloSpec) -> Result<String, FingerprintError> {
    let mut out = String::new();
    // The handshake-layer version is the fingerprinted one.
    out.push_str(&spec.version_max().to_string());

    out.push(',');
    push_joined(&mut out, spec.cipher_suites().iter());

    out.push(',');
    let mut curves: &[u16] = &[];
    let mut points: &[u8] = &[];
    for (index, ext) in spec.extensions().iter().enumerate() {
        if index >= 1 {
            out.push('-');
        }
        let id = ext
            .type_id()
            .ok_or(FingerprintError::UnreadableExtensionType { index })?;
        out.push_str(&id.to_string());
        match ext {
            Extension::SupportedCurves(list) => curves = list,
            Extension::PointFormats(list) => points = list,
            _ => {}
        }
    }

    out.push(',');
    push_joined(&mut out, curves.iter());

    out.push(',');
    push_joined(&mut out, points.iter());

    Ok(out)
}

/// MD5 of the canonical fingerprint string, lowercase hex — the usual
/// 32-character JA3 hash.
pub fn ja3_hash(spec: &ClientHelloSpec) -> Result<String, FingerprintError> {
    let raw = format_ja3(spec)?;
    let mut hasher = Md5::new();
    hasher.update(raw.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

fn push_joined<T: std::fmt::Display>(out: &mut String, values: impl Iterator<Item = T>) {
    for (index, value) in values.enumerate() {
        if index >= 1 {
            out.push('-');
        }
        out.push_str(&value.to_string());
    }
}
