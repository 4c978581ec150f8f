//! JA3 fingerprint string → [`ClientHelloSpec`].
//!
//! Format: `version,cipher-cipher-…,ext-ext-…,curve-curve-…,point-point-…`
//! with all numbers decimal and unsigned. An empty curve or point field
//! means "no entries", not a single empty entry.

use crate::fingerprint::registry::{build_extension, UnknownExtensionPolicy};
use crate::fingerprint::spec::ClientHelloSpec;
use crate::fingerprint::FingerprintError;

/// JA3 of the Android API 24 TLS stack.
/// MD5: 2454fe66222e468b886b8e552b5e2f3b
pub const ANDROID_JA3: &str = "769,49195-49196-52393-49199-49200-52392-158-159-49161-49162-49171-49172-\
51-57-156-157-47-53,65281-0-23-35-13-16-11-10,23,0";

/// JA3 mimicking Chrome 78.
pub const CHROME_JA3: &str = "769,47-53-5-10-49161-49162-49171-49172-50-56-19-4,0-10-11,23-24-25,0";

/// JA3 mimicking Safari 604.1.
pub const SAFARI_JA3: &str = "771,4865-4866-4867-49196-49195-49188-49187-49162-49161-52393-49200-49199-\
49192-49191-49172-49171-52392-157-156-61-60-53-47-49160-49170-10,\
65281-0-23-13-5-18-16-11-51-45-43-10-21,29-23-24-25,0";

/// Parse a fingerprint string with the default permissive policy.
pub fn parse_ja3(fingerprint: &str) -> Result<ClientHelloSpec, FingerprintError> {
    parse_ja3_with_policy(fingerprint, UnknownExtensionPolicy::default())
}

/// Parse a fingerprint string, choosing how unknown extension ids are
/// handled.
pub fn parse_ja3_with_policy(
    fingerprint: &str,
    policy: UnknownExtensionPolicy,
) -> Result<ClientHelloSpec, FingerprintError> {
    // At most 5: a stray comma lands in the points field and fails as a
    // non-numeric token rather than silently shifting fields.
    let fields: Vec<&str> = fingerprint.splitn(5, ',').collect();
    if fields.len() < 5 {
        return Err(FingerprintError::MalformedFingerprint {
            fields: fields.len(),
        });
    }

    let version = parse_u16(fields[0])?;
    // Ciphers may never be empty, so no empty-field tolerance here: an
    // empty field yields one empty token and fails loudly.
    let ciphers = fields[1]
        .split('-')
        .map(parse_u16)
        .collect::<Result<Vec<u16>, _>>()?;
    let curves = split_dashed(fields[3])
        .iter()
        .map(|token| parse_u16(token))
        .collect::<Result<Vec<u16>, _>>()?;
    let points = split_dashed(fields[4])
        .iter()
        .map(|token| parse_u8(token))
        .collect::<Result<Vec<u8>, _>>()?;

    let extensions = fields[2]
        .split('-')
        .map(|id| build_extension(id, &curves, &points, policy))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ClientHelloSpec::new(version, version, ciphers, extensions))
}

/// Split a dash-delimited field, treating a single empty field as
/// "no entries".
fn split_dashed(field: &str) -> Vec<&str> {
    if field.is_empty() {
        return Vec::new();
    }
    field.split('-').collect()
}

fn parse_u16(token: &str) -> Result<u16, FingerprintError> {
    token.parse().map_err(|_| FingerprintError::InvalidNumber {
        token: token.to_string(),
        width: 16,
    })
}

fn parse_u8(token: &str) -> Result<u8, FingerprintError> {
    token.parse().map_err(|_| FingerprintError::InvalidNumber {
        token: token.to_string(),
        width: 8,
    })
}
