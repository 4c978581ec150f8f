//! Raw ClientHello bytes → [`ClientHelloSpec`].
//!
//! Input is a TLS record as observed on the wire: 1-byte content type,
//! 2-byte record version, 2-byte length, then the handshake message.
//! Decoding is best-effort: the producer is any TLS client, not
//! necessarily a spec-compliant one, so uninterpreted extension types
//! pass through with their type code and raw payload intact and a
//! truncated trailing fragment is kept rather than rejected.

use tls_parser::nom::Err as NomErr;
use tls_parser::{parse_tls_plaintext, TlsMessage, TlsMessageHandshake, TlsRecordType};

use crate::fingerprint::spec::{ext_id, ClientHelloSpec, Extension, GenericExtension};
use crate::fingerprint::FingerprintError;

/// Parse a raw TLS record containing a ClientHello.
///
/// The record-layer version lands in `version_min`, the handshake-layer
/// version found inside the ClientHello body in `version_max`.
pub fn decode_client_hello(raw: &[u8]) -> Result<ClientHelloSpec, FingerprintError> {
    // Content type + 2-byte record version is the bare minimum.
    if raw.len() < 3 {
        return Err(FingerprintError::OutOfRange {
            wanted: 3,
            got: raw.len(),
        });
    }
    let record_version = u16::from_be_bytes([raw[1], raw[2]]);
    if raw[0] != 0x16 {
        return Err(FingerprintError::NotHandshake);
    }

    let (_, record) = parse_tls_plaintext(raw).map_err(|e| match e {
        NomErr::Incomplete(needed) => {
            let n = match needed {
                tls_parser::nom::Needed::Size(s) => s.get(),
                tls_parser::nom::Needed::Unknown => 0,
            };
            FingerprintError::OutOfRange {
                wanted: raw.len() + n,
                got: raw.len(),
            }
        }
        _ => FingerprintError::TlsParse(e.to_string()),
    })?;

    if record.hdr.record_type != TlsRecordType::Handshake {
        return Err(FingerprintError::NotHandshake);
    }

    for msg in &record.msg {
        if let TlsMessage::Handshake(TlsMessageHandshake::ClientHello(ch)) = msg {
            let ciphers: Vec<u16> = ch.ciphers.iter().map(|c| c.0).collect();
            let extensions = match ch.ext {
                Some(bytes) => walk_extensions(bytes),
                None => Vec::new(),
            };
            return Ok(ClientHelloSpec::new(
                record_version,
                ch.version.0,
                ciphers,
                extensions,
            ));
        }
    }

    Err(FingerprintError::NotClientHello)
}

/// Walk the raw extensions block, interpreting the types the model
/// carries payloads for and passing everything else through verbatim.
fn walk_extensions(mut bytes: &[u8]) -> Vec<Extension> {
    let mut extensions = Vec::new();
    while !bytes.is_empty() {
        if bytes.len() < 4 {
            // Not even a full type + length header; keep the fragment so
            // the formatter can name its position when it fails.
            extensions.push(Extension::Generic(GenericExtension::fragment(bytes)));
            break;
        }
        let id = u16::from_be_bytes([bytes[0], bytes[1]]);
        let len = u16::from_be_bytes([bytes[2], bytes[3]]) as usize;
        if bytes.len() < 4 + len {
            extensions.push(Extension::Generic(GenericExtension::fragment(bytes)));
            break;
        }
        let payload = &bytes[4..4 + len];
        extensions.push(interpret(id, payload));
        bytes = &bytes[4 + len..];
    }
    extensions
}

/// Interpret one extension payload. Any payload that does not parse as
/// its type demands falls back to a raw pass-through.
fn interpret(id: u16, payload: &[u8]) -> Extension {
    let interpreted = match id {
        ext_id::SERVER_NAME => decode_server_name(payload),
        ext_id::SUPPORTED_CURVES => decode_u16_list(payload).map(Extension::SupportedCurves),
        ext_id::POINT_FORMATS => decode_u8_list(payload).map(Extension::PointFormats),
        ext_id::SIGNATURE_ALGORITHMS => {
            decode_u16_list(payload).map(Extension::SignatureAlgorithms)
        }
        ext_id::ALPN => decode_alpn(payload),
        ext_id::SUPPORTED_VERSIONS => decode_supported_versions(payload),
        _ => None,
    };
    interpreted.unwrap_or_else(|| Extension::Generic(GenericExtension::from_wire(id, payload)))
}

/// server_name: u16 list length, then entries of (u8 name type,
/// u16 length, name). Only the first host_name entry matters.
fn decode_server_name(payload: &[u8]) -> Option<Extension> {
    if payload.is_empty() {
        return Some(Extension::ServerName(None));
    }
    if payload.len() < 2 {
        return None;
    }
    let list_len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    let mut rest = payload.get(2..2 + list_len)?;
    while rest.len() >= 3 {
        let name_type = rest[0];
        let name_len = u16::from_be_bytes([rest[1], rest[2]]) as usize;
        let name = rest.get(3..3 + name_len)?;
        if name_type == 0 {
            let host = std::str::from_utf8(name).ok()?;
            return Some(Extension::ServerName(Some(host.to_string())));
        }
        rest = &rest[3 + name_len..];
    }
    Some(Extension::ServerName(None))
}

/// u16 byte-length prefix, then u16 entries.
fn decode_u16_list(payload: &[u8]) -> Option<Vec<u16>> {
    if payload.len() < 2 {
        return None;
    }
    let len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    let body = payload.get(2..2 + len)?;
    if len % 2 != 0 || payload.len() != 2 + len {
        return None;
    }
    Some(
        body.chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect(),
    )
}

/// u8 byte-length prefix, then u8 entries.
fn decode_u8_list(payload: &[u8]) -> Option<Vec<u8>> {
    let (&len, body) = payload.split_first()?;
    if body.len() != len as usize {
        return None;
    }
    Some(body.to_vec())
}

/// ALPN: u16 list length, then entries of (u8 length, protocol name).
fn decode_alpn(payload: &[u8]) -> Option<Extension> {
    if payload.len() < 2 {
        return None;
    }
    let list_len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    let mut rest = payload.get(2..2 + list_len)?;
    let mut protocols = Vec::new();
    while let Some((&len, body)) = rest.split_first() {
        let name = body.get(..len as usize)?;
        protocols.push(std::str::from_utf8(name).ok()?.to_string());
        rest = &body[len as usize..];
    }
    Some(Extension::Alpn(protocols))
}

/// supported_versions: u8 byte-length prefix, then u16 versions.
fn decode_supported_versions(payload: &[u8]) -> Option<Extension> {
    let (&len, body) = payload.split_first()?;
    if body.len() != len as usize || len % 2 != 0 {
        return None;
    }
    Some(Extension::SupportedVersions(
        body.chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::format::format_ja3;

    /// Hand-assemble a record-framed ClientHello for the decoder.
    fn sample_hello(extensions: &[(u16, Vec<u8>)]) -> Vec<u8> {
        let mut ext_block = Vec::new();
        for (id, payload) in extensions {
            ext_block.extend_from_slice(&id.to_be_bytes());
            ext_block.extend_from_slice(&(payload.len() as u16).to_be_bytes());
            ext_block.extend_from_slice(payload);
        }
        sample_hello_with_ext_block(&ext_block)
    }

    /// Same framing, but the extensions block is taken verbatim so a
    /// test can plant lying lengths or truncated tails inside it.
    fn sample_hello_with_ext_block(ext_block: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&0x0303u16.to_be_bytes()); // handshake version
        body.extend_from_slice(&[0u8; 32]); // random
        body.push(0); // empty session id
        body.extend_from_slice(&6u16.to_be_bytes()); // cipher bytes
        for cipher in [0x1301u16, 0xC02B, 0x002F] {
            body.extend_from_slice(&cipher.to_be_bytes());
        }
        body.extend_from_slice(&[1, 0]); // null compression
        body.extend_from_slice(&(ext_block.len() as u16).to_be_bytes());
        body.extend_from_slice(ext_block);

        let mut handshake = vec![0x01];
        handshake.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        handshake.extend_from_slice(&body);

        let mut record = vec![0x16, 0x03, 0x01];
        record.extend_from_slice(&(handshake.len() as u16).to_be_bytes());
        record.extend_from_slice(&handshake);
        record
    }

    fn sni_payload(host: &str) -> Vec<u8> {
        let mut entry = vec![0u8];
        entry.extend_from_slice(&(host.len() as u16).to_be_bytes());
        entry.extend_from_slice(host.as_bytes());
        let mut payload = (entry.len() as u16).to_be_bytes().to_vec();
        payload.extend_from_slice(&entry);
        payload
    }

    #[test]
    fn test_undersized_buffer() {
        let err = decode_client_hello(&[0x16, 0x03]).unwrap_err();
        match err {
            FingerprintError::OutOfRange { wanted, got } => {
                assert_eq!(wanted, 3);
                assert_eq!(got, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_not_a_handshake() {
        let err = decode_client_hello(&[0x17, 0x03, 0x03, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err, FingerprintError::NotHandshake));
    }

    #[test]
    fn test_decode_versions_and_ciphers() {
        let raw = sample_hello(&[]);
        let spec = decode_client_hello(&raw).unwrap();
        // Record layer says 0x0301, handshake body says 0x0303.
        assert_eq!(spec.version_min(), 0x0301);
        assert_eq!(spec.version_max(), 0x0303);
        assert_eq!(spec.cipher_suites(), &[0x1301, 0xC02B, 0x002F]);
        assert!(spec.extensions().is_empty());
    }

    #[test]
    fn test_decode_extensions() {
        let raw = sample_hello(&[
            (0, sni_payload("example.com")),
            (23, vec![]),
            (10, vec![0x00, 0x04, 0x00, 0x1d, 0x00, 0x17]),
            (11, vec![0x01, 0x00]),
            (13, vec![0x00, 0x04, 0x04, 0x03, 0x08, 0x04]),
            (43, vec![0x04, 0x03, 0x04, 0x03, 0x03]),
        ]);
        let spec = decode_client_hello(&raw).unwrap();
        assert_eq!(spec.server_name(), Some("example.com"));
        assert_eq!(spec.curves(), Some(&[0x001d, 0x0017][..]));
        assert_eq!(spec.point_formats(), Some(&[0][..]));
        assert_eq!(spec.supported_versions(), Some(&[0x0304, 0x0303][..]));
        // The flag-like extension passes through with its code intact.
        assert!(spec.has_extension(23));

        assert_eq!(
            format_ja3(&spec).unwrap(),
            "771,4865-49195-47,0-23-10-11-13-43,29-23,0"
        );
    }

    #[test]
    fn test_unknown_extension_pass_through() {
        let raw = sample_hello(&[(17513, vec![0x00, 0x03, 0x02, 0x68, 0x32])]);
        let spec = decode_client_hello(&raw).unwrap();
        match &spec.extensions()[0] {
            Extension::Generic(g) => {
                assert_eq!(g.type_id(), Some(17513));
                assert_eq!(g.payload(), &[0x00, 0x03, 0x02, 0x68, 0x32]);
            }
            other => panic!("unexpected extension: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_payload_falls_back_to_raw() {
        // supported_groups payload with a length prefix that lies.
        let raw = sample_hello(&[(10, vec![0x00, 0x08, 0x00, 0x1d])]);
        let spec = decode_client_hello(&raw).unwrap();
        assert!(matches!(spec.extensions()[0], Extension::Generic(_)));
        // The type code is still recoverable for formatting.
        assert_eq!(spec.extensions()[0].type_id(), Some(10));
    }

    #[test]
    fn test_truncated_extension_kept_as_fragment() {
        // extended_master_secret, then a key_share whose claimed length
        // (16) exceeds the two bytes actually left in the block.
        let mut ext_block = vec![0x00, 0x17, 0x00, 0x00];
        ext_block.extend_from_slice(&[0x00, 0x33, 0x00, 0x10, 0xAA, 0xBB]);
        let raw = sample_hello_with_ext_block(&ext_block);
        let spec = decode_client_hello(&raw).unwrap();
        assert_eq!(spec.extensions().len(), 2);
        // The type code survives, so formatting still names it.
        match &spec.extensions()[1] {
            Extension::Generic(g) => {
                assert_eq!(g.type_id(), Some(0x33));
                assert_eq!(g.payload(), &[0x00, 0x10, 0xAA, 0xBB]);
            }
            other => panic!("unexpected extension: {:?}", other),
        }
        assert_eq!(format_ja3(&spec).unwrap(), "771,4865-49195-47,23-51,,");
    }

    #[test]
    fn test_truncated_extension_header_fails_format() {
        // A single trailing byte cannot even carry a type code; decode
        // keeps it, formatting reports the position.
        let mut ext_block = vec![0x00, 0x17, 0x00, 0x00];
        ext_block.push(0x00);
        let raw = sample_hello_with_ext_block(&ext_block);
        let spec = decode_client_hello(&raw).unwrap();
        assert_eq!(spec.extensions().len(), 2);
        let err = format_ja3(&spec).unwrap_err();
        match err {
            FingerprintError::UnreadableExtensionType { index } => assert_eq!(index, 1),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_grease_ciphers_survive() {
        let mut raw = sample_hello(&[]);
        // Swap the first cipher for a GREASE value in place.
        let cipher_offset = raw.len() - 2 /* ext len */ - 2 /* comp */ - 6;
        raw[cipher_offset] = 0x0a;
        raw[cipher_offset + 1] = 0x0a;
        let spec = decode_client_hello(&raw).unwrap();
        // The decoder preserves GREASE; filtering is a formatting-policy
        // choice the codec does not make.
        assert_eq!(spec.cipher_suites()[0], 0x0a0a);
    }
}
