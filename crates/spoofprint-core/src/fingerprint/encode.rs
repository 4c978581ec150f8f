//! [`ClientHelloSpec`] → record-framed ClientHello bytes.
//!
//! Realizes the per-extension default payloads at the byte level. The
//! output is a complete TLS record (content type, record version,
//! length, handshake message) suitable for fingerprinting tools or for
//! feeding back through [`decode_client_hello`].
//!
//! [`decode_client_hello`]: crate::fingerprint::decode::decode_client_hello

use crate::fingerprint::spec::{ClientHelloSpec, Extension};
use crate::fingerprint::FingerprintError;

/// Serialize the spec into one handshake record.
///
/// `random` is caller-supplied so the output stays deterministic;
/// `server_name` fills a [`Extension::ServerName`] that does not fix a
/// host of its own. The session id is derived from the random via the
/// spec's session-ID provider.
pub fn encode_client_hello(
    spec: &ClientHelloSpec,
    random: &[u8; 32],
    server_name: &str,
) -> Result<Vec<u8>, FingerprintError> {
    // First pass without the padding extension: its payload size
    // depends on the length of everything else.
    let unpadded_ext = encode_extensions(spec, server_name, 0, true)?;
    // Measured over the whole handshake message, header included.
    let unpadded_len = body_len(spec, unpadded_ext.len()) + 4;
    let padding_len = boring_padding_len(unpadded_len);

    let ext_block = encode_extensions(spec, server_name, padding_len, false)?;

    let mut body = Vec::with_capacity(body_len(spec, ext_block.len()));
    body.extend_from_slice(&spec.version_max().to_be_bytes());
    body.extend_from_slice(random);
    let session_id = spec.session_id(random);
    body.push(session_id.len() as u8);
    body.extend_from_slice(&session_id);
    body.extend_from_slice(&((spec.cipher_suites().len() * 2) as u16).to_be_bytes());
    for cipher in spec.cipher_suites() {
        body.extend_from_slice(&cipher.to_be_bytes());
    }
    body.push(spec.compression_methods().len() as u8);
    body.extend_from_slice(spec.compression_methods());
    body.extend_from_slice(&(ext_block.len() as u16).to_be_bytes());
    body.extend_from_slice(&ext_block);

    let mut out = Vec::with_capacity(body.len() + 9);
    out.push(0x16);
    out.extend_from_slice(&spec.version_min().to_be_bytes());
    out.extend_from_slice(&((body.len() + 4) as u16).to_be_bytes());
    out.push(0x01); // client_hello
    out.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Handshake body length for a given extensions-block size.
fn body_len(spec: &ClientHelloSpec, ext_block_len: usize) -> usize {
    2 + 32
        + 1
        + 32
        + 2
        + spec.cipher_suites().len() * 2
        + 1
        + spec.compression_methods().len()
        + 2
        + ext_block_len
}

/// BoringSSL padding policy: a hello between 256 and 511 bytes is
/// padded out to 512 to dodge buggy middleboxes.
fn boring_padding_len(unpadded: usize) -> usize {
    if unpadded > 0xff && unpadded < 0x200 {
        let padding = 0x200 - unpadded;
        // The extension header itself eats 4 of the padding bytes.
        if padding >= 5 {
            padding - 4
        } else {
            1
        }
    } else {
        0
    }
}

fn encode_extensions(
    spec: &ClientHelloSpec,
    server_name: &str,
    padding_len: usize,
    skip_padding: bool,
) -> Result<Vec<u8>, FingerprintError> {
    let mut block = Vec::new();
    for (index, ext) in spec.extensions().iter().enumerate() {
        if skip_padding && matches!(ext, Extension::Padding) {
            continue;
        }
        let id = ext
            .type_id()
            .ok_or(FingerprintError::UnreadableExtensionType { index })?;
        let payload = encode_payload(ext, server_name, padding_len);
        block.extend_from_slice(&id.to_be_bytes());
        block.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        block.extend_from_slice(&payload);
    }
    Ok(block)
}

fn encode_payload(ext: &Extension, server_name: &str, padding_len: usize) -> Vec<u8> {
    match ext {
        Extension::ServerName(host) => {
            let host = host.as_deref().unwrap_or(server_name);
            let mut entry = vec![0u8]; // host_name
            entry.extend_from_slice(&(host.len() as u16).to_be_bytes());
            entry.extend_from_slice(host.as_bytes());
            let mut payload = (entry.len() as u16).to_be_bytes().to_vec();
            payload.extend_from_slice(&entry);
            payload
        }
        // ocsp, empty responder-id and request-extension lists
        Extension::StatusRequest => vec![1, 0, 0, 0, 0],
        Extension::SupportedCurves(curves) => u16_list(curves),
        Extension::PointFormats(points) => {
            let mut payload = vec![points.len() as u8];
            payload.extend_from_slice(points);
            payload
        }
        Extension::SignatureAlgorithms(algs) => u16_list(algs),
        Extension::Alpn(protocols) => {
            let mut list = Vec::new();
            for protocol in protocols {
                list.push(protocol.len() as u8);
                list.extend_from_slice(protocol.as_bytes());
            }
            let mut payload = (list.len() as u16).to_be_bytes().to_vec();
            payload.extend_from_slice(&list);
            payload
        }
        Extension::SignedCertificateTimestamp => Vec::new(),
        Extension::Padding => vec![0; padding_len],
        Extension::ExtendedMasterSecret => Vec::new(),
        Extension::CertCompression(algs) => {
            let mut payload = vec![(algs.len() * 2) as u8];
            for alg in algs {
                payload.extend_from_slice(&alg.to_be_bytes());
            }
            payload
        }
        Extension::RecordSizeLimit(limit) => limit.to_be_bytes().to_vec(),
        Extension::SessionTicket => Vec::new(),
        Extension::SupportedVersions(versions) => {
            let mut payload = vec![(versions.len() * 2) as u8];
            for version in versions {
                payload.extend_from_slice(&version.to_be_bytes());
            }
            payload
        }
        Extension::Cookie => Vec::new(),
        Extension::PskKeyExchangeModes(modes) => {
            let mut payload = vec![modes.len() as u8];
            payload.extend_from_slice(modes);
            payload
        }
        Extension::KeyShare(groups) => {
            // Groups with empty key material; the TLS engine supplies
            // real shares during an actual handshake.
            let mut list = Vec::new();
            for group in groups {
                list.extend_from_slice(&group.to_be_bytes());
                list.extend_from_slice(&0u16.to_be_bytes());
            }
            let mut payload = (list.len() as u16).to_be_bytes().to_vec();
            payload.extend_from_slice(&list);
            payload
        }
        Extension::NextProtocolNegotiation => Vec::new(),
        Extension::RenegotiationInfo => vec![0],
        Extension::Generic(generic) => generic.payload().to_vec(),
    }
}

fn u16_list(values: &[u16]) -> Vec<u8> {
    let mut payload = ((values.len() * 2) as u16).to_be_bytes().to_vec();
    for value in values {
        payload.extend_from_slice(&value.to_be_bytes());
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::decode::decode_client_hello;
    use crate::fingerprint::format::format_ja3;
    use crate::fingerprint::parse::{parse_ja3, ANDROID_JA3};

    #[test]
    fn test_wire_roundtrip() {
        for fp in [
            "769,47-53,0-10-11,23,0",
            "771,4865,0-9999-10-11,29,0",
            ANDROID_JA3,
        ] {
            let spec = parse_ja3(fp).unwrap();
            let raw = encode_client_hello(&spec, &[7u8; 32], "example.com").unwrap();
            let decoded = decode_client_hello(&raw).unwrap();
            assert_eq!(decoded.cipher_suites(), spec.cipher_suites());
            assert_eq!(format_ja3(&decoded).unwrap(), fp, "wire round-trip of {:?}", fp);
        }
    }

    #[test]
    fn test_record_framing() {
        let spec = parse_ja3("769,47,0,23,0").unwrap();
        let raw = encode_client_hello(&spec, &[0u8; 32], "example.com").unwrap();
        assert_eq!(raw[0], 0x16);
        // Record version = version_min = 769 = 0x0301.
        assert_eq!(&raw[1..3], &[0x03, 0x01]);
        let record_len = u16::from_be_bytes([raw[3], raw[4]]) as usize;
        assert_eq!(raw.len(), 5 + record_len);
        assert_eq!(raw[5], 0x01);
    }

    #[test]
    fn test_server_name_fallback_and_override() {
        let spec = parse_ja3("771,4865,0,,").unwrap();
        let raw = encode_client_hello(&spec, &[0u8; 32], "fallback.test").unwrap();
        let decoded = decode_client_hello(&raw).unwrap();
        assert_eq!(decoded.server_name(), Some("fallback.test"));

        let fixed = crate::fingerprint::spec::ClientHelloSpec::new(
            771,
            771,
            vec![4865],
            vec![Extension::ServerName(Some("pinned.test".to_string()))],
        );
        let raw = encode_client_hello(&fixed, &[0u8; 32], "fallback.test").unwrap();
        let decoded = decode_client_hello(&raw).unwrap();
        assert_eq!(decoded.server_name(), Some("pinned.test"));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let spec = parse_ja3(ANDROID_JA3).unwrap();
        let a = encode_client_hello(&spec, &[1u8; 32], "example.com").unwrap();
        let b = encode_client_hello(&spec, &[1u8; 32], "example.com").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_boring_padding_thresholds() {
        assert_eq!(boring_padding_len(0xff), 0);
        assert_eq!(boring_padding_len(0x100), 0x100 - 4);
        assert_eq!(boring_padding_len(0x1fe), 1);
        assert_eq!(boring_padding_len(0x200), 0);
    }

    #[test]
    fn test_padding_pads_to_512() {
        // The Safari preset carries a padding extension and its hello
        // lands in the pad-triggering range with an 11-byte host.
        let spec = parse_ja3(crate::fingerprint::parse::SAFARI_JA3).unwrap();
        let raw = encode_client_hello(&spec, &[0u8; 32], "example.com").unwrap();
        // Handshake message (record payload) padded out to 0x200.
        let record_len = u16::from_be_bytes([raw[3], raw[4]]) as usize;
        assert_eq!(record_len, 0x200);
    }
}
