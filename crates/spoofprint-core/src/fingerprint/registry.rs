//! Extension registry: extension-id token → fully populated [`Extension`].
//!
//! Default payloads mimic known real clients (Android API 24–29 stacks
//! and desktop Chrome), so a fingerprint that only names type codes
//! still produces a hello a server will accept. The two JA3-dependent
//! ids, supported_groups (10) and ec_point_formats (11), take their
//! payloads from the fingerprint's own curve/point fields.
//!
//! The registry is a pure function of its arguments. Concurrent builds
//! never observe each other's curve/point lists because there is no
//! shared table to patch.

use crate::fingerprint::grease::GREASE_PLACEHOLDER;
use crate::fingerprint::spec::{
    Extension, GenericExtension, VERSION_TLS10, VERSION_TLS11, VERSION_TLS12, VERSION_TLS13,
};
use crate::fingerprint::FingerprintError;

/// What to do with an extension id the registry does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownExtensionPolicy {
    /// Pass the id through as a payload-less [`Extension::Generic`].
    /// The default: a sniffed fingerprint may legitimately contain ids
    /// this library has no dedicated handling for, and they still need
    /// to round-trip.
    #[default]
    Permissive,
    /// Fail with [`FingerprintError::UnsupportedExtension`]. For
    /// callers that need every extension fully realized, e.g. when the
    /// spec must drive a byte-exact handshake.
    Strict,
}

/// Signature algorithm preference order of the mimicked clients:
/// ecdsa_secp256r1_sha256 first, PSS before PKCS#1 per digest, SHA-1
/// last for legacy servers.
pub const DEFAULT_SIGNATURE_ALGORITHMS: &[u16] = &[
    0x0403, // ecdsa_secp256r1_sha256
    0x0804, // rsa_pss_rsae_sha256
    0x0401, // rsa_pkcs1_sha256
    0x0503, // ecdsa_secp384r1_sha384
    0x0805, // rsa_pss_rsae_sha384
    0x0501, // rsa_pkcs1_sha384
    0x0806, // rsa_pss_rsae_sha512
    0x0601, // rsa_pkcs1_sha512
    0x0201, // rsa_pkcs1_sha1
];

/// Certificate compression algorithm id for brotli (RFC 8879).
pub const CERT_COMPRESSION_BROTLI: u16 = 2;

/// psk_key_exchange_mode psk_dhe_ke.
pub const PSK_MODE_DHE: u8 = 1;

/// Build the extension for one fingerprint id token.
///
/// `curves` and `points` are the already-parsed curve/point fields of
/// the same fingerprint; only ids 10 and 11 consume them.
pub fn build_extension(
    id: &str,
    curves: &[u16],
    points: &[u8],
    policy: UnknownExtensionPolicy,
) -> Result<Extension, FingerprintError> {
    let ext = match id {
        "0" => Extension::ServerName(None),
        "5" => Extension::StatusRequest,
        "10" => Extension::SupportedCurves(curves.to_vec()),
        "11" => Extension::PointFormats(points.to_vec()),
        "13" => Extension::SignatureAlgorithms(DEFAULT_SIGNATURE_ALGORITHMS.to_vec()),
        // Empty ALPN fails on any HTTP/2 server, so offer both.
        "16" => Extension::Alpn(vec!["h2".to_string(), "http/1.1".to_string()]),
        "18" => Extension::SignedCertificateTimestamp,
        "21" => Extension::Padding,
        "23" => Extension::ExtendedMasterSecret,
        "27" => Extension::CertCompression(vec![CERT_COMPRESSION_BROTLI]),
        "28" => Extension::RecordSizeLimit(0x4001),
        "35" => Extension::SessionTicket,
        "43" => Extension::SupportedVersions(vec![
            GREASE_PLACEHOLDER,
            VERSION_TLS13,
            VERSION_TLS12,
            VERSION_TLS11,
            VERSION_TLS10,
        ]),
        "44" => Extension::Cookie,
        "45" => Extension::PskKeyExchangeModes(vec![PSK_MODE_DHE]),
        // Groups only; the TLS engine generates the key material.
        "51" => Extension::KeyShare(Vec::new()),
        "13172" => Extension::NextProtocolNegotiation,
        "65281" => Extension::RenegotiationInfo,
        unknown => {
            if policy == UnknownExtensionPolicy::Strict {
                return Err(FingerprintError::UnsupportedExtension {
                    id: unknown.to_string(),
                });
            }
            let raw_id: u16 =
                unknown
                    .parse()
                    .map_err(|_| FingerprintError::InvalidNumber {
                        token: unknown.to_string(),
                        width: 16,
                    })?;
            Extension::Generic(GenericExtension::from_id(raw_id))
        }
    };
    Ok(ext)
}
