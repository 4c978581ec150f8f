use sha2::{Digest, Sha256};

/// TLS protocol version numbers.
pub const VERSION_TLS10: u16 = 0x0301;
pub const VERSION_TLS11: u16 = 0x0302;
pub const VERSION_TLS12: u16 = 0x0303;
pub const VERSION_TLS13: u16 = 0x0304;

/// Extension type codes (IANA TLS ExtensionType registry).
pub mod ext_id {
    pub const SERVER_NAME: u16 = 0;
    pub const STATUS_REQUEST: u16 = 5;
    pub const SUPPORTED_CURVES: u16 = 10;
    pub const POINT_FORMATS: u16 = 11;
    pub const SIGNATURE_ALGORITHMS: u16 = 13;
    pub const ALPN: u16 = 16;
    pub const SCT: u16 = 18;
    pub const PADDING: u16 = 21;
    pub const EXTENDED_MASTER_SECRET: u16 = 23;
    pub const CERT_COMPRESSION: u16 = 27;
    pub const RECORD_SIZE_LIMIT: u16 = 28;
    pub const SESSION_TICKET: u16 = 35;
    pub const SUPPORTED_VERSIONS: u16 = 43;
    pub const COOKIE: u16 = 44;
    pub const PSK_KEY_EXCHANGE_MODES: u16 = 45;
    pub const KEY_SHARE: u16 = 51;
    pub const NPN: u16 = 13172;
    pub const RENEGOTIATION_INFO: u16 = 65281;
}

/// An extension whose type the codec does not model specifically.
///
/// `raw` holds the bytes exactly as they will appear (or appeared) on
/// the wire: the 2-byte type code followed by the payload. A fragment
/// captured from a truncated extensions block may be shorter than two
/// bytes, in which case the type code is unrecoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericExtension {
    raw: Vec<u8>,
}

impl GenericExtension {
    /// A generic extension with the given type code and no payload.
    pub fn from_id(id: u16) -> Self {
        Self {
            raw: id.to_be_bytes().to_vec(),
        }
    }

    /// A generic extension captured from the wire: type code + payload.
    pub fn from_wire(id: u16, payload: &[u8]) -> Self {
        let mut raw = Vec::with_capacity(2 + payload.len());
        raw.extend_from_slice(&id.to_be_bytes());
        raw.extend_from_slice(payload);
        Self { raw }
    }

    /// A raw fragment, possibly too short to carry a type code.
    pub fn fragment(bytes: &[u8]) -> Self {
        Self {
            raw: bytes.to_vec(),
        }
    }

    /// The 2-byte type code, if the fragment is long enough to hold one.
    pub fn type_id(&self) -> Option<u16> {
        if self.raw.len() < 2 {
            return None;
        }
        Some(u16::from_be_bytes([self.raw[0], self.raw[1]]))
    }

    /// Payload bytes following the type code.
    pub fn payload(&self) -> &[u8] {
        if self.raw.len() < 2 {
            &[]
        } else {
            &self.raw[2..]
        }
    }
}

/// A ClientHello extension, identified by its 16-bit type code.
///
/// The set is closed: every type the registry or decoder specifically
/// interprets has a variant, and anything else travels as [`Generic`]
/// with its raw bytes preserved for re-formatting.
///
/// [`Generic`]: Extension::Generic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extension {
    /// server_name (0). `None` means the dialer fills in the target host.
    ServerName(Option<String>),
    /// status_request (5), OCSP stapling.
    StatusRequest,
    /// supported_groups (10). Carries the fingerprint's curve list.
    SupportedCurves(Vec<u16>),
    /// ec_point_formats (11). Carries the fingerprint's point list.
    PointFormats(Vec<u8>),
    /// signature_algorithms (13).
    SignatureAlgorithms(Vec<u16>),
    /// application_layer_protocol_negotiation (16).
    Alpn(Vec<String>),
    /// signed_certificate_timestamp (18).
    SignedCertificateTimestamp,
    /// padding (21), BoringSSL-style pad-to-512 policy.
    Padding,
    /// extended_master_secret (23).
    ExtendedMasterSecret,
    /// compress_certificate (27). Algorithm ids, e.g. 2 = brotli.
    CertCompression(Vec<u16>),
    /// record_size_limit (28).
    RecordSizeLimit(u16),
    /// session_ticket (35).
    SessionTicket,
    /// supported_versions (43), in client preference order.
    SupportedVersions(Vec<u16>),
    /// cookie (44).
    Cookie,
    /// psk_key_exchange_modes (45).
    PskKeyExchangeModes(Vec<u8>),
    /// key_share (51). Groups offered; key material is the engine's job.
    KeyShare(Vec<u16>),
    /// next_protocol_negotiation (13172).
    NextProtocolNegotiation,
    /// renegotiation_info (65281).
    RenegotiationInfo,
    /// Anything else, raw bytes preserved.
    Generic(GenericExtension),
}

impl Extension {
    /// The extension's 16-bit type code.
    ///
    /// `None` only for a [`Generic`] fragment too short to carry one.
    ///
    /// [`Generic`]: Extension::Generic
    pub fn type_id(&self) -> Option<u16> {
        let id = match self {
            Extension::ServerName(_) => ext_id::SERVER_NAME,
            Extension::StatusRequest => ext_id::STATUS_REQUEST,
            Extension::SupportedCurves(_) => ext_id::SUPPORTED_CURVES,
            Extension::PointFormats(_) => ext_id::POINT_FORMATS,
            Extension::SignatureAlgorithms(_) => ext_id::SIGNATURE_ALGORITHMS,
            Extension::Alpn(_) => ext_id::ALPN,
            Extension::SignedCertificateTimestamp => ext_id::SCT,
            Extension::Padding => ext_id::PADDING,
            Extension::ExtendedMasterSecret => ext_id::EXTENDED_MASTER_SECRET,
            Extension::CertCompression(_) => ext_id::CERT_COMPRESSION,
            Extension::RecordSizeLimit(_) => ext_id::RECORD_SIZE_LIMIT,
            Extension::SessionTicket => ext_id::SESSION_TICKET,
            Extension::SupportedVersions(_) => ext_id::SUPPORTED_VERSIONS,
            Extension::Cookie => ext_id::COOKIE,
            Extension::PskKeyExchangeModes(_) => ext_id::PSK_KEY_EXCHANGE_MODES,
            Extension::KeyShare(_) => ext_id::KEY_SHARE,
            Extension::NextProtocolNegotiation => ext_id::NPN,
            Extension::RenegotiationInfo => ext_id::RENEGOTIATION_INFO,
            Extension::Generic(g) => return g.type_id(),
        };
        Some(id)
    }
}

/// A fully specified ClientHello, immutable once built.
///
/// Cipher and extension order is the fingerprint; nothing here ever
/// re-sorts or deduplicates it. Duplicated type codes pass through
/// unchanged, matching real-world permissiveness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHelloSpec {
    version_min: u16,
    version_max: u16,
    cipher_suites: Vec<u16>,
    extensions: Vec<Extension>,
    compression_methods: Vec<u8>,
}

impl ClientHelloSpec {
    /// Build a spec from already-validated parts.
    ///
    /// In the build path callers pass the same version for both bounds;
    /// the decode path records the record-layer version as `min` and
    /// the handshake-layer version as `max`.
    pub fn new(
        version_min: u16,
        version_max: u16,
        cipher_suites: Vec<u16>,
        extensions: Vec<Extension>,
    ) -> Self {
        Self {
            version_min,
            version_max,
            cipher_suites,
            extensions,
            // TLS requires null compression even though no real client
            // offers anything else.
            compression_methods: vec![0],
        }
    }

    /// Record-layer protocol version.
    pub fn version_min(&self) -> u16 {
        self.version_min
    }

    /// Handshake-layer protocol version.
    pub fn version_max(&self) -> u16 {
        self.version_max
    }

    pub fn cipher_suites(&self) -> &[u16] {
        &self.cipher_suites
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn compression_methods(&self) -> &[u8] {
        &self.compression_methods
    }

    /// Curve list from the supported_groups extension, if present.
    pub fn curves(&self) -> Option<&[u16]> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::SupportedCurves(curves) => Some(curves.as_slice()),
            _ => None,
        })
    }

    /// Point-format list from the ec_point_formats extension, if present.
    pub fn point_formats(&self) -> Option<&[u8]> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::PointFormats(points) => Some(points.as_slice()),
            _ => None,
        })
    }

    /// Host fixed by a server_name extension, if one carries a value.
    pub fn server_name(&self) -> Option<&str> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::ServerName(Some(host)) => Some(host.as_str()),
            _ => None,
        })
    }

    /// ALPN protocol list, if the extension is present.
    pub fn alpn_protocols(&self) -> Option<&[String]> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Alpn(protocols) => Some(protocols.as_slice()),
            _ => None,
        })
    }

    /// Versions offered in the supported_versions extension, if present.
    pub fn supported_versions(&self) -> Option<&[u16]> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::SupportedVersions(versions) => Some(versions.as_slice()),
            _ => None,
        })
    }

    /// Whether the spec carries an extension with the given type code.
    pub fn has_extension(&self, id: u16) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.type_id() == Some(id))
    }

    /// Deterministic session identifier for the given handshake content.
    ///
    /// Replay-resistant session caching wants the same hello content to
    /// map to the same session id; SHA-256 of the content gives that.
    /// Not part of the fingerprint.
    pub fn session_id(&self, content: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_type_ids() {
        assert_eq!(Extension::ServerName(None).type_id(), Some(0));
        assert_eq!(Extension::SupportedCurves(vec![23]).type_id(), Some(10));
        assert_eq!(Extension::PointFormats(vec![0]).type_id(), Some(11));
        assert_eq!(Extension::RenegotiationInfo.type_id(), Some(65281));
        assert_eq!(
            Extension::Generic(GenericExtension::from_id(9999)).type_id(),
            Some(9999)
        );
    }

    #[test]
    fn test_generic_fragment_unreadable() {
        let frag = GenericExtension::fragment(&[0x17]);
        assert_eq!(frag.type_id(), None);
        assert!(frag.payload().is_empty());
    }

    #[test]
    fn test_generic_wire_roundtrip() {
        let ext = GenericExtension::from_wire(17513, &[0x00, 0x03, 0x02, 0x68, 0x32]);
        assert_eq!(ext.type_id(), Some(17513));
        assert_eq!(ext.payload(), &[0x00, 0x03, 0x02, 0x68, 0x32]);
    }

    #[test]
    fn test_spec_accessors() {
        let spec = ClientHelloSpec::new(
            769,
            769,
            vec![47, 53],
            vec![
                Extension::ServerName(None),
                Extension::SupportedCurves(vec![23, 24]),
                Extension::PointFormats(vec![0]),
            ],
        );
        assert_eq!(spec.version_min(), 769);
        assert_eq!(spec.version_max(), 769);
        assert_eq!(spec.cipher_suites(), &[47, 53]);
        assert_eq!(spec.curves(), Some(&[23, 24][..]));
        assert_eq!(spec.point_formats(), Some(&[0][..]));
        assert_eq!(spec.compression_methods(), &[0]);
        assert_eq!(spec.server_name(), None);
        assert!(spec.has_extension(10));
        assert!(!spec.has_extension(16));
    }

    #[test]
    fn test_session_id_deterministic() {
        let spec = ClientHelloSpec::new(771, 771, vec![4865], vec![Extension::ServerName(None)]);
        let a = spec.session_id(b"hello content");
        let b = spec.session_id(b"hello content");
        let c = spec.session_id(b"other content");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
