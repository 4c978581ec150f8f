//! Map a [`ClientHelloSpec`] onto a `rustls::ClientConfig`.
//!
//! rustls owns key exchange and record protection, so the mapping
//! carries over everything rustls lets a client pin: cipher-suite set
//! and preference order, protocol versions, ALPN, and session
//! resumption. Suites and versions rustls does not implement are
//! skipped rather than failing the whole spec.

use std::sync::Arc;

use rustls::crypto::ring as ring_provider;
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, RootCertStore, SupportedCipherSuite};
use spoofprint_core::fingerprint::grease::is_grease_u16;
use spoofprint_core::fingerprint::spec::{ext_id, VERSION_TLS12, VERSION_TLS13};
use spoofprint_core::ClientHelloSpec;

use crate::DialError;

/// Build a client config whose negotiable surface follows the spec.
pub fn client_config_for(spec: &ClientHelloSpec) -> Result<ClientConfig, DialError> {
    let provider = ring_provider::default_provider();
    let cipher_suites = select_cipher_suites(spec, &provider.cipher_suites);
    if cipher_suites.is_empty() {
        return Err(DialError::Config(
            "no cipher suite in the spec is supported by the TLS engine".to_string(),
        ));
    }

    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let crypto_provider = CryptoProvider {
        cipher_suites,
        ..provider
    };

    let mut config = ClientConfig::builder_with_provider(Arc::new(crypto_provider))
        .with_protocol_versions(&protocol_versions(spec))
        .map_err(|e| DialError::Config(e.to_string()))?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    if let Some(protocols) = spec.alpn_protocols() {
        config.alpn_protocols = protocols
            .iter()
            .map(|p| p.as_bytes().to_vec())
            .collect();
    }

    // Only offer resumption when the fingerprint advertises it.
    if !spec.has_extension(ext_id::SESSION_TICKET) {
        config.resumption = rustls::client::Resumption::disabled();
    }

    Ok(config)
}

/// The spec's cipher list restricted to suites the engine implements,
/// spec order preserved. GREASE entries are placeholders, not suites.
fn select_cipher_suites(
    spec: &ClientHelloSpec,
    available: &[SupportedCipherSuite],
) -> Vec<SupportedCipherSuite> {
    spec.cipher_suites()
        .iter()
        .filter(|&&id| !is_grease_u16(id))
        .filter_map(|&id| {
            available
                .iter()
                .find(|suite| u16::from(suite.suite()) == id)
                .copied()
        })
        .collect()
}

/// Protocol versions to enable, from the supported_versions extension
/// when present, else from the handshake version. rustls speaks 1.2
/// and 1.3 only; a pre-1.2 fingerprint still handshakes at 1.2, the
/// engine's floor.
fn protocol_versions(spec: &ClientHelloSpec) -> Vec<&'static rustls::SupportedProtocolVersion> {
    let mut versions = Vec::new();
    match spec.supported_versions() {
        Some(offered) => {
            if offered.contains(&VERSION_TLS13) {
                versions.push(&rustls::version::TLS13);
            }
            if offered.iter().any(|&v| v <= VERSION_TLS12 && !is_grease_u16(v)) {
                versions.push(&rustls::version::TLS12);
            }
        }
        None => {
            if spec.version_max() >= VERSION_TLS13 {
                versions.push(&rustls::version::TLS13);
            }
            versions.push(&rustls::version::TLS12);
        }
    }
    if versions.is_empty() {
        versions.push(&rustls::version::TLS12);
    }
    versions
}
