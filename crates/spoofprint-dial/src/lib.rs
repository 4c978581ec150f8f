//! # spoofprint-dial
//!
//! Spoofing TLS dialer: opens a TCP connection and performs a
//! handshake shaped by a [`ClientHelloSpec`] instead of the platform
//! default. The returned stream is a drop-in transport for any HTTP
//! client speaking over `AsyncRead + AsyncWrite`.
//!
//! The spec decides what the engine offers (cipher order, versions,
//! ALPN, SNI, resumption); rustls performs the cryptographic handshake
//! itself.

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use spoofprint_core::{ClientHelloSpec, FingerprintError};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_rustls::{client::TlsStream, TlsConnector};
use tracing::debug;

/// Errors from dialing and handshaking.
#[derive(Debug, Error)]
pub enum DialError {
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    #[error("dial failed: {0}")]
    Dial(#[source] std::io::Error),
    #[error("TLS handshake failed: {0}")]
    Handshake(#[source] std::io::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("TLS configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Spec(#[from] FingerprintError),
}

/// A reusable dialer built from one spec.
///
/// Construction does the spec-to-config mapping once; each [`dial`]
/// call is independent after that, so one dialer may serve concurrent
/// dials.
///
/// [`dial`]: SpoofDialer::dial
pub struct SpoofDialer {
    config: Arc<rustls::ClientConfig>,
    // SNI pinned by the spec's server_name extension, if any.
    server_name: Option<String>,
}

impl SpoofDialer {
    pub fn new(spec: &ClientHelloSpec) -> Result<Self, DialError> {
        let config = config::client_config_for(spec)?;
        Ok(Self {
            config: Arc::new(config),
            server_name: spec.server_name().map(|s| s.to_string()),
        })
    }

    /// Connect to `addr` (`host:port`) and complete the handshake.
    ///
    /// The SNI value is the spec's pinned server name when it fixes
    /// one, otherwise the host component of `addr`. The timeout covers
    /// connect and handshake separately; the socket is released on
    /// every exit path, including cancellation, by drop.
    pub async fn dial(
        &self,
        addr: &str,
        timeout: Duration,
    ) -> Result<TlsStream<TcpStream>, DialError> {
        let host = host_of(addr)?;
        let sni = self.server_name.as_deref().unwrap_or(host);

        debug!(addr, sni, "dialing with spoofed hello");
        let tcp = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| DialError::Timeout(timeout))?
            .map_err(DialError::Dial)?;
        tcp.set_nodelay(true).ok();

        let server_name = ServerName::try_from(sni.to_string())
            .map_err(|_| DialError::InvalidAddress(sni.to_string()))?;
        let connector = TlsConnector::from(self.config.clone());

        let stream = tokio::time::timeout(timeout, connector.connect(server_name, tcp))
            .await
            .map_err(|_| DialError::Timeout(timeout))?
            .map_err(DialError::Handshake)?;

        let (_, session) = stream.get_ref();
        debug!(
            version = ?session.protocol_version(),
            suite = ?session.negotiated_cipher_suite().map(|s| s.suite()),
            "handshake complete"
        );
        Ok(stream)
    }
}

/// One-shot convenience: build the dialer and dial once.
pub async fn dial(
    addr: &str,
    spec: &ClientHelloSpec,
    timeout: Duration,
) -> Result<TlsStream<TcpStream>, DialError> {
    SpoofDialer::new(spec)?.dial(addr, timeout).await
}

/// Host component of a `host:port` address.
///
/// IPv6 hosts must be bracketed (`[2001:db8::1]:443`); an unbracketed
/// IPv6 address makes the port boundary ambiguous and is rejected.
fn host_of(addr: &str) -> Result<&str, DialError> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| DialError::InvalidAddress(addr.to_string()))?;
    if host.is_empty() || port.is_empty() {
        return Err(DialError::InvalidAddress(addr.to_string()));
    }
    if let Some(bracketed) = host.strip_prefix('[') {
        return bracketed
            .strip_suffix(']')
            .ok_or_else(|| DialError::InvalidAddress(addr.to_string()));
    }
    if host.contains(':') {
        return Err(DialError::InvalidAddress(addr.to_string()));
    }
    Ok(host)
}
