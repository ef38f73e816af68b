//! TLS listener setup.
//!
//! Loads the PEM certificate chain and private key given on the command
//! line and builds the [`TlsAcceptor`] the accept loop wraps every
//! connection with. Bad material is a startup error; there is no
//! plaintext fallback.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::{ServerConfig, crypto::aws_lc_rs};

/// Builds a TLS acceptor from PEM files on disk.
///
/// Accepts any certificate chain rustls can parse; the key may be PKCS#1,
/// PKCS#8, or SEC1. Protocol versions are rustls defaults (TLS 1.2 and
/// 1.3).
pub fn build_acceptor(cert_path: &str, key_path: &str) -> Result<TlsAcceptor, String> {
    // Several linked crates ship crypto providers; pin the process-level
    // one so ServerConfig::builder() is unambiguous.
    let _ = aws_lc_rs::default_provider().install_default();

    let certs = load_certs(cert_path)?;
    if certs.is_empty() {
        return Err(format!("No certificates found in '{cert_path}'"));
    }
    let key = load_key(key_path)?;

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|err| format!("Invalid TLS material: {err}"))?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn load_certs(path: &str) -> Result<Vec<CertificateDer<'static>>, String> {
    let file = File::open(path).map_err(|err| format!("Cannot open '{path}': {err}"))?;
    rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("Cannot parse certificates in '{path}': {err}"))
}

fn load_key(path: &str) -> Result<PrivateKeyDer<'static>, String> {
    let file = File::open(path).map_err(|err| format!("Cannot open '{path}': {err}"))?;
    rustls_pemfile::private_key(&mut BufReader::new(file))
        .map_err(|err| format!("Cannot parse private key in '{path}': {err}"))?
        .ok_or_else(|| format!("No private key found in '{path}'"))
}
