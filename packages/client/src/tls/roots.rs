//! Trust anchors for verifying the server

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use rustls::RootCertStore;
use rustls::pki_types::CertificateDer;

use crate::error::{Result, constructors};

/// Where server trust anchors come from.
#[derive(Debug, Clone)]
pub(crate) struct TrustSources {
    pub(crate) use_platform_roots: bool,
    pub(crate) webpki_fallback: bool,
    pub(crate) pem_files: Vec<PathBuf>,
    pub(crate) certificates: Vec<CertificateDer<'static>>,
}

impl Default for TrustSources {
    fn default() -> Self {
        Self {
            use_platform_roots: true,
            webpki_fallback: true,
            pem_files: Vec::new(),
            certificates: Vec::new(),
        }
    }
}

impl TrustSources {
    /// Platform store first, bundled webpki roots when it yields nothing, then extras.
    pub(crate) fn root_store(&self) -> Result<RootCertStore> {
        let mut root_store = RootCertStore::empty();

        if self.use_platform_roots {
            let cert_result = rustls_native_certs::load_native_certs();
            let (added, ignored) = root_store.add_parsable_certificates(cert_result.certs);
            if ignored > 0 {
                tracing::warn!(
                    target: "mtls_setup::tls",
                    "Ignored {} unparsable system certificates",
                    ignored
                );
            }
            for err in &cert_result.errors {
                tracing::warn!(target: "mtls_setup::tls", "Certificate load error: {}", err);
            }
            tracing::debug!(target: "mtls_setup::tls", "Loaded {} system certificates", added);
        }

        if root_store.is_empty() && self.webpki_fallback {
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            tracing::debug!(
                target: "mtls_setup::tls",
                "Using {} bundled webpki roots",
                root_store.len()
            );
        }

        for path in &self.pem_files {
            for cert in read_pem_certificates(path)? {
                root_store
                    .add(cert)
                    .map_err(|e| constructors::tls("invalid root certificate", e))?;
            }
            tracing::debug!(
                target: "mtls_setup::tls",
                path = %path.display(),
                "Added root certificates from PEM file"
            );
        }

        for cert in &self.certificates {
            root_store
                .add(cert.clone())
                .map_err(|e| constructors::tls("invalid root certificate", e))?;
        }

        if root_store.is_empty() {
            return Err(constructors::no_trust_anchors());
        }

        Ok(root_store)
    }
}

/// All `CERTIFICATE` blocks of a PEM file. A file with none is an error.
pub(crate) fn read_pem_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path).map_err(|e| constructors::io(path, e))?;
    let mut reader = BufReader::new(file);

    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| constructors::decode("PEM root certificate file", e))?;

    if certs.is_empty() {
        return Err(constructors::decode(
            "PEM root certificate file",
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("no certificates in '{}'", path.display()),
            ),
        ));
    }

    Ok(certs)
}
