//! TLS client configuration
//!
//! Deserializable from JSON; every field except the keystore has a default.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::security::SecurityConfig;
use super::validation::{Validate, ValidationError};
use crate::error::{Result, constructors};
use crate::tls::types::Passphrase;

/// PKCS#12 keystore location and passphrase.
#[derive(Debug, Clone, Deserialize)]
pub struct KeystoreConfig {
    pub path: PathBuf,
    pub password: Passphrase,
}

/// Where server trust anchors come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Load the operating system's trust store
    pub use_platform_roots: bool,
    /// Use the bundled webpki roots when no platform root could be loaded
    pub webpki_fallback: bool,
    /// Additional PEM files of trusted roots
    pub extra_root_certificates: Vec<PathBuf>,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            use_platform_roots: true,
            webpki_fallback: true,
            extra_root_certificates: Vec::new(),
        }
    }
}

/// Everything needed to build a mutual-TLS client context.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientTlsConfig {
    pub keystore: KeystoreConfig,
    #[serde(default)]
    pub trust: TrustConfig,
    #[serde(flatten)]
    pub security: SecurityConfig,
}

impl ClientTlsConfig {
    /// Keystore plus defaults: platform trust, TLS 1.2+, SNI on, no ALPN.
    pub fn new(path: impl Into<PathBuf>, password: impl Into<Passphrase>) -> Self {
        Self {
            keystore: KeystoreConfig {
                path: path.into(),
                password: password.into(),
            },
            trust: TrustConfig::default(),
            security: SecurityConfig::default(),
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(constructors::invalid_input)?;
        config.validate().map_err(constructors::invalid_input)?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| constructors::io(path, e))?;
        Self::from_json_str(&json)
    }
}

impl Validate for TrustConfig {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        for (index, path) in self.extra_root_certificates.iter().enumerate() {
            if path.as_os_str().is_empty() {
                return Err(ValidationError::EmptyRootCertificatePath { index });
            }
        }
        Ok(())
    }
}

impl Validate for ClientTlsConfig {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.keystore.path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyKeystorePath);
        }
        if self.keystore.password.is_empty() {
            return Err(ValidationError::EmptyPassphrase);
        }
        self.trust.validate()?;
        self.security.validate()
    }
}
