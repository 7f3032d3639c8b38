//! Core types shared by the keystore and TLS layers

use std::fmt;
use std::time::SystemTime;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Parsed certificate information extracted from X.509
#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    /// RFC 4514 rendering of the subject
    pub subject: String,
    /// RFC 4514 rendering of the issuer
    pub issuer: String,
    /// Raw DER-encoded subject Name
    pub subject_der: Vec<u8>,
    /// Raw DER-encoded issuer Name
    pub issuer_der: Vec<u8>,
    /// Raw DER-encoded SubjectPublicKeyInfo
    pub public_key_der: Vec<u8>,
    /// Hex serial number
    pub serial_number: String,
    pub not_before: SystemTime,
    pub not_after: SystemTime,
    pub is_ca: bool,
    /// False only when an ExtendedKeyUsage extension is present and excludes clientAuth
    pub client_auth_allowed: bool,
    /// False only when a KeyUsage extension is present and excludes digitalSignature
    pub digital_signature_allowed: bool,
}

impl ParsedCertificate {
    /// Whether the certificate names itself as its issuer.
    #[must_use]
    pub fn is_self_issued(&self) -> bool {
        self.subject_der == self.issuer_der
    }
}

/// Secure key material that zeroes on drop
#[derive(ZeroizeOnDrop)]
pub struct SecureKeyMaterial {
    data: Vec<u8>,
}

impl SecureKeyMaterial {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for SecureKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureKeyMaterial({} bytes)", self.data.len())
    }
}

/// Keystore passphrase, wiped from memory on drop and redacted in `Debug`.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Passphrase(String);

impl Passphrase {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(passphrase.into())
    }

    /// Borrow the secret. Keep the borrow short.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

impl From<&str> for Passphrase {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Passphrase {
    fn from(value: String) -> Self {
        Self(value)
    }
}
