use std::fmt;

/// A marker type to indicate that the PKCS#12 integrity MAC did not verify.
#[derive(Debug)]
pub struct MacMismatch;

impl fmt::Display for MacMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PKCS#12 MAC verification failed")
    }
}

impl std::error::Error for MacMismatch {}

/// An algorithm identifier no provider in this crate implements.
#[derive(Debug)]
pub struct UnsupportedAlgorithm {
    /// Dotted OID, or a short name when the algorithm is not OID-identified.
    pub algorithm: String,
    /// Where the algorithm was found (for example "MAC digest").
    pub context: &'static str,
}

impl fmt::Display for UnsupportedAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported {}: {}", self.context, self.algorithm)
    }
}

impl std::error::Error for UnsupportedAlgorithm {}

/// A block cipher decryption or padding check failed.
#[derive(Debug)]
pub struct DecryptionFailed {
    pub cipher: &'static str,
}

impl fmt::Display for DecryptionFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} decryption failed", self.cipher)
    }
}

impl std::error::Error for DecryptionFailed {}

/// A private key in the store has no certificate to present with it.
#[derive(Debug)]
pub struct MissingCertificate {
    pub alias: String,
}

impl fmt::Display for MissingCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no certificate found for key entry '{}'", self.alias)
    }
}

impl std::error::Error for MissingCertificate {}
