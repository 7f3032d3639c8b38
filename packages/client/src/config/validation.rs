//! Configuration validation

use thiserror::Error;

/// Configuration rejected before any file is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("keystore path is empty")]
    EmptyKeystorePath,

    #[error("keystore passphrase is empty")]
    EmptyPassphrase,

    #[error("ALPN protocol at index {index} is empty")]
    EmptyAlpnProtocol { index: usize },

    #[error("ALPN protocol at index {index} is {len} bytes long (max 255)")]
    AlpnProtocolTooLong { index: usize, len: usize },

    #[error("root certificate path at index {index} is empty")]
    EmptyRootCertificatePath { index: usize },
}

/// Configuration validation trait
pub trait Validate {
    /// Checks the configuration without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    fn validate(&self) -> Result<(), ValidationError>;
}
