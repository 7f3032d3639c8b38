pub mod classification;
pub(crate) mod constructors;
pub mod helpers;
pub mod types;

pub use helpers::{DecryptionFailed, MacMismatch, MissingCertificate, UnsupportedAlgorithm};
pub use types::{ConfigurationError, ErrorKind, Result};
