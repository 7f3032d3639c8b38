use std::error::Error as StdError;
use std::fmt;

/// A Result alias where the Err case is [`ConfigurationError`].
pub type Result<T> = std::result::Result<T, ConfigurationError>;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// The single error produced while setting up a client TLS context.
///
/// Every underlying failure (I/O, decoding, wrong passphrase, unsupported
/// algorithm, key recovery, TLS initialization) is collapsed into this type.
/// The original cause is kept as [`std::error::Error::source`] so callers can
/// inspect it without this crate flattening it into a string.
pub struct ConfigurationError {
    pub(crate) inner: Box<Inner>,
}

pub(crate) struct Inner {
    pub(crate) kind: ErrorKind,
    pub(crate) message: String,
    pub(crate) source: Option<BoxError>,
}

/// Coarse classification of a [`ConfigurationError`].
///
/// Informational only: callers are not expected to branch on it to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The keystore or another input file could not be opened or read.
    Io,
    /// The input is not a well-formed PKCS#12 container or certificate.
    Decode,
    /// The passphrase did not authenticate or decrypt the container.
    Passphrase,
    /// The container uses an algorithm no available provider implements.
    UnsupportedAlgorithm,
    /// A private key entry could not be recovered.
    KeyRecovery,
    /// The container holds no key entry usable for client authentication.
    NoKeyEntry,
    /// The TLS library refused the configuration.
    Tls,
    /// Caller-supplied configuration was rejected before any work was done.
    InvalidInput,
}

impl ConfigurationError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> ConfigurationError {
        ConfigurationError {
            inner: Box::new(Inner {
                kind,
                message: message.into(),
                source: None,
            }),
        }
    }

    #[must_use = "ConfigurationError builder methods return a new error and should be used"]
    pub(crate) fn with<E: Into<BoxError>>(mut self, source: E) -> ConfigurationError {
        self.inner.source = Some(source.into());
        self
    }

    /// The classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    /// Human readable description of the step that failed.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.message
    }
}

impl fmt::Debug for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("mtls_setup::ConfigurationError");

        f.field("kind", &self.inner.kind);
        f.field("message", &self.inner.message);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        f.finish()
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.message)
    }
}

impl StdError for ConfigurationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
