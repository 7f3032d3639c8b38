use std::error::Error as StdError;
use std::io;

use super::helpers::{MacMismatch, UnsupportedAlgorithm};
use super::types::{ConfigurationError, ErrorKind};

impl ConfigurationError {
    /// Returns true if the error was caused by a missing input file.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        let mut source = self.source();

        while let Some(err) = source {
            if let Some(io) = err.downcast_ref::<io::Error>() {
                if io.kind() == io::ErrorKind::NotFound {
                    return true;
                }
            }
            source = err.source();
        }

        false
    }

    /// Returns true if the passphrase was rejected by the container.
    #[must_use]
    pub fn is_bad_passphrase(&self) -> bool {
        if matches!(self.inner.kind, ErrorKind::Passphrase) {
            return true;
        }

        let mut source = self.source();
        while let Some(err) = source {
            if err.is::<MacMismatch>() {
                return true;
            }
            source = err.source();
        }

        false
    }

    /// Returns true if the input could not be decoded.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Decode)
    }

    /// Returns true if an algorithm in the container is not supported.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        if matches!(self.inner.kind, ErrorKind::UnsupportedAlgorithm) {
            return true;
        }

        let mut source = self.source();
        while let Some(err) = source {
            if err.is::<UnsupportedAlgorithm>() {
                return true;
            }
            source = err.source();
        }

        false
    }

    /// Returns true if the store had no key usable for client authentication.
    #[must_use]
    pub fn is_no_key_entry(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::NoKeyEntry)
    }

    /// Returns true if the TLS library rejected the configuration.
    #[must_use]
    pub fn is_tls(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Tls)
    }
}
