use std::path::Path;

use super::helpers::{MacMismatch, MissingCertificate, UnsupportedAlgorithm};
use super::types::{BoxError, ConfigurationError, ErrorKind};

/// Creates an error for a file that could not be opened or read.
pub(crate) fn io(path: &Path, e: std::io::Error) -> ConfigurationError {
    ConfigurationError::new(
        ErrorKind::Io,
        format!("failed to read '{}'", path.display()),
    )
    .with(e)
}

/// Creates an error for a reader that failed before decoding started.
pub(crate) fn read<E: Into<BoxError>>(e: E) -> ConfigurationError {
    ConfigurationError::new(ErrorKind::Io, "failed to read PKCS#12 data").with(e)
}

/// Creates an error for input that is not a well-formed container.
pub(crate) fn decode<E: Into<BoxError>>(what: &str, e: E) -> ConfigurationError {
    ConfigurationError::new(ErrorKind::Decode, format!("malformed {what}")).with(e)
}

/// Creates an error for a passphrase that failed the integrity check.
pub(crate) fn bad_passphrase() -> ConfigurationError {
    ConfigurationError::new(
        ErrorKind::Passphrase,
        "keystore integrity check failed (wrong passphrase?)",
    )
    .with(MacMismatch)
}

/// Creates an error for encrypted content the passphrase could not decrypt.
pub(crate) fn undecryptable<E: Into<BoxError>>(e: E) -> ConfigurationError {
    ConfigurationError::new(
        ErrorKind::Passphrase,
        "failed to decrypt keystore contents (wrong passphrase?)",
    )
    .with(e)
}

/// Creates an error for an algorithm no provider implements.
pub(crate) fn unsupported(algorithm: impl Into<String>, context: &'static str) -> ConfigurationError {
    let algorithm = algorithm.into();
    ConfigurationError::new(
        ErrorKind::UnsupportedAlgorithm,
        format!("no provider supports {context} {algorithm}"),
    )
    .with(UnsupportedAlgorithm { algorithm, context })
}

/// Creates an error for a key entry that could not be recovered.
pub(crate) fn key_recovery<E: Into<BoxError>>(alias: &str, e: E) -> ConfigurationError {
    ConfigurationError::new(
        ErrorKind::KeyRecovery,
        format!("cannot recover key '{alias}' with the given passphrase"),
    )
    .with(e)
}

/// Creates an error for a store without any usable key entry.
pub(crate) fn no_key_entry(message: impl Into<String>) -> ConfigurationError {
    ConfigurationError::new(ErrorKind::NoKeyEntry, message)
}

/// Creates an error for a TLS library failure.
pub(crate) fn tls<E: Into<BoxError>>(message: impl Into<String>, e: E) -> ConfigurationError {
    ConfigurationError::new(ErrorKind::Tls, message).with(e)
}

/// Creates an error for rejected caller input.
pub(crate) fn invalid_input<E: Into<BoxError>>(e: E) -> ConfigurationError {
    ConfigurationError::new(ErrorKind::InvalidInput, "invalid TLS client configuration").with(e)
}

/// Creates an error for key entries none of which has a certificate to present.
pub(crate) fn no_certificate_for_key(alias: &str) -> ConfigurationError {
    ConfigurationError::new(
        ErrorKind::NoKeyEntry,
        "keystore has no key entry with a matching certificate",
    )
    .with(MissingCertificate {
        alias: alias.to_string(),
    })
}

/// Creates an error for a context that would trust no server at all.
pub(crate) fn no_trust_anchors() -> ConfigurationError {
    ConfigurationError::new(
        ErrorKind::Tls,
        "no trusted root certificates available for server verification",
    )
}
