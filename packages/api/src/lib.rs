//! mtls-setup Public API
//!
//! Mutual-TLS client contexts from PKCS#12 client certificates, with a fluent
//! builder over the three-step setup: load the keystore, derive key managers,
//! build the context.
//!
//! ```no_run
//! use mtls_setup::ClientTls;
//!
//! let context = ClientTls::pkcs12("client.p12")
//!     .password("changeit")
//!     .add_root_certificates("ca.pem")
//!     .build()?;
//! let connector = context.connector();
//! # let _ = connector;
//! # Ok::<(), mtls_setup::ConfigurationError>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;

// Re-export all public API components
pub use builder::*;

// Re-export important types from client package
pub use mtls_setup_client::{
    ClientTlsConfig, ClientTlsSetup, ConfigurationError, CredentialStore, ErrorKind,
    KeyManagerFactory, KeyManagerSet, Passphrase, Result, TlsContext, TlsContextBuilder, TlsVersion,
    build_tls_context, derive_key_managers, load_credential_store, setup_client_tls,
    setup_client_tls_with,
};

/// Main entry point providing static builder methods
pub struct ClientTls;

impl ClientTls {
    /// Start a builder from a PKCS#12 file
    ///
    /// Shorthand for `ClientTlsBuilder::pkcs12(path)`
    pub fn pkcs12(path: impl Into<std::path::PathBuf>) -> ClientTlsBuilder<PasswordNotSet> {
        ClientTlsBuilder::pkcs12(path)
    }

    /// Start a builder from a configuration value
    pub fn from_config(config: ClientTlsConfig) -> ClientTlsBuilder<PasswordSet> {
        ClientTlsBuilder::from_config(config)
    }
}
