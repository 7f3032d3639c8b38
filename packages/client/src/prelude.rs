//! mtls-setup Prelude
//!
//! The types a caller needs to go from a PKCS#12 file to a TLS context.

// Error types
pub use crate::error::{ConfigurationError, ErrorKind, Result};

// Configuration
pub use crate::config::{ClientTlsConfig, KeystoreConfig, TlsVersion, TrustConfig, Validate};

// The three steps and their outputs
pub use crate::keystore::{CredentialStore, load_credential_store};
pub use crate::tls::{
    KeyManager, KeyManagerFactory, KeyManagerSet, Passphrase, TlsContext, TlsContextBuilder,
    build_tls_context, derive_key_managers,
};

// Orchestration
pub use crate::setup::{ClientTlsSetup, setup_client_tls, setup_client_tls_with};
