//! Client TLS
//!
//! Key managers derived from a credential store, trust anchors, and the
//! resulting client context.

pub mod certificate;
pub mod context;
pub mod key_manager;
pub(crate) mod roots;
pub mod types;

pub use context::{TlsContext, TlsContextBuilder, build_tls_context};
pub use key_manager::{KeyManager, KeyManagerFactory, KeyManagerSet, derive_key_managers};
pub use types::{ParsedCertificate, Passphrase, SecureKeyMaterial};
