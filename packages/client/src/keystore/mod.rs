//! PKCS#12 keystore
//!
//! Decodes a passphrase-protected PKCS#12 (RFC 7292) container into a
//! [`CredentialStore`]. Certificates are parsed up front; private keys stay
//! encrypted until [`KeyEntry::recover`] is called with the passphrase.

mod kdf;
mod pfx;
pub mod store;

pub use store::{CertificateEntry, CredentialStore, KeyEntry, load_credential_store};
