//! # mtls-setup client
//!
//! Loads a client certificate from a PKCS#12 file, derives key managers from
//! it and builds a rustls client context for mutual-TLS authentication.
//!
//! ## Features
//!
//! - **PKCS#12 decoding** with MAC verification, PBES2 (AES-CBC) and legacy 3DES
//! - **Key managers** that pick the identity matching the server's CA hints
//! - **Rustls TLS** with native root certificates and a webpki fallback
//! - **One error type** that keeps the underlying cause as `source()`
//!
//! ## Usage
//!
//! ```no_run
//! use mtls_setup_client::setup_client_tls;
//!
//! let context = setup_client_tls("client.p12", "changeit")?;
//! let connector = context.connector();
//! # let _ = connector;
//! # Ok::<(), mtls_setup_client::ConfigurationError>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod keystore;
pub mod setup;
pub mod tls;

// Prelude with canonical types
pub mod prelude;

pub use crate::prelude::*;
