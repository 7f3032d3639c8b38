//! Configuration for building a client TLS context

pub mod client;
pub mod security;
pub mod validation;

pub use client::{ClientTlsConfig, KeystoreConfig, TrustConfig};
pub use security::{SecurityConfig, TlsVersion};
pub use validation::{Validate, ValidationError};
