//! Client TLS builder API modules
//!
//! Provides the fluent API for turning a PKCS#12 client certificate into a
//! TLS context.

pub mod core;
pub mod options;

// Re-export all public types for convenience
pub use self::core::*;
