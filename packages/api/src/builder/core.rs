//! Core `ClientTlsBuilder` structure and state types
//!
//! The builder starts from a PKCS#12 path and only offers `build()` once a
//! passphrase has been supplied.

use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use mtls_setup_client::config::{SecurityConfig, TrustConfig};
use mtls_setup_client::{ClientTlsConfig, ClientTlsSetup, Passphrase, Result, TlsContext};
use rustls::crypto::{CryptoProvider, SecureRandom};

/// State marker indicating no passphrase has been set
#[derive(Debug, Clone, Copy)]
pub struct PasswordNotSet;

/// State marker indicating a passphrase has been set
#[derive(Debug, Clone, Copy)]
pub struct PasswordSet;

/// Fluent builder for a mutual-TLS client context
pub struct ClientTlsBuilder<S = PasswordNotSet> {
    pub(crate) path: PathBuf,
    pub(crate) password: Passphrase,
    pub(crate) trust: TrustConfig,
    pub(crate) security: SecurityConfig,
    pub(crate) provider: Option<Arc<CryptoProvider>>,
    pub(crate) secure_random: Option<&'static dyn SecureRandom>,
    pub(crate) state: PhantomData<S>,
}

impl<S> fmt::Debug for ClientTlsBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientTlsBuilder")
            .field("path", &self.path)
            .field("trust", &self.trust)
            .field("security", &self.security)
            .field("custom_provider", &self.provider.is_some())
            .field("custom_secure_random", &self.secure_random.is_some())
            .finish_non_exhaustive()
    }
}

impl ClientTlsBuilder<PasswordNotSet> {
    /// Start from a PKCS#12 file
    pub fn pkcs12(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            password: Passphrase::default(),
            trust: TrustConfig::default(),
            security: SecurityConfig::default(),
            provider: None,
            secure_random: None,
            state: PhantomData,
        }
    }

    /// Passphrase protecting both the container and its key entries
    pub fn password(self, password: impl Into<Passphrase>) -> ClientTlsBuilder<PasswordSet> {
        ClientTlsBuilder {
            path: self.path,
            password: password.into(),
            trust: self.trust,
            security: self.security,
            provider: self.provider,
            secure_random: self.secure_random,
            state: PhantomData,
        }
    }
}

impl ClientTlsBuilder<PasswordSet> {
    /// Start from a complete configuration value
    pub fn from_config(config: ClientTlsConfig) -> Self {
        let ClientTlsConfig {
            keystore,
            trust,
            security,
        } = config;
        Self {
            path: keystore.path,
            password: keystore.password,
            trust,
            security,
            provider: None,
            secure_random: None,
            state: PhantomData,
        }
    }

    /// The configuration `build()` will run with
    pub fn to_config(&self) -> ClientTlsConfig {
        let mut config = ClientTlsConfig::new(self.path.clone(), self.password.clone());
        config.trust = self.trust.clone();
        config.security = self.security.clone();
        config
    }

    /// Load the keystore, derive key managers and build the context
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` carrying the underlying cause when any
    /// step fails. No partially built context is ever returned.
    pub fn build(self) -> Result<TlsContext> {
        let mut setup = ClientTlsSetup::new(self.to_config());
        if let Some(provider) = self.provider {
            setup = setup.crypto_provider(provider);
        }
        if let Some(secure_random) = self.secure_random {
            setup = setup.secure_random(secure_random);
        }

        tracing::debug!(
            target: "mtls_setup",
            path = %self.path.display(),
            "Building client TLS context"
        );
        setup.run()
    }
}
