//! One-shot client TLS setup: keystore, key managers, context
//!
//! Each run threads its own values through the three steps. Nothing is cached
//! between runs, so two runs with the same inputs give two independent contexts.

use std::path::PathBuf;
use std::sync::Arc;

use rustls::crypto::{CryptoProvider, SecureRandom};

use crate::config::{ClientTlsConfig, Validate};
use crate::error::{Result, constructors};
use crate::keystore::load_credential_store;
use crate::tls::{KeyManagerFactory, Passphrase, TlsContext, TlsContextBuilder};

/// A configured setup run.
#[derive(Debug, Clone)]
pub struct ClientTlsSetup {
    config: ClientTlsConfig,
    factory: KeyManagerFactory,
    secure_random: Option<&'static dyn SecureRandom>,
}

impl ClientTlsSetup {
    pub fn new(config: ClientTlsConfig) -> Self {
        Self {
            config,
            factory: KeyManagerFactory::new(),
            secure_random: None,
        }
    }

    /// Provider used both to load the private keys and for the handshake.
    #[must_use]
    pub fn crypto_provider(mut self, provider: Arc<CryptoProvider>) -> Self {
        self.factory = KeyManagerFactory::with_provider(provider);
        self
    }

    /// Replace the provider's random source, for deterministic tests.
    #[must_use]
    pub fn secure_random(mut self, secure_random: &'static dyn SecureRandom) -> Self {
        self.secure_random = Some(secure_random);
        self
    }

    pub fn config(&self) -> &ClientTlsConfig {
        &self.config
    }

    /// Load the keystore, derive key managers and build the context.
    ///
    /// Any failure aborts the run; nothing is retried.
    pub fn run(&self) -> Result<TlsContext> {
        self.config.validate().map_err(constructors::invalid_input)?;

        let span = tracing::info_span!(
            "client_tls_setup",
            keystore = %self.config.keystore.path.display()
        );
        let _enter = span.enter();

        self.steps().inspect_err(|e| {
            tracing::warn!(target: "mtls_setup::setup", error = %e, "Client TLS setup failed");
        })
    }

    fn steps(&self) -> Result<TlsContext> {
        let keystore = &self.config.keystore;
        let store = load_credential_store(&keystore.path, &keystore.password)?;
        let key_managers = self.factory.init(&store, &keystore.password)?;
        drop(store);

        let mut builder = TlsContextBuilder::from_config(key_managers, &self.config)
            .crypto_provider(Arc::clone(self.factory.provider()));
        if let Some(secure_random) = self.secure_random {
            builder = builder.secure_random(secure_random);
        }

        builder.build()
    }
}

/// Build a mutual-TLS client context from a PKCS#12 file and its passphrase.
pub fn setup_client_tls(
    cert_path: impl Into<PathBuf>,
    cert_password: impl Into<Passphrase>,
) -> Result<TlsContext> {
    ClientTlsSetup::new(ClientTlsConfig::new(cert_path, cert_password)).run()
}

/// Same sequence, driven by a configuration value.
pub fn setup_client_tls_with(config: &ClientTlsConfig) -> Result<TlsContext> {
    ClientTlsSetup::new(config.clone()).run()
}
