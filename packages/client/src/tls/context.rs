//! Client TLS context: a rustls `ClientConfig` that presents a client certificate

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use rustls::ClientConfig;
use rustls::crypto::{CryptoProvider, SecureRandom};
use rustls::pki_types::CertificateDer;
use tokio_rustls::TlsConnector;

use super::key_manager::KeyManagerSet;
use super::roots::TrustSources;
use crate::config::{ClientTlsConfig, TlsVersion};
use crate::error::{Result, constructors};

/// A fully initialized client TLS configuration.
///
/// Cheap to clone. Every connection opened from it authenticates with the
/// key managers it was built from.
#[derive(Clone)]
pub struct TlsContext {
    config: Arc<ClientConfig>,
    aliases: Vec<String>,
}

impl TlsContext {
    /// The rustls configuration, for blocking `ClientConnection`s or other integrations.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.config)
    }

    /// An async connector sharing this context's configuration.
    pub fn connector(&self) -> TlsConnector {
        TlsConnector::from(Arc::clone(&self.config))
    }

    /// Aliases of the identities this context can present.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl fmt::Debug for TlsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsContext")
            .field("aliases", &self.aliases)
            .field("alpn_protocols", &self.config.alpn_protocols.len())
            .field("enable_sni", &self.config.enable_sni)
            .finish_non_exhaustive()
    }
}

/// Builds a [`TlsContext`] from a [`KeyManagerSet`].
///
/// Defaults match [`build_tls_context`]: platform trust store with the webpki
/// fallback, TLS 1.2 and 1.3, SNI on, no ALPN, the provider's own secure random.
pub struct TlsContextBuilder {
    key_managers: KeyManagerSet,
    provider: Option<Arc<CryptoProvider>>,
    secure_random: Option<&'static dyn SecureRandom>,
    min_tls_version: TlsVersion,
    trust: TrustSources,
    alpn_protocols: Vec<Vec<u8>>,
    enable_sni: bool,
}

impl TlsContextBuilder {
    pub fn new(key_managers: KeyManagerSet) -> Self {
        Self {
            key_managers,
            provider: None,
            secure_random: None,
            min_tls_version: TlsVersion::default(),
            trust: TrustSources::default(),
            alpn_protocols: Vec::new(),
            enable_sni: true,
        }
    }

    /// Apply the trust and protocol sections of `config`.
    pub fn from_config(key_managers: KeyManagerSet, config: &ClientTlsConfig) -> Self {
        Self::new(key_managers)
            .min_tls_version(config.security.min_tls_version)
            .platform_roots(config.trust.use_platform_roots)
            .webpki_fallback(config.trust.webpki_fallback)
            .add_root_certificates(config.trust.extra_root_certificates.iter().cloned())
            .alpn_protocols(config.security.alpn_protocols.iter().map(|p| p.as_bytes().to_vec()))
            .enable_sni(config.security.enable_sni)
    }

    /// Crypto provider for the handshake. Should be the one the keys were loaded with.
    #[must_use]
    pub fn crypto_provider(mut self, provider: Arc<CryptoProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the provider's random source, for deterministic tests.
    #[must_use]
    pub fn secure_random(mut self, secure_random: &'static dyn SecureRandom) -> Self {
        self.secure_random = Some(secure_random);
        self
    }

    #[must_use]
    pub fn min_tls_version(mut self, version: TlsVersion) -> Self {
        self.min_tls_version = version;
        self
    }

    #[must_use]
    pub fn platform_roots(mut self, enabled: bool) -> Self {
        self.trust.use_platform_roots = enabled;
        self
    }

    #[must_use]
    pub fn webpki_fallback(mut self, enabled: bool) -> Self {
        self.trust.webpki_fallback = enabled;
        self
    }

    /// Trust the certificates in these PEM files as well.
    #[must_use]
    pub fn add_root_certificates<I, P>(mut self, pem_files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.trust
            .pem_files
            .extend(pem_files.into_iter().map(Into::into));
        self
    }

    /// Trust a DER certificate as well.
    #[must_use]
    pub fn add_root_certificate(mut self, certificate: CertificateDer<'static>) -> Self {
        self.trust.certificates.push(certificate);
        self
    }

    #[must_use]
    pub fn alpn_protocols<I>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        self.alpn_protocols = protocols.into_iter().collect();
        self
    }

    #[must_use]
    pub fn enable_sni(mut self, enabled: bool) -> Self {
        self.enable_sni = enabled;
        self
    }

    /// Initialize the context. Nothing partial is ever returned.
    pub fn build(self) -> Result<TlsContext> {
        if self.key_managers.is_empty() {
            return Err(constructors::no_key_entry(
                "no key managers to initialize the TLS context with",
            ));
        }

        let mut provider = self.provider.unwrap_or_else(|| {
            CryptoProvider::get_default()
                .cloned()
                .unwrap_or_else(|| Arc::new(rustls::crypto::ring::default_provider()))
        });
        if let Some(secure_random) = self.secure_random {
            let mut custom = (*provider).clone();
            custom.secure_random = secure_random;
            provider = Arc::new(custom);
        }

        let roots = self.trust.root_store()?;
        let root_count = roots.len();
        let aliases: Vec<String> = self
            .key_managers
            .aliases()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut config = ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(self.min_tls_version.protocol_versions())
            .map_err(|e| constructors::tls("TLS context initialization failed", e))?
            .with_root_certificates(roots)
            .with_client_cert_resolver(Arc::new(self.key_managers));

        config.alpn_protocols = self.alpn_protocols;
        config.enable_sni = self.enable_sni;

        tracing::info!(
            target: "mtls_setup::tls",
            aliases = ?aliases,
            roots = root_count,
            min_version = ?self.min_tls_version,
            "Client TLS context initialized"
        );

        Ok(TlsContext {
            config: Arc::new(config),
            aliases,
        })
    }
}

/// Build a context with the default options.
pub fn build_tls_context(key_managers: KeyManagerSet) -> Result<TlsContext> {
    TlsContextBuilder::new(key_managers).build()
}
