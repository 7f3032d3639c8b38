//! Trust, protocol and provider options
//!
//! Available in every builder state.

use std::path::PathBuf;
use std::sync::Arc;

use mtls_setup_client::TlsVersion;
use rustls::crypto::{CryptoProvider, SecureRandom};

use crate::builder::core::ClientTlsBuilder;

impl<S> ClientTlsBuilder<S> {
    /// Negotiate TLS 1.3 only
    #[must_use]
    pub fn tls13_only(self) -> Self {
        self.min_tls_version(TlsVersion::Tls13)
    }

    #[must_use]
    pub fn min_tls_version(mut self, version: TlsVersion) -> Self {
        self.security.min_tls_version = version;
        self
    }

    /// Offer these ALPN protocols, most preferred first
    ///
    /// # Examples
    /// ```no_run
    /// use mtls_setup::ClientTls;
    ///
    /// let context = ClientTls::pkcs12("client.p12")
    ///     .password("changeit")
    ///     .alpn(["h2", "http/1.1"])
    ///     .build()?;
    /// # let _ = context;
    /// # Ok::<(), mtls_setup::ConfigurationError>(())
    /// ```
    #[must_use]
    pub fn alpn<I, P>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.security.alpn_protocols = protocols.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn sni(mut self, enabled: bool) -> Self {
        self.security.enable_sni = enabled;
        self
    }

    /// Load the operating system trust store (default on)
    #[must_use]
    pub fn platform_roots(mut self, enabled: bool) -> Self {
        self.trust.use_platform_roots = enabled;
        self
    }

    /// Fall back to the bundled webpki roots when no platform root loads (default on)
    #[must_use]
    pub fn webpki_fallback(mut self, enabled: bool) -> Self {
        self.trust.webpki_fallback = enabled;
        self
    }

    /// Also trust the certificates in a PEM file
    #[must_use]
    pub fn add_root_certificates(mut self, pem_file: impl Into<PathBuf>) -> Self {
        self.trust.extra_root_certificates.push(pem_file.into());
        self
    }

    /// Load keys and handshake with this provider instead of the default
    #[must_use]
    pub fn crypto_provider(mut self, provider: Arc<CryptoProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the provider's random source, for deterministic tests
    #[must_use]
    pub fn secure_random(mut self, secure_random: &'static dyn SecureRandom) -> Self {
        self.secure_random = Some(secure_random);
        self
    }
}
