//! Key managers: client identities rustls can present during a handshake

use std::sync::Arc;

use rustls::SignatureScheme;
use rustls::client::ResolvesClientCert;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::CertificateDer;
use rustls::sign::CertifiedKey;

use super::certificate::warn_on_client_certificate_issues;
use super::types::{ParsedCertificate, Passphrase};
use crate::error::{Result, constructors};
use crate::keystore::{CertificateEntry, CredentialStore, KeyEntry};

/// One usable identity: alias, chain (leaf first) and a loaded signing key.
#[derive(Debug, Clone)]
pub struct KeyManager {
    alias: String,
    leaf: ParsedCertificate,
    /// Raw subject and issuer names of every certificate in the chain
    names: Vec<Vec<u8>>,
    certified_key: Arc<CertifiedKey>,
}

impl KeyManager {
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn leaf(&self) -> &ParsedCertificate {
        &self.leaf
    }

    pub fn certificate_chain(&self) -> &[CertificateDer<'static>] {
        &self.certified_key.cert
    }

    pub fn certified_key(&self) -> &Arc<CertifiedKey> {
        &self.certified_key
    }

    fn supports_any(&self, sigschemes: &[SignatureScheme]) -> bool {
        self.certified_key.key.choose_scheme(sigschemes).is_some()
    }

    /// Whether any hinted CA name appears in this chain.
    fn matches_hint(&self, root_hint_subjects: &[&[u8]]) -> bool {
        root_hint_subjects.iter().any(|hint| {
            self.names
                .iter()
                .any(|name| name_matches(hint, name))
        })
    }
}

/// rustls hands out hint names without the outer SEQUENCE header.
fn name_matches(hint: &[u8], raw_name: &[u8]) -> bool {
    if hint == raw_name {
        return true;
    }
    let header_len = match raw_name {
        [0x30, len, ..] if *len < 0x80 => 2,
        [0x30, len, ..] => 2 + usize::from(*len & 0x7f),
        _ => return false,
    };
    raw_name.len() == header_len + hint.len() && raw_name.ends_with(hint)
}

/// Ordered set of key managers; the rustls-side key manager for a client config.
#[derive(Debug, Clone, Default)]
pub struct KeyManagerSet {
    managers: Vec<KeyManager>,
}

impl KeyManagerSet {
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyManager> {
        self.managers.iter()
    }

    pub fn aliases(&self) -> Vec<&str> {
        self.managers.iter().map(KeyManager::alias).collect()
    }

    pub fn get(&self, alias: &str) -> Option<&KeyManager> {
        self.managers.iter().find(|m| m.alias == alias)
    }

    /// Pick the identity to present.
    ///
    /// Only keys that can sign with an offered scheme qualify. Among those, a
    /// chain naming one of the server's hinted CAs wins, else the first one.
    fn select(
        &self,
        root_hint_subjects: &[&[u8]],
        sigschemes: &[SignatureScheme],
    ) -> Option<&KeyManager> {
        let mut usable = self.managers.iter().filter(|m| m.supports_any(sigschemes));
        let first = usable.next()?;
        if root_hint_subjects.is_empty() || first.matches_hint(root_hint_subjects) {
            return Some(first);
        }
        Some(
            usable
                .find(|m| m.matches_hint(root_hint_subjects))
                .unwrap_or(first),
        )
    }
}

impl ResolvesClientCert for KeyManagerSet {
    fn resolve(
        &self,
        root_hint_subjects: &[&[u8]],
        sigschemes: &[SignatureScheme],
    ) -> Option<Arc<CertifiedKey>> {
        let chosen = self.select(root_hint_subjects, sigschemes);
        match chosen {
            Some(manager) => {
                tracing::debug!(
                    target: "mtls_setup::tls",
                    alias = %manager.alias,
                    "Presenting client certificate"
                );
                Some(Arc::clone(&manager.certified_key))
            }
            None => {
                tracing::warn!(
                    target: "mtls_setup::tls",
                    offered = ?sigschemes,
                    "No client key supports the server's signature schemes"
                );
                None
            }
        }
    }

    fn has_certs(&self) -> bool {
        !self.managers.is_empty()
    }
}

/// Turns a [`CredentialStore`] into a [`KeyManagerSet`] using one crypto provider.
#[derive(Debug, Clone)]
pub struct KeyManagerFactory {
    provider: Arc<CryptoProvider>,
}

impl Default for KeyManagerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyManagerFactory {
    /// Use the process default provider if one is installed, else ring.
    ///
    /// Never installs a process default.
    pub fn new() -> Self {
        let provider = CryptoProvider::get_default()
            .cloned()
            .unwrap_or_else(|| Arc::new(rustls::crypto::ring::default_provider()));
        Self::with_provider(provider)
    }

    pub fn with_provider(provider: Arc<CryptoProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<CryptoProvider> {
        &self.provider
    }

    /// Recover every key in `store` and pair it with its certificate chain.
    pub fn init(&self, store: &CredentialStore, password: &Passphrase) -> Result<KeyManagerSet> {
        let keys = store.key_entries();
        if keys.is_empty() {
            return Err(constructors::no_key_entry(
                "keystore contains no private key entry",
            ));
        }

        let mut managers = Vec::with_capacity(keys.len());
        for key in keys {
            match self.key_manager(store, key, password)? {
                Some(manager) => managers.push(manager),
                None => tracing::warn!(
                    target: "mtls_setup::tls",
                    alias = key.alias(),
                    "Skipping key entry without a matching certificate"
                ),
            }
        }

        if managers.is_empty() {
            return Err(constructors::no_certificate_for_key(keys[0].alias()));
        }

        tracing::debug!(
            target: "mtls_setup::tls",
            count = managers.len(),
            "Derived key managers"
        );

        Ok(KeyManagerSet { managers })
    }

    fn key_manager(
        &self,
        store: &CredentialStore,
        key: &KeyEntry,
        password: &Passphrase,
    ) -> Result<Option<KeyManager>> {
        let private_key = key.recover_private_key(password)?;
        let signing_key = self
            .provider
            .key_provider
            .load_private_key(private_key)
            .map_err(|e| constructors::key_recovery(key.alias(), e))?;

        let public_key: Option<Vec<u8>> = signing_key.public_key().map(|spki| spki.as_ref().to_vec());
        let spki = public_key.as_deref();

        let mut certificate = store.certificate_for_key_id(key);
        if let (Some(cert), Some(spki)) = (certificate, spki) {
            if cert.parsed().public_key_der != spki {
                tracing::warn!(
                    target: "mtls_setup::tls",
                    alias = key.alias(),
                    "Certificate with the key's localKeyId carries a different public key"
                );
                certificate = None;
            }
        }
        let certificate: Option<&CertificateEntry> =
            certificate.or_else(|| spki.and_then(|spki| store.certificate_for_public_key(spki)));

        let Some(leaf) = certificate else {
            return Ok(None);
        };

        warn_on_client_certificate_issues(key.alias(), leaf.parsed());

        let chain = store.chain_for(leaf);
        let mut names = Vec::with_capacity(chain.len() * 2);
        for cert in store.certificates() {
            if chain.iter().any(|der| der == cert.der()) {
                names.push(cert.parsed().subject_der.clone());
                names.push(cert.parsed().issuer_der.clone());
            }
        }

        tracing::debug!(
            target: "mtls_setup::tls",
            alias = key.alias(),
            subject = %leaf.parsed().subject,
            chain_len = chain.len(),
            "Paired key with certificate chain"
        );

        Ok(Some(KeyManager {
            alias: key.alias().to_string(),
            leaf: leaf.parsed().clone(),
            names,
            certified_key: Arc::new(CertifiedKey::new(chain, signing_key)),
        }))
    }
}

/// Derive key managers from `store` with the default crypto provider.
pub fn derive_key_managers(store: &CredentialStore, password: &Passphrase) -> Result<KeyManagerSet> {
    KeyManagerFactory::new().init(store, password)
}
