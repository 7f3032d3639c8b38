//! In-memory credential store decoded from a PKCS#12 container

use std::fs::File;
use std::io::Read;
use std::path::Path;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};

use super::pfx::{self, BagAttributes, DecryptError, KeyMaterial, SafeBag};
use crate::error::{DecryptionFailed, Result, constructors};
use crate::tls::certificate::parse_certificate_from_der;
use crate::tls::types::{ParsedCertificate, Passphrase, SecureKeyMaterial};

/// A certificate found in the store, with the fields pairing and chain building use.
#[derive(Debug, Clone)]
pub struct CertificateEntry {
    der: CertificateDer<'static>,
    parsed: ParsedCertificate,
    friendly_name: Option<String>,
    local_key_id: Option<Vec<u8>>,
}

impl CertificateEntry {
    pub fn der(&self) -> &CertificateDer<'static> {
        &self.der
    }

    pub fn parsed(&self) -> &ParsedCertificate {
        &self.parsed
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }

    pub fn local_key_id(&self) -> Option<&[u8]> {
        self.local_key_id.as_deref()
    }
}

/// A private key entry, still protected by the passphrase.
#[derive(Debug, Clone)]
pub struct KeyEntry {
    alias: String,
    friendly_name: Option<String>,
    local_key_id: Option<Vec<u8>>,
    material: KeyMaterial,
}

impl KeyEntry {
    /// `friendlyName`, else hex `localKeyId`, else `entry-<n>`.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn local_key_id(&self) -> Option<&[u8]> {
        self.local_key_id.as_deref()
    }

    /// Whether the key is stored encrypted.
    pub fn is_shrouded(&self) -> bool {
        matches!(self.material, KeyMaterial::Shrouded { .. })
    }

    /// Decrypt the entry into PKCS#8 bytes.
    ///
    /// The plaintext is wiped when the returned buffer drops.
    pub fn recover(&self, password: &Passphrase) -> Result<SecureKeyMaterial> {
        let pkcs8 = match &self.material {
            KeyMaterial::Plain(pkcs8) => pkcs8.to_vec(),
            KeyMaterial::Shrouded { scheme, ciphertext } => {
                let mut plaintext = scheme
                    .decrypt(ciphertext, password.expose())
                    .map_err(|e| match e {
                        DecryptError::Unsupported(oid) => {
                            constructors::unsupported(oid, "key encryption")
                        }
                        DecryptError::Failed(e) => constructors::key_recovery(&self.alias, e),
                    })?;
                std::mem::take(&mut *plaintext)
            }
        };

        let key = SecureKeyMaterial::new(pkcs8);
        // PrivateKeyInfo is a SEQUENCE
        if key.as_bytes().first() != Some(&0x30) {
            return Err(constructors::key_recovery(
                &self.alias,
                DecryptionFailed { cipher: "PKCS#8" },
            ));
        }
        Ok(key)
    }

    /// Recover the key in the form the crypto provider loads.
    pub fn recover_private_key(&self, password: &Passphrase) -> Result<PrivateKeyDer<'static>> {
        let key = self.recover(password)?;
        Ok(PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
            key.as_bytes().to_vec(),
        )))
    }
}

/// Decoded PKCS#12 contents: certificates plus still-protected key entries.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    keys: Vec<KeyEntry>,
    certificates: Vec<CertificateEntry>,
}

impl CredentialStore {
    /// Open and decode the PKCS#12 file at `path`.
    pub fn load(path: impl AsRef<Path>, password: &Passphrase) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| constructors::io(path, e))?;
        tracing::debug!(
            target: "mtls_setup::keystore",
            path = %path.display(),
            "Loading PKCS#12 keystore"
        );
        Self::from_reader(file, password)
    }

    /// Read a PKCS#12 container to the end, release the reader, then decode.
    ///
    /// The reader is dropped before decoding starts and on every error path.
    pub fn from_reader<R: Read>(mut reader: R, password: &Passphrase) -> Result<Self> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(constructors::read)?;
        drop(reader);

        Self::from_pkcs12_der(&data, password)
    }

    /// Decode PKCS#12 bytes already in memory.
    pub fn from_pkcs12_der(data: &[u8], password: &Passphrase) -> Result<Self> {
        if password.is_empty() {
            return Err(constructors::invalid_input(
                crate::config::ValidationError::EmptyPassphrase,
            ));
        }

        let bags = pfx::decode_pfx(data, password.expose())?;

        let mut keys = Vec::new();
        let mut certificates = Vec::new();
        for bag in bags {
            match bag {
                SafeBag::Key {
                    material,
                    attributes,
                } => {
                    let alias = alias_for(&attributes, keys.len());
                    let BagAttributes {
                        friendly_name,
                        local_key_id,
                    } = attributes;
                    keys.push(KeyEntry {
                        alias,
                        friendly_name,
                        local_key_id,
                        material,
                    });
                }
                SafeBag::Cert { der, attributes } => {
                    let parsed = parse_certificate_from_der(&der)?;
                    certificates.push(CertificateEntry {
                        der: CertificateDer::from(der),
                        parsed,
                        friendly_name: attributes.friendly_name,
                        local_key_id: attributes.local_key_id,
                    });
                }
                SafeBag::Other(_) => {}
            }
        }

        // A key without a friendlyName takes its certificate's
        for key in keys.iter_mut().filter(|k| k.friendly_name.is_none()) {
            let named = certificates.iter().find(|c| {
                c.friendly_name.is_some()
                    && c.local_key_id.is_some()
                    && c.local_key_id == key.local_key_id
            });
            if let Some(name) = named.and_then(|c| c.friendly_name.clone()) {
                key.alias = name;
            }
        }

        tracing::debug!(
            target: "mtls_setup::keystore",
            keys = keys.len(),
            certificates = certificates.len(),
            "Credential store decoded"
        );

        Ok(Self { keys, certificates })
    }

    pub fn key_entries(&self) -> &[KeyEntry] {
        &self.keys
    }

    pub fn certificates(&self) -> &[CertificateEntry] {
        &self.certificates
    }

    /// Aliases of the key entries, in container order.
    pub fn aliases(&self) -> Vec<&str> {
        self.keys.iter().map(KeyEntry::alias).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.certificates.is_empty()
    }

    /// The certificate issued for `key`: same `localKeyId`.
    pub(crate) fn certificate_for_key_id(&self, key: &KeyEntry) -> Option<&CertificateEntry> {
        let id = key.local_key_id.as_deref()?;
        self.certificates
            .iter()
            .find(|c| c.local_key_id.as_deref() == Some(id))
    }

    /// The certificate carrying `spki` as its SubjectPublicKeyInfo.
    pub(crate) fn certificate_for_public_key(&self, spki: &[u8]) -> Option<&CertificateEntry> {
        self.certificates
            .iter()
            .find(|c| c.parsed.public_key_der == spki)
    }

    /// Leaf first, then issuers found in the store.
    ///
    /// Stops at a self-signed certificate, a missing issuer or a cycle.
    pub(crate) fn chain_for(&self, leaf: &CertificateEntry) -> Vec<CertificateDer<'static>> {
        let mut chain = vec![leaf.der.clone()];
        // By DER: serial numbers are only unique per issuer
        let mut visited = vec![&leaf.der];
        let mut current = leaf;

        while !current.parsed.is_self_issued() {
            let issuer = self.certificates.iter().find(|c| {
                c.parsed.subject_der == current.parsed.issuer_der
                    && !visited.contains(&&c.der)
            });
            let Some(issuer) = issuer else {
                break;
            };
            chain.push(issuer.der.clone());
            visited.push(&issuer.der);
            current = issuer;
        }

        chain
    }
}

fn alias_for(attributes: &BagAttributes, index: usize) -> String {
    if let Some(name) = &attributes.friendly_name {
        return name.clone();
    }
    if let Some(id) = &attributes.local_key_id {
        return hex::encode(id);
    }
    format!("entry-{index}")
}

/// Open a PKCS#12 file and decode it with `password`.
pub fn load_credential_store(
    path: impl AsRef<Path>,
    password: &Passphrase,
) -> Result<CredentialStore> {
    CredentialStore::load(path, password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_prefers_friendly_name_then_key_id() {
        let named = BagAttributes {
            friendly_name: Some("client".to_string()),
            local_key_id: Some(vec![0xAB, 0x01]),
        };
        assert_eq!(alias_for(&named, 0), "client");

        let id_only = BagAttributes {
            friendly_name: None,
            local_key_id: Some(vec![0xAB, 0x01]),
        };
        assert_eq!(alias_for(&id_only, 0), "ab01");

        assert_eq!(alias_for(&BagAttributes::default(), 3), "entry-3");
    }

    #[test]
    fn empty_passphrase_is_rejected_before_decoding() {
        let err = CredentialStore::from_pkcs12_der(b"irrelevant", &Passphrase::default())
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }
}
