//! BER parsing of PKCS#12 (PFX) structures (RFC 7292).
//!
//! PKCS#12 files in the wild are BER, not strict DER, so everything here goes
//! through `yasna::parse_ber`. Key bags are returned still shrouded: recovering
//! a private key is a separate step that needs the passphrase again.

use std::fmt;

use yasna::models::ObjectIdentifier;
use yasna::{ASN1Error, ASN1ErrorKind, ASN1Result, BERReader, BERReaderSeq, Tag};
use zeroize::Zeroizing;

use super::kdf::{self, MacDigest, Pbes2Cipher, Prf};
use crate::error::{DecryptionFailed, Result, constructors};

// Content types (PKCS#7)
const OID_DATA: &[u64] = &[1, 2, 840, 113549, 1, 7, 1];
const OID_ENCRYPTED_DATA: &[u64] = &[1, 2, 840, 113549, 1, 7, 6];

// Bag types
const OID_KEY_BAG: &[u64] = &[1, 2, 840, 113549, 1, 12, 10, 1, 1];
const OID_PKCS8_SHROUDED_KEY_BAG: &[u64] = &[1, 2, 840, 113549, 1, 12, 10, 1, 2];
const OID_CERT_BAG: &[u64] = &[1, 2, 840, 113549, 1, 12, 10, 1, 3];

const OID_X509_CERTIFICATE: &[u64] = &[1, 2, 840, 113549, 1, 9, 22, 1];

// Bag attributes
const OID_FRIENDLY_NAME: &[u64] = &[1, 2, 840, 113549, 1, 9, 20];
const OID_LOCAL_KEY_ID: &[u64] = &[1, 2, 840, 113549, 1, 9, 21];

// Password-based encryption
const OID_PBE_SHA1_3DES: &[u64] = &[1, 2, 840, 113549, 1, 12, 1, 3];
const OID_PBES2: &[u64] = &[1, 2, 840, 113549, 1, 5, 13];
const OID_PBKDF2: &[u64] = &[1, 2, 840, 113549, 1, 5, 12];

const OID_AES_128_CBC: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 2];
const OID_AES_192_CBC: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 22];
const OID_AES_256_CBC: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 1, 42];

const OID_HMAC_SHA1: &[u64] = &[1, 2, 840, 113549, 2, 7];
const OID_HMAC_SHA224: &[u64] = &[1, 2, 840, 113549, 2, 8];
const OID_HMAC_SHA256: &[u64] = &[1, 2, 840, 113549, 2, 9];
const OID_HMAC_SHA384: &[u64] = &[1, 2, 840, 113549, 2, 10];
const OID_HMAC_SHA512: &[u64] = &[1, 2, 840, 113549, 2, 11];

// MAC digests
const OID_SHA1: &[u64] = &[1, 3, 14, 3, 2, 26];
const OID_SHA256: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 1];
const OID_SHA384: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 2];
const OID_SHA512: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 3];

fn oid(components: &[u64]) -> ObjectIdentifier {
    ObjectIdentifier::from_slice(components)
}

fn invalid() -> ASN1Error {
    ASN1Error::new(ASN1ErrorKind::Invalid)
}

/// Upper bound on KDF and MAC iteration counts read from a container.
///
/// Common tools write 2048.
const MAX_ITERATIONS: u32 = 10_000_000;

/// An iteration count in `1..=MAX_ITERATIONS`; anything else is malformed.
fn read_iterations(r: BERReader) -> ASN1Result<u32> {
    let iterations = r.read_u32()?;
    if iterations == 0 || iterations > MAX_ITERATIONS {
        tracing::debug!(
            target: "mtls_setup::keystore",
            iterations,
            "Rejecting out-of-range iteration count"
        );
        return Err(invalid());
    }
    Ok(iterations)
}

/// Skip whatever optional parameters follow an algorithm OID.
fn skip_rest(r: &mut BERReaderSeq<'_, '_>) -> ASN1Result<()> {
    while r.read_optional(|r| r.read_der())?.is_some() {}
    Ok(())
}

/// A password-based encryption scheme found on encrypted content or a key bag.
#[derive(Debug, Clone)]
pub(crate) enum EncryptionScheme {
    PbeSha1And3Des {
        salt: Vec<u8>,
        iterations: u32,
    },
    Pbes2 {
        salt: Vec<u8>,
        iterations: u32,
        prf: Prf,
        cipher: Pbes2Cipher,
        iv: Vec<u8>,
    },
    /// Dotted OID of a scheme, PRF or cipher this crate cannot run.
    Unsupported(String),
}

/// Why a shrouded payload could not be decrypted.
#[derive(Debug)]
pub(crate) enum DecryptError {
    Unsupported(String),
    Failed(DecryptionFailed),
}

impl EncryptionScheme {
    pub(crate) fn decrypt(
        &self,
        ciphertext: &[u8],
        password: &str,
    ) -> std::result::Result<Zeroizing<Vec<u8>>, DecryptError> {
        match self {
            EncryptionScheme::PbeSha1And3Des { salt, iterations } => {
                let bmp = kdf::password_to_bmp(password);
                kdf::decrypt_pbe_sha1_3des(ciphertext, &bmp, salt, *iterations)
                    .map_err(DecryptError::Failed)
            }
            EncryptionScheme::Pbes2 {
                salt,
                iterations,
                prf,
                cipher,
                iv,
            } => kdf::decrypt_pbes2(ciphertext, password, salt, *iterations, *prf, *cipher, iv)
                .map_err(DecryptError::Failed),
            EncryptionScheme::Unsupported(oid) => Err(DecryptError::Unsupported(oid.clone())),
        }
    }
}

impl fmt::Display for EncryptionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionScheme::PbeSha1And3Des { iterations, .. } => {
                write!(f, "PBE-SHA1-3DES ({iterations} iterations)")
            }
            EncryptionScheme::Pbes2 {
                iterations,
                prf,
                cipher,
                ..
            } => write!(f, "PBES2 {prf:?}/{} ({iterations} iterations)", cipher.name()),
            EncryptionScheme::Unsupported(oid) => write!(f, "unsupported scheme {oid}"),
        }
    }
}

/// `friendlyName` and `localKeyId` of a bag. Other attributes are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BagAttributes {
    pub(crate) friendly_name: Option<String>,
    pub(crate) local_key_id: Option<Vec<u8>>,
}

/// Private key as stored in the container.
#[derive(Clone)]
pub(crate) enum KeyMaterial {
    /// `keyBag`: unencrypted PKCS#8.
    Plain(Zeroizing<Vec<u8>>),
    /// `pkcs8ShroudedKeyBag`: EncryptedPrivateKeyInfo.
    Shrouded {
        scheme: EncryptionScheme,
        ciphertext: Vec<u8>,
    },
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Plain(pkcs8) => write!(f, "Plain({} bytes)", pkcs8.len()),
            KeyMaterial::Shrouded { scheme, ciphertext } => f
                .debug_struct("Shrouded")
                .field("scheme", &format_args!("{scheme}"))
                .field("ciphertext_len", &ciphertext.len())
                .finish(),
        }
    }
}

#[derive(Debug)]
pub(crate) enum SafeBag {
    Key {
        material: KeyMaterial,
        attributes: BagAttributes,
    },
    Cert {
        der: Vec<u8>,
        attributes: BagAttributes,
    },
    /// CRL, secret, nested safeContents and non-X.509 certificate bags.
    Other(String),
}

struct MacData {
    digest: std::result::Result<MacDigest, ObjectIdentifier>,
    digest_value: Vec<u8>,
    salt: Vec<u8>,
    iterations: u32,
}

enum AuthSafe {
    Data(Vec<u8>),
    Other(ObjectIdentifier),
}

enum ContentInfo {
    Data(Vec<u8>),
    Encrypted {
        scheme: EncryptionScheme,
        ciphertext: Vec<u8>,
    },
    Other(ObjectIdentifier),
}

/// Decode a PFX, verify its MAC and decrypt its encrypted contents.
///
/// Returns every bag in container order. Key bags stay shrouded.
pub(crate) fn decode_pfx(data: &[u8], password: &str) -> Result<Vec<SafeBag>> {
    let (auth_safe, mac) = yasna::parse_ber(data, |r| {
        r.read_sequence(|r| {
            let version = r.next().read_u32()?;
            if version != 3 {
                return Err(invalid());
            }
            let auth_safe = r.next().read_sequence(|r| {
                let content_type = r.next().read_oid()?;
                if content_type == oid(OID_DATA) {
                    let data = r.next().read_tagged(Tag::context(0), |r| r.read_bytes())?;
                    Ok(AuthSafe::Data(data))
                } else {
                    skip_rest(r)?;
                    Ok(AuthSafe::Other(content_type))
                }
            })?;
            let mac = r.read_optional(parse_mac_data)?;
            Ok((auth_safe, mac))
        })
    })
    .map_err(|e| constructors::decode("PKCS#12 container", e))?;

    let auth_safe = match auth_safe {
        AuthSafe::Data(data) => data,
        AuthSafe::Other(content_type) => {
            return Err(constructors::unsupported(
                content_type.to_string(),
                "integrity mode",
            ));
        }
    };

    match mac {
        Some(mac) => verify_mac(&mac, &auth_safe, password)?,
        None => tracing::warn!(
            target: "mtls_setup::keystore",
            "PKCS#12 container has no MAC; integrity not verified"
        ),
    }

    let content_infos =
        yasna::parse_ber(&auth_safe, |r| r.collect_sequence_of(parse_content_info))
            .map_err(|e| constructors::decode("PKCS#12 authenticated safe", e))?;

    let mut bags = Vec::new();
    for content_info in content_infos {
        let safe_contents = match content_info {
            ContentInfo::Data(data) => Zeroizing::new(data),
            ContentInfo::Encrypted { scheme, ciphertext } => {
                tracing::debug!(
                    target: "mtls_setup::keystore",
                    scheme = %scheme,
                    "Decrypting encrypted safe contents"
                );
                scheme
                    .decrypt(&ciphertext, password)
                    .map_err(|e| match e {
                        DecryptError::Unsupported(oid) => {
                            constructors::unsupported(oid, "content encryption")
                        }
                        DecryptError::Failed(e) => constructors::undecryptable(e),
                    })?
            }
            ContentInfo::Other(content_type) => {
                return Err(constructors::unsupported(
                    content_type.to_string(),
                    "content type",
                ));
            }
        };

        let mut contents = yasna::parse_ber(&safe_contents, |r| r.collect_sequence_of(parse_safe_bag))
            .map_err(|e| constructors::decode("PKCS#12 safe contents", e))?;
        bags.append(&mut contents);
    }

    tracing::debug!(
        target: "mtls_setup::keystore",
        bags = bags.len(),
        "Decoded PKCS#12 container"
    );

    Ok(bags)
}

fn verify_mac(mac: &MacData, auth_safe: &[u8], password: &str) -> Result<()> {
    let digest = match &mac.digest {
        Ok(digest) => *digest,
        Err(oid) => return Err(constructors::unsupported(oid.to_string(), "MAC digest")),
    };

    let bmp = kdf::password_to_bmp(password);
    if digest.verify(&bmp, &mac.salt, mac.iterations, auth_safe, &mac.digest_value) {
        tracing::debug!(
            target: "mtls_setup::keystore",
            digest = ?digest,
            iterations = mac.iterations,
            "PKCS#12 MAC verified"
        );
        Ok(())
    } else {
        Err(constructors::bad_passphrase())
    }
}

fn parse_mac_data(r: BERReader) -> ASN1Result<MacData> {
    r.read_sequence(|r| {
        let (digest, digest_value) = r.next().read_sequence(|r| {
            let digest = r.next().read_sequence(|r| {
                let hash_oid = r.next().read_oid()?;
                skip_rest(r)?;
                Ok(mac_digest_from_oid(&hash_oid).ok_or(hash_oid))
            })?;
            let value = r.next().read_bytes()?;
            Ok((digest, value))
        })?;

        let salt = r.next().read_bytes()?;
        let iterations = r.read_optional(read_iterations)?.unwrap_or(1);

        Ok(MacData {
            digest,
            digest_value,
            salt,
            iterations,
        })
    })
}

fn mac_digest_from_oid(hash_oid: &ObjectIdentifier) -> Option<MacDigest> {
    if *hash_oid == oid(OID_SHA1) {
        Some(MacDigest::Sha1)
    } else if *hash_oid == oid(OID_SHA256) {
        Some(MacDigest::Sha256)
    } else if *hash_oid == oid(OID_SHA384) {
        Some(MacDigest::Sha384)
    } else if *hash_oid == oid(OID_SHA512) {
        Some(MacDigest::Sha512)
    } else {
        None
    }
}

fn parse_content_info(r: BERReader) -> ASN1Result<ContentInfo> {
    r.read_sequence(|r| {
        let content_type = r.next().read_oid()?;

        if content_type == oid(OID_DATA) {
            let data = r.next().read_tagged(Tag::context(0), |r| r.read_bytes())?;
            Ok(ContentInfo::Data(data))
        } else if content_type == oid(OID_ENCRYPTED_DATA) {
            r.next().read_tagged(Tag::context(0), |r| {
                r.read_sequence(|r| {
                    let _version = r.next().read_u32()?;
                    let (scheme, ciphertext) = r.next().read_sequence(|r| {
                        let _content_type = r.next().read_oid()?;
                        let scheme = parse_encryption_scheme(r.next())?;
                        let ciphertext = r
                            .next()
                            .read_tagged_implicit(Tag::context(0), |r| r.read_bytes())?;
                        Ok((scheme, ciphertext))
                    })?;
                    // unprotectedAttrs [1]
                    skip_rest(r)?;
                    Ok(ContentInfo::Encrypted { scheme, ciphertext })
                })
            })
        } else {
            skip_rest(r)?;
            Ok(ContentInfo::Other(content_type))
        }
    })
}

fn parse_safe_bag(r: BERReader) -> ASN1Result<SafeBag> {
    r.read_sequence(|r| {
        let bag_type = r.next().read_oid()?;

        let bag = if bag_type == oid(OID_PKCS8_SHROUDED_KEY_BAG) {
            let (scheme, ciphertext) = r.next().read_tagged(Tag::context(0), |r| {
                r.read_sequence(|r| {
                    let scheme = parse_encryption_scheme(r.next())?;
                    let ciphertext = r.next().read_bytes()?;
                    Ok((scheme, ciphertext))
                })
            })?;
            let attributes = parse_bag_attributes(r)?;
            SafeBag::Key {
                material: KeyMaterial::Shrouded { scheme, ciphertext },
                attributes,
            }
        } else if bag_type == oid(OID_KEY_BAG) {
            let pkcs8 = r.next().read_tagged(Tag::context(0), |r| r.read_der())?;
            let attributes = parse_bag_attributes(r)?;
            SafeBag::Key {
                material: KeyMaterial::Plain(Zeroizing::new(pkcs8)),
                attributes,
            }
        } else if bag_type == oid(OID_CERT_BAG) {
            let cert = r.next().read_tagged(Tag::context(0), |r| {
                r.read_sequence(|r| {
                    let cert_type = r.next().read_oid()?;
                    if cert_type == oid(OID_X509_CERTIFICATE) {
                        let der = r.next().read_tagged(Tag::context(0), |r| r.read_bytes())?;
                        Ok(Ok(der))
                    } else {
                        skip_rest(r)?;
                        Ok(Err(cert_type))
                    }
                })
            })?;
            let attributes = parse_bag_attributes(r)?;
            match cert {
                Ok(der) => SafeBag::Cert { der, attributes },
                Err(cert_type) => SafeBag::Other(format!("certificate type {cert_type}")),
            }
        } else {
            skip_rest(r)?;
            SafeBag::Other(format!("bag type {bag_type}"))
        };

        if let SafeBag::Other(what) = &bag {
            tracing::debug!(target: "mtls_setup::keystore", "Skipping {what}");
        }
        Ok(bag)
    })
}

fn parse_bag_attributes(r: &mut BERReaderSeq<'_, '_>) -> ASN1Result<BagAttributes> {
    let mut attributes = BagAttributes::default();
    r.read_optional(|r| {
        r.read_set_of(|r| {
            r.read_sequence(|r| {
                let attr_type = r.next().read_oid()?;
                r.next().read_set_of(|r| {
                    if attr_type == oid(OID_FRIENDLY_NAME) && attributes.friendly_name.is_none() {
                        attributes.friendly_name = Some(r.read_bmp_string()?);
                    } else if attr_type == oid(OID_LOCAL_KEY_ID)
                        && attributes.local_key_id.is_none()
                    {
                        attributes.local_key_id = Some(r.read_bytes()?);
                    } else {
                        r.read_der()?;
                    }
                    Ok(())
                })
            })
        })
    })?;
    Ok(attributes)
}

fn parse_encryption_scheme(r: BERReader) -> ASN1Result<EncryptionScheme> {
    r.read_sequence(|r| {
        let scheme_oid = r.next().read_oid()?;

        if scheme_oid == oid(OID_PBE_SHA1_3DES) {
            r.next().read_sequence(|r| {
                let salt = r.next().read_bytes()?;
                let iterations = read_iterations(r.next())?;
                Ok(EncryptionScheme::PbeSha1And3Des { salt, iterations })
            })
        } else if scheme_oid == oid(OID_PBES2) {
            r.next().read_sequence(|r| parse_pbes2_params(r))
        } else {
            skip_rest(r)?;
            Ok(EncryptionScheme::Unsupported(scheme_oid.to_string()))
        }
    })
}

struct Pbkdf2Params {
    salt: Vec<u8>,
    iterations: u32,
    prf: std::result::Result<Prf, ObjectIdentifier>,
}

fn parse_pbes2_params(r: &mut BERReaderSeq<'_, '_>) -> ASN1Result<EncryptionScheme> {
    let kdf = r.next().read_sequence(|r| {
        let kdf_oid = r.next().read_oid()?;
        if kdf_oid != oid(OID_PBKDF2) {
            skip_rest(r)?;
            return Ok(Err(kdf_oid));
        }
        r.next().read_sequence(|r| {
            let salt = r.next().read_bytes()?;
            let iterations = read_iterations(r.next())?;

            // keyLength INTEGER OPTIONAL, prf AlgorithmIdentifier DEFAULT hmacWithSHA1
            let mut prf = Ok(Prf::HmacSha1);
            if let Some(next) = r.read_optional(|r| r.read_der())? {
                let prf_der = if next.first() == Some(&0x02) {
                    r.read_optional(|r| r.read_der())?
                } else {
                    Some(next)
                };
                if let Some(prf_der) = prf_der {
                    prf = parse_prf(&prf_der)?;
                }
            }
            Ok(Ok(Pbkdf2Params {
                salt,
                iterations,
                prf,
            }))
        })
    })?;

    let cipher = r.next().read_sequence(|r| {
        let cipher_oid = r.next().read_oid()?;
        match pbes2_cipher_from_oid(&cipher_oid) {
            Some(cipher) => {
                let iv = r.next().read_bytes()?;
                Ok(Ok((cipher, iv)))
            }
            None => {
                skip_rest(r)?;
                Ok(Err(cipher_oid))
            }
        }
    })?;

    let params = match kdf {
        Ok(params) => params,
        Err(kdf_oid) => return Ok(EncryptionScheme::Unsupported(kdf_oid.to_string())),
    };
    let prf = match params.prf {
        Ok(prf) => prf,
        Err(prf_oid) => return Ok(EncryptionScheme::Unsupported(prf_oid.to_string())),
    };
    let (cipher, iv) = match cipher {
        Ok(cipher) => cipher,
        Err(cipher_oid) => return Ok(EncryptionScheme::Unsupported(cipher_oid.to_string())),
    };

    Ok(EncryptionScheme::Pbes2 {
        salt: params.salt,
        iterations: params.iterations,
        prf,
        cipher,
        iv,
    })
}

fn parse_prf(der: &[u8]) -> ASN1Result<std::result::Result<Prf, ObjectIdentifier>> {
    yasna::parse_ber(der, |r| {
        r.read_sequence(|r| {
            let prf_oid = r.next().read_oid()?;
            skip_rest(r)?;
            Ok(prf_from_oid(&prf_oid).ok_or(prf_oid))
        })
    })
}

fn prf_from_oid(prf_oid: &ObjectIdentifier) -> Option<Prf> {
    if *prf_oid == oid(OID_HMAC_SHA1) {
        Some(Prf::HmacSha1)
    } else if *prf_oid == oid(OID_HMAC_SHA224) {
        Some(Prf::HmacSha224)
    } else if *prf_oid == oid(OID_HMAC_SHA256) {
        Some(Prf::HmacSha256)
    } else if *prf_oid == oid(OID_HMAC_SHA384) {
        Some(Prf::HmacSha384)
    } else if *prf_oid == oid(OID_HMAC_SHA512) {
        Some(Prf::HmacSha512)
    } else {
        None
    }
}

fn pbes2_cipher_from_oid(cipher_oid: &ObjectIdentifier) -> Option<Pbes2Cipher> {
    if *cipher_oid == oid(OID_AES_128_CBC) {
        Some(Pbes2Cipher::Aes128Cbc)
    } else if *cipher_oid == oid(OID_AES_192_CBC) {
        Some(Pbes2Cipher::Aes192Cbc)
    } else if *cipher_oid == oid(OID_AES_256_CBC) {
        Some(Pbes2Cipher::Aes256Cbc)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> Vec<u8> {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name);
        std::fs::read(path).unwrap()
    }

    fn counts(bags: &[SafeBag]) -> (usize, usize) {
        let keys = bags
            .iter()
            .filter(|b| matches!(b, SafeBag::Key { .. }))
            .count();
        let certs = bags
            .iter()
            .filter(|b| matches!(b, SafeBag::Cert { .. }))
            .count();
        (keys, certs)
    }

    #[test]
    fn pbes2_container_keeps_key_shrouded() {
        let bags = decode_pfx(&fixture("client.p12"), "changeit").unwrap();
        assert_eq!(counts(&bags), (1, 2));

        let key = bags
            .iter()
            .find_map(|b| match b {
                SafeBag::Key {
                    material,
                    attributes,
                } => Some((material, attributes)),
                _ => None,
            })
            .unwrap();
        assert!(matches!(
            key.0,
            KeyMaterial::Shrouded {
                scheme: EncryptionScheme::Pbes2 {
                    cipher: Pbes2Cipher::Aes256Cbc,
                    prf: Prf::HmacSha256,
                    ..
                },
                ..
            }
        ));
        assert_eq!(key.1.friendly_name.as_deref(), Some("test-client"));
        assert!(key.1.local_key_id.is_some());
    }

    #[test]
    fn legacy_3des_container_decodes() {
        let bags = decode_pfx(&fixture("client-3des.p12"), "changeit").unwrap();
        let (keys, certs) = counts(&bags);
        assert_eq!(keys, 1);
        assert!(certs >= 1);
    }

    #[test]
    fn wrong_password_fails_mac() {
        let err = decode_pfx(&fixture("client.p12"), "wrong").unwrap_err();
        assert!(err.is_bad_passphrase());
    }

    #[test]
    fn rc2_contents_are_unsupported() {
        let err = decode_pfx(&fixture("client-rc2.p12"), "changeit").unwrap_err();
        assert!(err.is_unsupported());
        assert!(err.to_string().contains("1.2.840.113549.1.12.1.6"));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = decode_pfx(b"definitely not BER", "changeit").unwrap_err();
        assert!(err.is_malformed());
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.is::<ASN1Error>());
    }

    #[test]
    fn attributes_parse_bmp_friendly_name() {
        // SET OF { SEQUENCE { friendlyName, SET { BMPString "ab" } } }
        let der = yasna::construct_der(|w| {
            w.write_sequence(|w| {
                w.next().write_set_of(|w| {
                    w.next().write_sequence(|w| {
                        w.next().write_oid(&oid(OID_FRIENDLY_NAME));
                        w.next().write_set_of(|w| {
                            w.next().write_bmp_string("ab");
                        });
                    });
                });
            });
        });
        let attributes =
            yasna::parse_der(&der, |r| r.read_sequence(|r| parse_bag_attributes(r))).unwrap();
        assert_eq!(attributes.friendly_name.as_deref(), Some("ab"));
        assert_eq!(attributes.local_key_id, None);
    }

    #[test]
    fn iteration_counts_are_bounded() {
        let count = |n: u32| yasna::construct_der(|w| w.write_u32(n));
        assert_eq!(yasna::parse_der(&count(2048), read_iterations).unwrap(), 2048);
        assert!(yasna::parse_der(&count(0), read_iterations).is_err());
        assert!(yasna::parse_der(&count(u32::MAX), read_iterations).is_err());
    }
}
