//! Shared helpers for the integration tests
#![allow(dead_code)]

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use mtls_setup_client::ClientTlsConfig;
use rustls::RootCertStore;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{ServerConfig, SupportedProtocolVersion};
use yasna::Tag;
use yasna::models::ObjectIdentifier;

pub const PASSWORD: &str = "changeit";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Trust only the test CA, never the machine's store.
pub fn test_config(keystore: &str) -> ClientTlsConfig {
    let mut config = ClientTlsConfig::new(fixture(keystore), PASSWORD);
    config.trust.use_platform_roots = false;
    config.trust.webpki_fallback = false;
    config.trust.extra_root_certificates = vec![fixture("ca.pem")];
    config
}

pub fn ca_certificates() -> Vec<CertificateDer<'static>> {
    let mut reader = BufReader::new(File::open(fixture("ca.pem")).unwrap());
    rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// A server for `localhost` that requires a client certificate issued by the test CA.
pub fn server_config() -> Arc<ServerConfig> {
    server_config_with_versions(rustls::ALL_VERSIONS)
}

pub fn server_config_with_versions(
    versions: &[&'static SupportedProtocolVersion],
) -> Arc<ServerConfig> {
    let provider = provider();

    let mut roots = RootCertStore::empty();
    for cert in ca_certificates() {
        roots.add(cert).unwrap();
    }
    let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
        .build()
        .unwrap();

    let mut reader = BufReader::new(File::open(fixture("server.pem")).unwrap());
    let chain = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let mut reader = BufReader::new(File::open(fixture("server.key")).unwrap());
    let key: PrivateKeyDer<'static> = rustls_pemfile::private_key(&mut reader).unwrap().unwrap();

    let config = ServerConfig::builder_with_provider(provider)
        .with_protocol_versions(versions)
        .unwrap()
        .with_client_cert_verifier(verifier)
        .with_single_cert(chain, key)
        .unwrap();
    Arc::new(config)
}

/// DER of the first certificate in a PEM fixture.
pub fn pem_certificate(name: &str) -> Vec<u8> {
    let mut reader = BufReader::new(File::open(fixture(name)).unwrap());
    rustls_pemfile::certs(&mut reader)
        .next()
        .unwrap()
        .unwrap()
        .to_vec()
}

/// PKCS#8 DER of a PEM private key fixture.
pub fn pem_private_key(name: &str) -> Vec<u8> {
    let mut reader = BufReader::new(File::open(fixture(name)).unwrap());
    let key = rustls_pemfile::private_key(&mut reader).unwrap().unwrap();
    key.secret_der().to_vec()
}

const OID_DATA: &[u64] = &[1, 2, 840, 113549, 1, 7, 1];
const OID_KEY_BAG: &[u64] = &[1, 2, 840, 113549, 1, 12, 10, 1, 1];
const OID_CERT_BAG: &[u64] = &[1, 2, 840, 113549, 1, 12, 10, 1, 3];
const OID_X509_CERTIFICATE: &[u64] = &[1, 2, 840, 113549, 1, 9, 22, 1];
const OID_FRIENDLY_NAME: &[u64] = &[1, 2, 840, 113549, 1, 9, 20];
const OID_LOCAL_KEY_ID: &[u64] = &[1, 2, 840, 113549, 1, 9, 21];

enum BagValue {
    Key(Vec<u8>),
    Cert(Vec<u8>),
}

struct Bag {
    value: BagValue,
    friendly_name: Option<String>,
    local_key_id: Option<Vec<u8>>,
}

/// Unencrypted PKCS#12 container without a MAC, assembled bag by bag.
#[derive(Default)]
pub struct Pkcs12Builder {
    bags: Vec<Bag>,
}

impl Pkcs12Builder {
    pub fn key(mut self, pkcs8: Vec<u8>, friendly_name: Option<&str>, local_key_id: Option<&[u8]>) -> Self {
        self.bags.push(Bag {
            value: BagValue::Key(pkcs8),
            friendly_name: friendly_name.map(str::to_string),
            local_key_id: local_key_id.map(<[u8]>::to_vec),
        });
        self
    }

    pub fn cert(mut self, der: Vec<u8>, friendly_name: Option<&str>, local_key_id: Option<&[u8]>) -> Self {
        self.bags.push(Bag {
            value: BagValue::Cert(der),
            friendly_name: friendly_name.map(str::to_string),
            local_key_id: local_key_id.map(<[u8]>::to_vec),
        });
        self
    }

    pub fn to_der(&self) -> Vec<u8> {
        let oid = ObjectIdentifier::from_slice;

        let safe_contents = yasna::construct_der(|w| {
            w.write_sequence(|w| {
                for bag in &self.bags {
                    w.next().write_sequence(|w| match &bag.value {
                        BagValue::Key(pkcs8) => {
                            w.next().write_oid(&oid(OID_KEY_BAG));
                            w.next()
                                .write_tagged(Tag::context(0), |w| w.write_der(pkcs8));
                            write_attributes(w, bag);
                        }
                        BagValue::Cert(der) => {
                            w.next().write_oid(&oid(OID_CERT_BAG));
                            w.next().write_tagged(Tag::context(0), |w| {
                                w.write_sequence(|w| {
                                    w.next().write_oid(&oid(OID_X509_CERTIFICATE));
                                    w.next()
                                        .write_tagged(Tag::context(0), |w| w.write_bytes(der));
                                });
                            });
                            write_attributes(w, bag);
                        }
                    });
                }
            });
        });

        let auth_safe = yasna::construct_der(|w| {
            w.write_sequence(|w| {
                w.next().write_sequence(|w| {
                    w.next().write_oid(&oid(OID_DATA));
                    w.next()
                        .write_tagged(Tag::context(0), |w| w.write_bytes(&safe_contents));
                });
            });
        });

        yasna::construct_der(|w| {
            w.write_sequence(|w| {
                w.next().write_u32(3);
                w.next().write_sequence(|w| {
                    w.next().write_oid(&oid(OID_DATA));
                    w.next()
                        .write_tagged(Tag::context(0), |w| w.write_bytes(&auth_safe));
                });
            });
        })
    }
}

fn write_attributes(w: &mut yasna::DERWriterSeq<'_>, bag: &Bag) {
    if bag.friendly_name.is_none() && bag.local_key_id.is_none() {
        return;
    }
    let oid = ObjectIdentifier::from_slice;
    w.next().write_set_of(|w| {
        if let Some(name) = &bag.friendly_name {
            w.next().write_sequence(|w| {
                w.next().write_oid(&oid(OID_FRIENDLY_NAME));
                w.next().write_set_of(|w| w.next().write_bmp_string(name));
            });
        }
        if let Some(id) = &bag.local_key_id {
            w.next().write_sequence(|w| {
                w.next().write_oid(&oid(OID_LOCAL_KEY_ID));
                w.next().write_set_of(|w| w.next().write_bytes(id));
            });
        }
    });
}
