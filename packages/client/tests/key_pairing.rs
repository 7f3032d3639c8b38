//! Pairing keys with certificates, and choosing among several identities

mod common;

use common::{PASSWORD, Pkcs12Builder, init_tracing, pem_certificate, pem_private_key};
use mtls_setup_client::{CredentialStore, Passphrase, derive_key_managers};
use rustls::SignatureScheme;
use rustls::client::ResolvesClientCert;
use x509_parser::prelude::{FromDer, X509Certificate};

const P256: &[SignatureScheme] = &[SignatureScheme::ECDSA_NISTP256_SHA256];

fn subject_der(pem_fixture: &str) -> Vec<u8> {
    let der = pem_certificate(pem_fixture);
    let (_, cert) = X509Certificate::from_der(&der).unwrap();
    cert.subject().as_raw().to_vec()
}

#[test]
fn mismatched_local_key_id_falls_back_to_public_key() {
    init_tracing();
    let password = Passphrase::from(PASSWORD);
    // The localKeyId points at the CA, whose public key is not the client's
    let der = Pkcs12Builder::default()
        .key(pem_private_key("serial-client.key"), Some("serial"), Some(&[7]))
        .cert(pem_certificate("ca.pem"), None, Some(&[7]))
        .cert(pem_certificate("serial-client.pem"), None, None)
        .cert(pem_certificate("serial-ca.pem"), None, None)
        .to_der();
    let store = CredentialStore::from_pkcs12_der(&der, &password).unwrap();

    let managers = derive_key_managers(&store, &password).unwrap();
    let manager = managers.get("serial").unwrap();
    assert!(manager.leaf().subject.contains("serial-client"));
    assert_eq!(manager.certificate_chain()[0].as_ref(), pem_certificate("serial-client.pem").as_slice());
    assert_eq!(manager.certificate_chain().len(), 2);
}

#[test]
fn key_without_local_key_id_pairs_by_public_key() {
    init_tracing();
    let password = Passphrase::from(PASSWORD);
    let der = Pkcs12Builder::default()
        .cert(pem_certificate("server.pem"), None, None)
        .key(pem_private_key("server.key"), None, None)
        .to_der();
    let store = CredentialStore::from_pkcs12_der(&der, &password).unwrap();
    assert_eq!(store.aliases(), vec!["entry-0"]);

    let managers = derive_key_managers(&store, &password).unwrap();
    assert!(managers.get("entry-0").unwrap().leaf().subject.contains("localhost"));
}

fn two_identities() -> Pkcs12Builder {
    Pkcs12Builder::default()
        .key(pem_private_key("server.key"), Some("test-root-id"), Some(&[1]))
        .cert(pem_certificate("server.pem"), None, Some(&[1]))
        .cert(pem_certificate("ca.pem"), None, None)
        .key(pem_private_key("serial-client.key"), Some("serial-root-id"), Some(&[2]))
        .cert(pem_certificate("serial-client.pem"), None, Some(&[2]))
        .cert(pem_certificate("serial-ca.pem"), None, None)
}

#[test]
fn server_ca_hint_selects_matching_identity() {
    init_tracing();
    let password = Passphrase::from(PASSWORD);
    let store = CredentialStore::from_pkcs12_der(&two_identities().to_der(), &password).unwrap();
    let managers = derive_key_managers(&store, &password).unwrap();
    assert_eq!(managers.aliases(), vec!["test-root-id", "serial-root-id"]);

    let serial_client = pem_certificate("serial-client.pem");
    let server_leaf = pem_certificate("server.pem");

    let serial_root = subject_der("serial-ca.pem");
    let chosen = managers.resolve(&[serial_root.as_slice()], P256).unwrap();
    assert_eq!(chosen.cert[0].as_ref(), serial_client.as_slice());

    // Hints without the outer SEQUENCE header match too
    let test_root = subject_der("ca.pem");
    let chosen = managers.resolve(&[&test_root[2..]], P256).unwrap();
    assert_eq!(chosen.cert[0].as_ref(), server_leaf.as_slice());
}

#[test]
fn first_usable_identity_without_matching_hint() {
    init_tracing();
    let password = Passphrase::from(PASSWORD);
    let store = CredentialStore::from_pkcs12_der(&two_identities().to_der(), &password).unwrap();
    let managers = derive_key_managers(&store, &password).unwrap();
    let server_leaf = pem_certificate("server.pem");

    let chosen = managers.resolve(&[], P256).unwrap();
    assert_eq!(chosen.cert[0].as_ref(), server_leaf.as_slice());

    let chosen = managers.resolve(&[b"unknown CA".as_slice()], P256).unwrap();
    assert_eq!(chosen.cert[0].as_ref(), server_leaf.as_slice());

    assert!(managers.resolve(&[], &[SignatureScheme::ED25519]).is_none());
}
