//! Every setup failure surfaces as one ConfigurationError with its cause attached

mod common;

use std::error::Error as _;

use common::{PASSWORD, fixture, init_tracing, test_config};
use mtls_setup_client::error::MissingCertificate;
use mtls_setup_client::prelude::*;

#[test]
fn missing_keystore_is_not_found() {
    init_tracing();
    let err = setup_client_tls_with(&test_config("does-not-exist.p12")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.is_not_found());
    assert!(err.source().is_some());
}

#[test]
fn wrong_passphrase_is_rejected() {
    init_tracing();
    let mut config = test_config("client.p12");
    config.keystore.password = Passphrase::from("not-the-password");
    let err = setup_client_tls_with(&config).unwrap_err();
    assert!(err.is_bad_passphrase());
    assert!(!err.is_not_found());
}

#[test]
fn wrong_passphrase_on_legacy_store() {
    init_tracing();
    let mut config = test_config("client-3des.p12");
    config.keystore.password = Passphrase::from("wrong");
    let err = setup_client_tls_with(&config).unwrap_err();
    assert!(err.is_bad_passphrase());
}

#[test]
fn empty_passphrase_is_invalid_input() {
    init_tracing();
    let err = setup_client_tls(fixture("client.p12"), "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn text_file_is_malformed() {
    init_tracing();
    let err = setup_client_tls_with(&test_config("not-pkcs12.p12")).unwrap_err();
    assert!(err.is_malformed());
    assert!(err.source().is_some());
}

#[test]
fn rc2_encryption_is_unsupported() {
    init_tracing();
    let err = setup_client_tls_with(&test_config("client-rc2.p12")).unwrap_err();
    assert!(err.is_unsupported());
    assert!(err.to_string().contains("1.2.840.113549.1.12.1.6"));
}

#[test]
fn store_without_key_has_no_key_entry() {
    init_tracing();
    let err = setup_client_tls_with(&test_config("certs-only.p12")).unwrap_err();
    assert!(err.is_no_key_entry());
}

#[test]
fn key_without_certificate_has_no_key_entry() {
    init_tracing();
    let err = setup_client_tls_with(&test_config("key-only.p12")).unwrap_err();
    assert!(err.is_no_key_entry());
    let source = err.source().expect("missing certificate cause");
    assert!(source.is::<MissingCertificate>());
}

#[test]
fn missing_extra_root_file_fails_setup() {
    init_tracing();
    let mut config = test_config("client.p12");
    config.trust.extra_root_certificates = vec![fixture("no-such-ca.pem")];
    let err = setup_client_tls_with(&config).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn no_trust_anchors_is_a_tls_error() {
    init_tracing();
    let mut config = test_config("client.p12");
    config.trust.extra_root_certificates.clear();
    let err = setup_client_tls_with(&config).unwrap_err();
    assert!(err.is_tls());
}

#[test]
fn debug_output_never_contains_the_passphrase() {
    init_tracing();
    let config = test_config("client.p12");
    let rendered = format!("{config:?}");
    assert!(!rendered.contains(PASSWORD));
}
