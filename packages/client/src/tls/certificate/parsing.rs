//! Certificate parsing and validity checks

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use x509_parser::certificate::X509Certificate;
use x509_parser::error::X509Error;
use x509_parser::prelude::FromDer;

use crate::error::{Result, constructors};
use crate::tls::types::ParsedCertificate;

/// Parse a DER certificate to extract the fields key pairing and chain building need
pub fn parse_certificate_from_der(der: &[u8]) -> Result<ParsedCertificate> {
    let (_, cert) = X509Certificate::from_der(der).map_err(|e| {
        let e = match e {
            x509_parser::nom::Err::Error(e) | x509_parser::nom::Err::Failure(e) => e,
            x509_parser::nom::Err::Incomplete(_) => X509Error::InvalidCertificate,
        };
        constructors::decode("X.509 certificate", e)
    })?;

    let client_auth_allowed = match cert.extended_key_usage() {
        Ok(Some(eku)) => eku.value.any || eku.value.client_auth,
        Ok(None) => true,
        Err(e) => return Err(constructors::decode("extended key usage extension", e)),
    };
    let digital_signature_allowed = match cert.key_usage() {
        Ok(Some(ku)) => ku.value.digital_signature(),
        Ok(None) => true,
        Err(e) => return Err(constructors::decode("key usage extension", e)),
    };

    let validity = cert.validity();

    Ok(ParsedCertificate {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        subject_der: cert.subject().as_raw().to_vec(),
        issuer_der: cert.issuer().as_raw().to_vec(),
        public_key_der: cert.public_key().raw.to_vec(),
        serial_number: hex::encode(cert.raw_serial()),
        not_before: system_time(validity.not_before.timestamp()),
        not_after: system_time(validity.not_after.timestamp()),
        is_ca: cert.is_ca(),
        client_auth_allowed,
        digital_signature_allowed,
    })
}

fn system_time(timestamp: i64) -> SystemTime {
    if timestamp >= 0 {
        UNIX_EPOCH + Duration::from_secs(timestamp.unsigned_abs())
    } else {
        UNIX_EPOCH - Duration::from_secs(timestamp.unsigned_abs())
    }
}

/// Log certificate problems the server is better placed to judge.
///
/// Nothing here is fatal: an expired or narrowly-scoped client certificate is
/// still presented, and the server decides.
pub fn warn_on_client_certificate_issues(alias: &str, parsed_cert: &ParsedCertificate) {
    let now = SystemTime::now();

    if now < parsed_cert.not_before {
        tracing::warn!(
            target: "mtls_setup::tls",
            alias,
            subject = %parsed_cert.subject,
            "Client certificate is not yet valid (not before: {:?})",
            parsed_cert.not_before
        );
    } else if now > parsed_cert.not_after {
        tracing::warn!(
            target: "mtls_setup::tls",
            alias,
            subject = %parsed_cert.subject,
            "Client certificate has expired (not after: {:?})",
            parsed_cert.not_after
        );
    } else if let Ok(remaining) = parsed_cert.not_after.duration_since(now) {
        if remaining.as_secs() < 30 * 24 * 3600 {
            tracing::warn!(
                target: "mtls_setup::tls",
                alias,
                "Client certificate expires soon: {} days remaining",
                remaining.as_secs() / (24 * 3600)
            );
        }
    }

    if !parsed_cert.client_auth_allowed {
        tracing::warn!(
            target: "mtls_setup::tls",
            alias,
            "Client certificate extended key usage does not include clientAuth"
        );
    }
    if !parsed_cert.digital_signature_allowed {
        tracing::warn!(
            target: "mtls_setup::tls",
            alias,
            "Client certificate key usage does not include digitalSignature"
        );
    }
    if parsed_cert.is_ca {
        tracing::warn!(
            target: "mtls_setup::tls",
            alias,
            "End-entity certificate is marked as CA"
        );
    }
}
