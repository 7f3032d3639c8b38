//! Security Configuration Module
//!
//! Protocol settings applied to the TLS client context.

use rustls::SupportedProtocolVersion;
use serde::Deserialize;

use super::validation::{Validate, ValidationError};

/// Lowest TLS version the context will negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsVersion {
    #[default]
    Tls12,
    Tls13,
}

impl TlsVersion {
    /// Versions rustls is allowed to negotiate, highest preference first.
    #[must_use]
    pub fn protocol_versions(self) -> &'static [&'static SupportedProtocolVersion] {
        static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];
        match self {
            TlsVersion::Tls12 => rustls::ALL_VERSIONS,
            TlsVersion::Tls13 => TLS13_ONLY,
        }
    }
}

/// Runtime security configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub min_tls_version: TlsVersion,
    /// ALPN identifiers offered to the server, in preference order
    pub alpn_protocols: Vec<String>,
    pub enable_sni: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            min_tls_version: TlsVersion::Tls12,
            alpn_protocols: Vec::new(),
            enable_sni: true,
        }
    }
}

impl SecurityConfig {
    /// TLS 1.3 only
    #[must_use]
    pub fn tls13_only() -> Self {
        Self {
            min_tls_version: TlsVersion::Tls13,
            ..Self::default()
        }
    }
}

impl Validate for SecurityConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (index, protocol) in self.alpn_protocols.iter().enumerate() {
            if protocol.is_empty() {
                return Err(ValidationError::EmptyAlpnProtocol { index });
            }
            if protocol.len() > 255 {
                return Err(ValidationError::AlpnProtocolTooLong {
                    index,
                    len: protocol.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_versions_deserialize_lowercase() {
        let v: TlsVersion = serde_json::from_str("\"tls13\"").unwrap();
        assert_eq!(v, TlsVersion::Tls13);
        assert_eq!(v.protocol_versions().len(), 1);
        assert!(serde_json::from_str::<TlsVersion>("\"ssl3\"").is_err());
        assert_eq!(TlsVersion::default().protocol_versions().len(), 2);
    }

    #[test]
    fn oversized_alpn_is_rejected() {
        let config = SecurityConfig {
            alpn_protocols: vec!["h2".to_string(), "x".repeat(256)],
            ..SecurityConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::AlpnProtocolTooLong { index: 1, len: 256 })
        ));
    }
}
