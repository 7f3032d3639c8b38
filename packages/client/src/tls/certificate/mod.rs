//! Certificate parsing for keystore entries

pub mod parsing;

pub use parsing::{parse_certificate_from_der, warn_on_client_certificate_issues};
