//! Domain identity and issued-certificate parsing.
//!
//! A domain string (possibly carrying a `*` wildcard) derives a `SafeName`
//! used as the storage key for all of its artifacts. The transform is pure,
//! total and one-way; collisions between distinct domains are assumed not to
//! occur in practice and are not actively prevented.

use chrono::DateTime;
use openssl::asn1::{Asn1Time, Asn1TimeRef};
use openssl::nid::Nid;
use openssl::x509::X509;

use crate::errors::{LifecycleError, Result};

/// Filesystem/identifier-safe rendering of a domain.
///
/// The wildcard glyph is replaced by the literal token `star`, so
/// `*.example.com` becomes `star.example.com`.
pub fn safe_name(domain: &str) -> String {
    domain.replace('*', "star")
}

/// Certificate-store entry name: `<safeName>-exp<ISO-date>`.
///
/// The expiry suffix keeps re-installations of the same domain with
/// different expiries distinct, and sorts stored entries by expiry.
pub fn store_entry_name(safe_name: &str, expiry_date: &str) -> String {
    format!("{}-exp{}", safe_name, expiry_date)
}

/// The fields `install` needs from an externally issued certificate.
pub struct ParsedCertificate {
    pub x509: X509,
    /// Subject common name, i.e. the domain the certificate was issued for.
    pub common_name: String,
    /// Expiry as an ISO calendar date (UTC), e.g. `2027-06-15`.
    pub expiry_date: String,
    /// Subject public key in DER form, compared byte-for-byte against the
    /// stored private key's public half.
    pub public_key_der: Vec<u8>,
}

impl ParsedCertificate {
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let x509 = X509::from_pem(pem)?;

        let common_name = x509
            .subject_name()
            .entries_by_nid(Nid::COMMONNAME)
            .next()
            .and_then(|entry| entry.data().as_utf8().ok())
            .map(|data| data.to_string())
            .ok_or_else(|| LifecycleError::NotFound {
                what: "subject common name in certificate".to_string(),
            })?;

        let expiry_date = iso_date(x509.not_after())?;
        let public_key_der = x509.public_key()?.public_key_to_der()?;

        Ok(Self {
            x509,
            common_name,
            expiry_date,
            public_key_der,
        })
    }
}

/// Render an ASN.1 time as a UTC calendar date.
fn iso_date(time: &Asn1TimeRef) -> Result<String> {
    let epoch = Asn1Time::from_unix(0)?;
    let diff = epoch.diff(time)?;
    let unix_secs = i64::from(diff.days) * 86_400 + i64::from(diff.secs);
    let when = DateTime::from_timestamp(unix_secs, 0).ok_or_else(|| {
        LifecycleError::CryptoProvider("certificate expiry is out of range".to_string())
    })?;
    Ok(when.format("%Y-%m-%d").to_string())
}
