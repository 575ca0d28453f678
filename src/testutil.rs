//! Shared test fixtures: keypairs and certificates with a fixed expiry so
//! derived entry names are deterministic.

use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::BasicConstraints;
use openssl::x509::{X509NameBuilder, X509};

/// 2100-01-01T00:00:00Z.
pub const EXPIRY_2100: i64 = 4_102_444_800;

pub fn keypair() -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
}

pub fn make_cert(
    cn: &str,
    key: &PKey<Private>,
    issuer: Option<(&X509, &PKey<Private>)>,
    ca: bool,
    not_after_unix: i64,
) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", cn).unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();

    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
    builder
        .set_serial_number(&serial.to_asn1_integer().unwrap())
        .unwrap();

    builder.set_subject_name(&name).unwrap();
    builder.set_pubkey(key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::from_unix(not_after_unix).unwrap())
        .unwrap();

    if ca {
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
    }

    match issuer {
        Some((issuer_cert, issuer_key)) => {
            builder
                .set_issuer_name(issuer_cert.subject_name())
                .unwrap();
            builder.sign(issuer_key, MessageDigest::sha256()).unwrap();
        }
        None => {
            builder.set_issuer_name(&name).unwrap();
            builder.sign(key, MessageDigest::sha256()).unwrap();
        }
    }

    builder.build()
}

pub fn self_signed(cn: &str, key: &PKey<Private>) -> X509 {
    make_cert(cn, key, None, false, EXPIRY_2100)
}

/// CA certificate plus its key; self-signed root when `issuer` is `None`.
pub fn ca(cn: &str, issuer: Option<(&X509, &PKey<Private>)>) -> (PKey<Private>, X509) {
    let key = keypair();
    let cert = make_cert(cn, &key, issuer, true, EXPIRY_2100);
    (key, cert)
}

pub fn issued(cn: &str, key: &PKey<Private>, issuer: &X509, issuer_key: &PKey<Private>) -> X509 {
    make_cert(cn, key, Some((issuer, issuer_key)), false, EXPIRY_2100)
}
