//! Trust chain construction.
//!
//! The operator may hand `install` a chain file, which is used verbatim.
//! Otherwise the chain is derived from the leaf: issuer links are walked
//! through the configured CA bundle, verifying each signature, until a
//! self-signed root terminates the path.

use std::fs;
use std::path::Path;

use openssl::x509::{X509Ref, X509VerifyResult, X509};

use crate::errors::{LifecycleError, Result};

const MAX_CHAIN_DEPTH: usize = 16;

/// Read an operator-supplied chain file verbatim.
pub fn chain_from_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(LifecycleError::NotFound {
            what: format!("chain file {}", path.display()),
        });
    }
    Ok(fs::read(path)?)
}

/// Derive the issuer chain for `leaf` from the CA bundle at `bundle_path`.
///
/// Returns the issuers leaf-first (intermediate before root). A self-signed
/// leaf has an empty chain. A missing issuer is fatal: installing a
/// certificate without its trust path would produce a store entry clients
/// cannot validate.
pub fn resolve_chain(leaf: &X509Ref, bundle_path: &Path) -> Result<Vec<X509>> {
    if leaf.issued(leaf) == X509VerifyResult::OK {
        return Ok(Vec::new());
    }

    if !bundle_path.exists() {
        return Err(LifecycleError::NotFound {
            what: format!("CA bundle {}", bundle_path.display()),
        });
    }
    let candidates = X509::stack_from_pem(&fs::read(bundle_path)?)?;

    let mut chain: Vec<X509> = Vec::new();
    let mut current = leaf.to_owned();
    while current.issued(&current) != X509VerifyResult::OK {
        if chain.len() >= MAX_CHAIN_DEPTH {
            return Err(LifecycleError::CryptoProvider(format!(
                "issuer chain exceeds {} certificates; bundle may contain a cycle",
                MAX_CHAIN_DEPTH
            )));
        }

        let issuer = candidates
            .iter()
            .find(|candidate| {
                candidate.issued(&current) == X509VerifyResult::OK
                    && candidate
                        .public_key()
                        .and_then(|key| current.verify(&key))
                        .unwrap_or(false)
            })
            .ok_or_else(|| LifecycleError::NotFound {
                what: format!(
                    "issuer certificate for '{}' in CA bundle",
                    subject_cn(&current)
                ),
            })?;

        chain.push(issuer.clone());
        current = issuer.clone();
    }

    Ok(chain)
}

fn subject_cn(cert: &X509Ref) -> String {
    cert.subject_name()
        .entries_by_nid(openssl::nid::Nid::COMMONNAME)
        .next()
        .and_then(|entry| entry.data().as_utf8().ok())
        .map(|data| data.to_string())
        .unwrap_or_else(|| "<no common name>".to_string())
}

/// Concatenate a derived chain into a single PEM document.
pub fn serialize_chain(chain: &[X509]) -> Result<Vec<u8>> {
    let mut pem = Vec::new();
    for cert in chain {
        pem.extend_from_slice(&cert.to_pem()?);
    }
    Ok(pem)
}
