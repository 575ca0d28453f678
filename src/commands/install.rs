//! `install`: pair an externally issued certificate with its stored private
//! key and place the complete entry in the certificate store.
//!
//! The public-key match is checked before anything is uploaded. A mismatch
//! aborts with nothing written: an entry whose certificate and key disagree
//! would break TLS termination for every client.

use std::path::Path;

use openssl::pkey::PKey;
use secrecy::ExposeSecret;

use crate::artifact_store::{ArtifactKind, ArtifactStore};
use crate::cert_store::{CertificateStore, DirCertificateStore, UploadError};
use crate::chain;
use crate::configs::AppConfig;
use crate::console::Console;
use crate::credentials;
use crate::domain::{safe_name, store_entry_name, ParsedCertificate};
use crate::envelope::EnvelopeCrypto;
use crate::errors::{LifecycleError, Result};

pub struct InstallArgs<'a> {
    pub cert_file: &'a Path,
    pub chain_file: Option<&'a Path>,
    pub key_profile: Option<&'a str>,
    pub install_profile: Option<&'a str>,
    pub region: Option<&'a str>,
}

pub fn run(config: &AppConfig, console: &mut dyn Console, args: &InstallArgs) -> Result<()> {
    if !args.cert_file.exists() {
        return Err(LifecycleError::NotFound {
            what: format!("certificate file {}", args.cert_file.display()),
        });
    }
    let cert_pem = std::fs::read(args.cert_file)?;
    let parsed = ParsedCertificate::from_pem(&cert_pem)?;
    let domain = parsed.common_name.clone();
    let safe = safe_name(&domain);

    console.status(&format!(
        "Certificate for '{}', expires {}",
        domain, parsed.expiry_date
    ));

    // Key access and install target may run under different identities.
    let key_provider = credentials::resolve(args.key_profile, args.region, config);
    let install_provider = match args.install_profile {
        Some(profile) => credentials::resolve(Some(profile), args.region, config),
        None => key_provider.clone(),
    };

    let store = ArtifactStore::new(&config.keys.keys_dir)?;
    let blob = store.read(&safe, ArtifactKind::EncryptedKey)?;
    let envelope =
        EnvelopeCrypto::open(&config.keys.master_key_alias, &key_provider.master_key_path)?;
    let key_pem = envelope.decrypt(&blob, &domain)?;
    let private_key = PKey::private_key_from_pem(key_pem.expose_secret())?;

    if private_key.public_key_to_der()? != parsed.public_key_der {
        return Err(LifecycleError::Verification { domain });
    }
    console.status("✓ Certificate matches the stored private key");

    let chain_pem = match args.chain_file {
        Some(path) => chain::chain_from_file(path)?,
        None => {
            let chain = chain::resolve_chain(&parsed.x509, &config.chain.ca_bundle_path)?;
            console.status(&format!("Derived a {}-certificate trust chain", chain.len()));
            chain::serialize_chain(&chain)?
        }
    };

    let entry_name = store_entry_name(&safe, &parsed.expiry_date);
    let cert_store = DirCertificateStore::new(
        &install_provider.store_root,
        &install_provider.region,
        config.store.max_entries,
    );

    match cert_store.upload(
        &entry_name,
        key_pem.expose_secret(),
        &cert_pem,
        &chain_pem,
    ) {
        Ok(id) => console.status(&format!("✓ Installed as {}", id)),
        Err(e @ UploadError::QuotaExceeded { .. }) => {
            console.status(&format!("✗ {}", e));
            console.status("The local artifacts are untouched; re-run install after freeing quota");
        }
        Err(e) => console.status(&format!("✗ {}", e)),
    }

    Ok(())
}
