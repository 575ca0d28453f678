//! `create`: generate a keypair and CSR for a domain.
//!
//! The private key never touches disk in the clear. It is envelope-encrypted
//! under the master key with the domain as the authenticated context before
//! either artifact is written, and the encrypted key lands before the CSR so
//! an interrupted run never leaves a CSR without its key.

use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::{X509NameBuilder, X509ReqBuilder};

use crate::artifact_store::{ArtifactKind, ArtifactStore};
use crate::configs::AppConfig;
use crate::console::Console;
use crate::credentials;
use crate::domain::safe_name;
use crate::envelope::EnvelopeCrypto;
use crate::errors::{LifecycleError, Result};

const LEAF_KEY_BITS: u32 = 2048;

pub fn run(
    config: &AppConfig,
    console: &mut dyn Console,
    domain: &str,
    profile: Option<&str>,
    region: Option<&str>,
    force: bool,
) -> Result<()> {
    let safe = safe_name(domain);
    let store = ArtifactStore::new(&config.keys.keys_dir)?;

    if !force && store.exists(&safe, ArtifactKind::EncryptedKey) {
        return Err(LifecycleError::OverwriteGuard {
            domain: domain.to_string(),
        });
    }

    let provider = credentials::resolve(profile, region, config);
    console.status(&format!(
        "Profile '{}', region '{}'",
        provider.profile, provider.region
    ));

    if !provider.master_key_path.exists() {
        console.status(&format!(
            "No master key at {}; generating one",
            provider.master_key_path.display()
        ));
    }
    let envelope = EnvelopeCrypto::open(&config.keys.master_key_alias, &provider.master_key_path)?;
    console.status(&format!(
        "Using master key {}",
        envelope.resolve_key_alias()?
    ));

    let key = PKey::from_rsa(Rsa::generate(LEAF_KEY_BITS)?)?;
    let csr_pem = build_csr(domain, &key)?;

    let key_pem = key.private_key_to_pem_pkcs8()?;
    let encrypted = envelope.encrypt(&key_pem, domain)?;

    let key_path = store.save(&encrypted, &safe, ArtifactKind::EncryptedKey)?;
    console.status(&format!("✓ Encrypted private key: {}", key_path.display()));
    let csr_path = store.save(&csr_pem, &safe, ArtifactKind::Csr)?;
    console.status(&format!("✓ Signing request: {}", csr_path.display()));

    console.emit(String::from_utf8_lossy(&csr_pem).trim_end());
    Ok(())
}

fn build_csr(domain: &str, key: &PKey<Private>) -> Result<Vec<u8>> {
    let mut name = X509NameBuilder::new()?;
    name.append_entry_by_text("CN", domain)?;
    let name = name.build();

    let mut builder = X509ReqBuilder::new()?;
    builder.set_version(0)?;
    builder.set_subject_name(&name)?;
    builder.set_pubkey(key)?;
    builder.sign(key, MessageDigest::sha256())?;

    Ok(builder.build().to_pem()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::test_support::ScriptedConsole;
    use openssl::x509::X509Req;
    use tempfile::tempdir;

    fn test_config(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.keys.keys_dir = dir.join("keys");
        config.store.store_root = dir.join("store");
        config.chain.ca_bundle_path = dir.join("ca-bundle.pem");
        config
    }

    #[test]
    fn create_emits_csr_and_persists_artifacts() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let mut console = ScriptedConsole::new(vec![]);

        run(
            &config,
            &mut console,
            "*.example.com",
            None,
            Some("global"),
            false,
        )
        .unwrap();

        // Primary output is exactly the CSR.
        assert_eq!(console.emitted.len(), 1);
        let req = X509Req::from_pem(console.emitted[0].as_bytes()).unwrap();
        let cn = req
            .subject_name()
            .entries()
            .next()
            .unwrap()
            .data()
            .as_utf8()
            .unwrap()
            .to_string();
        assert_eq!(cn, "*.example.com");

        let store = ArtifactStore::new(&config.keys.keys_dir).unwrap();
        assert!(store.exists("star.example.com", ArtifactKind::Csr));
        assert!(store.exists("star.example.com", ArtifactKind::EncryptedKey));
    }

    #[test]
    fn second_create_without_force_is_guarded() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let mut console = ScriptedConsole::new(vec![]);

        run(&config, &mut console, "www.example.com", None, Some("global"), false).unwrap();
        let err = run(&config, &mut console, "www.example.com", None, Some("global"), false)
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::OverwriteGuard { domain } if domain == "www.example.com"
        ));
    }

    #[test]
    fn force_replaces_the_key_material() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let mut console = ScriptedConsole::new(vec![]);

        run(&config, &mut console, "www.example.com", None, Some("global"), false).unwrap();
        let store = ArtifactStore::new(&config.keys.keys_dir).unwrap();
        let first = store
            .read("www.example.com", ArtifactKind::EncryptedKey)
            .unwrap();

        run(&config, &mut console, "www.example.com", None, Some("global"), true).unwrap();
        let second = store
            .read("www.example.com", ArtifactKind::EncryptedKey)
            .unwrap();
        assert_ne!(first, second);
    }
}
