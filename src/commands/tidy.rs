//! `tidy`: delete a domain's local artifacts after the certificate is
//! installed.
//!
//! Deletion is irreversible, so the command lists exactly what it is about to
//! remove and requires an explicit confirmation. Whether the certificate was
//! actually installed cannot be checked from here; that judgement stays with
//! the operator.

use crate::artifact_store::{ArtifactKind, ArtifactStore};
use crate::configs::AppConfig;
use crate::console::Console;
use crate::domain::safe_name;
use crate::errors::Result;

pub fn run(config: &AppConfig, console: &mut dyn Console, domain: &str) -> Result<()> {
    let safe = safe_name(domain);
    let store = ArtifactStore::new(&config.keys.keys_dir)?;

    let targets: Vec<ArtifactKind> = [ArtifactKind::Csr, ArtifactKind::EncryptedKey]
        .into_iter()
        .filter(|kind| store.exists(&safe, *kind))
        .collect();

    if targets.is_empty() {
        console.status(&format!("Nothing to tidy for '{}'", domain));
        return Ok(());
    }

    for kind in &targets {
        console.status(&format!(
            "  {} ({})",
            store.location(&safe, *kind).display(),
            kind.describe()
        ));
    }
    console.status("Deleting these removes the only copy of the private key.");
    console.status("Make sure the certificate is installed and serving first.");

    if !console.confirm(&format!(
        "Delete {} artifact(s) for '{}'?",
        targets.len(),
        domain
    ))? {
        console.status("Aborted; nothing deleted.");
        return Ok(());
    }

    for kind in targets {
        store.delete(&safe, kind)?;
        console.status(&format!("✓ Deleted {}", store.location(&safe, kind).display()));
    }
    Ok(())
}
