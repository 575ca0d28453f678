//! `list`: enumerate every domain with local artifacts.

use std::collections::BTreeMap;

use crate::artifact_store::{ArtifactKind, ArtifactStore};
use crate::configs::AppConfig;
use crate::console::Console;
use crate::errors::Result;

pub fn run(config: &AppConfig, console: &mut dyn Console) -> Result<()> {
    let store = ArtifactStore::new(&config.keys.keys_dir)?;
    let entries = collect(&store)?;

    if entries.is_empty() {
        console.status("No artifacts found.");
        return Ok(());
    }

    for (name, kinds) in entries {
        console.emit(&format!("{} [{}]", name, kinds.join(", ")));
    }
    Ok(())
}

/// Union of both artifact kinds, each safe name listed once.
fn collect(store: &ArtifactStore) -> Result<BTreeMap<String, Vec<&'static str>>> {
    let mut entries: BTreeMap<String, Vec<&'static str>> = BTreeMap::new();
    for kind in [ArtifactKind::Csr, ArtifactKind::EncryptedKey] {
        for name in store.list(kind)? {
            entries.entry(name).or_default().push(kind.describe());
        }
    }
    Ok(entries)
}
