//! Per-domain artifact persistence.
//!
//! Artifacts live as flat files under the configured keys directory, keyed by
//! `SafeName` plus kind: `<safeName>.csr` and `<safeName>.pkenc`. Writes go
//! through a temp file in the same directory and a rename, so a single
//! artifact is never observable half-written. The store itself overwrites
//! freely; the force-guard policy lives in the `create` command.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::{LifecycleError, Result};

/// The two artifact kinds produced by `create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Csr,
    EncryptedKey,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Csr => "csr",
            ArtifactKind::EncryptedKey => "pkenc",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ArtifactKind::Csr => "certificate signing request",
            ArtifactKind::EncryptedKey => "encrypted private key",
        }
    }
}

pub struct ArtifactStore {
    keys_dir: PathBuf,
}

impl ArtifactStore {
    /// Open the store rooted at `keys_dir`, creating the directory if needed.
    pub fn new(keys_dir: &Path) -> Result<Self> {
        fs::create_dir_all(keys_dir)?;
        Ok(Self {
            keys_dir: keys_dir.to_path_buf(),
        })
    }

    /// Filesystem location of an artifact, whether or not it exists yet.
    pub fn location(&self, safe_name: &str, kind: ArtifactKind) -> PathBuf {
        self.keys_dir
            .join(format!("{}.{}", safe_name, kind.extension()))
    }

    /// Write an artifact atomically and return its location.
    pub fn save(&self, content: &[u8], safe_name: &str, kind: ArtifactKind) -> Result<PathBuf> {
        let mut tmp = NamedTempFile::new_in(&self.keys_dir)?;
        tmp.write_all(content)?;

        // Key material gets owner-only permissions before it lands under its
        // final name.
        #[cfg(unix)]
        if kind == ArtifactKind::EncryptedKey {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        let path = self.location(safe_name, kind);
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(path)
    }

    pub fn exists(&self, safe_name: &str, kind: ArtifactKind) -> bool {
        self.location(safe_name, kind).exists()
    }

    pub fn read(&self, safe_name: &str, kind: ArtifactKind) -> Result<Vec<u8>> {
        let path = self.location(safe_name, kind);
        if !path.exists() {
            return Err(LifecycleError::NotFound {
                what: format!("{} for '{}'", kind.describe(), safe_name),
            });
        }
        Ok(fs::read(&path)?)
    }

    /// All safe names with an artifact of the given kind.
    pub fn list(&self, kind: ArtifactKind) -> Result<BTreeSet<String>> {
        let suffix = format!(".{}", kind.extension());
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.keys_dir)? {
            let entry = entry?;
            if let Some(file_name) = entry.file_name().to_str() {
                if let Some(name) = file_name.strip_suffix(&suffix) {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }

    pub fn delete(&self, safe_name: &str, kind: ArtifactKind) -> Result<()> {
        let path = self.location(safe_name, kind);
        if !path.exists() {
            return Err(LifecycleError::NotFound {
                what: format!("{} for '{}'", kind.describe(), safe_name),
            });
        }
        fs::remove_file(&path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_read_roundtrip() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        let path = store
            .save(b"csr body", "www.example.com", ArtifactKind::Csr)
            .unwrap();
        assert!(path.ends_with("www.example.com.csr"));
        assert!(store.exists("www.example.com", ArtifactKind::Csr));
        assert_eq!(
            store.read("www.example.com", ArtifactKind::Csr).unwrap(),
            b"csr body"
        );
    }

    #[test]
    fn read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        let err = store
            .read("absent.example.com", ArtifactKind::EncryptedKey)
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }

    #[test]
    fn list_separates_kinds() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        store.save(b"a", "a.example.com", ArtifactKind::Csr).unwrap();
        store
            .save(b"b", "b.example.com", ArtifactKind::EncryptedKey)
            .unwrap();

        let csrs = store.list(ArtifactKind::Csr).unwrap();
        let keys = store.list(ArtifactKind::EncryptedKey).unwrap();
        assert!(csrs.contains("a.example.com") && !csrs.contains("b.example.com"));
        assert!(keys.contains("b.example.com") && !keys.contains("a.example.com"));
    }

    #[test]
    fn delete_removes_only_target() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        store.save(b"a", "a.example.com", ArtifactKind::Csr).unwrap();
        store
            .save(b"a", "a.example.com", ArtifactKind::EncryptedKey)
            .unwrap();

        store.delete("a.example.com", ArtifactKind::Csr).unwrap();
        assert!(!store.exists("a.example.com", ArtifactKind::Csr));
        assert!(store.exists("a.example.com", ArtifactKind::EncryptedKey));

        let err = store
            .delete("a.example.com", ArtifactKind::Csr)
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }

    #[test]
    fn save_overwrites_in_place() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        store
            .save(b"first", "a.example.com", ArtifactKind::EncryptedKey)
            .unwrap();
        store
            .save(b"second", "a.example.com", ArtifactKind::EncryptedKey)
            .unwrap();
        assert_eq!(
            store
                .read("a.example.com", ArtifactKind::EncryptedKey)
                .unwrap(),
            b"second"
        );
    }
}
