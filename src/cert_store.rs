//! Certificate store upload boundary.
//!
//! The store holds installed certificates under `<root>/<region>/<entry>/`,
//! one directory per entry with the private key, leaf certificate and trust
//! chain as separate PEM files. Upload failures have their own error type so
//! the `install` command can treat a quota breach as recoverable and
//! everything else as report-and-terminate, without aborting the process.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    /// The store refused the entry because the region is at capacity. The
    /// operator can remove stale entries and re-run `install`; the artifacts
    /// on disk are untouched.
    #[error("certificate store quota exceeded ({limit} entries); remove stale entries and retry")]
    QuotaExceeded { limit: u32 },

    #[error("upload failed: {0}")]
    Failed(String),
}

pub trait CertificateStore {
    /// Submit a complete entry. Returns the store identifier on success.
    fn upload(
        &self,
        entry_name: &str,
        private_key_pem: &[u8],
        certificate_pem: &[u8],
        chain_pem: &[u8],
    ) -> Result<String, UploadError>;
}

/// Directory-backed certificate store.
pub struct DirCertificateStore {
    root: PathBuf,
    region: String,
    max_entries: Option<u32>,
}

impl DirCertificateStore {
    pub fn new(root: &Path, region: &str, max_entries: Option<u32>) -> Self {
        Self {
            root: root.to_path_buf(),
            region: region.to_string(),
            max_entries,
        }
    }

    fn write_entry_file(dir: &Path, name: &str, content: &[u8]) -> Result<(), UploadError> {
        let path = dir.join(name);
        fs::write(&path, content)
            .map_err(|e| UploadError::Failed(format!("cannot write {}: {}", path.display(), e)))
    }
}

impl CertificateStore for DirCertificateStore {
    fn upload(
        &self,
        entry_name: &str,
        private_key_pem: &[u8],
        certificate_pem: &[u8],
        chain_pem: &[u8],
    ) -> Result<String, UploadError> {
        let region_dir = self.root.join(&self.region);
        fs::create_dir_all(&region_dir).map_err(|e| {
            UploadError::Failed(format!("cannot create {}: {}", region_dir.display(), e))
        })?;

        let entry_dir = region_dir.join(entry_name);

        // Re-installing an existing entry never counts against the quota.
        if let Some(limit) = self.max_entries {
            if !entry_dir.exists() {
                let existing = fs::read_dir(&region_dir)
                    .map_err(|e| UploadError::Failed(e.to_string()))?
                    .count() as u32;
                if existing >= limit {
                    return Err(UploadError::QuotaExceeded { limit });
                }
            }
        }

        fs::create_dir_all(&entry_dir).map_err(|e| {
            UploadError::Failed(format!("cannot create {}: {}", entry_dir.display(), e))
        })?;

        Self::write_entry_file(&entry_dir, "privkey.pem", private_key_pem)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(
                entry_dir.join("privkey.pem"),
                fs::Permissions::from_mode(0o600),
            )
            .map_err(|e| UploadError::Failed(e.to_string()))?;
        }
        Self::write_entry_file(&entry_dir, "cert.pem", certificate_pem)?;
        Self::write_entry_file(&entry_dir, "chain.pem", chain_pem)?;

        Ok(format!("{}/{}", self.region, entry_name))
    }
}
