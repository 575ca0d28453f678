//! Error taxonomy for the certificate lifecycle.
//!
//! Every variant except the two upload-side conditions (which live in
//! [`crate::cert_store::UploadError`] and are caught by the `install`
//! command) is fatal and aborts the running command.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifecycleError {
    /// An encrypted private key already exists for the domain and `--force`
    /// was not given. Overwriting would orphan a key that may back an
    /// already-issued certificate.
    #[error("an encrypted private key for '{domain}' already exists; pass --force to replace it")]
    OverwriteGuard { domain: String },

    #[error("{what} not found")]
    NotFound { what: String },

    /// Authenticated decryption failed. The ciphertext was sealed under a
    /// different domain context, or has been tampered with.
    #[error("decryption refused for domain '{domain}': authentication failed (wrong domain context or corrupted ciphertext)")]
    Authorization { domain: String },

    #[error("key provider error: {0}")]
    CryptoProvider(String),

    /// The issued certificate's subject public key does not match the
    /// stored private key. Uploading would silently break TLS termination.
    #[error("certificate public key does not match the stored private key for '{domain}'")]
    Verification { domain: String },

    #[error("configuration error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OpenSSL error: {0}")]
    OpenSsl(#[from] openssl::error::ErrorStack),
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
