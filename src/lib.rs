//! certkeeper: single-operator TLS certificate lifecycle management.
//!
//! The lifecycle runs in four steps. `create` generates a keypair and CSR for
//! a domain, envelope-encrypting the private key under a master key with the
//! domain as authenticated context. The operator sends the CSR to a CA out of
//! band. `install` pairs the issued certificate with the stored key, refuses
//! to proceed unless the public keys match, derives the trust chain, and
//! places the complete entry in the certificate store. `list` shows what is
//! pending, and `tidy` removes the local artifacts once a certificate is
//! serving.
//!
//! The core invariant: a private key is never written to disk in the clear,
//! and its ciphertext only decrypts under the exact domain it was created
//! for.
//!
//! ```no_run
//! use certkeeper::configs::AppConfig;
//! use certkeeper::console::StdConsole;
//!
//! # fn main() -> certkeeper::errors::Result<()> {
//! let config = AppConfig::load()?;
//! let mut console = StdConsole;
//! certkeeper::commands::create::run(
//!     &config,
//!     &mut console,
//!     "*.example.com",
//!     None,
//!     None,
//!     false,
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod artifact_store;
pub mod cert_store;
pub mod chain;
pub mod commands;
pub mod configs;
pub mod console;
pub mod credentials;
pub mod domain;
pub mod envelope;
pub mod errors;

#[cfg(test)]
pub(crate) mod testutil;
