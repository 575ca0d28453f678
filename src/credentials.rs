//! Access-credential strategy selection.
//!
//! Each command resolves its credentials exactly once, up front, into an
//! inspectable [`CredentialProvider`] value that is passed down to the
//! components that need it. `install` resolves a second provider for the
//! install target when `--install-profile` is given, supporting topologies
//! where keys are held under one identity and certificates are deployed
//! under another.

use std::path::PathBuf;

use crate::configs::AppConfig;

pub const PROFILE_ENV: &str = "CERTKEEPER_PROFILE";
pub const REGION_ENV: &str = "CERTKEEPER_REGION";

pub const DEFAULT_PROFILE: &str = "default";
pub const FALLBACK_REGION: &str = "global";

/// The resolved strategy: which profile, which region, and the concrete
/// locations that profile maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialProvider {
    pub profile: String,
    pub region: String,
    pub master_key_path: PathBuf,
    pub store_root: PathBuf,
}

/// Resolve a provider from an optional explicit profile and region.
///
/// Profile: explicit argument, then `CERTKEEPER_PROFILE`, then `"default"`.
/// Region: explicit argument, then `CERTKEEPER_REGION`, then `"global"`.
pub fn resolve(profile: Option<&str>, region: Option<&str>, config: &AppConfig) -> CredentialProvider {
    let profile = pick(profile, std::env::var(PROFILE_ENV).ok(), DEFAULT_PROFILE);
    let region = pick(region, std::env::var(REGION_ENV).ok(), FALLBACK_REGION);

    let section = config.profiles.get(&profile);
    let master_key_path = section
        .and_then(|p| p.master_key_path.clone())
        .unwrap_or_else(|| {
            config
                .keys
                .keys_dir
                .join(format!("{}.{}.pem", config.keys.master_key_alias, profile))
        });
    let store_root = section
        .and_then(|p| p.store_root.clone())
        .unwrap_or_else(|| config.store.store_root.clone());

    CredentialProvider {
        profile,
        region,
        master_key_path,
        store_root,
    }
}

fn pick(explicit: Option<&str>, ambient: Option<String>, fallback: &str) -> String {
    explicit
        .map(str::to_string)
        .or(ambient.filter(|v| !v.is_empty()))
        .unwrap_or_else(|| fallback.to_string())
}
