use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use certkeeper::commands;
use certkeeper::commands::install::InstallArgs;
use certkeeper::configs::AppConfig;
use certkeeper::console::StdConsole;

#[derive(Parser)]
#[command(name = "certkeeper", version, about = "TLS certificate lifecycle management")]
struct Cli {
    /// Configuration file (defaults to ./certkeeper.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a keypair and CSR for a domain
    Create {
        /// Domain to request a certificate for, e.g. "*.example.com"
        domain: String,
        /// Credential profile to use
        #[arg(long)]
        profile: Option<String>,
        /// Replace an existing encrypted key for this domain
        #[arg(long)]
        force: bool,
        /// Target region
        #[arg(long)]
        region: Option<String>,
    },
    /// Install an issued certificate alongside its stored private key
    Install {
        /// PEM file containing the issued certificate
        cert_file: PathBuf,
        /// Trust chain PEM file; derived from the CA bundle if omitted
        #[arg(long)]
        chain: Option<PathBuf>,
        /// Profile holding the master key
        #[arg(long)]
        key_profile: Option<String>,
        /// Profile for the certificate store, when it differs from the key profile
        #[arg(long)]
        install_profile: Option<String>,
        /// Target region
        #[arg(long)]
        region: Option<String>,
    },
    /// List domains with local artifacts
    List,
    /// Delete a domain's local artifacts after installation
    Tidy {
        /// Domain whose artifacts should be removed
        domain: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("cannot load configuration from {}", path.display()))?,
        None => AppConfig::load().context("cannot load configuration")?,
    };

    let mut console = StdConsole;

    match &cli.command {
        Commands::Create {
            domain,
            profile,
            force,
            region,
        } => commands::create::run(
            &config,
            &mut console,
            domain,
            profile.as_deref(),
            region.as_deref(),
            *force,
        )?,
        Commands::Install {
            cert_file,
            chain,
            key_profile,
            install_profile,
            region,
        } => commands::install::run(
            &config,
            &mut console,
            &InstallArgs {
                cert_file,
                chain_file: chain.as_deref(),
                key_profile: key_profile.as_deref(),
                install_profile: install_profile.as_deref(),
                region: region.as_deref(),
            },
        )?,
        Commands::List => commands::list::run(&config, &mut console)?,
        Commands::Tidy { domain } => commands::tidy::run(&config, &mut console, domain)?,
    }

    Ok(())
}
