use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use knime_rust::install::{self, DEFAULT_VERSION, SUPPORTED_VERSIONS};

#[derive(Parser)]
#[command(author, version, about = "Installs KNIME and the RetroPath2.0 plugins")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Downloads the archives from Zenodo, then installs them.
    Online {
        /// Path to install Knime
        #[arg(long)]
        kinstall: PathBuf,

        #[arg(long, default_value = DEFAULT_VERSION, value_parser = clap::builder::PossibleValuesParser::new(SUPPORTED_VERSIONS))]
        kver: String,
    },
    /// Installs from a Zenodo "Download all" zip.
    Local {
        /// Path to install Knime
        #[arg(long)]
        kinstall: PathBuf,

        /// Zenodo file obtained from the "Download all" button (7515771.zip, 7564938.zip)
        #[arg(long)]
        zenodo_zip: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || run(cli))
}

fn run(cli: Cli) -> Result<()> {
    let knime = match cli.command {
        Commands::Online { kinstall, kver } => install::install_online(&kinstall, &kver)
            .with_context(|| format!("Installing KNIME {} into {:?}", kver, kinstall))?,
        Commands::Local { kinstall, zenodo_zip } => install::install_local(&kinstall, &zenodo_zip)
            .with_context(|| format!("Installing {:?} into {:?}", zenodo_zip, kinstall))?,
    };

    println!("{}", knime);
    Ok(())
}
