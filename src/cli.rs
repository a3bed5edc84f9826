use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "djinn release installer and download endpoint")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Sub‑commands (install, serve, etc.)
    #[command(subcommand)]
    pub sub: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Install the latest djinn binary (default if no sub‑command)
    Install {
        /// Directory receiving `bin/` and `.tmp/` (default: next to this executable)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Install this version instead of the latest release
        #[arg(long = "release")]
        release: Option<String>,
    },
    /// Print the download URL for a desktop platform
    Resolve {
        /// mac-arm64, windows, linux-appimage or linux-deb
        #[arg(long)]
        platform: String,
    },
    /// Run the download redirect endpoint
    Serve {
        /// Address to listen on (host:port)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the effective configuration
    Config,
}
