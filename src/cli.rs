use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "modlic",
    version,
    about = "License reconciliation for server mod distributions"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Project root holding servers/ and the license tables"
    )]
    pub root: PathBuf,
    #[arg(
        long,
        global = true,
        help = "Config file (defaults to <root>/modlic.toml when present)"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log filter; RUST_LOG takes precedence"
    )]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile, write attribution files, quarantine and persist.
    Check {
        /// Only process this distribution.
        server: Option<String>,
        #[arg(long, default_value_t = false)]
        no_quarantine: bool,
    },
    /// Same scan and audit without writing or moving anything.
    Audit {
        server: Option<String>,
        #[arg(long, default_value_t = false, help = "Exit 1 on unresolved or prohibited findings")]
        strict: bool,
    },
    /// Generate a link descriptor for one archive.
    Describe {
        archive: PathBuf,
        #[arg(long)]
        group: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}
