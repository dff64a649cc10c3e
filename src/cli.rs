use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// kovl - Kubernetes overlay compiler
#[derive(Parser, Debug)]
#[command(name = "kovl")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Run 'kovl build <dir>' to resolve a kustomization root.")]
pub struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a kustomization root and emit the final manifest
    Build {
        /// Kustomization root (directory or kustomization file)
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Write the manifest to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve two roots and show what the second changes
    Diff {
        /// Old side (typically the base)
        left: PathBuf,

        /// New side (typically the overlay)
        right: PathBuf,
    },

    /// Rebuild continuously when files under the root change
    Watch {
        /// Kustomization root to watch
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Rewrite this file on each build (stdout otherwise)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve and list the document inventory (debugging)
    #[command(hide = true)]
    Parse {
        /// Kustomization root
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Show version information
    Version,
}
