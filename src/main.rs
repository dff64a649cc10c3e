//! kovl CLI - Kubernetes overlay compiler
//!
//! Usage: kovl <COMMAND>
//!
//! Commands:
//!   build   Resolve a kustomization root and emit the final manifest
//!   diff    Resolve two roots and show what the second changes
//!   watch   Rebuild continuously when files under the root change

use anyhow::Result;
use clap::Parser;

use kovl::cli::{Cli, Commands};
use kovl::commands::{build, diff, parse, watch};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { root, output } => {
            build::run(&build::BuildOptions {
                root,
                output,
                json: cli.json,
                verbose: cli.verbose,
            })?;
        }
        // diff follows the classic exit convention: 0 = same, 1 = differ,
        // 2 = trouble
        Commands::Diff { left, right } => {
            match diff::run(&diff::DiffOptions {
                left,
                right,
                json: cli.json,
            }) {
                Ok(true) => std::process::exit(1),
                Ok(false) => {}
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(2);
                }
            }
        }
        Commands::Watch { root, output } => {
            watch::run(&watch::WatchCmdOptions {
                root,
                output,
                json: cli.json,
            })?;
        }
        Commands::Parse { root } => {
            parse::run(&parse::ParseOptions {
                root,
                json: cli.json,
            })?;
        }
        Commands::Version => {
            if cli.json {
                println!(
                    r#"{{"name":"{}","version":"{}"}}"#,
                    env!("CARGO_PKG_NAME"),
                    env!("CARGO_PKG_VERSION")
                );
            } else {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            }
        }
    }

    Ok(())
}
