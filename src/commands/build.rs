//! `kovl build` - resolve a kustomization root and emit the manifest

use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::emitter::emit;
use crate::error::KovlResult;
use crate::loader::FsSource;
use crate::resolver::Resolver;
use crate::ui::Console;
use crate::watcher::write_atomic;

use super::{report_config_warnings, report_resolve_warnings};

/// Build command options
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Kustomization root (directory or kustomization file)
    pub root: PathBuf,
    /// Write the manifest here instead of stdout
    pub output: Option<PathBuf>,
    /// Machine-readable warnings
    pub json: bool,
    /// Verbosity level
    pub verbose: u8,
}

pub fn run(options: &BuildOptions) -> KovlResult<()> {
    let (config, config_warnings) = Config::load_or_default(&options.root)?;
    let console = Console::new(config.output.color, config.output.unicode);
    report_config_warnings(&console, &config_warnings, options.json);

    let source = FsSource;
    let resolution = Resolver::new(&source)
        .with_legacy_bases(config.legacy_bases_mode())
        .with_max_depth(config.build.max_depth)
        .resolve(&options.root)?;
    report_resolve_warnings(&console, &resolution.warnings, options.json);

    let manifest = emit(&resolution.set)?;

    match &options.output {
        Some(path) => {
            write_atomic(path, &manifest)?;
            if options.json {
                eprintln!(
                    r#"{{"built":{},"output":"{}"}}"#,
                    resolution.set.len(),
                    path.display()
                );
            } else {
                console.success(&format!(
                    "built {} resources -> {}",
                    resolution.set.len(),
                    path.display()
                ));
            }
        }
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(manifest.as_bytes())?;
            stdout.flush()?;
            if options.verbose > 0 && !options.json {
                console.info(&format!("built {} resources", resolution.set.len()));
            }
        }
    }

    Ok(())
}
