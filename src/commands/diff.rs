//! `kovl diff` - resolve two kustomization roots and compare their output

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::diff::{diff_manifests, DiffResult, DiffTag};
use crate::emitter::emit;
use crate::error::KovlResult;
use crate::loader::FsSource;
use crate::resolver::Resolver;
use crate::ui::{colors, Console};

use super::{report_config_warnings, report_resolve_warnings};

/// Diff command options
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Old side (typically the base)
    pub left: PathBuf,
    /// New side (typically the overlay)
    pub right: PathBuf,
    /// Machine-readable output
    pub json: bool,
}

/// Returns whether the two builds differ, so the caller can set the exit
/// code the way `diff` does.
pub fn run(options: &DiffOptions) -> KovlResult<bool> {
    let (config, config_warnings) = Config::load_or_default(&options.left)?;
    let console = Console::new(config.output.color, config.output.unicode);
    report_config_warnings(&console, &config_warnings, options.json);

    let left = build_manifest(&config, &options.left, &console, options.json)?;
    let right = build_manifest(&config, &options.right, &console, options.json)?;

    let result = diff_manifests(&left, &right);

    if options.json {
        println!(
            r#"{{"additions":{},"deletions":{},"has_changes":{}}}"#,
            result.additions, result.deletions, result.has_changes
        );
    } else {
        render(&console, &result);
    }

    Ok(result.has_changes)
}

fn build_manifest(
    config: &Config,
    root: &Path,
    console: &Console,
    json: bool,
) -> KovlResult<String> {
    let source = FsSource;
    let resolution = Resolver::new(&source)
        .with_legacy_bases(config.legacy_bases_mode())
        .with_max_depth(config.build.max_depth)
        .resolve(root)?;
    report_resolve_warnings(console, &resolution.warnings, json);
    emit(&resolution.set)
}

fn render(console: &Console, result: &DiffResult) {
    if !result.has_changes {
        console.info("no differences");
        return;
    }

    for line in &result.lines {
        match line.tag {
            DiffTag::Delete => {
                println!("{}", console.paint(colors::ERROR, &format!("-{}", line.content)));
            }
            DiffTag::Insert => {
                println!("{}", console.paint(colors::SUCCESS, &format!("+{}", line.content)));
            }
            DiffTag::Equal => {
                println!(" {}", line.content);
            }
        }
    }

    console.info(&result.summary());
}
