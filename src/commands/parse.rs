//! `kovl parse` - resolve and display the document inventory (debugging)

use std::path::PathBuf;

use crate::config::Config;
use crate::error::KovlResult;
use crate::loader::FsSource;
use crate::resolver::Resolver;
use crate::ui::Console;

use super::{report_config_warnings, report_resolve_warnings};

/// Parse command options
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub root: PathBuf,
    pub json: bool,
}

pub fn run(options: &ParseOptions) -> KovlResult<()> {
    let (config, config_warnings) = Config::load_or_default(&options.root)?;
    let console = Console::new(config.output.color, config.output.unicode);
    report_config_warnings(&console, &config_warnings, options.json);

    let source = FsSource;
    let resolution = Resolver::new(&source)
        .with_legacy_bases(config.legacy_bases_mode())
        .with_max_depth(config.build.max_depth)
        .resolve(&options.root)?;
    report_resolve_warnings(&console, &resolution.warnings, options.json);

    if options.json {
        let inventory: Vec<serde_json::Value> = resolution
            .set
            .iter()
            .map(|doc| {
                serde_json::json!({
                    "kind": doc.kind(),
                    "apiVersion": doc.api_version(),
                    "namespace": doc.namespace(),
                    "name": doc.name(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&inventory)?);
        return Ok(());
    }

    for doc in resolution.set.iter() {
        println!(
            "{:<30} {:<15} {}",
            doc.kind(),
            doc.namespace().unwrap_or("-"),
            doc.name()
        );
    }
    console.info(&format!("{} resources", resolution.set.len()));

    Ok(())
}
