//! `kovl watch` - rebuild continuously on file changes

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{KovlError, KovlResult};
use crate::ui::Console;
use crate::watcher::{watch, WatchEvent, WatchOptions};

use super::report_config_warnings;

/// Watch command options
#[derive(Debug, Clone)]
pub struct WatchCmdOptions {
    /// Kustomization root to watch and rebuild
    pub root: PathBuf,
    /// Rewrite this file on each build; stdout when None
    pub output: Option<PathBuf>,
    /// NDJSON event stream
    pub json: bool,
}

pub fn run(options: &WatchCmdOptions) -> KovlResult<()> {
    let (config, config_warnings) = Config::load_or_default(&options.root)?;
    let console = Console::new(config.output.color, config.output.unicode);
    report_config_warnings(&console, &config_warnings, options.json);

    let running = Arc::new(AtomicBool::new(true));
    let running_handler = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_handler.store(false, Ordering::SeqCst);
    })
    .map_err(|e| {
        KovlError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            e.to_string(),
        ))
    })?;

    let json = options.json;
    let watch_options = WatchOptions {
        root: options.root.clone(),
        output: options.output.clone(),
        config,
    };

    watch(watch_options, running, move |event| {
        if json {
            println!("{}", event.to_json());
            return;
        }
        match event {
            WatchEvent::Started { root } => {
                console.info(&format!("watching {} (Ctrl+C to stop)", root));
            }
            WatchEvent::FileChanged { path } => {
                console.info(&format!("changed: {}", path));
            }
            WatchEvent::BuildStarted => {}
            WatchEvent::BuildComplete { resources, warnings } => {
                let mut message = format!("built {} resources", resources);
                if warnings > 0 {
                    message.push_str(&format!(" ({} warnings)", warnings));
                }
                console.success(&message);
            }
            WatchEvent::Error { message } => {
                console.error(&message);
            }
            WatchEvent::Shutdown => {
                console.info("stopped");
            }
        }
    })
}
