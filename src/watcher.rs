//! File watcher for continuous builds
//!
//! Implements the `watch` command with:
//! - Debouncing (100ms)
//! - Atomic output rewrites
//! - Graceful Ctrl+C shutdown
//! - NDJSON output for CI

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::Config;
use crate::emitter::emit;
use crate::error::{KovlError, KovlResult};
use crate::loader::FsSource;
use crate::resolver::Resolver;

/// Debounce duration in milliseconds
const DEBOUNCE_MS: u64 = 100;

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Kustomization root to build
    pub root: PathBuf,
    /// Where to write the built manifest; stdout when None
    pub output: Option<PathBuf>,
    /// Resolution settings
    pub config: Config,
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Started { root: String },
    FileChanged { path: String },
    BuildStarted,
    BuildComplete { resources: usize, warnings: usize },
    Error { message: String },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        match self {
            WatchEvent::Started { root } => {
                format!(r#"{{"event":"started","root":"{}"}}"#, root)
            }
            WatchEvent::FileChanged { path } => {
                format!(r#"{{"event":"file_changed","path":"{}"}}"#, path)
            }
            WatchEvent::BuildStarted => r#"{"event":"build_started"}"#.to_string(),
            WatchEvent::BuildComplete { resources, warnings } => {
                format!(
                    r#"{{"event":"build_complete","resources":{},"warnings":{}}}"#,
                    resources, warnings
                )
            }
            WatchEvent::Error { message } => {
                format!(
                    r#"{{"event":"error","message":"{}"}}"#,
                    message.replace('"', "\\\"")
                )
            }
            WatchEvent::Shutdown => r#"{"event":"shutdown"}"#.to_string(),
        }
    }
}

/// Watcher state for debouncing
struct WatcherState {
    pending_changes: HashSet<PathBuf>,
    last_change: Option<Instant>,
}

impl WatcherState {
    fn new() -> Self {
        Self {
            pending_changes: HashSet::new(),
            last_change: None,
        }
    }

    fn add_change(&mut self, path: PathBuf) {
        self.pending_changes.insert(path);
        self.last_change = Some(Instant::now());
    }

    fn should_build(&self) -> bool {
        if let Some(last) = self.last_change {
            !self.pending_changes.is_empty()
                && last.elapsed() >= Duration::from_millis(DEBOUNCE_MS)
        } else {
            false
        }
    }

    fn take_changes(&mut self) -> Vec<PathBuf> {
        let changes: Vec<_> = self.pending_changes.drain().collect();
        self.last_change = None;
        changes
    }
}

/// Start watching for file changes
pub fn watch(
    options: WatchOptions,
    running: Arc<AtomicBool>,
    event_callback: impl Fn(WatchEvent),
) -> KovlResult<()> {
    event_callback(WatchEvent::Started {
        root: options.root.display().to_string(),
    });

    // Initial build; errors here are fatal since the root itself is bad
    do_build(&options, &event_callback)?;

    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        },
        NotifyConfig::default(),
    )
    .map_err(|e| KovlError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;

    watcher
        .watch(&options.root, RecursiveMode::Recursive)
        .map_err(|e| KovlError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;

    let output = options.output.clone();
    let mut state = WatcherState::new();

    while running.load(Ordering::SeqCst) {
        // Check for file changes (non-blocking with timeout)
        if let Ok(path) = rx.recv_timeout(Duration::from_millis(50)) {
            // Never rebuild in response to our own output rewrite
            let is_own_output = output
                .as_deref()
                .map(|out| path.ends_with(out) || path == out)
                .unwrap_or(false);
            if !is_own_output {
                event_callback(WatchEvent::FileChanged {
                    path: path.display().to_string(),
                });
                state.add_change(path);
            }
        }

        if state.should_build() {
            let _changes = state.take_changes();
            // A broken intermediate state must not kill the watch loop
            if do_build(&options, &event_callback).is_err() {
                continue;
            }
        }
    }

    event_callback(WatchEvent::Shutdown);
    Ok(())
}

fn do_build(options: &WatchOptions, callback: &impl Fn(WatchEvent)) -> KovlResult<()> {
    callback(WatchEvent::BuildStarted);

    let result = match perform_build(options) {
        Ok(result) => result,
        Err(e) => {
            callback(WatchEvent::Error {
                message: e.to_string(),
            });
            return Err(e);
        }
    };

    callback(WatchEvent::BuildComplete {
        resources: result.resources,
        warnings: result.warnings,
    });

    Ok(())
}

struct BuildOutcome {
    resources: usize,
    warnings: usize,
}

fn perform_build(options: &WatchOptions) -> KovlResult<BuildOutcome> {
    let source = FsSource;
    let resolution = Resolver::new(&source)
        .with_legacy_bases(options.config.legacy_bases_mode())
        .with_max_depth(options.config.build.max_depth)
        .resolve(&options.root)?;

    let manifest = emit(&resolution.set)?;

    match &options.output {
        Some(path) => write_atomic(path, &manifest)?,
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(manifest.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(BuildOutcome {
        resources: resolution.set.len(),
        warnings: resolution.warnings.len(),
    })
}

/// Write via a temp file + rename so readers never see a half-written
/// manifest.
pub fn write_atomic(path: &std::path::Path, content: &str) -> KovlResult<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|e| KovlError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[test]
    fn test_watch_event_to_json_started() {
        let event = WatchEvent::Started {
            root: "overlays/prod".to_string(),
        };
        let json = event.to_json();
        assert!(json.contains("\"event\":\"started\""));
        assert!(json.contains("\"root\":\"overlays/prod\""));
    }

    #[test]
    fn test_watch_event_to_json_build_complete() {
        let event = WatchEvent::BuildComplete {
            resources: 4,
            warnings: 1,
        };
        let json = event.to_json();
        assert!(json.contains("\"event\":\"build_complete\""));
        assert!(json.contains("\"resources\":4"));
        assert!(json.contains("\"warnings\":1"));
    }

    #[test]
    fn test_watch_event_to_json_error_escapes_quotes() {
        let event = WatchEvent::Error {
            message: "bad \"field\"".to_string(),
        };
        let json = event.to_json();
        assert!(json.contains("\\\"field\\\""));
    }

    #[test]
    fn test_watcher_state_debouncing() {
        let mut state = WatcherState::new();

        assert!(!state.should_build());

        state.add_change(PathBuf::from("deployment.yaml"));
        assert!(!state.should_build());

        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 10));
        assert!(state.should_build());

        let changes = state.take_changes();
        assert_eq!(changes.len(), 1);
        assert!(!state.should_build());
    }

    #[test]
    fn test_watcher_state_coalesces_changes() {
        let mut state = WatcherState::new();
        state.add_change(PathBuf::from("a.yaml"));
        state.add_change(PathBuf::from("a.yaml"));
        state.add_change(PathBuf::from("b.yaml"));

        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 10));
        assert_eq!(state.take_changes().len(), 2);
    }

    #[test]
    fn test_write_atomic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        write_atomic(&path, "kind: Service\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "kind: Service\n");

        // Overwrites cleanly
        write_atomic(&path, "kind: ConfigMap\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "kind: ConfigMap\n");
    }

    #[test]
    fn test_watch_initial_build() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("base");
        fs::create_dir_all(&root).unwrap();
        fs::write(
            root.join("kustomization.yaml"),
            "resources:\n  - service.yaml\n",
        )
        .unwrap();
        fs::write(
            root.join("service.yaml"),
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n",
        )
        .unwrap();
        let out = dir.path().join("out.yaml");

        let options = WatchOptions {
            root: root.clone(),
            output: Some(out.clone()),
            config: Config::default(),
        };

        let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let events_clone = Arc::clone(&events);

        let running = Arc::new(AtomicBool::new(false)); // Stop immediately

        watch(options, running, |event| {
            events_clone.lock().unwrap().push(event.to_json());
        })
        .unwrap();

        let captured = events.lock().unwrap();
        assert!(captured[0].contains("started"));
        assert!(captured.iter().any(|e| e.contains("build_complete")));
        assert!(fs::read_to_string(&out).unwrap().contains("kind: Service"));
    }
}
