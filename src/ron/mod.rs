//! Helpers for reading RON files from a directory and watching it for edits.
//!
//! The watcher flips a shared flag whenever a file under the watched
//! directory is modified. Systems poll that flag once per frame and reload,
//! which is how the tuning files under `data/settings` hot-reload.

use bevy::prelude::{warn, Resource};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Failure to turn one file into a value.
#[derive(Debug, Error)]
pub enum RonLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// File-watcher resource for RON hot-reload.
#[derive(Resource)]
pub struct RonWatcher {
    changed: Arc<AtomicBool>,
    _watcher: Option<RecommendedWatcher>, // kept alive so the OS watch stays registered
}

impl RonWatcher {
    /// A watcher with no OS backing. Used when the real watcher cannot be
    /// created; `take_changed` then always returns `false`.
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            changed: Arc::new(AtomicBool::new(false)),
            _watcher: None,
        }
    }

    /// Returns `true` once per batch of file modifications and clears the flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }
}

/// Read and deserialize a single RON file.
///
/// # Errors
/// Returns [`RonLoadError`] when the file cannot be read or parsed.
pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T, RonLoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| RonLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str::<T>(&content).map_err(|source| RonLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every `.ron` file in `path`, sorted by file name.
///
/// Files that fail to load are logged and skipped.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: &str) -> Vec<T> {
    let Ok(entries) = std::fs::read_dir(path) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    files
        .iter()
        .filter_map(|p| match load_ron_file::<T>(p) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("{e}");
                None
            }
        })
        .collect()
}

/// Create a `RonWatcher` for `path` (non-recursive).
///
/// # Errors
/// Returns a `notify::Error` if the OS watcher cannot be created or the
/// directory cannot be registered.
pub fn setup_ron_watcher(path: &str) -> Result<RonWatcher, notify::Error> {
    let changed = Arc::new(AtomicBool::new(false));
    let changed_clone = Arc::clone(&changed);
    let watched_path: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| PathBuf::from(path));

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, notify::EventKind::Modify(_)) {
                    return;
                }
                let relevant = event.paths.iter().any(|p| {
                    std::fs::canonicalize(p)
                        .unwrap_or_else(|_| p.clone())
                        .starts_with(&watched_path)
                });
                if relevant {
                    changed_clone.store(true, Ordering::Release);
                }
            }
            Err(e) => warn!("watch error: {e:?}"),
        },
        Config::default(),
    )?;

    watcher.watch(Path::new(path), RecursiveMode::NonRecursive)?;
    Ok(RonWatcher { changed, _watcher: Some(watcher) })
}
