//! Settings loading and hot-reloading.
//!
//! Settings are loaded from RON files in the `data/settings` directory. If multiple
//! RON files are present, the first one (by file name) that parses is used. If no
//! RON files are found or none parses, default settings are used. Loaded values
//! always go through [`Settings::validated`].
use crate::ron_loader::{load_ron_files, setup_ron_watcher, RonWatcher};
use crate::settings::Settings;
use bevy::prelude::{info, warn, Res, ResMut, Resource};

/// Directory the game reads its settings from.
pub const SETTINGS_DIR: &str = "data/settings";

#[derive(Resource)]
pub struct SettingsWatcher {
    watcher: RonWatcher,
    dir: String,
}

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher { watcher: RonWatcher::stub(), dir: SETTINGS_DIR.to_string() }
    }
}

/// Load settings from `path` (directory).
#[must_use]
pub fn load_settings_from_dir(path: &str) -> Settings {
    let items: Vec<Settings> = load_ron_files(path);
    match items.into_iter().next() {
        Some(first) => first.validated(),
        None => {
            info!("no settings found in {path}, using defaults");
            Settings::defaults()
        }
    }
}

/// Create a watcher for the settings directory (hot-reload).
///
/// # Errors
/// Returns the underlying `notify::Error` when the directory cannot be watched.
pub fn setup_settings_watcher(path: &str) -> Result<SettingsWatcher, notify::Error> {
    setup_ron_watcher(path).map(|watcher| SettingsWatcher { watcher, dir: path.to_string() })
}

/// Why hot reload is off; logged once logging is up.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct WatchError(pub String);

/// A watcher for `path`, or a stub and the reason the real one failed.
#[must_use]
pub fn watcher_or_stub(path: &str) -> (SettingsWatcher, Option<WatchError>) {
    match setup_settings_watcher(path) {
        Ok(watcher) => (watcher, None),
        Err(e) => (SettingsWatcher::stub(), Some(WatchError(format!("cannot watch {path}: {e}")))),
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn report_watch_error(error: Option<Res<WatchError>>) {
    if let Some(error) = error {
        warn!("settings hot reload disabled: {}", error.0);
    }
}

/// Reload the `Settings` resource when a file in the watched directory changes.
///
/// Controllers pick the new values up through `Settings` change detection.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if watcher.watcher.take_changed() {
        info!("settings changed, reloading from {}", watcher.dir);
        *settings = load_settings_from_dir(&watcher.dir);
    }
}
