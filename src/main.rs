use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use grabshot::physics::PhysicsPlugin;
use grabshot::player::PlayerControllerPlugin;
use grabshot::settings::loader::{self as settings_loader, SETTINGS_DIR};
use grabshot::ui::HudPlugin;

mod app;

fn main() {
    let settings = settings_loader::load_settings_from_dir(SETTINGS_DIR);
    let (settings_watcher, watch_error) = settings_loader::watcher_or_stub(SETTINGS_DIR);

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "grabshot".into(),
                position: WindowPosition::Centered(MonitorSelection::Primary),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins((PhysicsPlugin, PlayerControllerPlugin, HudPlugin));

    app.insert_resource(settings);
    app.insert_resource(settings_watcher);

    if let Some(error) = watch_error {
        app.insert_resource(error);
    }

    app.add_systems(Startup, (app::setup, settings_loader::report_watch_error));
    app.add_systems(PreUpdate, settings_loader::check_settings_changes);

    app.run();
}
