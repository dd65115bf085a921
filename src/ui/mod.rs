//! User interface: status line, crosshair, debug overlay and collider
//! gizmos.
//!
//! The status line is the interaction controller's display (force while
//! picking, ammo while firing). The overlay refreshes twice a second with
//! FPS and the player's controller state.

use crate::input::Binding;
use crate::interaction::{InteractionController, Mode};
use crate::locomotion::LocomotionController;
use crate::physics::Projectile;
use crate::player::Player;
use crate::settings::Settings;
use avian3d::prelude::ColliderAabb;
use bevy::diagnostic::{Diagnostic, DiagnosticPath, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

const FONT_PATH: &str = "fonts/OpenSans.ttf";

/// The interaction controller's status text.
#[derive(Component, Debug, Default)]
pub struct StatusText;

#[derive(Component)]
pub struct DebugOverlayText;

/// State for the debug overlay visibility.
#[derive(Resource, Default)]
pub struct DebugOverlayState {
    pub visible: bool,
}

#[derive(Resource, Default)]
pub struct DebugOverlayTimer(pub Timer);

#[derive(Resource, Default)]
pub struct ColliderGizmosVisible(pub bool);

/// Insert debug overlay resources.
pub fn setup_debug_overlay(mut commands: Commands) {
    commands.insert_resource(DebugOverlayTimer(Timer::from_seconds(0.5, TimerMode::Repeating)));
    commands.insert_resource(DebugOverlayState::default());
    commands.insert_resource(ColliderGizmosVisible::default());
}

fn toggle_pressed(settings: &Settings, action: &str, default: KeyCode, keys: &ButtonInput<KeyCode>, mouse: &ButtonInput<MouseButton>) -> bool {
    let binding = settings
        .controls
        .keybinds
        .get(action)
        .and_then(|s| Binding::parse(s))
        .unwrap_or(Binding::Key(default));
    match binding {
        Binding::Key(k) => keys.just_pressed(k),
        Binding::Mouse(b) => mouse.just_pressed(b),
    }
}

/// Toggle the debug overlay (F1 by default).
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_debug_overlay(
    mut state: ResMut<DebugOverlayState>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    settings: Res<Settings>,
) {
    if toggle_pressed(&settings, "toggle_debug", KeyCode::F1, &keys, &mouse) {
        state.visible = !state.visible;
    }
}

/// Toggle collider wireframes (F2 by default).
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_collider_gizmos(
    mut visible: ResMut<ColliderGizmosVisible>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    settings: Res<Settings>,
) {
    if toggle_pressed(&settings, "toggle_colliders", KeyCode::F2, &keys, &mouse) {
        visible.0 = !visible.0;
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Pick => "pick",
        Mode::Fire => "fire",
    }
}

/// Overlay body for one player.
#[must_use]
pub fn player_summary(position: Vec3, locomotion: &LocomotionController, interaction: &InteractionController) -> String {
    let v = locomotion.velocity();
    let weapon = interaction.weapon();
    format!(
        "Pos: ({:.1}, {:.1}, {:.1})\nGrounded: {}\nVelocity: ({:.1}, {:.1}, {:.1})\nMode: {}{}\nAmmo: {}/{}{}\nCharge: {:.0}\nRecoil: {:.2}",
        position.x,
        position.y,
        position.z,
        locomotion.is_grounded(),
        v.x,
        v.y,
        v.z,
        mode_label(interaction.mode()),
        if interaction.held().is_some() { " (holding)" } else { "" },
        weapon.ammo(),
        interaction.config().max_ammo,
        if weapon.is_reloading() { " reloading" } else { "" },
        interaction.charge(),
        weapon.recoil().length(),
    )
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct DebugOverlayCtx<'w, 's> {
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub state: Res<'w, DebugOverlayState>,
    pub time: Res<'w, Time>,
    pub timer: ResMut<'w, DebugOverlayTimer>,
    pub query: Query<'w, 's, &'static mut Text, With<DebugOverlayText>>,
    pub players: Query<
        'w,
        's,
        (&'static GlobalTransform, &'static LocomotionController, &'static InteractionController),
        With<Player>,
    >,
}

fn smoothed(diagnostics: &DiagnosticsStore, path: &DiagnosticPath) -> f64 {
    diagnostics.get(path).and_then(Diagnostic::smoothed).unwrap_or(0.0)
}

/// Refresh the overlay text at a fixed interval.
pub fn update_debug_overlay(mut ctx: DebugOverlayCtx<'_, '_>) {
    if !ctx.timer.0.tick(ctx.time.delta()).just_finished() {
        return;
    }

    let Ok(mut text) = ctx.query.get_single_mut() else { return };

    if !ctx.state.visible {
        text.sections[0].value = String::new();
        return;
    }

    let fps = smoothed(&ctx.diagnostics, &FrameTimeDiagnosticsPlugin::FPS);
    let frame_time = smoothed(&ctx.diagnostics, &FrameTimeDiagnosticsPlugin::FRAME_TIME);

    let player = ctx
        .players
        .get_single()
        .map_or_else(|_| "Player: N/A".to_string(), |(gt, loco, inter)| player_summary(gt.translation(), loco, inter));

    text.sections[0].value = format!("FPS: {fps:.1}\nFrame Time: {frame_time:.2} ms\n{player}");
}

/// Status line, debug overlay and crosshair.
#[allow(clippy::needless_pass_by_value)]
pub fn spawn_hud(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font: Handle<Font> = asset_server.load(FONT_PATH);

    commands.spawn((
        TextBundle {
            text: Text::from_section(
                "",
                TextStyle { font: font.clone(), font_size: 18.0, color: Color::srgb(1.0, 1.0, 0.0) },
            ),
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            ..default()
        },
        DebugOverlayText,
    ));

    commands.spawn((
        TextBundle {
            text: Text::from_section("", TextStyle { font, font_size: 24.0, color: Color::WHITE }),
            style: Style {
                position_type: PositionType::Absolute,
                right: Val::Px(16.0),
                bottom: Val::Px(12.0),
                ..default()
            },
            ..default()
        },
        StatusText,
    ));

    spawn_crosshair(&mut commands);
}

/// Draw every collider's bounding box while enabled.
#[allow(clippy::needless_pass_by_value)]
pub fn render_colliders(
    visible: Res<ColliderGizmosVisible>,
    mut gizmos: Gizmos,
    colliders: Query<(&ColliderAabb, Has<Projectile>)>,
) {
    if !visible.0 {
        return;
    }
    for (aabb, projectile) in &colliders {
        let color = if projectile { Color::srgb(1.0, 0.3, 0.1) } else { Color::srgb(0.0, 1.0, 0.0) };
        let transform = Transform::from_translation((aabb.min + aabb.max) * 0.5).with_scale(aabb.max - aabb.min);
        gizmos.cuboid(transform, color);
    }
}

/// Spawn a crosshair UI element centered on the screen.
pub fn spawn_crosshair(commands: &mut Commands) {
    commands
        .spawn(NodeBundle {
            style: Style {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            ..default()
        })
        .with_children(|p| {
            p.spawn(NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Px(20.0),
                    height: Val::Px(2.0),
                    ..default()
                },
                background_color: Color::WHITE.into(),
                ..default()
            });
            p.spawn(NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Px(2.0),
                    height: Val::Px(20.0),
                    ..default()
                },
                background_color: Color::WHITE.into(),
                ..default()
            });
        });
}

/// HUD, overlay and gizmo systems.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        // Status text must exist before collaborators are checked in PostStartup.
        app.add_systems(Startup, (setup_debug_overlay, spawn_hud)).add_systems(
            Update,
            (toggle_debug_overlay, toggle_collider_gizmos, update_debug_overlay, render_colliders),
        );
    }
}
