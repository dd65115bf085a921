//! Camera control and cursor helpers.
//!
//! `camera_look` turns mouse motion into yaw on the player body and pitch on
//! its camera. `apply_recoil` composes the pitch with the interaction
//! controller's recoil offset. `cursor_grab` re-captures the pointer on a
//! left click; releasing it is the locomotion controller's job.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::locomotion::CursorControl;
use crate::player::{Player, PlayerCamera};
use crate::settings::{ControlsSettings, Settings};

const CAMERA_MAX_PITCH_DEG: f32 = 85.0;

/// The player's look orientation in radians.
///
/// - `yaw`: rotation of the body around Y.
/// - `pitch`: rotation of the camera around X, clamped to a safe range.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PlayerLook {
    pub yaw: f32,
    pub pitch: f32,
}

impl PlayerLook {
    /// Apply a raw mouse delta (updates yaw/pitch and clamps pitch).
    pub fn apply_delta(&mut self, delta: Vec2, controls: &ControlsSettings) {
        let max_pitch = CAMERA_MAX_PITCH_DEG.to_radians();
        let scale = controls.mouse_sensitivity / 1000.0;

        let x = if controls.invert_x { -delta.x } else { delta.x };
        let y = if controls.invert_y { -delta.y } else { delta.y };
        self.yaw -= x * scale;
        self.pitch = (self.pitch - y * scale).clamp(-max_pitch, max_pitch);
    }
}

/// Recoil added on top of the look pitch, `(pitch, yaw, roll)` in degrees.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct RecoilOffset(pub Vec3);

/// Apply mouse look while the cursor is captured.
#[allow(clippy::needless_pass_by_value)]
pub fn camera_look(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut motion_events: EventReader<MouseMotion>,
    mut query: Query<(&mut Transform, &mut PlayerLook), With<Player>>,
    settings: Res<Settings>,
) {
    let delta: Vec2 = motion_events.read().map(|ev| ev.delta).sum();
    if delta == Vec2::ZERO {
        return;
    }

    let Ok(window) = windows.get_single() else { return };
    if window.cursor.visible {
        return;
    }

    for (mut transform, mut look) in &mut query {
        look.apply_delta(delta, &settings.controls);
        transform.rotation = Quat::from_rotation_y(look.yaw);
    }
}

/// Write the camera's local rotation from look pitch plus recoil.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_recoil(
    players: Query<&PlayerLook, With<Player>>,
    mut cameras: Query<(&mut Transform, &RecoilOffset), With<PlayerCamera>>,
) {
    let Ok(look) = players.get_single() else { return };
    for (mut transform, recoil) in &mut cameras {
        let r = recoil.0;
        transform.rotation = Quat::from_euler(
            EulerRot::YXZ,
            r.y.to_radians(),
            look.pitch + r.x.to_radians(),
            r.z.to_radians(),
        );
    }
}

pub fn lock_window(window: &mut Window, locked: bool) {
    if locked {
        window.cursor.grab_mode = CursorGrabMode::Locked;
        window.cursor.visible = false;
    } else {
        window.cursor.grab_mode = CursorGrabMode::None;
        window.cursor.visible = true;
    }
}

/// [`CursorControl`] over the primary window; a no-op when there is none.
pub struct WindowCursor<'a>(pub Option<Mut<'a, Window>>);

impl CursorControl for WindowCursor<'_> {
    fn set_cursor_locked(&mut self, locked: bool) {
        if let Some(window) = self.0.as_mut() {
            lock_window(window, locked);
        }
    }
}

/// Re-capture the cursor on a left click.
#[allow(clippy::needless_pass_by_value)]
pub fn cursor_grab(mut wq: Query<&mut Window, With<PrimaryWindow>>, mb: Res<ButtonInput<MouseButton>>) {
    let Ok(mut w) = wq.get_single_mut() else { return };
    if mb.just_pressed(MouseButton::Left) && w.cursor.grab_mode == CursorGrabMode::None {
        lock_window(&mut w, true);
    }
}
