//! Per-frame input snapshot shared by both controllers.
//!
//! `gather_input` resolves the configured keybinds against Bevy's button
//! state once per frame and stores the result in the `InputSnapshot`
//! resource. The controllers only ever see the snapshot, which keeps them
//! independent of Bevy's input types and easy to drive from tests.

use crate::settings::Settings;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

/// Edge and level state of one button for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub just_pressed: bool,
    pub pressed: bool,
    pub just_released: bool,
}

impl ButtonState {
    /// Button went down this frame and is held.
    #[must_use]
    pub const fn press() -> Self {
        Self { just_pressed: true, pressed: true, just_released: false }
    }

    /// Button is held, with no edge this frame.
    #[must_use]
    pub const fn hold() -> Self {
        Self { just_pressed: false, pressed: true, just_released: false }
    }

    /// Button came up this frame.
    #[must_use]
    pub const fn release() -> Self {
        Self { just_pressed: false, pressed: false, just_released: true }
    }
}

/// Everything the controllers read from the input devices in one frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pub primary: ButtonState,
    pub secondary: ButtonState,
    pub select_pick: bool,
    pub select_fire: bool,
    pub reload: bool,
    pub jump: bool,
    pub escape: bool,
    /// Forward/back axis in `[-1, 1]`, positive forward.
    pub forward: f32,
    /// Strafe axis in `[-1, 1]`, positive right.
    pub strafe: f32,
}

/// A key or a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Key(KeyCode),
    Mouse(MouseButton),
}

impl Binding {
    /// Parse a keybind string: any key accepted by
    /// [`Settings::keycode_from_str`], or `MouseLeft` / `MouseRight` / `MouseMiddle`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "MOUSELEFT" | "LMB" => Some(Binding::Mouse(MouseButton::Left)),
            "MOUSERIGHT" | "RMB" => Some(Binding::Mouse(MouseButton::Right)),
            "MOUSEMIDDLE" | "MMB" => Some(Binding::Mouse(MouseButton::Middle)),
            _ => Settings::keycode_from_str(name).map(Binding::Key),
        }
    }

    fn state(self, keys: &ButtonInput<KeyCode>, mouse: &ButtonInput<MouseButton>) -> ButtonState {
        match self {
            Binding::Key(k) => ButtonState {
                just_pressed: keys.just_pressed(k),
                pressed: keys.pressed(k),
                just_released: keys.just_released(k),
            },
            Binding::Mouse(b) => ButtonState {
                just_pressed: mouse.just_pressed(b),
                pressed: mouse.pressed(b),
                just_released: mouse.just_released(b),
            },
        }
    }
}

/// Resolved bindings for every action the controllers know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keymap {
    pub primary: Binding,
    pub secondary: Binding,
    pub pick_mode: Binding,
    pub fire_mode: Binding,
    pub reload: Binding,
    pub jump: Binding,
    pub pause: Binding,
    pub forward: Binding,
    pub back: Binding,
    pub left: Binding,
    pub right: Binding,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            primary: Binding::Mouse(MouseButton::Left),
            secondary: Binding::Mouse(MouseButton::Right),
            pick_mode: Binding::Key(KeyCode::Digit1),
            fire_mode: Binding::Key(KeyCode::Digit2),
            reload: Binding::Key(KeyCode::KeyR),
            jump: Binding::Key(KeyCode::Space),
            pause: Binding::Key(KeyCode::Escape),
            forward: Binding::Key(KeyCode::KeyW),
            back: Binding::Key(KeyCode::KeyS),
            left: Binding::Key(KeyCode::KeyA),
            right: Binding::Key(KeyCode::KeyD),
        }
    }
}

impl Keymap {
    /// Resolve the keybinds in `settings`, keeping the default for any action
    /// that is missing or unparsable.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let binds = &settings.controls.keybinds;
        let map = |name: &str, default: Binding| {
            binds.get(name).and_then(|s| Binding::parse(s)).unwrap_or(default)
        };
        let d = Keymap::default();
        Self {
            primary: map("primary", d.primary),
            secondary: map("secondary", d.secondary),
            pick_mode: map("pick_mode", d.pick_mode),
            fire_mode: map("fire_mode", d.fire_mode),
            reload: map("reload", d.reload),
            jump: map("jump", d.jump),
            pause: map("pause", d.pause),
            forward: map("forward", d.forward),
            back: map("back", d.back),
            left: map("left", d.left),
            right: map("right", d.right),
        }
    }

    /// Build the snapshot for this frame.
    ///
    /// With `actions_enabled == false` (cursor not captured) only the pause
    /// edge is forwarded, so clicks that re-capture the cursor do not also
    /// pick things up or fire.
    #[must_use]
    pub fn snapshot(
        &self,
        keys: &ButtonInput<KeyCode>,
        mouse: &ButtonInput<MouseButton>,
        actions_enabled: bool,
    ) -> InputSnapshot {
        let escape = self.pause.state(keys, mouse).just_pressed;
        if !actions_enabled {
            return InputSnapshot { escape, ..default() };
        }

        let axis = |pos: Binding, neg: Binding| {
            f32::from(u8::from(pos.state(keys, mouse).pressed))
                - f32::from(u8::from(neg.state(keys, mouse).pressed))
        };

        InputSnapshot {
            primary: self.primary.state(keys, mouse),
            secondary: self.secondary.state(keys, mouse),
            select_pick: self.pick_mode.state(keys, mouse).just_pressed,
            select_fire: self.fire_mode.state(keys, mouse).just_pressed,
            reload: self.reload.state(keys, mouse).just_pressed,
            jump: self.jump.state(keys, mouse).just_pressed,
            escape,
            forward: axis(self.forward, self.back),
            strafe: axis(self.right, self.left),
        }
    }
}

/// Fill the `InputSnapshot` resource for this frame.
#[allow(clippy::needless_pass_by_value)]
pub fn gather_input(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    settings: Res<Settings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut snapshot: ResMut<InputSnapshot>,
) {
    let captured = windows
        .get_single()
        .map_or(true, |w| w.cursor.grab_mode != CursorGrabMode::None);
    *snapshot = Keymap::from_settings(&settings).snapshot(&keys, &mouse, captured);
}
