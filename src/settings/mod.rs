//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! using the RON watcher utilities (see `ron::setup_ron_watcher`). Every field
//! has a serde default, so a settings file only needs the values it overrides.
use crate::interaction::InteractionConfig;
use crate::locomotion::LocomotionConfig;
use bevy::prelude::{warn, KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub mod loader;

/// A tuning value that cannot be used as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{section}.{field} must be {expected}, got {value}")]
    OutOfRange {
        section: &'static str,
        field: &'static str,
        expected: &'static str,
        value: f32,
    },
    #[error("interaction.max_throw_force ({max}) must not be below interaction.throw_force ({base})")]
    ThrowForceRange { base: f32, max: f32 },
    #[error("controls.keybinds.{action} = {binding:?} is not a known key or mouse button")]
    UnknownBinding { action: String, binding: String },
}

impl SettingsError {
    pub(crate) fn check_non_negative(
        section: &'static str,
        field: &'static str,
        value: f32,
        errors: &mut Vec<SettingsError>,
    ) {
        if !(value.is_finite() && value >= 0.0) {
            errors.push(SettingsError::OutOfRange { section, field, expected: "finite and >= 0", value });
        }
    }

    pub(crate) fn check_positive(
        section: &'static str,
        field: &'static str,
        value: f32,
        errors: &mut Vec<SettingsError>,
    ) {
        if !(value.is_finite() && value > 0.0) {
            errors.push(SettingsError::OutOfRange { section, field, expected: "finite and > 0", value });
        }
    }
}

/// Sound cue settings. Playback itself belongs to the platform mixer; the
/// volume is forwarded with every cue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    #[serde(default = "AudioSettings::default_master")]
    pub master_volume: f32, // Master output volume
    #[serde(default = "AudioSettings::default_effects")]
    pub effects_volume: f32, // Sound effects volume multiplier
    #[serde(default = "AudioSettings::default_enabled")]
    pub cues_enabled: bool, // Publish fire/reload cues at all
}

impl AudioSettings {
    fn default_master() -> f32 { 1.0 }
    fn default_effects() -> f32 { 0.8 }
    fn default_enabled() -> bool { true }

    /// Final gain attached to a cue.
    #[must_use]
    pub fn cue_volume(&self) -> f32 {
        (self.master_volume * self.effects_volume).clamp(0.0, 1.0)
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: Self::default_master(),
            effects_volume: Self::default_effects(),
            cues_enabled: Self::default_enabled(),
        }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub invert_y: bool, // Invert mouse Y axis
    #[serde(default)]
    pub invert_x: bool, // Invert mouse X axis
    #[serde(default = "ControlsSettings::default_sensitivity")]
    pub mouse_sensitivity: f32, // Mouse sensitivity multiplier
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Action name -> key or mouse button name
}

impl ControlsSettings {
    fn default_sensitivity() -> f32 { 1.0 }

    pub(crate) fn default_keybinds() -> HashMap<String, String> {
        [
            ("primary", "MouseLeft"),
            ("secondary", "MouseRight"),
            ("pick_mode", "1"),
            ("fire_mode", "2"),
            ("reload", "R"),
            ("jump", "Space"),
            ("pause", "Escape"),
            ("forward", "W"),
            ("back", "S"),
            ("left", "A"),
            ("right", "D"),
            ("toggle_debug", "F1"),
            ("toggle_colliders", "F2"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_y: false,
            invert_x: false,
            mouse_sensitivity: Self::default_sensitivity(),
            keybinds: Self::default_keybinds(),
        }
    }
}

/// World physics tuning handed to avian and the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsSettings {
    #[serde(default = "PhysicsSettings::default_gravity")]
    pub gravity: f32, // Downward acceleration applied to dynamic bodies
    #[serde(default = "PhysicsSettings::default_force_step")]
    pub force_step: f32, // Seconds a throw force acts for; impulse = force * force_step
    #[serde(default = "PhysicsSettings::default_floor_height")]
    pub floor_height: f32, // Top of the static floor collider
    #[serde(default = "PhysicsSettings::default_linear_damping")]
    pub linear_damping: f32, // Linear damping on dynamic crates
}

impl PhysicsSettings {
    fn default_gravity() -> f32 { 9.81 }
    fn default_force_step() -> f32 { 0.02 }
    fn default_floor_height() -> f32 { 0.0 }
    fn default_linear_damping() -> f32 { 0.1 }

    fn validate(&self, errors: &mut Vec<SettingsError>) {
        SettingsError::check_non_negative("physics", "gravity", self.gravity, errors);
        SettingsError::check_positive("physics", "force_step", self.force_step, errors);
        SettingsError::check_non_negative("physics", "linear_damping", self.linear_damping, errors);
    }
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: Self::default_gravity(),
            force_step: Self::default_force_step(),
            floor_height: Self::default_floor_height(),
            linear_damping: Self::default_linear_damping(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub locomotion: LocomotionConfig,
    #[serde(default)]
    pub physics: PhysicsSettings,
}

impl Settings {
    #[must_use]
    pub fn defaults() -> Self { Settings::default() }

    /// Every problem found in the loaded values, section by section.
    #[must_use]
    pub fn problems(&self) -> Vec<SettingsError> {
        let mut errors = Vec::new();
        self.interaction.validate(&mut errors);
        self.locomotion.validate(&mut errors);
        self.physics.validate(&mut errors);
        SettingsError::check_positive("controls", "mouse_sensitivity", self.controls.mouse_sensitivity, &mut errors);
        for (action, binding) in &self.controls.keybinds {
            if crate::input::Binding::parse(binding).is_none() {
                errors.push(SettingsError::UnknownBinding {
                    action: action.clone(),
                    binding: binding.clone(),
                });
            }
        }
        errors
    }

    /// Replace every section that has a problem with its default, logging each
    /// problem. Unknown keybinds are dropped so the built-in default applies.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let problems = self.problems();
        if problems.is_empty() {
            return self;
        }

        for problem in &problems {
            warn!("settings: {problem}; falling back to the default");
            match problem {
                SettingsError::ThrowForceRange { .. } => self.interaction = InteractionConfig::default(),
                SettingsError::OutOfRange { section, .. } => match *section {
                    "interaction" => self.interaction = InteractionConfig::default(),
                    "locomotion" => self.locomotion = LocomotionConfig::default(),
                    "physics" => self.physics = PhysicsSettings::default(),
                    "controls" => self.controls.mouse_sensitivity = ControlsSettings::default_sensitivity(),
                    _ => {}
                },
                SettingsError::UnknownBinding { action, .. } => {
                    self.controls.keybinds.remove(action);
                }
            }
        }
        self
    }

    /// Convert a key identifier (e.g. from `controls.keybinds`) into a `KeyCode`.
    ///
    /// Accepts single letters and digits, function keys `F1`..`F12` and a set
    /// of named keys (`Space`, `Escape`, `LShift`, arrows...). Case-insensitive.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        const LETTERS: [KeyCode; 26] = [
            KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
            KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
            KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
            KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
            KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
            KeyCode::KeyZ,
        ];
        const DIGITS: [KeyCode; 10] = [
            KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
            KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
        ];
        const FUNCTION: [KeyCode; 12] = [
            KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
            KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
        ];

        let s = name.trim().to_ascii_uppercase();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_uppercase() {
                return Some(LETTERS[(c as u8 - b'A') as usize]);
            }
            if c.is_ascii_digit() {
                return Some(DIGITS[(c as u8 - b'0') as usize]);
            }
        }

        if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<usize>().ok()) {
            return FUNCTION.get(n.checked_sub(1)?).copied();
        }

        Some(match s.as_str() {
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "BACKSPACE" => KeyCode::Backspace,
            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            _ => return None,
        })
    }
}
