//! Grounded walking, jumping and gravity for the player.
//!
//! [`LocomotionController`] carries one velocity vector across frames. While
//! grounded it is rebuilt from the movement axes (and the jump edge); gravity
//! is always integrated; the result is handed to a collision-aware
//! [`CharacterMotor`]. It also owns the pointer lock: locked on start,
//! released on the pause key.

use crate::input::InputSnapshot;
use crate::settings::SettingsError;
use bevy::prelude::{Component, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Collision-aware mover for the player body.
pub trait CharacterMotor {
    /// Whether the last move ended standing on something.
    fn is_grounded(&self) -> bool;
    /// World orientation of the body; local movement is rotated by it.
    fn orientation(&self) -> Quat;
    /// Move by `delta` world units, stopping at obstacles.
    fn move_by(&mut self, delta: Vec3);
}

/// Pointer capture.
pub trait CursorControl {
    fn set_cursor_locked(&mut self, locked: bool);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocomotionConfig {
    #[serde(default = "LocomotionConfig::default_speed")]
    pub speed: f32, // Walk speed in units per second
    #[serde(default = "LocomotionConfig::default_gravity")]
    pub gravity: f32, // Downward acceleration on the player
    #[serde(default = "LocomotionConfig::default_jump_height")]
    pub jump_height: f32, // Apex height of a jump
}

impl LocomotionConfig {
    fn default_speed() -> f32 { 9.8 }
    fn default_gravity() -> f32 { 15.0 }
    fn default_jump_height() -> f32 { 2.0 }

    /// Take-off speed that reaches `jump_height` under `gravity`.
    #[must_use]
    pub fn jump_velocity(&self) -> f32 {
        (self.jump_height * 2.0 * self.gravity).sqrt()
    }

    pub(crate) fn validate(&self, errors: &mut Vec<SettingsError>) {
        SettingsError::check_non_negative("locomotion", "speed", self.speed, errors);
        SettingsError::check_positive("locomotion", "gravity", self.gravity, errors);
        SettingsError::check_non_negative("locomotion", "jump_height", self.jump_height, errors);
    }
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            speed: Self::default_speed(),
            gravity: Self::default_gravity(),
            jump_height: Self::default_jump_height(),
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct LocomotionController {
    config: LocomotionConfig,
    velocity: Vec3,
    grounded: bool,
}

impl LocomotionController {
    #[must_use]
    pub fn new(config: LocomotionConfig) -> Self {
        Self { config, velocity: Vec3::ZERO, grounded: false }
    }

    #[must_use]
    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Grounded state read at the start of the last update.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn reconfigure(&mut self, config: LocomotionConfig) {
        self.config = config;
    }

    /// Capture the pointer. Call once when the player spawns.
    pub fn start(&self, cursor: &mut impl CursorControl) {
        cursor.set_cursor_locked(true);
    }

    /// Advance one frame.
    pub fn update(
        &mut self,
        dt: f32,
        input: &InputSnapshot,
        motor: &mut impl CharacterMotor,
        cursor: &mut impl CursorControl,
    ) {
        self.grounded = motor.is_grounded();

        if self.grounded {
            // -Z is forward
            let local = Vec3::new(input.strafe, 0.0, -input.forward) * self.config.speed;
            self.velocity = motor.orientation() * local;
            self.velocity.y = 0.0;
            if input.jump {
                self.velocity.y = self.config.jump_velocity();
            }
        }

        self.velocity.y -= self.config.gravity * dt;
        motor.move_by(self.velocity * dt);

        if input.escape {
            cursor.set_cursor_locked(false);
        }
    }
}
