//! Fire-mode state: magazine, reload timer, fire-rate gate and recoil.
//!
//! All timestamps are seconds on the owning controller's clock.

use super::InteractionConfig;
use bevy::prelude::Vec3;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReloadState {
    Idle,
    Reloading { ready_at: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponState {
    current_ammo: u32,
    reload: ReloadState,
    next_fire_time: f64,
    /// (pitch, yaw, roll) in degrees.
    recoil: Vec3,
    pub is_shooting: bool,
}

impl WeaponState {
    #[must_use]
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            current_ammo: config.max_ammo,
            reload: ReloadState::Idle,
            next_fire_time: 0.0,
            recoil: Vec3::ZERO,
            is_shooting: false,
        }
    }

    #[must_use]
    pub fn ammo(&self) -> u32 {
        self.current_ammo
    }

    #[must_use]
    pub fn recoil(&self) -> Vec3 {
        self.recoil
    }

    #[must_use]
    pub fn is_reloading(&self) -> bool {
        matches!(self.reload, ReloadState::Reloading { .. })
    }

    #[must_use]
    pub fn reload_state(&self) -> ReloadState {
        self.reload
    }

    /// Has rounds and is not reloading, ignoring the fire-rate gate.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.current_ammo > 0 && !self.is_reloading()
    }

    #[must_use]
    pub fn can_fire(&self, now: f64) -> bool {
        self.is_armed() && now >= self.next_fire_time
    }

    /// Spend one round and close the gate for `fire_rate` seconds.
    pub fn consume_shot(&mut self, now: f64, config: &InteractionConfig) {
        self.current_ammo = self.current_ammo.saturating_sub(1);
        self.next_fire_time = now + f64::from(config.fire_rate);
    }

    /// Random per-shot kick: fixed pitch, uniform yaw in `[-h, h]`.
    pub fn recoil_kick(rng: &mut impl Rng, config: &InteractionConfig) -> Vec3 {
        let h = config.recoil_horizontal_strength;
        let yaw = if h > 0.0 { rng.gen_range(-h..=h) } else { 0.0 };
        Vec3::new(config.recoil_vertical_strength, yaw, 0.0)
    }

    pub fn add_recoil(&mut self, kick: Vec3, config: &InteractionConfig) {
        self.recoil = (self.recoil + kick).clamp_length_max(config.max_recoil);
    }

    /// Exponential approach toward zero.
    pub fn recover(&mut self, dt: f32, config: &InteractionConfig) {
        let t = (config.recoil_recovery_speed * dt).clamp(0.0, 1.0);
        self.recoil = self.recoil.lerp(Vec3::ZERO, t);
    }

    /// Arm a reload. Returns `false` when one is already pending or the
    /// magazine is full.
    pub fn begin_reload(&mut self, now: f64, config: &InteractionConfig) -> bool {
        if self.is_reloading() || self.current_ammo >= config.max_ammo {
            return false;
        }
        self.reload = ReloadState::Reloading { ready_at: now + f64::from(config.reload_time) };
        true
    }

    /// Complete a pending reload once its time has come. Returns `true` on
    /// the frame the magazine is refilled.
    pub fn finish_reload_if_due(&mut self, now: f64, config: &InteractionConfig) -> bool {
        match self.reload {
            ReloadState::Reloading { ready_at } if now >= ready_at => {
                self.current_ammo = config.max_ammo;
                self.reload = ReloadState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn clamp_to(&mut self, config: &InteractionConfig) {
        self.current_ammo = self.current_ammo.min(config.max_ammo);
        self.recoil = self.recoil.clamp_length_max(config.max_recoil);
    }
}
