//! Throw charge: a force that ramps up while the secondary action is held.

use super::InteractionConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowCharge {
    current: f32,
    charging: bool,
}

impl ThrowCharge {
    #[must_use]
    pub fn new(config: &InteractionConfig) -> Self {
        Self { current: config.throw_force, charging: false }
    }

    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// A charge was started and not yet spent.
    #[must_use]
    pub fn is_charging(&self) -> bool {
        self.charging
    }

    pub fn accumulate(&mut self, dt: f32, config: &InteractionConfig) {
        self.charging = true;
        self.current = (self.current + config.force_increase_speed * dt)
            .clamp(config.throw_force, config.max_throw_force);
    }

    pub fn reset(&mut self, config: &InteractionConfig) {
        self.current = config.throw_force;
        self.charging = false;
    }

    /// Pull the value back inside the bounds of a new config.
    pub fn clamp_to(&mut self, config: &InteractionConfig) {
        self.current = self.current.clamp(config.throw_force, config.max_throw_force);
    }

    /// Charge progress in whole percent, `0` when the range is empty.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self, config: &InteractionConfig) -> u32 {
        let span = config.max_throw_force - config.throw_force;
        if span <= 0.0 {
            return 0;
        }
        let ratio = ((self.current - config.throw_force) / span).clamp(0.0, 1.0);
        (ratio * 100.0).round() as u32
    }
}
