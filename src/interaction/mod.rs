//! Pick up, hold, throw and shoot.
//!
//! [`InteractionController`] is a per-frame state machine with two modes.
//! In pick mode the primary action grabs the rigid body under the crosshair
//! (or drops the one being held), holding the secondary action charges a
//! throw and releasing it throws. In fire mode the primary action shoots
//! projectiles, limited by a fire-rate gate and a magazine that is refilled
//! by a timed reload; every shot kicks the camera, and the kick recovers
//! while the trigger is not held.
//!
//! The controller only talks to the world through [`InteractionHost`].
//!
//! # Example
//!
//! ```ignore
//! let mut controller = InteractionController::new(settings.interaction.clone());
//! // once per frame
//! controller.update(time.delta_seconds(), &input, &mut host);
//! ```

pub mod charge;
pub mod host;
pub mod weapon;

pub use charge::ThrowCharge;
pub use host::{CameraRig, Collaborator, ConfigurationMissing, InteractionHost, RayHit, SoundKind};
pub use weapon::{ReloadState, WeaponState};

use crate::input::InputSnapshot;
use crate::settings::SettingsError;
use bevy::prelude::{debug, Component, Entity, Transform, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Projectiles that hit nothing are removed after this long.
pub const PROJECTILE_LIFETIME_SECS: f32 = 5.0;

pub const RELOADING_STATUS: &str = "Reloading...";

/// Tuning for [`InteractionController`]. Distances in world units, times in
/// seconds, recoil in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    #[serde(default = "InteractionConfig::default_pickup_range")]
    pub pickup_range: f32, // Max ray distance for grabbing an object
    #[serde(default = "InteractionConfig::default_move_speed")]
    pub move_speed: f32, // How quickly a held object follows the hold anchor
    #[serde(default = "InteractionConfig::default_throw_force")]
    pub throw_force: f32, // Force of an uncharged throw
    #[serde(default = "InteractionConfig::default_max_throw_force")]
    pub max_throw_force: f32, // Force of a fully charged throw
    #[serde(default = "InteractionConfig::default_force_increase_speed")]
    pub force_increase_speed: f32, // Charge gained per second of holding
    #[serde(default = "InteractionConfig::default_bullet_speed")]
    pub bullet_speed: f32, // Projectile muzzle velocity
    #[serde(default = "InteractionConfig::default_fire_rate")]
    pub fire_rate: f32, // Minimum seconds between shots
    #[serde(default = "InteractionConfig::default_max_ammo")]
    pub max_ammo: u32, // Magazine size
    #[serde(default = "InteractionConfig::default_reload_time")]
    pub reload_time: f32, // Seconds a reload takes
    #[serde(default = "InteractionConfig::default_recoil_vertical")]
    pub recoil_vertical_strength: f32, // Pitch kick per shot
    #[serde(default = "InteractionConfig::default_recoil_horizontal")]
    pub recoil_horizontal_strength: f32, // Max random yaw kick per shot
    #[serde(default = "InteractionConfig::default_max_recoil")]
    pub max_recoil: f32, // Cap on the accumulated kick
    #[serde(default = "InteractionConfig::default_recoil_recovery_speed")]
    pub recoil_recovery_speed: f32, // Rate the kick returns to rest
}

impl InteractionConfig {
    fn default_pickup_range() -> f32 { 5.0 }
    fn default_move_speed() -> f32 { 10.0 }
    fn default_throw_force() -> f32 { 500.0 }
    fn default_max_throw_force() -> f32 { 1500.0 }
    fn default_force_increase_speed() -> f32 { 500.0 }
    fn default_bullet_speed() -> f32 { 60.0 }
    fn default_fire_rate() -> f32 { 0.1 }
    fn default_max_ammo() -> u32 { 40 }
    fn default_reload_time() -> f32 { 2.0 }
    fn default_recoil_vertical() -> f32 { 2.0 }
    fn default_recoil_horizontal() -> f32 { 1.0 }
    fn default_max_recoil() -> f32 { 10.0 }
    fn default_recoil_recovery_speed() -> f32 { 5.0 }

    pub(crate) fn validate(&self, errors: &mut Vec<SettingsError>) {
        let fields = [
            ("pickup_range", self.pickup_range),
            ("move_speed", self.move_speed),
            ("throw_force", self.throw_force),
            ("max_throw_force", self.max_throw_force),
            ("force_increase_speed", self.force_increase_speed),
            ("bullet_speed", self.bullet_speed),
            ("fire_rate", self.fire_rate),
            ("reload_time", self.reload_time),
            ("recoil_vertical_strength", self.recoil_vertical_strength),
            ("recoil_horizontal_strength", self.recoil_horizontal_strength),
            ("max_recoil", self.max_recoil),
            ("recoil_recovery_speed", self.recoil_recovery_speed),
        ];
        for (field, value) in fields {
            SettingsError::check_non_negative("interaction", field, value, errors);
        }
        if self.max_ammo == 0 {
            errors.push(SettingsError::OutOfRange {
                section: "interaction",
                field: "max_ammo",
                expected: "at least 1",
                value: 0.0,
            });
        }
        if self.max_throw_force < self.throw_force {
            errors.push(SettingsError::ThrowForceRange {
                base: self.throw_force,
                max: self.max_throw_force,
            });
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            pickup_range: Self::default_pickup_range(),
            move_speed: Self::default_move_speed(),
            throw_force: Self::default_throw_force(),
            max_throw_force: Self::default_max_throw_force(),
            force_increase_speed: Self::default_force_increase_speed(),
            bullet_speed: Self::default_bullet_speed(),
            fire_rate: Self::default_fire_rate(),
            max_ammo: Self::default_max_ammo(),
            reload_time: Self::default_reload_time(),
            recoil_vertical_strength: Self::default_recoil_vertical(),
            recoil_horizontal_strength: Self::default_recoil_horizontal(),
            max_recoil: Self::default_max_recoil(),
            recoil_recovery_speed: Self::default_recoil_recovery_speed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Pick,
    Fire,
}

/// The object currently attached to the hold anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldObject {
    pub entity: Entity,
    /// Physics mode to restore on release.
    pub was_kinematic: bool,
}

#[derive(Component)]
pub struct InteractionController {
    config: InteractionConfig,
    mode: Mode,
    held: Option<HeldObject>,
    charge: ThrowCharge,
    weapon: WeaponState,
    clock: f64,
    rng: StdRng,
}

impl InteractionController {
    #[must_use]
    pub fn new(config: InteractionConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic recoil, for tests and benchmarks.
    #[must_use]
    pub fn with_seed(config: InteractionConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: InteractionConfig, rng: StdRng) -> Self {
        Self {
            charge: ThrowCharge::new(&config),
            weapon: WeaponState::new(&config),
            config,
            mode: Mode::Pick,
            held: None,
            clock: 0.0,
            rng,
        }
    }

    #[must_use]
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn held(&self) -> Option<HeldObject> {
        self.held
    }

    #[must_use]
    pub fn charge(&self) -> f32 {
        self.charge.current()
    }

    #[must_use]
    pub fn weapon(&self) -> &WeaponState {
        &self.weapon
    }

    /// Seconds of `update` time seen so far.
    #[must_use]
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Swap in new tuning, keeping charge and ammo inside the new bounds.
    pub fn reconfigure(&mut self, config: InteractionConfig) {
        self.config = config;
        self.charge.clamp_to(&self.config);
        self.weapon.clamp_to(&self.config);
    }

    /// Collaborators the host cannot provide. Meant to be checked once at
    /// startup; the controller keeps running without them.
    pub fn missing_collaborators(host: &impl InteractionHost) -> Vec<ConfigurationMissing> {
        Collaborator::ALL
            .into_iter()
            .filter(|c| !host.has_collaborator(*c))
            .map(ConfigurationMissing)
            .collect()
    }

    #[must_use]
    pub fn ammo_status(&self) -> String {
        format!("Ammo: {}/{}", self.weapon.ammo(), self.config.max_ammo)
    }

    #[must_use]
    pub fn force_status(&self) -> String {
        format!("Force: {}%", self.charge.percent(&self.config))
    }

    /// Advance one frame.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot, host: &mut impl InteractionHost) {
        self.clock += f64::from(dt);

        if input.select_pick {
            self.set_mode(Mode::Pick);
        }
        if input.select_fire {
            self.set_mode(Mode::Fire);
            host.set_status(&self.ammo_status());
        }

        if self.weapon.finish_reload_if_due(self.clock, &self.config) {
            host.set_status(&self.ammo_status());
        }

        match self.mode {
            Mode::Pick => {
                self.weapon.is_shooting = false;
                self.update_pick(dt, input, host);
            }
            Mode::Fire => self.update_fire(input, host),
        }

        if self.held.is_some() {
            self.move_held_toward_anchor(dt, host);
        }

        if !self.weapon.is_shooting {
            self.weapon.recover(dt, &self.config);
        }
        host.apply_camera_recoil(self.weapon.recoil());
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode == Mode::Pick && mode != Mode::Pick {
            self.charge.reset(&self.config);
        }
        self.mode = mode;
    }

    fn update_pick(&mut self, dt: f32, input: &InputSnapshot, host: &mut impl InteractionHost) {
        if input.primary.just_pressed {
            if self.held.is_none() {
                self.try_pick(host);
            } else {
                self.release(host);
            }
        }

        if self.held.is_some() {
            if input.secondary.pressed {
                self.charge.accumulate(dt, &self.config);
            } else if input.secondary.just_released && self.charge.is_charging() {
                self.throw_held(host);
            }
        }

        host.set_status(&self.force_status());
    }

    fn try_pick(&mut self, host: &mut impl InteractionHost) {
        let Some(camera) = host.camera() else {
            return;
        };
        let Some(hit) = host.raycast(camera.position, camera.forward, self.config.pickup_range) else {
            return;
        };
        if !hit.has_rigid_body {
            return;
        }

        host.ignore_player_collision(hit.entity, true);
        host.set_kinematic(hit.entity, true);
        host.attach_to_hold_anchor(hit.entity);
        self.held = Some(HeldObject { entity: hit.entity, was_kinematic: hit.kinematic });
        debug!("picked up {:?} at {:.2}m", hit.entity, hit.distance);
    }

    /// Drop whatever is held. Returns the released entity.
    fn release(&mut self, host: &mut impl InteractionHost) -> Option<Entity> {
        let held = self.held.take()?;
        host.ignore_player_collision(held.entity, false);
        host.set_kinematic(held.entity, held.was_kinematic);
        host.detach(held.entity);
        self.charge.reset(&self.config);
        Some(held.entity)
    }

    fn throw_held(&mut self, host: &mut impl InteractionHost) {
        let force = self.charge.current();
        let Some(entity) = self.release(host) else {
            return;
        };
        if let Some(camera) = host.camera() {
            host.apply_impulse(entity, camera.forward * force);
            debug!("threw {entity:?} with force {force}");
        }
    }

    fn move_held_toward_anchor(&mut self, dt: f32, host: &mut impl InteractionHost) {
        let Some(held) = self.held else {
            return;
        };
        let Some(current) = host.held_pose(held.entity) else {
            // despawned by someone else while held
            debug!("held object {:?} disappeared", held.entity);
            self.held = None;
            self.charge.reset(&self.config);
            return;
        };
        let Some(target) = host.hold_target() else {
            return;
        };

        let t = (self.config.move_speed * dt).clamp(0.0, 1.0);
        let next = Transform {
            translation: current.translation.lerp(target.translation, t),
            rotation: current.rotation.lerp(target.rotation, t),
            scale: current.scale,
        };
        host.set_held_pose(held.entity, next);
    }

    fn update_fire(&mut self, input: &InputSnapshot, host: &mut impl InteractionHost) {
        if input.reload {
            self.start_reload(host);
        }

        self.weapon.is_shooting = input.primary.pressed && self.weapon.is_armed();
        if input.primary.pressed && self.weapon.can_fire(self.clock) {
            self.fire(host);
        }
    }

    fn fire(&mut self, host: &mut impl InteractionHost) {
        let Some(camera) = host.camera() else {
            return;
        };
        let origin = host.muzzle().unwrap_or(camera.position);

        let projectile = host.spawn_projectile(origin, camera.forward, self.config.bullet_speed);
        host.schedule_despawn(projectile, PROJECTILE_LIFETIME_SECS);

        self.weapon.consume_shot(self.clock, &self.config);
        let kick = WeaponState::recoil_kick(&mut self.rng, &self.config);
        self.weapon.add_recoil(kick, &self.config);

        host.play_sound(SoundKind::Fire, origin);
        host.set_status(&self.ammo_status());
    }

    fn start_reload(&mut self, host: &mut impl InteractionHost) {
        if !self.weapon.begin_reload(self.clock, &self.config) {
            return;
        }
        let at = host
            .muzzle()
            .or_else(|| host.camera().map(|c| c.position))
            .unwrap_or(Vec3::ZERO);
        host.play_sound(SoundKind::Reload, at);
        host.set_status(RELOADING_STATUS);
        debug!("reload armed, {}s", self.config.reload_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ButtonState;
    use bevy::prelude::Quat;
    use std::collections::{HashMap, HashSet};

    const PLAYER_CAM: Vec3 = Vec3::new(0.0, 1.7, 0.0);

    /// Records every call so tests can assert on side effects.
    struct MockHost {
        camera: Option<CameraRig>,
        target: Option<RayHit>,
        muzzle: Option<Vec3>,
        anchor: Transform,
        kinematic: HashMap<Entity, bool>,
        ignored: HashSet<Entity>,
        ignore_calls: Vec<(Entity, bool)>,
        attached: HashSet<Entity>,
        poses: HashMap<Entity, Transform>,
        impulses: Vec<(Entity, Vec3)>,
        projectiles: Vec<(Vec3, Vec3, f32)>,
        despawns: Vec<(Entity, f32)>,
        sounds: Vec<(SoundKind, Vec3)>,
        status: Option<String>,
        status_display: bool,
        camera_recoil: Vec3,
        next_id: u32,
    }

    impl MockHost {
        fn new() -> Self {
            Self {
                camera: Some(CameraRig { position: PLAYER_CAM, forward: Vec3::NEG_Z }),
                target: None,
                muzzle: Some(Vec3::new(0.3, 1.5, -0.8)),
                anchor: Transform::from_xyz(0.0, 1.4, -2.0),
                kinematic: HashMap::new(),
                ignored: HashSet::new(),
                ignore_calls: Vec::new(),
                attached: HashSet::new(),
                poses: HashMap::new(),
                impulses: Vec::new(),
                projectiles: Vec::new(),
                despawns: Vec::new(),
                sounds: Vec::new(),
                status: None,
                status_display: true,
                camera_recoil: Vec3::ZERO,
                next_id: 100,
            }
        }

        /// A dynamic crate `distance` metres in front of the camera.
        fn with_crate(mut self, distance: f32) -> (Self, Entity) {
            let e = Entity::from_raw(1);
            self.target = Some(RayHit { entity: e, distance, has_rigid_body: true, kinematic: false });
            self.kinematic.insert(e, false);
            self.poses.insert(e, Transform::from_translation(PLAYER_CAM + Vec3::NEG_Z * distance));
            (self, e)
        }
    }

    impl InteractionHost for MockHost {
        fn has_collaborator(&self, which: Collaborator) -> bool {
            match which {
                Collaborator::Camera => self.camera.is_some(),
                Collaborator::Muzzle => self.muzzle.is_some(),
                Collaborator::StatusDisplay => self.status_display,
                _ => true,
            }
        }

        fn camera(&self) -> Option<CameraRig> {
            self.camera
        }

        fn raycast(&self, _origin: Vec3, _direction: Vec3, max_distance: f32) -> Option<RayHit> {
            self.target.filter(|h| h.distance <= max_distance)
        }

        fn set_kinematic(&mut self, entity: Entity, kinematic: bool) {
            self.kinematic.insert(entity, kinematic);
        }

        fn ignore_player_collision(&mut self, entity: Entity, ignore: bool) {
            self.ignore_calls.push((entity, ignore));
            if ignore {
                self.ignored.insert(entity);
            } else {
                self.ignored.remove(&entity);
            }
        }

        fn attach_to_hold_anchor(&mut self, entity: Entity) {
            self.attached.insert(entity);
        }

        fn detach(&mut self, entity: Entity) {
            self.attached.remove(&entity);
        }

        fn hold_target(&self) -> Option<Transform> {
            Some(self.anchor)
        }

        fn held_pose(&self, entity: Entity) -> Option<Transform> {
            self.poses.get(&entity).copied()
        }

        fn set_held_pose(&mut self, entity: Entity, pose: Transform) {
            self.poses.insert(entity, pose);
        }

        fn apply_impulse(&mut self, entity: Entity, impulse: Vec3) {
            self.impulses.push((entity, impulse));
        }

        fn muzzle(&self) -> Option<Vec3> {
            self.muzzle
        }

        fn spawn_projectile(&mut self, position: Vec3, direction: Vec3, speed: f32) -> Entity {
            self.projectiles.push((position, direction, speed));
            self.next_id += 1;
            Entity::from_raw(self.next_id)
        }

        fn schedule_despawn(&mut self, entity: Entity, after_secs: f32) {
            self.despawns.push((entity, after_secs));
        }

        fn play_sound(&mut self, kind: SoundKind, position: Vec3) {
            self.sounds.push((kind, position));
        }

        fn set_status(&mut self, text: &str) {
            if self.status_display {
                self.status = Some(text.to_string());
            }
        }

        fn apply_camera_recoil(&mut self, euler_degrees: Vec3) {
            self.camera_recoil = euler_degrees;
        }
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    fn click() -> InputSnapshot {
        InputSnapshot { primary: ButtonState::press(), ..idle() }
    }

    fn throw_config() -> InteractionConfig {
        InteractionConfig {
            throw_force: 500.0,
            max_throw_force: 1500.0,
            force_increase_speed: 500.0,
            ..InteractionConfig::default()
        }
    }

    fn fire_config() -> InteractionConfig {
        InteractionConfig {
            max_ammo: 40,
            fire_rate: 0.125,
            reload_time: 1.5,
            ..InteractionConfig::default()
        }
    }

    fn in_fire_mode(ctrl: &mut InteractionController, host: &mut MockHost) {
        ctrl.update(0.0, &InputSnapshot { select_fire: true, ..idle() }, host);
    }

    #[test]
    fn pickup_attaches_rigid_body_in_range() {
        let (mut host, e) = MockHost::new().with_crate(3.0);
        let mut ctrl = InteractionController::with_seed(InteractionConfig::default(), 1);

        ctrl.update(0.016, &click(), &mut host);

        assert_eq!(ctrl.held().map(|h| h.entity), Some(e));
        assert!(host.ignored.contains(&e));
        assert!(host.kinematic[&e]);
        assert!(host.attached.contains(&e));
    }

    #[test]
    fn pickup_ignores_targets_out_of_range_or_static() {
        let (mut host, _) = MockHost::new().with_crate(7.5);
        let mut ctrl = InteractionController::with_seed(InteractionConfig::default(), 1);
        ctrl.update(0.016, &click(), &mut host);
        assert!(ctrl.held().is_none());

        let (mut host, e) = MockHost::new().with_crate(2.0);
        host.target = Some(RayHit { entity: e, distance: 2.0, has_rigid_body: false, kinematic: false });
        ctrl.update(0.016, &click(), &mut host);
        assert!(ctrl.held().is_none());
        assert!(host.ignore_calls.is_empty());
    }

    #[test]
    fn missing_camera_skips_pickup_for_that_frame() {
        let (mut host, e) = MockHost::new().with_crate(2.0);
        host.camera = None;
        let mut ctrl = InteractionController::with_seed(InteractionConfig::default(), 1);

        ctrl.update(0.016, &click(), &mut host);
        assert!(ctrl.held().is_none());

        host.camera = Some(CameraRig { position: PLAYER_CAM, forward: Vec3::NEG_Z });
        ctrl.update(0.016, &click(), &mut host);
        assert_eq!(ctrl.held().map(|h| h.entity), Some(e));
    }

    #[test]
    fn second_click_drops_and_restores_once() {
        let (mut host, e) = MockHost::new().with_crate(2.0);
        let mut ctrl = InteractionController::with_seed(throw_config(), 1);

        ctrl.update(0.016, &click(), &mut host);
        ctrl.update(0.25, &InputSnapshot { secondary: ButtonState::press(), ..idle() }, &mut host);
        assert!(ctrl.charge() > 500.0);

        ctrl.update(0.016, &click(), &mut host);

        assert!(ctrl.held().is_none());
        assert_eq!(ctrl.charge(), 500.0);
        assert!(!host.ignored.contains(&e));
        assert!(!host.kinematic[&e]);
        assert!(!host.attached.contains(&e));
        assert_eq!(host.ignore_calls, vec![(e, true), (e, false)]);
        assert!(host.impulses.is_empty());
    }

    #[test]
    fn already_kinematic_object_stays_kinematic_after_drop() {
        let (mut host, e) = MockHost::new().with_crate(2.0);
        host.target = Some(RayHit { entity: e, distance: 2.0, has_rigid_body: true, kinematic: true });
        let mut ctrl = InteractionController::with_seed(InteractionConfig::default(), 1);

        ctrl.update(0.016, &click(), &mut host);
        ctrl.update(0.016, &click(), &mut host);
        assert!(host.kinematic[&e]);
    }

    #[test]
    fn two_second_charge_clamps_and_throws_full_force() {
        let (mut host, e) = MockHost::new().with_crate(2.0);
        let mut ctrl = InteractionController::with_seed(throw_config(), 1);
        ctrl.update(0.016, &click(), &mut host);

        let mut secondary = InputSnapshot { secondary: ButtonState::press(), ..idle() };
        for _ in 0..8 {
            ctrl.update(0.25, &secondary, &mut host);
            secondary.secondary = ButtonState::hold();
            assert!((500.0..=1500.0).contains(&ctrl.charge()));
        }
        assert_eq!(ctrl.charge(), 1500.0);
        assert_eq!(host.status.as_deref(), Some("Force: 100%"));

        ctrl.update(0.016, &InputSnapshot { secondary: ButtonState::release(), ..idle() }, &mut host);

        assert_eq!(host.impulses, vec![(e, Vec3::NEG_Z * 1500.0)]);
        assert!(ctrl.held().is_none());
        assert_eq!(ctrl.charge(), 500.0);
        assert_eq!(host.ignore_calls, vec![(e, true), (e, false)]);
        assert!(!host.kinematic[&e]);
    }

    #[test]
    fn status_shows_charge_percentage() {
        let (mut host, _) = MockHost::new().with_crate(2.0);
        let mut ctrl = InteractionController::with_seed(throw_config(), 1);
        ctrl.update(0.016, &click(), &mut host);
        assert_eq!(host.status.as_deref(), Some("Force: 0%"));

        ctrl.update(1.0, &InputSnapshot { secondary: ButtonState::press(), ..idle() }, &mut host);
        assert_eq!(host.status.as_deref(), Some("Force: 50%"));
    }

    #[test]
    fn release_without_charge_does_not_throw() {
        let (mut host, _) = MockHost::new().with_crate(2.0);
        let mut ctrl = InteractionController::with_seed(throw_config(), 1);
        ctrl.update(0.016, &click(), &mut host);
        ctrl.update(0.016, &InputSnapshot { secondary: ButtonState::release(), ..idle() }, &mut host);
        assert!(ctrl.held().is_some());
        assert!(host.impulses.is_empty());
    }

    #[test]
    fn held_object_eases_toward_anchor() {
        let (mut host, e) = MockHost::new().with_crate(4.0);
        host.anchor = Transform::from_xyz(0.0, 1.0, -2.0).with_rotation(Quat::from_rotation_y(0.5));
        let mut ctrl = InteractionController::with_seed(
            InteractionConfig { move_speed: 10.0, ..InteractionConfig::default() },
            1,
        );
        ctrl.update(0.0, &click(), &mut host);
        let start = host.poses[&e].translation;

        ctrl.update(0.05, &idle(), &mut host); // factor 0.5
        let midway = start.lerp(host.anchor.translation, 0.5);
        assert!(host.poses[&e].translation.distance(midway) < 1e-5);

        for _ in 0..60 {
            ctrl.update(0.05, &idle(), &mut host);
        }
        assert!(host.poses[&e].translation.distance(host.anchor.translation) < 1e-4);
        assert!(host.poses[&e].rotation.angle_between(host.anchor.rotation) < 1e-3);
    }

    #[test]
    fn vanished_held_object_is_forgotten() {
        let (mut host, e) = MockHost::new().with_crate(2.0);
        let mut ctrl = InteractionController::with_seed(InteractionConfig::default(), 1);
        ctrl.update(0.016, &click(), &mut host);
        host.poses.remove(&e);
        ctrl.update(0.016, &idle(), &mut host);
        assert!(ctrl.held().is_none());
    }

    #[test]
    fn switching_to_fire_shows_ammo_and_cancels_charge() {
        let (mut host, _) = MockHost::new().with_crate(2.0);
        let mut ctrl = InteractionController::with_seed(throw_config(), 1);
        ctrl.update(0.016, &click(), &mut host);
        ctrl.update(0.5, &InputSnapshot { secondary: ButtonState::press(), ..idle() }, &mut host);

        ctrl.update(0.016, &InputSnapshot { select_fire: true, secondary: ButtonState::hold(), ..idle() }, &mut host);

        assert_eq!(ctrl.mode(), Mode::Fire);
        assert_eq!(ctrl.charge(), 500.0);
        assert_eq!(host.status.as_deref(), Some("Ammo: 40/40"));
    }

    #[test]
    fn fire_key_wins_when_both_mode_keys_pressed() {
        let mut host = MockHost::new();
        let mut ctrl = InteractionController::with_seed(InteractionConfig::default(), 1);
        ctrl.update(0.016, &InputSnapshot { select_pick: true, select_fire: true, ..idle() }, &mut host);
        assert_eq!(ctrl.mode(), Mode::Fire);
    }

    #[test]
    fn magazine_empties_then_reload_refills() {
        let mut host = MockHost::new();
        let mut ctrl = InteractionController::with_seed(fire_config(), 3);
        in_fire_mode(&mut ctrl, &mut host);

        let trigger = InputSnapshot { primary: ButtonState::hold(), ..idle() };
        for _ in 0..40 {
            ctrl.update(0.125, &trigger, &mut host);
        }
        assert_eq!(ctrl.weapon().ammo(), 0);
        assert_eq!(host.projectiles.len(), 40);
        assert_eq!(host.status.as_deref(), Some("Ammo: 0/40"));

        ctrl.update(0.125, &trigger, &mut host);
        assert_eq!(host.projectiles.len(), 40);
        assert_eq!(ctrl.weapon().ammo(), 0);

        ctrl.update(0.25, &InputSnapshot { reload: true, ..idle() }, &mut host);
        assert!(ctrl.weapon().is_reloading());
        assert_eq!(host.status.as_deref(), Some(RELOADING_STATUS));
        for _ in 0..5 {
            ctrl.update(0.25, &idle(), &mut host);
            assert!(ctrl.weapon().is_reloading(), "reload finished early");
        }
        ctrl.update(0.25, &idle(), &mut host);
        assert!(!ctrl.weapon().is_reloading());
        assert_eq!(ctrl.weapon().ammo(), 40);
        assert_eq!(host.status.as_deref(), Some("Ammo: 40/40"));
    }

    #[test]
    fn fire_rate_limits_shots_per_frame_time() {
        let mut host = MockHost::new();
        let cfg = InteractionConfig { fire_rate: 0.5, ..fire_config() };
        let mut ctrl = InteractionController::with_seed(cfg, 3);
        in_fire_mode(&mut ctrl, &mut host);

        let trigger = InputSnapshot { primary: ButtonState::hold(), ..idle() };
        for _ in 0..8 {
            ctrl.update(0.125, &trigger, &mut host); // 1 second total
        }
        assert_eq!(host.projectiles.len(), 2);
    }

    #[test]
    fn shot_spawns_projectile_with_lifetime_and_sound() {
        let mut host = MockHost::new();
        let cfg = InteractionConfig { bullet_speed: 80.0, ..fire_config() };
        let mut ctrl = InteractionController::with_seed(cfg, 3);
        in_fire_mode(&mut ctrl, &mut host);

        ctrl.update(0.016, &click(), &mut host);

        let muzzle = host.muzzle.unwrap();
        assert_eq!(host.projectiles, vec![(muzzle, Vec3::NEG_Z, 80.0)]);
        assert_eq!(host.despawns.len(), 1);
        assert_eq!(host.despawns[0].1, PROJECTILE_LIFETIME_SECS);
        assert_eq!(host.sounds, vec![(SoundKind::Fire, muzzle)]);
        assert_eq!(host.status.as_deref(), Some("Ammo: 39/40"));
    }

    #[test]
    fn no_muzzle_fires_from_camera() {
        let mut host = MockHost::new();
        host.muzzle = None;
        let mut ctrl = InteractionController::with_seed(fire_config(), 3);
        in_fire_mode(&mut ctrl, &mut host);
        ctrl.update(0.016, &click(), &mut host);
        assert_eq!(host.projectiles[0].0, PLAYER_CAM);
    }

    #[test]
    fn reload_cannot_be_restarted_and_blocks_firing() {
        let mut host = MockHost::new();
        let mut ctrl = InteractionController::with_seed(fire_config(), 3);
        in_fire_mode(&mut ctrl, &mut host);
        ctrl.update(0.125, &click(), &mut host);

        ctrl.update(0.25, &InputSnapshot { reload: true, ..idle() }, &mut host);
        ctrl.update(0.25, &InputSnapshot { reload: true, primary: ButtonState::hold(), ..idle() }, &mut host);

        let reload_cues = host.sounds.iter().filter(|(k, _)| *k == SoundKind::Reload).count();
        assert_eq!(reload_cues, 1);
        assert_eq!(host.projectiles.len(), 1);
        assert_eq!(ctrl.weapon().ammo(), 39);
    }

    #[test]
    fn reload_with_full_magazine_is_ignored() {
        let mut host = MockHost::new();
        let mut ctrl = InteractionController::with_seed(fire_config(), 3);
        in_fire_mode(&mut ctrl, &mut host);
        ctrl.update(0.25, &InputSnapshot { reload: true, ..idle() }, &mut host);
        assert!(!ctrl.weapon().is_reloading());
        assert!(host.sounds.is_empty());
    }

    #[test]
    fn reload_completes_even_after_leaving_fire_mode() {
        let mut host = MockHost::new();
        let mut ctrl = InteractionController::with_seed(fire_config(), 3);
        in_fire_mode(&mut ctrl, &mut host);
        ctrl.update(0.125, &click(), &mut host);
        ctrl.update(0.25, &InputSnapshot { reload: true, ..idle() }, &mut host);
        ctrl.update(0.25, &InputSnapshot { select_pick: true, ..idle() }, &mut host);
        for _ in 0..6 {
            ctrl.update(0.25, &idle(), &mut host);
        }
        assert_eq!(ctrl.weapon().ammo(), 40);
    }

    #[test]
    fn recoil_never_exceeds_cap() {
        let mut host = MockHost::new();
        let cfg = InteractionConfig {
            recoil_vertical_strength: 4.0,
            recoil_horizontal_strength: 3.0,
            max_recoil: 6.0,
            ..fire_config()
        };
        let mut ctrl = InteractionController::with_seed(cfg, 11);
        in_fire_mode(&mut ctrl, &mut host);

        let trigger = InputSnapshot { primary: ButtonState::hold(), ..idle() };
        for _ in 0..40 {
            ctrl.update(0.125, &trigger, &mut host);
            assert!(ctrl.weapon().recoil().length() <= 6.0 + 1e-4);
            assert_eq!(host.camera_recoil, ctrl.weapon().recoil());
        }
    }

    #[test]
    fn recoil_recovers_once_trigger_released() {
        let mut host = MockHost::new();
        let mut ctrl = InteractionController::with_seed(fire_config(), 5);
        in_fire_mode(&mut ctrl, &mut host);

        ctrl.update(0.016, &click(), &mut host);
        let kicked = ctrl.weapon().recoil();
        assert!(kicked.x > 0.0);

        // trigger still held but gate closed: recoil holds
        ctrl.update(0.016, &InputSnapshot { primary: ButtonState::hold(), ..idle() }, &mut host);
        assert_eq!(ctrl.weapon().recoil(), kicked);

        for _ in 0..30 {
            ctrl.update(0.1, &idle(), &mut host);
        }
        assert!(ctrl.weapon().recoil().length() < 1e-3);
        assert!(host.camera_recoil.length() < 1e-3);
    }

    #[test]
    fn reconfigure_clamps_ammo_into_new_magazine() {
        let mut host = MockHost::new();
        let mut ctrl = InteractionController::with_seed(fire_config(), 3);
        in_fire_mode(&mut ctrl, &mut host);
        ctrl.reconfigure(InteractionConfig { max_ammo: 10, ..fire_config() });
        assert_eq!(ctrl.weapon().ammo(), 10);
    }

    #[test]
    fn reports_missing_collaborators() {
        let mut host = MockHost::new();
        host.camera = None;
        host.status_display = false;

        let missing = InteractionController::missing_collaborators(&host);
        assert_eq!(
            missing,
            vec![
                ConfigurationMissing(Collaborator::Camera),
                ConfigurationMissing(Collaborator::StatusDisplay),
            ]
        );
        assert!(missing[0].0.is_required());
        assert!(!missing[1].0.is_required());
        assert_eq!(missing[0].to_string(), "player camera is not configured");
    }

    #[test]
    fn missing_status_display_is_tolerated() {
        let (mut host, e) = MockHost::new().with_crate(2.0);
        host.status_display = false;
        let mut ctrl = InteractionController::with_seed(InteractionConfig::default(), 1);
        ctrl.update(0.016, &click(), &mut host);
        assert_eq!(ctrl.held().map(|h| h.entity), Some(e));
        assert!(host.status.is_none());
    }
}
