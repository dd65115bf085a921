//! Game-side physics on top of avian: timed removal, projectile
//! consumption, the player's collision pair filter and the kinematic
//! character sweep.
//!
//! Rigid bodies, colliders, contacts and spatial queries are avian's; this
//! module only adds what the controllers need on top. Gravity follows
//! `physics.gravity` in [`Settings`].

use crate::settings::Settings;
use avian3d::prelude::*;
use bevy::prelude::*;
use std::collections::HashSet;

/// Gap kept between a swept character and whatever stopped it, so a body
/// resting on a surface can slide across it without starting in contact.
pub const SKIN: f32 = 1e-3;

/// The player's collision-aware body.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CharacterBody {
    pub grounded: bool,
}

/// Removed once `remaining` runs out.
#[derive(Component, Debug, Clone, Copy)]
pub struct Lifetime {
    pub remaining: f32,
}

impl Lifetime {
    #[must_use]
    pub fn seconds(remaining: f32) -> Self {
        Self { remaining }
    }

    pub fn expire(&mut self) {
        self.remaining = 0.0;
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Marks fired projectiles; they are consumed by their first contact.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile;

/// Entity pairs whose collisions are suppressed.
#[derive(Resource, Debug, Default)]
pub struct CollisionIgnores(HashSet<(Entity, Entity)>);

impl CollisionIgnores {
    fn key(a: Entity, b: Entity) -> (Entity, Entity) {
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn set(&mut self, a: Entity, b: Entity, ignore: bool) {
        if ignore {
            self.0.insert(Self::key(a, b));
        } else {
            self.0.remove(&Self::key(a, b));
        }
    }

    #[must_use]
    pub fn is_ignored(&self, a: Entity, b: Entity) -> bool {
        self.0.contains(&Self::key(a, b))
    }

    /// Every entity paired with `entity`.
    pub fn partners(&self, entity: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.0.iter().filter_map(move |&(a, b)| match (a == entity, b == entity) {
            (true, _) => Some(b),
            (_, true) => Some(a),
            _ => None,
        })
    }

    /// Drop every pair involving `entity`.
    pub fn forget(&mut self, entity: Entity) {
        self.0.retain(|(a, b)| *a != entity && *b != entity);
    }
}

/// Result of [`sweep_character`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub position: Vec3,
    /// Axes on which movement was stopped.
    pub blocked: BVec3,
    /// Downward movement ended on something.
    pub grounded: bool,
}

/// Move a character by `delta`, one axis at a time (x, z, then y).
///
/// `cast(origin, direction, max_distance)` reports the distance to the first
/// obstacle along `direction`, or `None` when the way is clear. A blocked
/// axis stops [`SKIN`] short of the hit.
pub fn sweep_character(position: Vec3, delta: Vec3, mut cast: impl FnMut(Vec3, Dir3, f32) -> Option<f32>) -> Sweep {
    let mut pos = position;
    let mut blocked = BVec3::FALSE;

    for axis in [0, 2, 1] {
        let d = delta[axis];
        let mut step = Vec3::ZERO;
        step[axis] = d;
        let Ok(dir) = Dir3::new(step) else { continue };

        let distance = d.abs();
        match cast(pos, dir, distance + SKIN) {
            Some(hit) => {
                pos += *dir * (hit - SKIN).clamp(0.0, distance);
                blocked.set(axis, true);
            }
            None => pos += step,
        }
    }

    Sweep {
        position: pos,
        blocked,
        grounded: blocked.y && delta.y <= 0.0,
    }
}

/// Follow `physics.gravity` from the settings.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_gravity(settings: Res<Settings>, mut gravity: ResMut<Gravity>) {
    if settings.is_changed() {
        gravity.0 = Vec3::NEG_Y * settings.physics.gravity;
    }
}

/// Consume every projectile whose path over this step reaches a collider.
/// Runs ahead of the solver, so a fast projectile stops at the first face
/// it would cross instead of passing through or resting against it.
#[allow(clippy::needless_pass_by_value, clippy::type_complexity)]
pub fn consume_projectiles(
    time: Res<Time>,
    pipeline: Res<SpatialQueryPipeline>,
    mut projectiles: Query<(Entity, &mut Transform, &mut LinearVelocity, &mut Lifetime), With<Projectile>>,
    characters: Query<Entity, With<CharacterBody>>,
) {
    let dt = time.delta_seconds();
    if dt <= 0.0 {
        return;
    }
    let skip: Vec<Entity> = projectiles.iter().map(|(e, ..)| e).chain(characters.iter()).collect();
    let filter = SpatialQueryFilter::default().with_excluded_entities(skip);

    for (entity, mut tf, mut velocity, mut lifetime) in &mut projectiles {
        if lifetime.is_expired() {
            continue;
        }
        let Ok(dir) = Dir3::new(velocity.0) else { continue };
        let reach = velocity.0.length() * dt;
        if let Some(hit) = pipeline.cast_ray(tf.translation, dir, reach, true, filter.clone()) {
            debug!("projectile {entity:?} hit {:?}", hit.entity);
            tf.translation += *dir * hit.time_of_impact;
            velocity.0 = Vec3::ZERO;
            lifetime.expire();
        }
    }
}

/// Consume projectiles that touched anything during the last step.
#[allow(clippy::needless_pass_by_value)]
pub fn consume_on_contact(
    mut started: EventReader<CollisionStarted>,
    mut projectiles: Query<(&mut LinearVelocity, &mut Lifetime), With<Projectile>>,
) {
    for CollisionStarted(a, b) in started.read() {
        for entity in [*a, *b] {
            if let Ok((mut velocity, mut lifetime)) = projectiles.get_mut(entity) {
                velocity.0 = Vec3::ZERO;
                lifetime.expire();
            }
        }
    }
}

/// Tick lifetimes and despawn what ran out. The only place that despawns
/// timed entities, so an entity is removed at most once.
#[allow(clippy::needless_pass_by_value)]
pub fn expire_lifetimes(
    time: Res<Time>,
    mut commands: Commands,
    mut ignores: ResMut<CollisionIgnores>,
    mut q: Query<(Entity, &mut Lifetime)>,
) {
    let dt = time.delta_seconds();
    for (entity, mut lifetime) in &mut q {
        lifetime.remaining -= dt;
        if lifetime.is_expired() {
            ignores.forget(entity);
            if let Some(ec) = commands.get_entity(entity) {
                ec.despawn_recursive();
            }
        }
    }
}

/// avian on the fixed timestep, plus gravity sync, projectile consumption
/// and timed removal.
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PhysicsPlugins::new(FixedPostUpdate))
            .init_resource::<CollisionIgnores>()
            .add_systems(
                FixedPostUpdate,
                (sync_gravity, consume_projectiles).chain().before(PhysicsSet::Prepare),
            )
            .add_systems(Update, (consume_on_contact, expire_lifetimes).chain());
    }
}
