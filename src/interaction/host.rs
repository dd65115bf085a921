//! The platform seam of the interaction controller.
//!
//! `InteractionController` never touches the ECS directly. Everything it
//! needs from the world (camera, ray casts, physics toggles, parenting,
//! spawning, sound, status text) goes through [`InteractionHost`]. The game
//! implements it over Bevy queries in `player::interaction`; the unit tests
//! implement it with a recording mock.

use bevy::prelude::{Entity, Transform, Vec3};
use std::fmt;
use thiserror::Error;

/// Where the player is looking from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    /// Unit forward vector.
    pub forward: Vec3,
}

/// First entity hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
    /// The entity can be simulated, so it can be picked up.
    pub has_rigid_body: bool,
    /// The body was already kinematic before anyone touched it.
    pub kinematic: bool,
}

/// Category of a fire-and-forget sound cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    Fire,
    Reload,
}

/// External pieces the interaction controller depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    Camera,
    PlayerCollider,
    HoldAnchor,
    Muzzle,
    StatusDisplay,
    SoundEmitter,
}

impl Collaborator {
    pub const ALL: [Collaborator; 6] = [
        Collaborator::Camera,
        Collaborator::PlayerCollider,
        Collaborator::HoldAnchor,
        Collaborator::Muzzle,
        Collaborator::StatusDisplay,
        Collaborator::SoundEmitter,
    ];

    /// Whether gameplay degrades without it. Status text and sound are
    /// cosmetic and are skipped silently when absent.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Collaborator::StatusDisplay | Collaborator::SoundEmitter)
    }
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Collaborator::Camera => "player camera",
            Collaborator::PlayerCollider => "player collider",
            Collaborator::HoldAnchor => "hold anchor",
            Collaborator::Muzzle => "muzzle anchor",
            Collaborator::StatusDisplay => "status display",
            Collaborator::SoundEmitter => "sound emitter",
        })
    }
}

/// A collaborator that was not present when the controller started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is not configured")]
pub struct ConfigurationMissing(pub Collaborator);

/// World access required by [`InteractionController`](super::InteractionController).
///
/// Methods acting on an optional collaborator (status text, sound, muzzle)
/// are expected to no-op when it is missing.
pub trait InteractionHost {
    fn has_collaborator(&self, which: Collaborator) -> bool;

    fn camera(&self) -> Option<CameraRig>;

    /// Closest hit along `direction` within `max_distance`, ignoring the player.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;

    fn set_kinematic(&mut self, entity: Entity, kinematic: bool);

    /// Toggle collisions between `entity` and the player's collider.
    fn ignore_player_collision(&mut self, entity: Entity, ignore: bool);

    fn attach_to_hold_anchor(&mut self, entity: Entity);

    /// Return `entity` to the world root, keeping its world pose.
    fn detach(&mut self, entity: Entity);

    /// Pose the held object is pulled toward. Expressed in the same frame as
    /// [`held_pose`](Self::held_pose).
    fn hold_target(&self) -> Option<Transform>;

    /// Current pose of a held entity, `None` once it no longer exists.
    fn held_pose(&self, entity: Entity) -> Option<Transform>;

    fn set_held_pose(&mut self, entity: Entity, pose: Transform);

    fn apply_impulse(&mut self, entity: Entity, impulse: Vec3);

    /// World position of the muzzle anchor.
    fn muzzle(&self) -> Option<Vec3>;

    fn spawn_projectile(&mut self, position: Vec3, direction: Vec3, speed: f32) -> Entity;

    /// Remove `entity` after `after_secs`. Must tolerate the entity being
    /// gone by then.
    fn schedule_despawn(&mut self, entity: Entity, after_secs: f32);

    fn play_sound(&mut self, kind: SoundKind, position: Vec3);

    fn set_status(&mut self, text: &str);

    /// Offset the camera's local rotation by `(pitch, yaw, roll)` degrees.
    fn apply_camera_recoil(&mut self, euler_degrees: Vec3);
}
