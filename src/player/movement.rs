//! Bevy side of the locomotion controller: a [`CharacterMotor`] that sweeps
//! the player's collider through avian's query pipeline, and the per-frame
//! system.

use crate::input::InputSnapshot;
use crate::locomotion::{CharacterMotor, LocomotionController};
use crate::physics::{sweep_character, CharacterBody, CollisionIgnores, Projectile};
use crate::player::{Player, WindowCursor};
use avian3d::prelude::*;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Moves the player's transform through whatever `cast` reports.
pub struct BodyMotor<'a, C> {
    pub transform: &'a mut Transform,
    pub body: &'a mut CharacterBody,
    pub cast: C,
}

impl<C: FnMut(Vec3, Dir3, f32) -> Option<f32>> CharacterMotor for BodyMotor<'_, C> {
    fn is_grounded(&self) -> bool {
        self.body.grounded
    }

    fn orientation(&self) -> Quat {
        self.transform.rotation
    }

    fn move_by(&mut self, delta: Vec3) {
        let sweep = sweep_character(self.transform.translation, delta, &mut self.cast);
        self.transform.translation = sweep.position;
        self.body.grounded = sweep.grounded;
    }
}

/// Drive every player's [`LocomotionController`] for this frame. The
/// player's own collider, projectiles and anything paired with the player
/// in [`CollisionIgnores`] do not block the sweep.
#[allow(clippy::needless_pass_by_value, clippy::type_complexity)]
pub fn player_locomotion(
    time: Res<Time>,
    input: Res<InputSnapshot>,
    pipeline: Res<SpatialQueryPipeline>,
    ignores: Res<CollisionIgnores>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut players: Query<
        (Entity, &mut Transform, &mut CharacterBody, &Collider, &mut LocomotionController),
        With<Player>,
    >,
    projectiles: Query<Entity, With<Projectile>>,
) {
    let dt = time.delta_seconds();
    for (player, mut transform, mut body, collider, mut controller) in &mut players {
        let skip: Vec<Entity> = std::iter::once(player)
            .chain(ignores.partners(player))
            .chain(projectiles.iter())
            .collect();
        let filter = SpatialQueryFilter::default().with_excluded_entities(skip);
        let rotation = transform.rotation;

        let mut motor = BodyMotor {
            transform: &mut transform,
            body: &mut body,
            cast: |origin: Vec3, dir: Dir3, max: f32| {
                pipeline
                    .cast_shape(collider, origin, rotation, dir, max, true, filter.clone())
                    .map(|hit| hit.time_of_impact)
            },
        };
        let mut cursor = WindowCursor(windows.get_single_mut().ok());
        controller.update(dt, &input, &mut motor, &mut cursor);
    }
}

/// Capture the pointer once the player exists.
pub fn lock_cursor_on_start(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    players: Query<&LocomotionController, With<Player>>,
) {
    for controller in &players {
        controller.start(&mut WindowCursor(windows.get_single_mut().ok()));
    }
}
