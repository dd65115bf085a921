//! Bevy side of the interaction controller.
//!
//! [`InteractionWorld`] bundles every query and resource the controller may
//! touch and implements [`InteractionHost`] over them, with avian doing the
//! ray casts, body modes and impulses. Held objects are parented to the
//! [`HoldAnchor`]; poses handed to the controller are in world space and
//! converted to anchor-local on write.

use avian3d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::input::InputSnapshot;
use crate::interaction::{
    CameraRig, Collaborator, InteractionController, InteractionHost, RayHit, SoundKind,
};
use crate::physics::{CollisionIgnores, Lifetime, Projectile};
use crate::player::{HoldAnchor, Muzzle, Player, PlayerCamera, RecoilOffset};
use crate::settings::Settings;
use crate::ui::StatusText;

const PROJECTILE_RADIUS: f32 = 0.05;

/// A one-shot sound request for whatever mixer the game plugs in.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub kind: SoundKind,
    pub position: Vec3,
    pub volume: f32,
}

/// Mesh and material shared by every projectile.
#[derive(Resource, Clone)]
pub struct ProjectileAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

#[derive(SystemParam)]
pub struct InteractionWorld<'w, 's> {
    commands: Commands<'w, 's>,
    settings: Res<'w, Settings>,
    pipeline: Res<'w, SpatialQueryPipeline>,
    ignores: ResMut<'w, CollisionIgnores>,
    projectile_assets: Option<Res<'w, ProjectileAssets>>,
    sounds: EventWriter<'w, SoundCue>,
    players: Query<'w, 's, Entity, (With<Player>, With<Collider>)>,
    projectiles: Query<'w, 's, Entity, With<Projectile>>,
    cameras: Query<'w, 's, &'static GlobalTransform, With<PlayerCamera>>,
    recoil: Query<'w, 's, &'static mut RecoilOffset, With<PlayerCamera>>,
    anchors: Query<'w, 's, (Entity, &'static GlobalTransform), With<HoldAnchor>>,
    muzzles: Query<'w, 's, &'static GlobalTransform, With<Muzzle>>,
    objects: Query<
        'w,
        's,
        (
            &'static GlobalTransform,
            &'static mut Transform,
            Option<&'static mut RigidBody>,
            Option<&'static mut LinearVelocity>,
            Option<&'static mut AngularVelocity>,
            Option<&'static Parent>,
        ),
        (With<Collider>, Without<Player>, Without<Projectile>),
    >,
    status: Query<'w, 's, &'static mut Text, With<StatusText>>,
}

impl InteractionHost for InteractionWorld<'_, '_> {
    fn has_collaborator(&self, which: Collaborator) -> bool {
        match which {
            Collaborator::Camera => !self.cameras.is_empty(),
            Collaborator::PlayerCollider => !self.players.is_empty(),
            Collaborator::HoldAnchor => !self.anchors.is_empty(),
            Collaborator::Muzzle => !self.muzzles.is_empty(),
            Collaborator::StatusDisplay => !self.status.is_empty(),
            Collaborator::SoundEmitter => self.settings.audio.cues_enabled,
        }
    }

    fn camera(&self) -> Option<CameraRig> {
        let gt = self.cameras.get_single().ok()?;
        Some(CameraRig { position: gt.translation(), forward: *gt.forward() })
    }

    /// Static geometry is hit like anything else but reports no movable body.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let dir = Dir3::new(direction).ok()?;
        let skip: Vec<Entity> = self.players.iter().chain(self.projectiles.iter()).collect();
        let filter = SpatialQueryFilter::default().with_excluded_entities(skip);
        let hit = self.pipeline.cast_ray(origin, dir, max_distance, true, filter)?;

        let body = self.objects.get(hit.entity).ok().and_then(|(_, _, body, ..)| body);
        Some(RayHit {
            entity: hit.entity,
            distance: hit.time_of_impact,
            has_rigid_body: matches!(body, Some(RigidBody::Dynamic | RigidBody::Kinematic)),
            kinematic: matches!(body, Some(RigidBody::Kinematic)),
        })
    }

    fn set_kinematic(&mut self, entity: Entity, kinematic: bool) {
        let Ok((_, _, Some(mut body), linear, angular, _)) = self.objects.get_mut(entity) else {
            return;
        };
        *body = if kinematic { RigidBody::Kinematic } else { RigidBody::Dynamic };
        if let Some(mut v) = linear {
            v.0 = Vec3::ZERO;
        }
        if let Some(mut w) = angular {
            w.0 = Vec3::ZERO;
        }
    }

    fn ignore_player_collision(&mut self, entity: Entity, ignore: bool) {
        if let Ok(player) = self.players.get_single() {
            self.ignores.set(player, entity, ignore);
        }
    }

    fn attach_to_hold_anchor(&mut self, entity: Entity) {
        if let Ok((anchor, _)) = self.anchors.get_single() {
            self.commands.entity(entity).set_parent_in_place(anchor);
        }
    }

    fn detach(&mut self, entity: Entity) {
        if let Some(mut ec) = self.commands.get_entity(entity) {
            ec.remove_parent_in_place();
        }
    }

    fn hold_target(&self) -> Option<Transform> {
        self.anchors.get_single().ok().map(|(_, gt)| gt.compute_transform())
    }

    fn held_pose(&self, entity: Entity) -> Option<Transform> {
        self.objects.get(entity).ok().map(|(gt, ..)| gt.compute_transform())
    }

    fn set_held_pose(&mut self, entity: Entity, pose: Transform) {
        let anchor = self.anchors.get_single().ok().map(|(e, gt)| (e, *gt));
        let Ok((_, mut transform, .., parent)) = self.objects.get_mut(entity) else {
            return;
        };
        *transform = match (anchor, parent) {
            (Some((a, anchor_gt)), Some(p)) if p.get() == a => GlobalTransform::from(pose).reparented_to(&anchor_gt),
            // parenting is still queued
            _ => pose,
        };
    }

    /// The throw force acts for `physics.force_step` seconds.
    fn apply_impulse(&mut self, entity: Entity, impulse: Vec3) {
        let step = self.settings.physics.force_step;
        if let Some(mut ec) = self.commands.get_entity(entity) {
            ec.insert(ExternalImpulse::new(impulse * step));
        }
    }

    fn muzzle(&self) -> Option<Vec3> {
        self.muzzles.get_single().ok().map(GlobalTransform::translation)
    }

    fn spawn_projectile(&mut self, position: Vec3, direction: Vec3, speed: f32) -> Entity {
        let transform = Transform::from_translation(position).looking_to(direction, Vec3::Y);
        let physics = (
            RigidBody::Dynamic,
            Collider::sphere(PROJECTILE_RADIUS),
            LinearVelocity(direction.normalize_or_zero() * speed),
            GravityScale(0.0),
            Projectile,
        );

        match self.projectile_assets.as_deref() {
            Some(assets) => self
                .commands
                .spawn((
                    PbrBundle {
                        mesh: assets.mesh.clone(),
                        material: assets.material.clone(),
                        transform,
                        ..default()
                    },
                    physics,
                ))
                .id(),
            None => self.commands.spawn((SpatialBundle::from_transform(transform), physics)).id(),
        }
    }

    fn schedule_despawn(&mut self, entity: Entity, after_secs: f32) {
        if let Some(mut ec) = self.commands.get_entity(entity) {
            ec.insert(Lifetime::seconds(after_secs));
        }
    }

    fn play_sound(&mut self, kind: SoundKind, position: Vec3) {
        let audio = &self.settings.audio;
        if audio.cues_enabled {
            self.sounds.send(SoundCue { kind, position, volume: audio.cue_volume() });
        }
    }

    fn set_status(&mut self, text: &str) {
        if let Ok(mut status) = self.status.get_single_mut() {
            if let Some(section) = status.sections.first_mut() {
                if section.value != text {
                    section.value = text.to_string();
                }
            }
        }
    }

    fn apply_camera_recoil(&mut self, euler_degrees: Vec3) {
        for mut offset in &mut self.recoil {
            offset.0 = euler_degrees;
        }
    }
}

/// Drive every player's [`InteractionController`] for this frame.
#[allow(clippy::needless_pass_by_value)]
pub fn player_interaction(
    time: Res<Time>,
    input: Res<InputSnapshot>,
    mut controllers: Query<&mut InteractionController, With<Player>>,
    mut host: InteractionWorld,
) {
    let dt = time.delta_seconds();
    for mut controller in &mut controllers {
        controller.update(dt, &input, &mut host);
    }
}

/// Log, once, every collaborator the scene does not provide.
pub fn report_missing_collaborators(host: InteractionWorld, controllers: Query<(), With<InteractionController>>) {
    if controllers.is_empty() {
        warn!("no player with an interaction controller in the scene");
        return;
    }
    for missing in InteractionController::missing_collaborators(&host) {
        if missing.0.is_required() {
            error!("{missing}");
        } else {
            warn!("{missing}");
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn log_sound_cues(mut cues: EventReader<SoundCue>) {
    for cue in cues.read() {
        debug!("sound {:?} at {:.2} (volume {:.2})", cue.kind, cue.position, cue.volume);
    }
}
