//! The demo room: a floor, a few static walls, a stack of crates and the
//! player rig.
//!
//! Runs at `Startup`. The player body is a kinematic box with both
//! controllers; its camera child carries the hold anchor and the muzzle.
use avian3d::prelude::*;
use bevy::prelude::*;
use grabshot::interaction::InteractionController;
use grabshot::locomotion::LocomotionController;
use grabshot::physics::CharacterBody;
use grabshot::player::{
    HoldAnchor, Muzzle, Player, PlayerCamera, PlayerLook, ProjectileAssets, RecoilOffset,
};
use grabshot::settings::Settings;

pub const CRATE_COUNT: usize = 6;

const PLAYER_SIZE: Vec3 = Vec3::new(0.8, 1.8, 0.8);
const EYE_HEIGHT: f32 = 0.7;
const HOLD_DISTANCE: f32 = 2.0;
const MUZZLE_OFFSET: Vec3 = Vec3::new(0.3, -0.25, -0.8);

/// Spawn lights, static geometry, crates and the player.
#[allow(clippy::needless_pass_by_value)]
pub fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<Settings>,
) {
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight { shadows_enabled: true, ..default() },
        transform: Transform::from_xyz(8.0, 16.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
    commands.insert_resource(AmbientLight { color: Color::WHITE, brightness: 300.0 });

    let floor = settings.physics.floor_height;
    commands.spawn(PbrBundle {
        mesh: meshes.add(Plane3d::default().mesh().size(60.0, 60.0)),
        material: materials.add(Color::srgb(0.35, 0.38, 0.35)),
        transform: Transform::from_xyz(0.0, floor, 0.0),
        ..default()
    });
    // slab under the visible plane, top flush with it
    commands.spawn((
        TransformBundle::from_transform(Transform::from_xyz(0.0, floor - 0.5, 0.0)),
        RigidBody::Static,
        Collider::cuboid(60.0, 1.0, 60.0),
    ));

    // walls and a ledge
    let wall_material = materials.add(Color::srgb(0.55, 0.55, 0.6));
    for (size, center) in [
        (Vec3::new(30.0, 4.0, 1.0), Vec3::new(0.0, 2.0, -15.0)),
        (Vec3::new(1.0, 4.0, 30.0), Vec3::new(-15.0, 2.0, 0.0)),
        (Vec3::new(1.0, 4.0, 30.0), Vec3::new(15.0, 2.0, 0.0)),
        (Vec3::new(6.0, 1.0, 4.0), Vec3::new(6.0, 0.5, -6.0)),
    ] {
        commands.spawn((
            PbrBundle {
                mesh: meshes.add(Cuboid::from_size(size)),
                material: wall_material.clone(),
                transform: Transform::from_translation(center + Vec3::Y * floor),
                ..default()
            },
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
        ));
    }

    let crate_mesh = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
    let crate_material = materials.add(Color::srgb(0.6, 0.4, 0.2));
    #[allow(clippy::cast_precision_loss)]
    for i in 0..CRATE_COUNT {
        let x = (i % 3) as f32 * 1.5 - 1.5;
        let y = (i / 3) as f32 * 1.1 + 0.5 + floor;
        commands.spawn((
            PbrBundle {
                mesh: crate_mesh.clone(),
                material: crate_material.clone(),
                transform: Transform::from_xyz(x, y, -4.0),
                ..default()
            },
            RigidBody::Dynamic,
            Collider::cuboid(1.0, 1.0, 1.0),
            LinearDamping(settings.physics.linear_damping),
        ));
    }

    commands.insert_resource(ProjectileAssets {
        mesh: meshes.add(Sphere::new(0.05)),
        material: materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.85, 0.2),
            emissive: LinearRgba::rgb(4.0, 3.0, 0.5),
            ..default()
        }),
    });

    commands
        .spawn((
            SpatialBundle::from_transform(Transform::from_xyz(0.0, floor + PLAYER_SIZE.y * 0.5 + 0.05, 6.0)),
            Player,
            PlayerLook::default(),
            CharacterBody::default(),
            RigidBody::Kinematic,
            Collider::cuboid(PLAYER_SIZE.x, PLAYER_SIZE.y, PLAYER_SIZE.z),
            InteractionController::new(settings.interaction.clone()),
            LocomotionController::new(settings.locomotion.clone()),
        ))
        .with_children(|body| {
            body.spawn((
                Camera3dBundle {
                    transform: Transform::from_xyz(0.0, EYE_HEIGHT, 0.0),
                    ..default()
                },
                PlayerCamera,
                RecoilOffset::default(),
            ))
            .with_children(|camera| {
                camera.spawn((SpatialBundle::from_transform(Transform::from_xyz(0.0, 0.0, -HOLD_DISTANCE)), HoldAnchor));
                camera.spawn((SpatialBundle::from_transform(Transform::from_translation(MUZZLE_OFFSET)), Muzzle));
            });
        });

    info!("scene ready: {CRATE_COUNT} crates");
}
