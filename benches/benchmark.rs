use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bevy::prelude::{Dir3, Entity, Quat, Transform, Vec2, Vec3};
use grabshot::input::{ButtonState, InputSnapshot};
use grabshot::interaction::{
    CameraRig, Collaborator, InteractionConfig, InteractionController, InteractionHost, RayHit,
    SoundKind,
};
use grabshot::locomotion::{CharacterMotor, CursorControl, LocomotionConfig, LocomotionController};
use grabshot::physics::sweep_character;
use grabshot::player::camera::PlayerLook;
use grabshot::settings::ControlsSettings;

/// Host with one pickable box straight ahead; spawns are counted, not stored.
struct BenchHost {
    spawned: u32,
    pose: Transform,
}

impl InteractionHost for BenchHost {
    fn has_collaborator(&self, _which: Collaborator) -> bool {
        true
    }
    fn camera(&self) -> Option<CameraRig> {
        Some(CameraRig { position: Vec3::ZERO, forward: Vec3::NEG_Z })
    }
    fn raycast(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> Option<RayHit> {
        Some(RayHit { entity: Entity::from_raw(1), distance: 2.0, has_rigid_body: true, kinematic: false })
    }
    fn set_kinematic(&mut self, _entity: Entity, _kinematic: bool) {}
    fn ignore_player_collision(&mut self, _entity: Entity, _ignore: bool) {}
    fn attach_to_hold_anchor(&mut self, _entity: Entity) {}
    fn detach(&mut self, _entity: Entity) {}
    fn hold_target(&self) -> Option<Transform> {
        Some(Transform::from_xyz(0.0, 0.0, -2.0))
    }
    fn held_pose(&self, _entity: Entity) -> Option<Transform> {
        Some(self.pose)
    }
    fn set_held_pose(&mut self, _entity: Entity, pose: Transform) {
        self.pose = pose;
    }
    fn apply_impulse(&mut self, _entity: Entity, _impulse: Vec3) {}
    fn muzzle(&self) -> Option<Vec3> {
        Some(Vec3::new(0.3, -0.2, -1.0))
    }
    fn spawn_projectile(&mut self, _position: Vec3, _direction: Vec3, _speed: f32) -> Entity {
        self.spawned += 1;
        Entity::from_raw(self.spawned + 100)
    }
    fn schedule_despawn(&mut self, _entity: Entity, _after_secs: f32) {}
    fn play_sound(&mut self, _kind: SoundKind, _position: Vec3) {}
    fn set_status(&mut self, text: &str) {
        black_box(text);
    }
    fn apply_camera_recoil(&mut self, euler_degrees: Vec3) {
        black_box(euler_degrees);
    }
}

struct FloorMotor {
    position: Vec3,
    grounded: bool,
}

impl CharacterMotor for FloorMotor {
    fn is_grounded(&self) -> bool {
        self.grounded
    }
    fn orientation(&self) -> Quat {
        Quat::from_rotation_y(0.3)
    }
    fn move_by(&mut self, delta: Vec3) {
        let s = sweep_character(self.position, delta, floor_cast);
        self.position = s.position;
        self.grounded = s.grounded;
    }
}

/// Floor plane at y = 0 under a 1.8 m tall body.
fn floor_cast(origin: Vec3, dir: Dir3, max: f32) -> Option<f32> {
    let gap = origin.y - 0.9;
    (dir.y < 0.0 && gap <= max).then_some(gap.max(0.0))
}

struct NoCursor;

impl CursorControl for NoCursor {
    fn set_cursor_locked(&mut self, _locked: bool) {}
}

/// Randomized camera movement deltas (deterministic LCG) to approximate variable input
fn bench_camera_look_random(c: &mut Criterion) {
    let controls = ControlsSettings::default();
    c.bench_function("camera_look_random", |b| {
        b.iter(|| {
            let mut look = PlayerLook::default();
            let mut state: u32 = 0x1234_5678;
            for _ in 0..1_000usize {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let dx = (((state >> 16) & 0x7fff) as f32 / 32767.0) * 200.0 - 100.0;
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let dy = (((state >> 16) & 0x7fff) as f32 / 32767.0) * 200.0 - 100.0;
                look.apply_delta(black_box(Vec2::new(dx, dy)), &controls);
            }
            black_box((look.yaw, look.pitch));
        })
    });
}

/// One second of walking at 240 Hz against the floor plane.
fn bench_locomotion_walk(c: &mut Criterion) {
    let input = InputSnapshot { forward: 1.0, strafe: 0.5, ..Default::default() };
    c.bench_function("locomotion_walk_240", |b| {
        b.iter(|| {
            let mut ctrl = LocomotionController::new(LocomotionConfig::default());
            let mut motor = FloorMotor { position: Vec3::new(0.0, 0.9, 0.0), grounded: true };
            for _ in 0..240 {
                ctrl.update(1.0 / 240.0, &input, &mut motor, &mut NoCursor);
            }
            black_box(motor.position);
        })
    });
}

/// Hold the trigger through a full magazine and a reload.
fn bench_interaction_fire_cycle(c: &mut Criterion) {
    let fire = InputSnapshot { select_fire: true, ..Default::default() };
    let hold = InputSnapshot { primary: ButtonState::hold(), ..Default::default() };
    let reload = InputSnapshot { reload: true, ..Default::default() };

    c.bench_function("interaction_fire_cycle", |b| {
        b.iter(|| {
            let mut ctrl = InteractionController::with_seed(InteractionConfig::default(), 42);
            let mut host = BenchHost { spawned: 0, pose: Transform::IDENTITY };
            ctrl.update(0.0, &fire, &mut host);
            for _ in 0..400 {
                ctrl.update(1.0 / 64.0, &hold, &mut host);
            }
            ctrl.update(1.0 / 64.0, &reload, &mut host);
            for _ in 0..200 {
                ctrl.update(1.0 / 64.0, &InputSnapshot::default(), &mut host);
            }
            black_box((host.spawned, ctrl.weapon().ammo()));
        })
    });
}

/// Pick up, carry and charge a throw.
fn bench_interaction_carry(c: &mut Criterion) {
    let click = InputSnapshot { primary: ButtonState::press(), ..Default::default() };
    let charge = InputSnapshot { secondary: ButtonState::hold(), ..Default::default() };
    let throw = InputSnapshot { secondary: ButtonState::release(), ..Default::default() };

    c.bench_function("interaction_carry_throw", |b| {
        b.iter(|| {
            let mut ctrl = InteractionController::with_seed(InteractionConfig::default(), 1);
            let mut host = BenchHost { spawned: 0, pose: Transform::from_xyz(0.0, 0.0, -5.0) };
            ctrl.update(1.0 / 64.0, &click, &mut host);
            for _ in 0..128 {
                ctrl.update(1.0 / 64.0, &charge, &mut host);
            }
            ctrl.update(1.0 / 64.0, &throw, &mut host);
            black_box(host.pose);
        })
    });
}

criterion_group!(
    benches,
    bench_camera_look_random,
    bench_locomotion_walk,
    bench_interaction_fire_cycle,
    bench_interaction_carry,
);
criterion_main!(benches);
