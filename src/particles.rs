//! Particle effects: kill bursts, dash sparks, muzzle flashes, and teleport
//! rings.
//!
//! Particles are lightweight ECS entities with a [`Particle`] component that
//! stores velocity, age, and colour.  Spawn helpers take only `&mut Commands`;
//! `attach_particle_mesh_system` supplies the shared `Mesh2d` one frame
//! later, which is imperceptible at 60 Hz.  A single shared circle mesh
//! avoids per-particle mesh allocation; each particle gets its own
//! `ColorMaterial` so alpha can fade individually.

use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use rand::Rng;

// ── Resources ────────────────────────────────────────────────────────────────

/// Shared circle mesh used by all particle entities (created once at startup).
#[derive(Resource)]
pub struct ParticleMesh(pub Handle<Mesh>);

// ── Component ────────────────────────────────────────────────────────────────

/// Short-lived visual particle entity.
#[derive(Component)]
pub struct Particle {
    /// World-space velocity (units/s).
    pub velocity: Vec2,
    /// Time alive so far (s).
    pub age: f32,
    /// Total lifetime (s); entity is despawned when `age >= lifetime`.
    pub lifetime: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// Handle to this particle's unique material so the update system can
    /// fade its alpha.  `None` until the mesh-attach system runs.
    pub material: Option<Handle<ColorMaterial>>,
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct ParticlesPlugin;

impl Plugin for ParticlesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, init_particle_mesh).add_systems(
            Update,
            (attach_particle_mesh_system, particle_update_system).chain(),
        );
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Create the shared circle mesh and store it as a [`ParticleMesh`] resource.
fn init_particle_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let handle = meshes.add(circle_mesh(2.5, 6));
    commands.insert_resource(ParticleMesh(handle));
}

/// Attach `Mesh2d` + `MeshMaterial2d` to every newly-spawned [`Particle`].
pub fn attach_particle_mesh_system(
    mut commands: Commands,
    particle_mesh: Res<ParticleMesh>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &mut Particle), Added<Particle>>,
) {
    for (entity, mut particle) in query.iter_mut() {
        let mat_handle = materials.add(ColorMaterial::from_color(Color::srgba(
            particle.r, particle.g, particle.b, 1.0,
        )));
        particle.material = Some(mat_handle.clone());
        commands
            .entity(entity)
            .insert((Mesh2d(particle_mesh.0.clone()), MeshMaterial2d(mat_handle)));
    }
}

/// Advance all particles: translate by velocity, fade alpha quadratically,
/// and despawn any whose age has exceeded their lifetime.
pub fn particle_update_system(
    mut commands: Commands,
    time: Res<Time>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &mut Transform, &mut Particle)>,
) {
    let dt = time.delta_secs();

    for (entity, mut transform, mut particle) in query.iter_mut() {
        particle.age += dt;

        if particle.age >= particle.lifetime {
            commands.entity(entity).despawn();
            continue;
        }

        transform.translation.x += particle.velocity.x * dt;
        transform.translation.y += particle.velocity.y * dt;

        // Quadratic ease-out alpha: bright at birth, rapid fade at end.
        let t = particle.age / particle.lifetime;
        let alpha = (1.0 - t).powi(2);

        if let Some(ref handle) = particle.material {
            if let Some(mat) = materials.get_mut(handle) {
                mat.color = Color::srgba(particle.r, particle.g, particle.b, alpha);
            }
        }
    }
}

// ── Public spawn helpers ──────────────────────────────────────────────────────

fn spawn_burst(
    commands: &mut Commands,
    pos: Vec2,
    count: u32,
    speed_range: std::ops::Range<f32>,
    rgb: (f32, f32, f32),
) {
    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let speed = rng.gen_range(speed_range.clone());
        let velocity = Vec2::new(angle.cos(), angle.sin()) * speed;
        let lifetime = rng.gen_range(0.25_f32..0.55_f32);
        let offset = Vec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0));

        commands.spawn((
            Particle {
                velocity,
                age: 0.0,
                lifetime,
                r: rgb.0,
                g: rgb.1,
                b: rgb.2,
                material: None,
            },
            Transform::from_translation((pos + offset).extend(0.9)),
            Visibility::default(),
        ));
    }
}

/// Burst at a kill site, tinted by the enemy's colour and scaled up with the
/// active combo (capped so mega-combos stay affordable).
pub fn spawn_kill_particles(commands: &mut Commands, pos: Vec2, color: Color, combo: u32) {
    let c = color.to_srgba();
    let count = (15 + combo * 2).min(50);
    spawn_burst(commands, pos, count, 60.0..240.0, (c.red, c.green, c.blue));
}

/// Blue sparks trailing an active dash.
pub fn spawn_dash_particles(commands: &mut Commands, pos: Vec2, count: u32) {
    spawn_burst(commands, pos, count, 40.0..160.0, (0.29, 0.56, 0.89));
}

/// Brief orange flash at the muzzle when a shot fires.
pub fn spawn_muzzle_particles(commands: &mut Commands, pos: Vec2, direction: Vec2) {
    let mut rng = rand::thread_rng();
    for _ in 0..5 {
        let spread = rng.gen_range(-0.6_f32..0.6_f32);
        let angle = direction.y.atan2(direction.x) + spread;
        let speed = rng.gen_range(120.0_f32..260.0_f32);

        commands.spawn((
            Particle {
                velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
                age: 0.0,
                lifetime: rng.gen_range(0.1_f32..0.2_f32),
                r: 1.0,
                g: 0.67,
                b: 0.0,
                material: None,
            },
            Transform::from_translation(pos.extend(0.9)),
            Visibility::default(),
        ));
    }
}

/// Paired departure/arrival rings for a teleporting enemy.
pub fn spawn_teleport_particles(commands: &mut Commands, from: Vec2, to: Vec2) {
    spawn_burst(commands, from, 8, 30.0..120.0, (1.0, 0.42, 0.62));
    spawn_burst(commands, to, 8, 30.0..120.0, (1.0, 0.42, 0.62));
}

// ── Geometry helper ───────────────────────────────────────────────────────────

/// Small filled circle approximated by a triangle fan.
fn circle_mesh(radius: f32, segments: u32) -> Mesh {
    let mut positions: Vec<[f32; 3]> = vec![[0.0, 0.0, 0.0]];
    let mut indices: Vec<u32> = Vec::new();

    for i in 0..=segments {
        let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
        positions.push([radius * angle.cos(), radius * angle.sin(), 0.0]);
    }
    for i in 1..=segments {
        indices.extend_from_slice(&[0, i, i + 1]);
    }

    let n = positions.len();
    let normals: Vec<[f32; 3]> = vec![[0.0, 0.0, 1.0]; n];
    let uvs: Vec<[f32; 2]> = positions.iter().map(|p| [p[0] * 0.5 + 0.5, p[1] * 0.5 + 0.5]).collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
