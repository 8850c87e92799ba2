//! Mesh2d-based filled polygon rendering for gameplay entities.
//!
//! Every enemy, bullet, power-up, and boss projectile automatically receives
//! a retained GPU mesh shortly after spawning via `Added<T>` attach systems —
//! geometry is uploaded once and lives until the entity despawns, so the
//! per-frame cost stays flat even with busy waves.  Shockwave rings are the
//! one immediate-mode exception: an expanding outline redrawn per frame fits
//! gizmos better than re-uploading mesh geometry every tick.

use crate::boss::{BossProjectile, BossShockwave};
use crate::enemy::{Enemy, Shape};
use crate::player::{Bullet, Player};
use crate::powerup::PowerUp;
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};

pub struct ShapesPlugin;

impl Plugin for ShapesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                attach_enemy_mesh_system,
                attach_player_mesh_system,
                attach_bullet_mesh_system,
                attach_powerup_mesh_system,
                attach_projectile_mesh_system,
                shockwave_gizmo_system,
            ),
        );
    }
}

// ── Attach systems ────────────────────────────────────────────────────────────

/// Give each new enemy its archetype polygon in its archetype colour.
pub fn attach_enemy_mesh_system(
    mut commands: Commands,
    query: Query<(Entity, &Enemy), Added<Enemy>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for (entity, enemy) in query.iter() {
        let mesh_handle = meshes.add(filled_shape_mesh(&shape_outline(enemy.shape, enemy.radius)));
        let material_handle = materials.add(ColorMaterial::from_color(enemy.color));
        commands
            .entity(entity)
            .insert((Mesh2d(mesh_handle), MeshMaterial2d(material_handle)));
    }
}

/// The player is a blue disc.
pub fn attach_player_mesh_system(
    mut commands: Commands,
    config: Res<crate::config::GameConfig>,
    query: Query<Entity, Added<Player>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for entity in query.iter() {
        let mesh_handle = meshes.add(filled_shape_mesh(&shape_outline(
            Shape::Circle,
            config.player_radius,
        )));
        let material_handle =
            materials.add(ColorMaterial::from_color(Color::srgb(0.29, 0.56, 0.89)));
        commands
            .entity(entity)
            .insert((Mesh2d(mesh_handle), MeshMaterial2d(material_handle)));
    }
}

/// Bullets are small yellow discs.
pub fn attach_bullet_mesh_system(
    mut commands: Commands,
    query: Query<(Entity, &Bullet), Added<Bullet>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for (entity, bullet) in query.iter() {
        let mesh_handle = meshes.add(filled_shape_mesh(&shape_outline(
            Shape::Circle,
            bullet.radius,
        )));
        let material_handle = materials.add(ColorMaterial::from_color(Color::srgb(1.0, 1.0, 0.0)));
        commands
            .entity(entity)
            .insert((Mesh2d(mesh_handle), MeshMaterial2d(material_handle)));
    }
}

/// Power-ups render as discs in their kind colour.
pub fn attach_powerup_mesh_system(
    mut commands: Commands,
    query: Query<(Entity, &PowerUp), Added<PowerUp>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for (entity, powerup) in query.iter() {
        let mesh_handle = meshes.add(filled_shape_mesh(&shape_outline(
            Shape::Circle,
            powerup.radius,
        )));
        let material_handle = materials.add(ColorMaterial::from_color(powerup.kind.color()));
        commands
            .entity(entity)
            .insert((Mesh2d(mesh_handle), MeshMaterial2d(material_handle)));
    }
}

/// Boss projectiles carry the boss tier's colour.
pub fn attach_projectile_mesh_system(
    mut commands: Commands,
    query: Query<(Entity, &BossProjectile), Added<BossProjectile>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for (entity, projectile) in query.iter() {
        let mesh_handle = meshes.add(filled_shape_mesh(&shape_outline(
            Shape::Circle,
            projectile.radius,
        )));
        let material_handle = materials.add(ColorMaterial::from_color(projectile.color));
        commands
            .entity(entity)
            .insert((Mesh2d(mesh_handle), MeshMaterial2d(material_handle)));
    }
}

/// Redraw each live shockwave as an expanding outline, fading toward its
/// maximum radius.
pub fn shockwave_gizmo_system(mut gizmos: Gizmos, query: Query<(&Transform, &BossShockwave)>) {
    for (transform, wave) in query.iter() {
        let alpha = (1.0 - wave.radius / wave.max_radius).clamp(0.0, 1.0) * 0.8;
        let c = wave.color.to_srgba();
        gizmos.circle_2d(
            transform.translation.truncate(),
            wave.radius,
            Color::srgba(c.red, c.green, c.blue, alpha),
        );
    }
}

// ── Geometry helpers ──────────────────────────────────────────────────────────

/// Outline points (counter-clockwise) for an entity shape of the given
/// radius.
pub fn shape_outline(shape: Shape, radius: f32) -> Vec<Vec2> {
    let regular = |sides: u32, phase: f32| -> Vec<Vec2> {
        (0..sides)
            .map(|i| {
                let angle = i as f32 / sides as f32 * std::f32::consts::TAU + phase;
                Vec2::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect()
    };

    match shape {
        Shape::Circle => regular(24, 0.0),
        Shape::Triangle => regular(3, std::f32::consts::FRAC_PI_2),
        Shape::Square => regular(4, std::f32::consts::FRAC_PI_4),
        Shape::Diamond => regular(4, std::f32::consts::FRAC_PI_2),
        Shape::Hexagon => regular(6, 0.0),
        Shape::Octagon => regular(8, std::f32::consts::FRAC_PI_8),
        Shape::Star => {
            // Eight spikes alternating between the outer and half radius.
            let spikes = 8;
            (0..spikes * 2)
                .map(|i| {
                    let angle = i as f32 / (spikes * 2) as f32 * std::f32::consts::TAU
                        - std::f32::consts::FRAC_PI_2;
                    let r = if i % 2 == 0 { radius } else { radius * 0.5 };
                    Vec2::new(r * angle.cos(), r * angle.sin())
                })
                .collect()
        }
    }
}

/// Triangulate an outline into a renderable [`Mesh`] by fanning from the
/// centroid.  Valid for any polygon that is star-shaped about the origin,
/// which covers every outline produced by [`shape_outline`].
pub fn filled_shape_mesh(outline: &[Vec2]) -> Mesh {
    debug_assert!(outline.len() >= 3, "shape must have at least 3 vertices");

    let mut positions: Vec<[f32; 3]> = vec![[0.0, 0.0, 0.0]];
    positions.extend(outline.iter().map(|v| [v.x, v.y, 0.0]));

    let n = outline.len() as u32;
    let mut indices: Vec<u32> = Vec::with_capacity(n as usize * 3);
    for i in 1..=n {
        let next = if i == n { 1 } else { i + 1 };
        indices.extend_from_slice(&[0, i, next]);
    }

    let count = positions.len();
    let normals: Vec<[f32; 3]> = vec![[0.0, 0.0, 1.0]; count];
    // Map local coords to a rough 0–1 UV range for future texturing.
    let uvs: Vec<[f32; 2]> = positions
        .iter()
        .map(|p| [(p[0] / 100.0) + 0.5, (p[1] / 100.0) + 0.5])
        .collect();

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
