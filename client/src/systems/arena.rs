//! Static arena visuals: floor, crates, light.
//!
//! Rendered from the same shared layout the server validates against, so
//! what blocks your cast on screen is exactly what blocks it authoritatively.

use bevy::prelude::*;
use shared::arena::{self, ARENA_RADIUS};

pub fn setup_arena(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Floor disc
    let floor_mesh = meshes.add(Cylinder::new(ARENA_RADIUS, 0.1));
    let floor_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.35, 0.42, 0.38),
        perceptual_roughness: 0.95,
        ..default()
    });
    commands.spawn((
        Mesh3d(floor_mesh),
        MeshMaterial3d(floor_material),
        Transform::from_xyz(0.0, -0.05, 0.0),
    ));

    // Crates and walls from the shared layout
    let crate_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.42, 0.28),
        perceptual_roughness: 0.9,
        ..default()
    });
    for blocker in arena::blockers() {
        let mesh = meshes.add(Cuboid::new(
            blocker.half_extents.x * 2.0,
            blocker.height,
            blocker.half_extents.y * 2.0,
        ));
        commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(crate_material.clone()),
            Transform::from_xyz(blocker.center.x, blocker.height * 0.5, blocker.center.y)
                .with_rotation(Quat::from_rotation_y(-blocker.rotation)),
        ));
    }

    // Key light + soft fill
    commands.spawn((
        DirectionalLight {
            illuminance: 12_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(20.0, 40.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.7, 0.8, 0.9),
        brightness: 250.0,
        ..default()
    });

    commands.insert_resource(ClearColor(Color::srgb(0.06, 0.09, 0.12)));
}
