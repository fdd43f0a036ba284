//! Stream effect visuals
//!
//! Droplet particles for replicated stream entities. The spawn rate mirrors
//! the server-published `StreamEmission` value exactly; the client never
//! recomputes falloff, so a beam that dims on the server dims here too.

use bevy::prelude::*;
use rand::Rng;

use shared::{StreamEmission, StreamPosition, StreamRotation, StreamType, WaterStream};

/// Height of the "nozzle" above the caster's feet.
const NOZZLE_HEIGHT: f32 = 1.1;

/// Droplet flight speed in m/s.
const DROPLET_SPEED: f32 = 14.0;

// =============================================================================
// COMPONENTS & RESOURCES
// =============================================================================

/// Per-stream particle spawner state.
#[derive(Component, Default)]
pub struct DropletEmitter {
    /// Fractional droplets owed from previous frames
    pub debt: f32,
}

/// A single water droplet (client-side only, never replicated).
#[derive(Component)]
pub struct Droplet {
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub velocity: Vec3,
    pub initial_scale: f32,
}

/// Pre-made assets for droplets (avoid recreating each frame)
#[derive(Resource)]
pub struct StreamVfxAssets {
    pub droplet_mesh: Handle<Mesh>,
    pub jet_material: Handle<StandardMaterial>,
    pub geyser_material: Handle<StandardMaterial>,
}

// =============================================================================
// SETUP
// =============================================================================

/// Create droplet assets on startup
pub fn setup_stream_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let droplet_mesh = meshes.add(Sphere::new(0.09));

    let jet_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.35, 0.6, 0.95, 0.8),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });
    let geyser_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.3, 0.85, 0.8, 0.8),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    commands.insert_resource(StreamVfxAssets {
        droplet_mesh,
        jet_material,
        geyser_material,
    });
}

// =============================================================================
// STREAM ENTITIES
// =============================================================================

/// Give newly replicated stream entities a transform and an emitter.
///
/// Convergent (`Without<DropletEmitter>`) rather than `Added`-driven, so a
/// stream whose components straggle in across frames still gets picked up.
pub fn attach_streams(
    mut commands: Commands,
    new_streams: Query<
        (Entity, &WaterStream, &StreamPosition, &StreamRotation),
        Without<DropletEmitter>,
    >,
) {
    for (entity, stream, position, rotation) in new_streams.iter() {
        commands.entity(entity).insert((
            Transform::from_translation(position.0 + Vec3::Y * NOZZLE_HEIGHT)
                .with_rotation(Quat::from_rotation_y(rotation.0)),
            Visibility::default(),
            DropletEmitter::default(),
        ));
        info!(
            "Stream effect appeared ({:?}, owner {})",
            stream.stream_type, stream.owner_id
        );
    }
}

/// Follow the replicated anchor. Rotation is fixed for the stream's life but
/// mirrored anyway - the value is authoritative, not inferred.
pub fn sync_stream_transforms(
    mut streams: Query<(&StreamPosition, &StreamRotation, &mut Transform), With<WaterStream>>,
) {
    for (position, rotation, mut transform) in streams.iter_mut() {
        transform.translation = position.0 + Vec3::Y * NOZZLE_HEIGHT;
        transform.rotation = Quat::from_rotation_y(rotation.0);
    }
}

// =============================================================================
// DROPLETS
// =============================================================================

/// Emit droplets at the server-published rate.
pub fn spawn_droplets(
    mut commands: Commands,
    assets: Option<Res<StreamVfxAssets>>,
    mut streams: Query<(&WaterStream, &StreamEmission, &Transform, &mut DropletEmitter)>,
    time: Res<Time>,
) {
    let Some(assets) = assets else { return };
    let mut rng = rand::thread_rng();

    for (stream, emission, transform, mut emitter) in streams.iter_mut() {
        emitter.debt += emission.0 * time.delta_secs();
        let count = emitter.debt.floor() as u32;
        emitter.debt -= count as f32;

        let stats = stream.stream_type.stats();
        let half_angle = ((stats.cast_width * 0.5) / stats.cast_length).atan();
        let material = match stream.stream_type {
            StreamType::WaterJet => assets.jet_material.clone(),
            StreamType::Geyser => assets.geyser_material.clone(),
        };

        for _ in 0..count {
            // Fan the droplets through the beam's angular width
            let spread: f32 = rng.gen_range(-half_angle..half_angle);
            let speed: f32 = DROPLET_SPEED * rng.gen_range(0.85..1.1);
            let velocity = (Quat::from_rotation_y(spread) * transform.forward().as_vec3()) * speed;

            let max_lifetime = stats.cast_length / DROPLET_SPEED;
            let initial_scale = rng.gen_range(0.7..1.3);

            commands.spawn((
                Droplet {
                    lifetime: max_lifetime,
                    max_lifetime,
                    velocity,
                    initial_scale,
                },
                Mesh3d(assets.droplet_mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(transform.translation).with_scale(Vec3::splat(initial_scale)),
            ));
        }
    }
}

/// Move, sag, shrink, and despawn droplets.
pub fn update_droplets(
    mut commands: Commands,
    mut droplets: Query<(Entity, &mut Droplet, &mut Transform)>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (entity, mut droplet, mut transform) in droplets.iter_mut() {
        droplet.lifetime -= dt;
        if droplet.lifetime <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }

        // Slight sag toward the ground near the end of flight
        droplet.velocity.y -= 2.5 * dt;
        let step = droplet.velocity * dt;
        transform.translation += step;

        let t = droplet.lifetime / droplet.max_lifetime;
        transform.scale = Vec3::splat(droplet.initial_scale * (0.4 + 0.6 * t));
    }
}
