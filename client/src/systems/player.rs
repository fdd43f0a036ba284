//! Player and dummy visuals
//!
//! Replicated entities arrive with components but no meshes; these systems
//! attach simple primitives and keep their transforms mirrored to the
//! replicated positions.

use bevy::prelude::*;
use lightyear::prelude::client::Connected;
use lightyear::prelude::*;

use shared::{
    Dummy, DummyKind, DummyPosition, Health, LocalPlayer, Player, PlayerPosition, PlayerRotation,
    DUMMY_HEIGHT, DUMMY_RADIUS, PLAYER_HEIGHT, PLAYER_RADIUS,
};

/// Marker: this replicated entity already has its visuals attached.
#[derive(Component)]
pub struct VisualsAttached;

/// Ensure exactly one `Player` entity is tagged as `LocalPlayer`, based on
/// our `LocalId`.
///
/// The first replicated `Player` can arrive while we're still connecting,
/// and insertion order can vary on higher-latency links, so this converges
/// every frame instead of relying on `Added` timing.
pub fn ensure_local_player_tag(
    mut commands: Commands,
    client_query: Query<&LocalId, (With<crate::GameClient>, With<Connected>)>,
    players: Query<(Entity, &Player)>,
    existing_local: Query<Entity, With<LocalPlayer>>,
) {
    let Some(our_peer_id) = client_query.iter().next().map(|r| r.0) else {
        return;
    };

    let Some(local_entity) = players
        .iter()
        .find(|(_, p)| p.client_id == our_peer_id)
        .map(|(e, _)| e)
    else {
        return;
    };

    for e in existing_local.iter() {
        if e != local_entity {
            commands.entity(e).remove::<LocalPlayer>();
        }
    }
    commands.entity(local_entity).insert(LocalPlayer);
}

/// Attach a capsule to every newly replicated player.
///
/// The local-or-remote color comes from comparing peer ids directly: the
/// `LocalPlayer` marker is inserted via deferred commands and may not be
/// visible yet on the frame a player first replicates in.
pub fn attach_player_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    client_query: Query<&LocalId, (With<crate::GameClient>, With<Connected>)>,
    new_players: Query<(Entity, &Player, &PlayerPosition), Without<VisualsAttached>>,
) {
    let our_peer_id = client_query.iter().next().map(|r| r.0);

    for (entity, player, position) in new_players.iter() {
        let color = if Some(player.client_id) == our_peer_id {
            Color::srgb(0.25, 0.55, 0.9)
        } else {
            Color::srgb(0.8, 0.35, 0.3)
        };

        let mesh = meshes.add(Capsule3d::new(PLAYER_RADIUS, PLAYER_HEIGHT - 2.0 * PLAYER_RADIUS));
        let material = materials.add(StandardMaterial {
            base_color: color,
            ..default()
        });

        commands.entity(entity).insert((
            VisualsAttached,
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(position.0 + Vec3::Y * (PLAYER_HEIGHT * 0.5)),
        ));

        info!("Attached visuals to replicated player {:?}", entity);
    }
}

/// Attach a post mesh to every newly replicated dummy.
pub fn attach_dummy_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    new_dummies: Query<(Entity, &Dummy, &DummyPosition), Without<VisualsAttached>>,
) {
    for (entity, dummy, position) in new_dummies.iter() {
        let color = match dummy.kind {
            DummyKind::Straw => Color::srgb(0.85, 0.75, 0.4),
            DummyKind::Wooden => Color::srgb(0.6, 0.45, 0.3),
            DummyKind::IronBound => Color::srgb(0.5, 0.5, 0.55),
        };

        let mesh = meshes.add(Cylinder::new(DUMMY_RADIUS, DUMMY_HEIGHT));
        let material = materials.add(StandardMaterial {
            base_color: color,
            ..default()
        });

        commands.entity(entity).insert((
            VisualsAttached,
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(position.0 + Vec3::Y * (DUMMY_HEIGHT * 0.5)),
        ));
    }
}

/// Mirror replicated player state into render transforms.
pub fn sync_player_transforms(
    mut players: Query<
        (&PlayerPosition, &PlayerRotation, &Health, &mut Transform),
        With<Player>,
    >,
) {
    for (position, rotation, health, mut transform) in players.iter_mut() {
        transform.translation = position.0 + Vec3::Y * (PLAYER_HEIGHT * 0.5);
        transform.rotation = Quat::from_rotation_y(rotation.0);

        // Dead players slump until the server respawns them
        transform.scale = if health.is_dead() {
            Vec3::new(1.0, 0.3, 1.0)
        } else {
            Vec3::ONE
        };
    }
}

/// Mirror replicated dummy state into render transforms.
pub fn sync_dummy_transforms(
    mut dummies: Query<(&DummyPosition, &Health, &mut Transform), With<Dummy>>,
) {
    for (position, health, mut transform) in dummies.iter_mut() {
        transform.translation = position.0 + Vec3::Y * (DUMMY_HEIGHT * 0.5);

        // Destroyed dummies collapse to a stump until rebuilt
        transform.scale = if health.is_dead() {
            Vec3::new(1.2, 0.15, 1.2)
        } else {
            Vec3::ONE
        };
    }
}
