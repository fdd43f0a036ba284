//! Server-side game systems
//!
//! Connection lifecycle, input collection, and player simulation.

use bevy::prelude::*;
use lightyear::prelude::server::*;
use lightyear::prelude::*;
use std::collections::HashMap;

use shared::{
    apply_movement, arena, dummy_max_health, CancelStreamRequest, CastFailed, CastStreamRequest,
    DamageReceived, Dummy, DummyPosition, Health, Player, PlayerInput, PlayerPosition,
    PlayerRotation, StreamHit, DUMMY_REBUILD_TIME, FIXED_TIMESTEP_HZ,
};

/// How long to wait before respawning (seconds)
const RESPAWN_TIME: f32 = 4.0;

/// Component added to dead players while waiting to respawn
#[derive(Component)]
pub struct RespawnTimer {
    pub time_remaining: f32,
}

/// Component added to destroyed dummies until they are rebuilt in place
#[derive(Component)]
pub struct RebuildTimer {
    pub time_remaining: f32,
}

/// Stores the latest input for each connected client.
#[derive(Resource, Default)]
pub struct ClientInputs {
    pub latest: HashMap<PeerId, PlayerInput>,
}

/// Counts players ever spawned, to pick spawn-ring slots.
#[derive(Resource, Default)]
pub struct SpawnCounter(pub usize);

/// Handle new client connections: wire up message I/O and spawn the player.
///
/// Lightyear 0.25 requires ReplicationSender + the message components on the
/// connection entity (the one with `ClientOf` + `Connected`); without them,
/// no replication happens.
pub fn handle_connections(
    mut commands: Commands,
    mut spawn_counter: ResMut<SpawnCounter>,
    new_clients: Query<(Entity, &RemoteId), Added<Connected>>,
    client_filter: Query<(), With<ClientOf>>,
    existing_players: Query<&Player>,
) {
    for (client_entity, remote_id) in new_clients.iter() {
        // Skip if this isn't a client link (the server itself also connects)
        if client_filter.get(client_entity).is_err() {
            continue;
        }

        let peer_id = remote_id.0;
        info!("Client connected: {:?}", peer_id);

        commands.entity(client_entity).insert((
            // Replication out: server -> this client
            ReplicationSender::new(
                shared::protocol::tick_duration(),
                SendUpdatesMode::SinceLastAck,
                false,
            ),
            // Client -> Server
            MessageReceiver::<PlayerInput>::default(),
            MessageReceiver::<CastStreamRequest>::default(),
            MessageReceiver::<CancelStreamRequest>::default(),
            // Server -> Client
            MessageSender::<CastFailed>::default(),
            MessageSender::<StreamHit>::default(),
            MessageSender::<DamageReceived>::default(),
        ));

        // Reconnects reuse the same peer id; don't double-spawn.
        if existing_players.iter().any(|p| p.client_id == peer_id) {
            continue;
        }

        let spawn_pos = arena::spawn_position(spawn_counter.0);
        spawn_counter.0 += 1;

        commands.spawn((
            Player { client_id: peer_id },
            PlayerPosition(spawn_pos),
            PlayerRotation(0.0),
            Health::default(),
            Replicate::new(ReplicationMode::SingleServer(NetworkTarget::All)),
            ControlledBy {
                owner: client_entity,
                lifetime: Lifetime::default(),
            },
        ));

        info!("Spawned player for {:?} at {:?}", peer_id, spawn_pos);
    }
}

/// Drop cached input when a client disconnects. The player entity itself is
/// torn down by its `ControlledBy` lifetime.
pub fn handle_disconnections(
    trigger: On<Add, Disconnected>,
    client_entities: Query<&RemoteId>,
    mut inputs: ResMut<ClientInputs>,
) {
    let client_entity = trigger.entity;

    let Ok(remote_id) = client_entities.get(client_entity) else {
        warn!(
            "Disconnect trigger for entity {:?} but no RemoteId found",
            client_entity
        );
        return;
    };

    let peer_id = remote_id.0;
    info!("Client {:?} disconnected: {:?}", client_entity, peer_id);
    inputs.latest.remove(&peer_id);
}

/// Receive input messages from clients into the per-peer cache.
pub fn receive_client_input(
    mut inputs: ResMut<ClientInputs>,
    mut client_links: Query<(&RemoteId, &mut MessageReceiver<PlayerInput>), With<ClientOf>>,
) {
    for (remote_id, mut receiver) in client_links.iter_mut() {
        for input in receiver.receive() {
            inputs.latest.insert(remote_id.0, input);
        }
    }
}

/// Simulate all players
pub fn simulate_players(
    inputs: Res<ClientInputs>,
    mut players: Query<(
        &Player,
        &Health,
        &mut PlayerPosition,
        &mut PlayerRotation,
        Option<&RespawnTimer>,
    )>,
) {
    let dt = 1.0 / FIXED_TIMESTEP_HZ as f32;

    for (player, health, mut position, mut rotation, respawn_timer) in players.iter_mut() {
        // Dead players stay put until they respawn
        if !is_player_alive(health, respawn_timer) {
            continue;
        }

        let input = inputs
            .latest
            .get(&player.client_id)
            .cloned()
            .unwrap_or_default();

        apply_movement(&input, &mut position, &mut rotation, dt);
    }
}

// =============================================================================
// DEATH & RESPAWN
// =============================================================================

/// Check for dead players and start their respawn timers
pub fn check_player_deaths(
    mut commands: Commands,
    players: Query<(Entity, &Player, &Health), Without<RespawnTimer>>,
) {
    for (entity, player, health) in players.iter() {
        if health.is_dead() {
            info!("Player {:?} died! Starting respawn timer", player.client_id);
            commands.entity(entity).insert(RespawnTimer {
                time_remaining: RESPAWN_TIME,
            });
        }
    }
}

/// Tick respawn timers and respawn players when ready
pub fn tick_respawn_timers(
    mut commands: Commands,
    mut spawn_counter: ResMut<SpawnCounter>,
    mut players: Query<(
        Entity,
        &Player,
        &mut Health,
        &mut PlayerPosition,
        &mut RespawnTimer,
    )>,
) {
    let dt = 1.0 / FIXED_TIMESTEP_HZ as f32;

    for (entity, player, mut health, mut position, mut timer) in players.iter_mut() {
        timer.time_remaining -= dt;

        if timer.time_remaining <= 0.0 {
            info!("Respawning player {:?}", player.client_id);
            health.current = health.max;
            position.0 = arena::spawn_position(spawn_counter.0);
            spawn_counter.0 += 1;
            commands.entity(entity).remove::<RespawnTimer>();
        }
    }
}

/// Destroyed dummies sit broken for a while, then come back at full health.
pub fn check_dummy_deaths(
    mut commands: Commands,
    dummies: Query<(Entity, &Dummy, &Health), Without<RebuildTimer>>,
) {
    for (entity, dummy, health) in dummies.iter() {
        if health.is_dead() {
            info!("Dummy {} destroyed", dummy.id);
            commands.entity(entity).insert(RebuildTimer {
                time_remaining: DUMMY_REBUILD_TIME,
            });
        }
    }
}

/// Tick rebuild timers and restore dummies in place
pub fn tick_rebuild_timers(
    mut commands: Commands,
    mut dummies: Query<(Entity, &Dummy, &mut Health, &mut RebuildTimer), With<DummyPosition>>,
) {
    let dt = 1.0 / FIXED_TIMESTEP_HZ as f32;

    for (entity, dummy, mut health, mut timer) in dummies.iter_mut() {
        timer.time_remaining -= dt;

        if timer.time_remaining <= 0.0 {
            health.current = dummy_max_health(dummy.kind);
            commands.entity(entity).remove::<RebuildTimer>();
        }
    }
}

/// Skip input processing for dead players
pub fn is_player_alive(health: &Health, respawn_timer: Option<&RespawnTimer>) -> bool {
    !health.is_dead() && respawn_timer.is_none()
}

/// Helper to convert PeerId to u64 for owner tracking
pub fn peer_id_to_u64(peer_id: PeerId) -> u64 {
    match peer_id {
        PeerId::Netcode(id) => id,
        PeerId::Steam(id) => id,
        PeerId::Local(id) => id,
        PeerId::Entity(id) => id,
        PeerId::Raw(addr) => {
            // Hash the socket address to a u64
            use std::hash::{Hash, Hasher};
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            addr.hash(&mut hasher);
            hasher.finish()
        }
        PeerId::Server => 0,
    }
}
