//! Connection systems

use bevy::prelude::*;
use lightyear::prelude::client::*;
use lightyear::prelude::*;
use std::net::SocketAddr;

use shared::{
    CancelStreamRequest, CastFailed, CastStreamRequest, DamageReceived, PlayerInput, StreamHit,
    PRIVATE_KEY, PROTOCOL_ID, SERVER_ADDR, SERVER_PORT,
};

use crate::states::GameState;

/// Start connection to the server.
///
/// In Lightyear 0.25, we spawn a Client entity with the networking
/// components and then trigger the Connect event.
pub fn start_connection(
    mut commands: Commands,
    existing_clients: Query<Entity, With<crate::GameClient>>,
) {
    // The server address can be overridden for LAN play.
    let server_ip = std::env::var("TIDEBREAK_SERVER").unwrap_or_else(|_| SERVER_ADDR.to_string());
    info!("Initiating connection to server at {}:{}...", server_ip, SERVER_PORT);

    // Ensure we only ever have ONE GameClient entity; stale ones from a
    // previous attempt would break `Query::single()` calls everywhere.
    for e in existing_clients.iter() {
        commands.entity(e).despawn();
    }

    let server_addr: SocketAddr = format!("{}:{}", server_ip, SERVER_PORT)
        .parse()
        .expect("Invalid server address");
    let local_addr: SocketAddr = "0.0.0.0:0".parse().unwrap();

    // Generate a unique client ID
    let client_id = rand::random::<u64>();

    let auth = Authentication::Manual {
        server_addr,
        protocol_id: PROTOCOL_ID,
        private_key: PRIVATE_KEY,
        client_id,
    };

    let client_entity = commands
        .spawn((
            crate::GameClient,
            Client::default(),
            UdpIo::default(),
            LocalAddr(local_addr),
            PeerAddr(server_addr),
            NetcodeClient::new(auth, NetcodeConfig::default())
                .expect("Failed to create netcode client"),
            // IMPORTANT: enable replication receive on this client.
            // Without this, no replicated entities ever arrive.
            ReplicationReceiver::default(),
            // Client -> Server
            MessageSender::<PlayerInput>::default(),
            MessageSender::<CastStreamRequest>::default(),
            MessageSender::<CancelStreamRequest>::default(),
            // Server -> Client
            MessageReceiver::<CastFailed>::default(),
            MessageReceiver::<StreamHit>::default(),
            MessageReceiver::<DamageReceived>::default(),
        ))
        .id();

    commands.trigger(Connect {
        entity: client_entity,
    });

    info!("Client entity spawned, client_id: {}", client_id);
}

/// Track connection status and flip game state accordingly.
pub fn check_connection(
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    new_connections: Query<Entity, (With<crate::GameClient>, Added<Connected>)>,
    new_disconnections: Query<Entity, (With<crate::GameClient>, Added<Disconnected>)>,
) {
    for _entity in new_connections.iter() {
        info!("Connected to server!");
        next_state.set(GameState::Playing);
    }

    for _entity in new_disconnections.iter() {
        match state.get() {
            // Dropping back to Connecting re-runs start_connection on enter
            GameState::Playing => {
                warn!("Lost connection to server; reconnecting");
                next_state.set(GameState::Connecting);
            }
            GameState::Connecting => {
                error!("Could not reach the server at startup");
            }
        }
    }
}
