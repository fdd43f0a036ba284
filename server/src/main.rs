//! Game server - headless Bevy app that owns the arena.
//!
//! Everything that mutates game state runs here: player simulation, stream
//! channels, damage, respawns. Clients only ever see replicated components
//! and feedback messages.

mod stream;
mod systems;
mod world;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use lightyear::prelude::server::*;
use lightyear::prelude::*;
use shared::{
    protocol::{get_server_bind_addr, tick_duration},
    ProtocolPlugin, PRIVATE_KEY, PROTOCOL_ID, SERVER_PORT,
};
use std::net::SocketAddr;

use systems::{ClientInputs, SpawnCounter};

/// Marker for our server entity
#[derive(Component)]
struct GameServer;

/// Spawn the server entity with all required networking components
fn spawn_server(mut commands: Commands) {
    let bind_addr = get_server_bind_addr();
    let server_addr: SocketAddr = format!("{}:{}", bind_addr, SERVER_PORT)
        .parse()
        .expect("Invalid server bind address");

    info!("Spawning server entity, binding to {:?}", server_addr);

    commands.spawn((
        GameServer,
        Server::default(),
        ServerUdpIo::default(),
        LocalAddr(server_addr),
        NetcodeServer::new(NetcodeConfig {
            protocol_id: PROTOCOL_ID,
            private_key: PRIVATE_KEY,
            ..default()
        }),
    ));
}

/// Start the server after it's spawned
fn start_server(
    mut commands: Commands,
    server_query: Query<Entity, (With<GameServer>, Without<Started>, Without<Starting>)>,
) {
    for server_entity in server_query.iter() {
        info!("Starting server...");
        commands.trigger(Start {
            entity: server_entity,
        });
    }
}

/// Check if server is started (run condition)
fn server_is_started(server_query: Query<(), (With<GameServer>, With<Started>)>) -> bool {
    !server_query.is_empty()
}

fn main() {
    let mut app = App::new();

    // Headless plugins (no rendering)
    // IMPORTANT: run the main loop at the same rate as our fixed tick.
    //
    // If the headless app runs "as fast as possible", Bevy clears the
    // `MessageReceiver` buffers every frame (in `Last`), but gameplay reads
    // messages in `FixedUpdate`. When frames >> fixed ticks, most inputs and
    // cast requests get cleared before `FixedUpdate` runs.
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick_duration())));
    app.add_plugins(bevy::log::LogPlugin::default());
    app.add_plugins(bevy::state::app::StatesPlugin);

    // Server-side input cache + spawn slot counter
    app.init_resource::<ClientInputs>();
    app.init_resource::<SpawnCounter>();

    // Lightyear server plugins (tick_duration = 60Hz)
    app.add_plugins(ServerPlugins {
        tick_duration: tick_duration(),
    });

    // Protocol plugin (component/message registration)
    app.add_plugins(ProtocolPlugin);

    // Game systems
    app.add_systems(Startup, (world::setup_world, spawn_server));

    // Start server after spawning
    app.add_systems(Update, start_server);

    // Spawn dummies after the server is started
    app.add_systems(Update, world::spawn_dummies_once.run_if(server_is_started));

    // Fixed tick: receive inputs, simulate players, then drive the streams.
    // Cancel handling runs before the tick driver so a stop request can
    // never land in the middle of a damage sweep.
    app.add_systems(
        FixedUpdate,
        (
            systems::handle_connections,
            systems::receive_client_input,
            systems::simulate_players,
            stream::handle_cast_requests,
            stream::handle_cancel_requests,
            stream::expire_orphaned_streams,
            stream::tick_streams,
            systems::check_player_deaths,
            systems::tick_respawn_timers,
            systems::check_dummy_deaths,
            systems::tick_rebuild_timers,
        )
            .chain()
            .run_if(server_is_started),
    );

    // Disconnect cleanup is an observer, not a scheduled system
    app.add_observer(systems::handle_disconnections);

    info!("Starting server on port {}", SERVER_PORT);
    app.run();
}
