//! Game client - renders the arena and sends input/cast requests.
//!
//! Strictly an observer: all combat math happens on the server; this side
//! only mirrors replicated state, previews the aim cone, and draws the
//! particle stream at whatever emission rate the server last published.

mod camera;
mod input;
mod states;
mod systems;

use bevy::prelude::*;
use bevy::window::WindowResolution;
use lightyear::prelude::client::ClientPlugins;
use shared::{arena, protocol::tick_duration, ProtocolPlugin};
use states::GameState;

/// Marker component for our client entity
#[derive(Component)]
pub struct GameClient;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Tidebreak".to_string(),
            resolution: WindowResolution::new(1280, 720),
            ..default()
        }),
        ..default()
    }));

    // Game state machine
    app.init_state::<GameState>();

    // Lightyear client plugins (tick_duration = 60Hz)
    app.add_plugins(ClientPlugins {
        tick_duration: tick_duration(),
    });
    app.add_plugins(ProtocolPlugin);

    // Local copy of the deterministic arena: blocker grid for cast previews,
    // identical to the one the server validates against.
    app.insert_resource(arena::build_blocker_grid());

    app.init_resource::<input::InputState>();
    app.init_resource::<input::AimState>();

    // Setup systems (run once at startup - rendering only)
    app.add_systems(
        Startup,
        (
            systems::arena::setup_arena,
            systems::stream_vfx::setup_stream_assets,
            camera::setup_camera,
        ),
    );

    // Connection systems
    app.add_systems(OnEnter(GameState::Connecting), systems::connection::start_connection);
    app.add_systems(Update, systems::connection::check_connection);

    // Send input to server at fixed tick rate (60 Hz)
    app.add_systems(
        FixedUpdate,
        input::send_input_to_server.run_if(in_state(GameState::Playing)),
    );

    // Replication-driven setup must NOT be gated solely to `Playing`:
    // initial snapshots can arrive while we're still in `Connecting`.
    app.add_systems(
        Update,
        (
            systems::player::ensure_local_player_tag,
            systems::player::attach_player_meshes,
            systems::player::attach_dummy_meshes,
            systems::stream_vfx::attach_streams,
        )
            .chain(),
    );

    // Gameplay systems
    app.add_systems(
        Update,
        (
            input::handle_keyboard_input,
            input::update_aim_point,
            input::handle_cast_input,
            camera::update_camera,
        )
            .chain()
            .run_if(in_state(GameState::Playing)),
    );

    // Visual mirrors of replicated state
    app.add_systems(
        Update,
        (
            systems::player::sync_player_transforms,
            systems::player::sync_dummy_transforms,
            systems::stream_vfx::sync_stream_transforms,
            systems::stream_vfx::spawn_droplets,
            systems::stream_vfx::update_droplets,
            systems::cone_preview::draw_cone_preview,
            systems::feedback::handle_cast_failures,
            systems::feedback::handle_stream_hits,
            systems::feedback::handle_damage_received,
        )
            .run_if(in_state(GameState::Playing)),
    );

    app.run();
}
