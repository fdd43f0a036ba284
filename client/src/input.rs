//! Player input handling
//!
//! WASD moves along the world axes; the caster faces the mouse cursor. The
//! aim point is the cursor projected onto the ground plane, fed through the
//! same resolver the server uses so the cast button (and the cone preview
//! color) reflects what the server would actually accept.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use lightyear::prelude::client::Connected;
use lightyear::prelude::*;
use shared::stream::aim::{AimError, AimResolver};
use shared::stream::geometry;
use shared::{
    BlockerGrid, CancelStreamRequest, CastStreamRequest, InputChannel, LocalPlayer, PlayerInput,
    PlayerPosition, ReliableChannel, StreamType,
};

/// Client-side input state
#[derive(Resource, Default)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Facing direction (yaw, radians) toward the cursor
    pub yaw: f32,
    /// Which stream spell the next cast uses (1/2 to switch)
    pub selected: StreamType,
}

/// Local aim resolution, refreshed every frame from the cursor.
///
/// Advisory only - the server re-validates every cast - but it lets the UI
/// color the cone and swallow obviously-invalid clicks without a roundtrip.
#[derive(Resource, Default)]
pub struct AimState {
    pub resolver: AimResolver,
    /// Result of the most recent local validation, for the cone color
    pub last_check: Option<Result<Vec3, AimError>>,
}

/// Handle keyboard input for movement and spell selection
pub fn handle_keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut input_state: ResMut<InputState>,
) {
    input_state.forward = keyboard.pressed(KeyCode::KeyW);
    input_state.backward = keyboard.pressed(KeyCode::KeyS);
    input_state.left = keyboard.pressed(KeyCode::KeyA);
    input_state.right = keyboard.pressed(KeyCode::KeyD);

    if keyboard.just_pressed(KeyCode::Digit1) {
        input_state.selected = StreamType::WaterJet;
        info!("Selected spell: WaterJet");
    }
    if keyboard.just_pressed(KeyCode::Digit2) {
        input_state.selected = StreamType::Geyser;
        info!("Selected spell: Geyser");
    }
}

/// Project the cursor onto the ground plane and refresh the aim resolver.
pub fn update_aim_point(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    local_player: Query<&PlayerPosition, With<LocalPlayer>>,
    blockers: Res<BlockerGrid>,
    mut input_state: ResMut<InputState>,
    mut aim: ResMut<AimState>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };

    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };
    let Some(distance) = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y)) else {
        return;
    };
    let point = ray.get_point(distance);

    aim.resolver.load_target(&[point]);

    let Some(position) = local_player.iter().next() else {
        return;
    };

    // Face the cursor
    if let Some(direction) = geometry::resolve_direction(position.0, point) {
        input_state.yaw = geometry::direction_yaw(direction);
    }

    // Same validation the server runs, against the same arena layout
    let stats = input_state.selected.stats();
    let check = aim.resolver.resolve(position.0, stats.cast_length, |from, to| {
        blockers.segment_clear(from, to)
    });
    aim.last_check = Some(check);
}

/// Cast on left click, cancel on right click.
pub fn handle_cast_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    input_state: Res<InputState>,
    aim: Res<AimState>,
    mut client_query: Query<
        (
            &mut MessageSender<CastStreamRequest>,
            &mut MessageSender<CancelStreamRequest>,
        ),
        (With<crate::GameClient>, With<Connected>),
    >,
) {
    let Ok((mut cast_sender, mut cancel_sender)) = client_query.single_mut() else {
        return;
    };

    if mouse_button.just_pressed(MouseButton::Left) {
        match aim.last_check {
            Some(Ok(aim_point)) => {
                cast_sender.send::<ReliableChannel>(CastStreamRequest {
                    stream_type: input_state.selected,
                    aim_point,
                });
            }
            Some(Err(reason)) => {
                info!("Cannot cast here: {:?}", reason);
            }
            None => {}
        }
    }

    if mouse_button.just_pressed(MouseButton::Right) {
        cancel_sender.send::<ReliableChannel>(CancelStreamRequest);
    }
}

/// Send input to server
pub fn send_input_to_server(
    input_state: Res<InputState>,
    mut client_query: Query<
        &mut MessageSender<PlayerInput>,
        (With<crate::GameClient>, With<Connected>),
    >,
    time: Res<Time>,
    mut last_warn_time: Local<f32>,
) {
    let Ok(mut sender) = client_query.single_mut() else {
        // If this fires, input never reaches the server and movement freezes.
        let now = time.elapsed_secs();
        if now - *last_warn_time > 1.0 {
            warn!("send_input_to_server: no connected client entity; not sending inputs");
            *last_warn_time = now;
        }
        return;
    };

    let input = PlayerInput {
        forward: input_state.forward,
        backward: input_state.backward,
        left: input_state.left,
        right: input_state.right,
        yaw: input_state.yaw,
    };

    let _ = sender.send::<InputChannel>(input);
}
