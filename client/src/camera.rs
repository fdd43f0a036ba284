//! Top-down follow camera.

use bevy::prelude::*;
use shared::LocalPlayer;

/// Camera offset from the followed player: high and pulled back south, so
/// the whole aim cone fits on screen.
const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 17.0, 11.0);

/// Spawn the camera looking at the arena center until a player exists.
pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(CAMERA_OFFSET).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Glide the camera after the local player.
pub fn update_camera(
    player_query: Query<&Transform, (With<LocalPlayer>, Without<Camera3d>)>,
    mut camera_query: Query<&mut Transform, (With<Camera3d>, Without<LocalPlayer>)>,
    time: Res<Time>,
) {
    let Some(player_transform) = player_query.iter().next() else {
        return;
    };

    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    // Mild smoothing removes replication micro-jitter
    let cam_rate: f32 = 10.0;
    let cam_t = 1.0_f32 - (-cam_rate * time.delta_secs()).exp();

    let target = player_transform.translation + CAMERA_OFFSET;
    camera_transform.translation = camera_transform.translation.lerp(target, cam_t);
    camera_transform.look_at(player_transform.translation, Vec3::Y);
}
