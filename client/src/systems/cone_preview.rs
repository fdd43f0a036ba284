//! Aim cone preview
//!
//! Draws the four-vertex cone outline from the caster to the cursor every
//! frame, colored by what the server would say about this cast.

use bevy::prelude::*;

use shared::stream::aim::AimError;
use shared::stream::geometry::{self, CastShape};
use shared::{LocalPlayer, PlayerPosition};

use crate::input::{AimState, InputState};

/// Lift above the floor, as the outline would otherwise z-fight with it.
const OUTLINE_LIFT: f32 = 0.1;

pub fn draw_cone_preview(
    mut gizmos: Gizmos,
    aim: Res<AimState>,
    input_state: Res<InputState>,
    local_player: Query<&PlayerPosition, With<LocalPlayer>>,
) {
    let Some(position) = local_player.iter().next() else {
        return;
    };
    let Some(aim_point) = aim.resolver.point() else {
        return;
    };
    let Some(direction) = geometry::resolve_direction(position.0, aim_point) else {
        return;
    };

    let stats = input_state.selected.stats();
    let shape = CastShape::new(position.0, direction, stats.cast_length, stats.cast_width);

    let color = match aim.last_check {
        Some(Ok(_)) => Color::srgb(0.3, 0.9, 0.5),
        Some(Err(AimError::OutOfRange)) => Color::srgb(0.95, 0.7, 0.2),
        Some(Err(AimError::Obstructed)) => Color::srgb(0.95, 0.3, 0.25),
        Some(Err(AimError::Pending)) | None => return,
    };

    gizmos.linestrip(shape.outline(OUTLINE_LIFT), color);
}
