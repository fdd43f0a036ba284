//! Combat feedback from the server.
//!
//! Terminal feedback only for now - these hooks are where hit markers and
//! damage indicators would attach.

use bevy::prelude::*;
use lightyear::prelude::client::Connected;
use lightyear::prelude::*;

use shared::{CastFailReason, CastFailed, DamageReceived, StreamHit};

/// Surface rejected casts to the player.
pub fn handle_cast_failures(
    mut client_query: Query<
        &mut MessageReceiver<CastFailed>,
        (With<crate::GameClient>, With<Connected>),
    >,
) {
    let Ok(mut receiver) = client_query.single_mut() else {
        return;
    };

    for failure in receiver.receive() {
        match failure.reason {
            CastFailReason::OutOfRange => info!("Cannot cast here: too far away"),
            CastFailReason::Obstructed => info!("Cannot cast here: no line of sight"),
            CastFailReason::AlreadyChanneling => info!("Already channeling a stream"),
        }
    }
}

/// Our stream connected with something.
pub fn handle_stream_hits(
    mut client_query: Query<
        &mut MessageReceiver<StreamHit>,
        (With<crate::GameClient>, With<Connected>),
    >,
) {
    let Ok(mut receiver) = client_query.single_mut() else {
        return;
    };

    for hit in receiver.receive() {
        if hit.kill {
            info!("Destroyed target (hit for {:.1})", hit.damage);
        } else {
            info!("Hit target for {:.1}", hit.damage);
        }
    }
}

/// We were caught in someone's stream.
pub fn handle_damage_received(
    mut client_query: Query<
        &mut MessageReceiver<DamageReceived>,
        (With<crate::GameClient>, With<Connected>),
    >,
) {
    let Ok(mut receiver) = client_query.single_mut() else {
        return;
    };

    for damage in receiver.receive() {
        warn!(
            "Took {:.1} damage ({:.0} HP left)",
            damage.damage, damage.health_remaining
        );
    }
}
