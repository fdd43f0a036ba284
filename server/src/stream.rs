//! Server-side stream channel systems
//!
//! Handles cast validation, effect entity lifecycle, and the per-cast damage
//! tick loop. Only this process ever advances a channel or deals damage;
//! clients receive the replicated effect components and combat feedback
//! messages, nothing else.

use bevy::prelude::*;
use lightyear::prelude::server::*;
use lightyear::prelude::*;
use std::collections::HashMap;

use shared::stream::aim::{AimError, AimResolver};
use shared::stream::falloff;
use shared::stream::geometry::{self, Candidate, CastShape};
use shared::{
    BlockerGrid, CancelStreamRequest, CastFailReason, CastFailed, CastStreamRequest,
    DamageReceived, Dummy, DummyPosition, Health, Player, PlayerPosition, ReliableChannel,
    StreamEmission, StreamHit, StreamPosition, StreamRotation, StreamStats, StreamType,
    WaterStream, FIXED_TIMESTEP_HZ,
};

use crate::systems::peer_id_to_u64;

/// Where a channel is in its life. "Idle" is the absence of a channel
/// entity; casts that never validate never get this far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamPhase {
    /// Effect entity exists with a resolved direction; no tick has run yet
    Priming,
    /// Ticking damage until the duration elapses
    Active,
    /// Terminal; the entity despawns on the next scheduler pass
    Completed,
}

/// Server-only state for one channeled cast.
///
/// Lives on the effect entity next to the replicated projection components
/// but is never registered with the protocol, so it cannot leak to clients.
#[derive(Component)]
pub struct StreamChannel {
    /// The caster's player entity; the beam follows it
    pub caster: Entity,
    pub owner_peer: PeerId,
    pub phase: StreamPhase,
    /// Cast direction, frozen when the cast was validated
    pub direction: Vec3,
    pub stats: StreamStats,
    /// Seconds spent channeling
    pub elapsed: f32,
    /// Seconds until the next damage tick; <= 0 means a tick is due
    pub until_tick: f32,
}

/// Handle stream cast requests from clients.
///
/// The client already ran the same aim validation locally, but its answer is
/// advisory only - everything is re-checked here against authoritative
/// state before anything spawns.
pub fn handle_cast_requests(
    mut commands: Commands,
    blockers: Res<BlockerGrid>,
    mut client_links: Query<
        (
            &RemoteId,
            &mut MessageReceiver<CastStreamRequest>,
            &mut MessageSender<CastFailed>,
        ),
        With<ClientOf>,
    >,
    players: Query<(Entity, &Player, &PlayerPosition, &Health)>,
    channels: Query<&StreamChannel>,
) {
    for (remote_id, mut receiver, mut sender) in client_links.iter_mut() {
        let peer_id = remote_id.0;

        for request in receiver.receive() {
            let Some((caster_entity, _, position, health)) =
                players.iter().find(|(_, p, _, _)| p.client_id == peer_id)
            else {
                continue;
            };

            // Dead casters don't cast; no feedback needed, the client UI
            // already greys the button out.
            if health.is_dead() {
                continue;
            }

            if channels
                .iter()
                .any(|c| c.owner_peer == peer_id && c.phase != StreamPhase::Completed)
            {
                sender.send::<ReliableChannel>(CastFailed {
                    reason: CastFailReason::AlreadyChanneling,
                });
                continue;
            }

            let stats = request.stream_type.stats();
            let mut resolver = AimResolver::default();
            resolver.load_target(&[request.aim_point]);

            let target = match resolver.resolve(position.0, stats.cast_length, |from, to| {
                blockers.segment_clear(from, to)
            }) {
                Ok(point) => point,
                Err(AimError::Pending) => continue, // unreachable: point was just loaded
                Err(AimError::OutOfRange) => {
                    info!("Rejected cast from {:?}: out of range", peer_id);
                    sender.send::<ReliableChannel>(CastFailed {
                        reason: CastFailReason::OutOfRange,
                    });
                    continue;
                }
                Err(AimError::Obstructed) => {
                    info!("Rejected cast from {:?}: no line of sight", peer_id);
                    sender.send::<ReliableChannel>(CastFailed {
                        reason: CastFailReason::Obstructed,
                    });
                    continue;
                }
            };

            // Aim point on top of the caster: no valid direction yet, treat
            // like a pending aim and drop the request.
            let Some(direction) = geometry::resolve_direction(position.0, target) else {
                continue;
            };

            let effect = spawn_stream(
                &mut commands,
                caster_entity,
                peer_id,
                request.stream_type,
                position.0,
                direction,
            );
            info!(
                "Player {:?} channels {:?} ({:?})",
                peer_id, request.stream_type, effect
            );
        }
    }
}

/// Spawn the stream effect entity: replicated projection for observers plus
/// the host-only channel state.
fn spawn_stream(
    commands: &mut Commands,
    caster: Entity,
    owner_peer: PeerId,
    stream_type: StreamType,
    origin: Vec3,
    direction: Vec3,
) -> Entity {
    let stats = stream_type.stats();
    commands
        .spawn((
            WaterStream {
                owner_id: peer_id_to_u64(owner_peer),
                stream_type,
            },
            StreamPosition(origin),
            StreamRotation(geometry::direction_yaw(direction)),
            StreamEmission(stats.base_emission_rate),
            Replicate::new(ReplicationMode::SingleServer(NetworkTarget::All)),
            StreamChannel {
                caster,
                owner_peer,
                phase: StreamPhase::Priming,
                direction,
                stats,
                elapsed: 0.0,
                until_tick: 0.0,
            },
        ))
        .id()
}

/// Tear down a finished stream. Safe on a stale handle: despawning an
/// already-removed entity is a no-op, so double destroys never fault.
pub fn finish_stream(commands: &mut Commands, entity: Entity) {
    if let Ok(mut effect) = commands.get_entity(entity) {
        effect.try_despawn();
    }
}

/// Handle early-stop requests from the caster.
///
/// Runs before `tick_streams` in the fixed-update chain, so a cancel either
/// lands before a tick starts or after it fully completed - a tick can never
/// be torn down halfway through its damage sweep.
pub fn handle_cancel_requests(
    mut client_links: Query<(&RemoteId, &mut MessageReceiver<CancelStreamRequest>), With<ClientOf>>,
    mut streams: Query<&mut StreamChannel>,
) {
    for (remote_id, mut receiver) in client_links.iter_mut() {
        let peer_id = remote_id.0;
        for _request in receiver.receive() {
            for mut channel in streams.iter_mut() {
                if channel.owner_peer == peer_id && channel.phase != StreamPhase::Completed {
                    info!("Player {:?} stopped channeling early", peer_id);
                    channel.phase = StreamPhase::Completed;
                }
            }
        }
    }
}

/// Force-complete streams whose caster died or despawned (disconnect).
pub fn expire_orphaned_streams(
    mut streams: Query<&mut StreamChannel>,
    casters: Query<&Health, With<Player>>,
) {
    for mut channel in streams.iter_mut() {
        if channel.phase == StreamPhase::Completed {
            continue;
        }
        match casters.get(channel.caster) {
            Ok(health) if !health.is_dead() => {}
            _ => {
                info!("Stream lost its caster; completing");
                channel.phase = StreamPhase::Completed;
            }
        }
    }
}

/// One resolved hit, collected during the sweep and applied afterwards.
struct HitRecord {
    target: Entity,
    victim_peer: Option<PeerId>,
    caster_peer: PeerId,
    damage: f32,
    kill: bool,
    from_direction: Vec3,
    health_remaining: f32,
}

/// Drive every active stream one fixed step: follow the caster, accumulate
/// time, and run a damage tick whenever the interval elapses.
///
/// Discovery, cone filtering, ranking, and the falloff sweep all happen
/// fresh inside the tick - nothing about targets is cached between ticks.
pub fn tick_streams(
    mut commands: Commands,
    mut streams: Query<(
        Entity,
        &mut StreamChannel,
        &mut StreamPosition,
        &mut StreamEmission,
    )>,
    mut players: Query<(Entity, &Player, &PlayerPosition, &mut Health), Without<Dummy>>,
    mut dummies: Query<(Entity, &Dummy, &DummyPosition, &mut Health), Without<Player>>,
    mut client_links: Query<
        (
            &RemoteId,
            &mut MessageSender<StreamHit>,
            &mut MessageSender<DamageReceived>,
        ),
        (With<ClientOf>, With<Connected>),
    >,
) {
    let dt = 1.0 / FIXED_TIMESTEP_HZ as f32;
    let mut hits: Vec<HitRecord> = Vec::new();

    for (effect_entity, mut channel, mut position, mut emission) in streams.iter_mut() {
        if channel.phase == StreamPhase::Completed {
            finish_stream(&mut commands, effect_entity);
            continue;
        }

        // The effect entity demonstrably exists, so the channel may arm.
        // Falls straight through to Active: the first damage tick lands on
        // the same pass the stream arms, like the original effect.
        if channel.phase == StreamPhase::Priming {
            channel.phase = StreamPhase::Active;
        }

        let Ok((_, _, caster_pos, _)) = players.get(channel.caster) else {
            channel.phase = StreamPhase::Completed;
            continue;
        };
        let origin = caster_pos.0;

        // Orientation follow: the beam re-anchors to the caster every step
        // but keeps its cast-time direction.
        position.0 = origin;

        channel.elapsed += dt;
        channel.until_tick -= dt;

        if channel.until_tick <= 0.0 {
            channel.until_tick += channel.stats.tick_interval;

            let shape = CastShape::new(
                origin,
                channel.direction,
                channel.stats.cast_length,
                channel.stats.cast_width,
            );

            // Candidate discovery: every living damageable actor within the
            // cast length, except the caster. Unordered; the ranker owns
            // ordering.
            let mut candidates: Vec<Candidate> = Vec::new();
            let mut handles: HashMap<u64, Entity> = HashMap::new();
            for (entity, _, pos, health) in players.iter() {
                if entity == channel.caster || health.is_dead() {
                    continue;
                }
                if in_search_radius(origin, pos.0, channel.stats.cast_length) {
                    handles.insert(entity.to_bits(), entity);
                    candidates.push(Candidate {
                        id: entity.to_bits(),
                        position: pos.0,
                    });
                }
            }
            for (entity, _, pos, health) in dummies.iter() {
                if health.is_dead() {
                    continue;
                }
                if in_search_radius(origin, pos.0, channel.stats.cast_length) {
                    handles.insert(entity.to_bits(), entity);
                    candidates.push(Candidate {
                        id: entity.to_bits(),
                        position: pos.0,
                    });
                }
            }

            let ranked = geometry::rank_targets(&shape, candidates);
            let sweep = falloff::sweep(&ranked, &channel.stats);

            for hit in &sweep.hits {
                let Some(&target) = handles.get(&hit.target) else {
                    continue;
                };

                if let Ok((_, player, pos, mut health)) = players.get_mut(target) {
                    let kill = health.take_damage(hit.damage.amount);
                    hits.push(HitRecord {
                        target,
                        victim_peer: Some(player.client_id),
                        caster_peer: channel.owner_peer,
                        damage: hit.damage.amount,
                        kill,
                        from_direction: (pos.0 - origin).normalize_or_zero(),
                        health_remaining: health.current,
                    });
                } else if let Ok((_, _, pos, mut health)) = dummies.get_mut(target) {
                    let kill = health.take_damage(hit.damage.amount);
                    hits.push(HitRecord {
                        target,
                        victim_peer: None,
                        caster_peer: channel.owner_peer,
                        damage: hit.damage.amount,
                        kill,
                        from_direction: (pos.0 - origin).normalize_or_zero(),
                        health_remaining: health.current,
                    });
                }
            }

            // Published every tick, hits or not; an empty tick resets the
            // stream to full brightness.
            emission.0 = sweep.emission_rate;
        }

        if channel.elapsed >= channel.stats.duration {
            channel.phase = StreamPhase::Completed;
            finish_stream(&mut commands, effect_entity);
        }
    }

    // Fan hit feedback out to the involved clients.
    for record in hits {
        for (remote_id, mut hit_sender, mut damage_sender) in client_links.iter_mut() {
            if remote_id.0 == record.caster_peer {
                hit_sender.send::<ReliableChannel>(StreamHit {
                    target_id: record.target.to_bits(),
                    damage: record.damage,
                    kill: record.kill,
                });
            }
            if Some(remote_id.0) == record.victim_peer {
                damage_sender.send::<ReliableChannel>(DamageReceived {
                    direction: record.from_direction,
                    damage: record.damage,
                    health_remaining: record.health_remaining,
                });
            }
        }
    }
}

/// Discovery radius test in the ground plane.
#[inline]
fn in_search_radius(origin: Vec3, position: Vec3, radius: f32) -> bool {
    let mut to_target = position - origin;
    to_target.y = 0.0;
    to_target.length_squared() <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::world::CommandQueue;

    #[test]
    fn test_finish_stream_twice_is_noop() {
        let mut world = World::new();
        let effect = world.spawn_empty().id();

        let mut queue = CommandQueue::default();
        let mut commands = Commands::new(&mut queue, &world);
        finish_stream(&mut commands, effect);
        queue.apply(&mut world);
        assert!(world.get_entity(effect).is_err());

        // Second destroy on the now-stale handle must be a silent no-op.
        let mut queue = CommandQueue::default();
        let mut commands = Commands::new(&mut queue, &world);
        finish_stream(&mut commands, effect);
        queue.apply(&mut world);
        assert!(world.get_entity(effect).is_err());
    }

    #[test]
    fn test_search_radius_ignores_height() {
        assert!(in_search_radius(
            Vec3::ZERO,
            Vec3::new(0.0, 5.0, 8.0),
            10.0
        ));
        assert!(!in_search_radius(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 10.5),
            10.0
        ));
    }
}
