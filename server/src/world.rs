//! Arena setup: blocker grid and training dummies.

use bevy::prelude::*;
use lightyear::prelude::*;
use rand::Rng;

use shared::{arena, dummy_max_health, Dummy, DummyKind, DummyPosition, Health};

/// Build the authoritative blocker grid from the shared arena layout.
pub fn setup_world(mut commands: Commands) {
    let grid = arena::build_blocker_grid();
    info!("Server arena initialized ({} blockers)", grid.len());
    commands.insert_resource(grid);
}

/// One-shot resource to ensure dummies spawn only once.
#[derive(Resource)]
pub struct DummiesSpawned;

/// Dummy practice lanes: (x, z, kind) clusters around the arena center.
const DUMMY_SPOTS: &[(f32, f32, DummyKind)] = &[
    (3.0, 7.0, DummyKind::Straw),
    (4.5, 8.0, DummyKind::Straw),
    (6.0, 9.0, DummyKind::Wooden),
    (-8.0, -3.0, DummyKind::Wooden),
    (-9.5, -4.5, DummyKind::Straw),
    (12.0, 6.0, DummyKind::IronBound),
    (-3.0, 14.0, DummyKind::IronBound),
];

/// Spawn the training dummies once the server is networking, so clients
/// actually receive the spawns.
pub fn spawn_dummies_once(mut commands: Commands, spawned: Option<Res<DummiesSpawned>>) {
    if spawned.is_some() {
        return;
    }
    commands.insert_resource(DummiesSpawned);

    let mut rng = rand::thread_rng();
    for (id, &(x, z, kind)) in DUMMY_SPOTS.iter().enumerate() {
        // Small jitter so rows don't look machine-placed
        let jitter_x: f32 = rng.gen_range(-0.3..0.3);
        let jitter_z: f32 = rng.gen_range(-0.3..0.3);

        commands.spawn((
            Dummy { id: id as u64, kind },
            DummyPosition(Vec3::new(x + jitter_x, 0.0, z + jitter_z)),
            Health::new(dummy_max_health(kind)),
            Replicate::new(ReplicationMode::SingleServer(NetworkTarget::All)),
        ));
    }

    info!("Spawned {} training dummies", DUMMY_SPOTS.len());
}
