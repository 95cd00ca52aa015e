//! War pickup placement and lifetime.
//!
//! One restorative pickup appears when the first wave starts; a defensive
//! pickup replaces it at the start of each later wave. Placement searches
//! an annulus around the player inside the territory; the fallback chain
//! (territory center, near-player jitter, player position) guarantees a
//! point. Surviving pickups despawn on a timer after victory, or
//! immediately on war teardown.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use turfwar_core::constants::{
    PICKUP_ATTEMPTS, PICKUP_DESPAWN_MS, PICKUP_GROUND_LIFT, PICKUP_JITTER, PICKUP_MIN_SEPARATION,
    PICKUP_RING_MAX, PICKUP_RING_MIN,
};
use turfwar_core::enums::PickupKind;
use turfwar_core::types::Rect;
use turfwar_world::{GameWorld, PickupId};

/// The active war pickup and its post-war despawn timer.
#[derive(Debug, Default)]
pub struct WarPickups {
    /// Handle and placement of the active pickup. The position is kept
    /// locally so separation checks need no world-side position query.
    active: Option<(PickupId, Vec3)>,
    despawn_at_ms: Option<u64>,
}

impl WarPickups {
    pub fn new() -> Self {
        Self::default()
    }

    /// The surviving pickup, if the world still has it.
    pub fn surviving(&self, world: &dyn GameWorld) -> Option<PickupId> {
        self.active
            .map(|(id, _)| id)
            .filter(|id| world.pickup_exists(*id))
    }

    /// Place a wave pickup, replacing whatever pickup came before it.
    pub fn spawn_wave_pickup(
        &mut self,
        world: &mut dyn GameWorld,
        rng: &mut ChaCha8Rng,
        kind: PickupKind,
        territory: Rect,
    ) {
        let avoid = self
            .active
            .filter(|(id, _)| world.pickup_exists(*id))
            .map(|(_, pos)| pos);
        let position = find_pickup_position(world, rng, territory, avoid);

        self.clear(world);
        let id = world.spawn_pickup(kind, position);
        tracing::debug!(?kind, x = position.x, y = position.y, "war pickup placed");
        self.active = Some((id, position));
    }

    /// Arm the post-victory despawn timer if a pickup survived the war.
    /// Returns whether the timer was armed.
    pub fn arm_despawn_timer(&mut self, world: &dyn GameWorld, now_ms: u64) -> bool {
        if self.surviving(world).is_some() {
            self.despawn_at_ms = Some(now_ms + PICKUP_DESPAWN_MS);
            true
        } else {
            self.despawn_at_ms = None;
            false
        }
    }

    /// Service the despawn timer. Runs even while no war is active.
    pub fn update(&mut self, world: &mut dyn GameWorld, now_ms: u64) {
        if let Some(due) = self.despawn_at_ms {
            if now_ms >= due {
                tracing::debug!("post-war pickup timer elapsed");
                self.clear(world);
            }
        }
    }

    /// Remove the pickup and cancel the timer.
    pub fn clear(&mut self, world: &mut dyn GameWorld) {
        if let Some((id, _)) = self.active.take() {
            if world.pickup_exists(id) {
                world.remove_pickup(id);
            }
        }
        self.despawn_at_ms = None;
    }
}

/// Find a pickup point: randomized annulus attempts around the player
/// constrained to the territory, then the fallback chain.
fn find_pickup_position(
    world: &dyn GameWorld,
    rng: &mut ChaCha8Rng,
    territory: Rect,
    avoid: Option<Vec3>,
) -> Vec3 {
    let player = world.player_position();

    for _ in 0..PICKUP_ATTEMPTS {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let distance = rng.gen_range(PICKUP_RING_MIN..PICKUP_RING_MAX);
        let candidate = Vec2::new(
            player.x + distance * angle.cos(),
            player.y + distance * angle.sin(),
        );

        if !territory.contains(candidate) {
            continue;
        }
        if let Some(avoid) = avoid {
            if candidate.distance(avoid.truncate()) < PICKUP_MIN_SEPARATION {
                continue;
            }
        }
        let Some(ground) = world.ground_z_at(candidate.x, candidate.y, player.z) else {
            continue;
        };
        return Vec3::new(candidate.x, candidate.y, ground + PICKUP_GROUND_LIFT);
    }

    // Fallback 1: territory center.
    let center = territory.center();
    if let Some(ground) = world.ground_z_at(center.x, center.y, player.z) {
        tracing::debug!("pickup placement fell back to territory center");
        return Vec3::new(center.x, center.y, ground + PICKUP_GROUND_LIFT);
    }

    // Fallback 2: one jittered point near the player.
    let near = Vec2::new(
        player.x + rng.gen_range(-PICKUP_JITTER..PICKUP_JITTER),
        player.y + rng.gen_range(-PICKUP_JITTER..PICKUP_JITTER),
    );
    if let Some(ground) = world.ground_z_at(near.x, near.y, player.z) {
        tracing::debug!("pickup placement fell back to near-player jitter");
        return Vec3::new(near.x, near.y, ground + PICKUP_GROUND_LIFT);
    }

    // Fallback 3: the player's exact position.
    tracing::warn!("pickup placement exhausted all fallbacks, using player position");
    player
}
