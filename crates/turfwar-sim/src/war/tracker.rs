//! Combat tracker: every hostile spawned into the active war.
//!
//! One entry per spawned enemy; entries carry the character handle, its
//! faction-colored map marker, and the last position the tracker saw.
//! Handles are generational and may go stale at any time, so every pass
//! re-validates against the world before touching a character.

use glam::Vec3;

use turfwar_core::constants::{FORCE_ENGAGE_DIST, FORCE_ENGAGE_MS, MARKER_SWEEP_MS};
use turfwar_core::enums::MovePace;
use turfwar_rules::behavior::pace_for_distance;
use turfwar_world::{CharacterId, GameWorld, MarkerId};

/// How to dispose of tracked enemies on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownMode {
    /// Drop the references and leave the characters to the world.
    /// Used at process shutdown.
    Release,
    /// Kill each tracked character before dropping it.
    /// Used for mid-game resets so no armed hostile outlives its war.
    ForceKill,
}

/// One spawned hostile under tracker supervision.
#[derive(Debug)]
struct TrackedEnemy {
    character: CharacterId,
    marker: MarkerId,
    last_pos: Vec3,
    marker_hidden: bool,
}

/// Tracks the spawned hostiles of the active war.
#[derive(Debug, Default)]
pub struct CombatTracker {
    entries: Vec<TrackedEnemy>,
    next_marker_sweep_ms: u64,
    next_force_engage_ms: u64,
}

impl CombatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly spawned hostile and attach its map marker.
    pub fn add_enemy(&mut self, world: &mut dyn GameWorld, character: CharacterId, color: [u8; 4]) {
        let marker = world.add_character_marker(character, color);
        let last_pos = world.character_position(character).unwrap_or(Vec3::ZERO);
        self.entries.push(TrackedEnemy {
            character,
            marker,
            last_pos,
            marker_hidden: false,
        });
    }

    pub fn tracked_count(&self) -> usize {
        self.entries.len()
    }

    /// Hostiles that are still valid, healthy, and not dying.
    pub fn alive_count(&self, world: &dyn GameWorld) -> u32 {
        self.entries
            .iter()
            .filter(|e| is_alive(world, e.character))
            .count() as u32
    }

    /// Per-tick upkeep: hide markers of dead or invalid enemies at the
    /// sweep cadence, and drag far stragglers back onto the player.
    pub fn update(&mut self, world: &mut dyn GameWorld, now_ms: u64) {
        if now_ms >= self.next_marker_sweep_ms {
            self.next_marker_sweep_ms = now_ms + MARKER_SWEEP_MS;
            self.marker_sweep(world);
        }

        if now_ms >= self.next_force_engage_ms {
            self.next_force_engage_ms = now_ms + FORCE_ENGAGE_MS;
            self.force_engage_distant(world);
        }
    }

    /// Hide the marker of every entry whose character died or vanished.
    fn marker_sweep(&mut self, world: &mut dyn GameWorld) {
        for entry in &mut self.entries {
            if let Some(pos) = world.character_position(entry.character) {
                entry.last_pos = pos;
            }
            if entry.marker_hidden || is_alive(world, entry.character) {
                continue;
            }
            world.set_marker_visible(entry.marker, false);
            entry.marker_hidden = true;
        }
    }

    /// Re-issue the pursue-player objective to every alive enemy that has
    /// drifted back into an idle or wandering state, pacing by distance.
    pub fn reassert_aggression(&mut self, world: &mut dyn GameWorld) {
        let player = world.player_position();
        for entry in &self.entries {
            if !is_alive(world, entry.character) {
                continue;
            }
            if !world.character_behavior(entry.character).is_disengaged() {
                continue;
            }
            let distance = world
                .character_position(entry.character)
                .map(|p| p.truncate().distance(player.truncate()))
                .unwrap_or(0.0);
            world.order_attack_player(entry.character, pace_for_distance(distance));
        }
    }

    /// Stragglers far from the fight get re-engaged at a sprint no matter
    /// what they are doing, so waves never stall on a distant spawn.
    fn force_engage_distant(&mut self, world: &mut dyn GameWorld) {
        let player = world.player_position();
        for entry in &self.entries {
            if !is_alive(world, entry.character) {
                continue;
            }
            let Some(pos) = world.character_position(entry.character) else {
                continue;
            };
            if pos.truncate().distance(player.truncate()) > FORCE_ENGAGE_DIST {
                world.order_attack_player(entry.character, MovePace::Sprint);
            }
        }
    }

    /// Drop every tracked enemy, always releasing its marker first.
    pub fn cleanup_all(&mut self, world: &mut dyn GameWorld, mode: TeardownMode) {
        for entry in self.entries.drain(..) {
            world.remove_marker(entry.marker);
            if mode == TeardownMode::ForceKill && world.character_is_valid(entry.character) {
                world.force_kill(entry.character);
            }
        }
        self.next_marker_sweep_ms = 0;
        self.next_force_engage_ms = 0;
    }
}

/// The tracker's liveness predicate: a valid handle with positive health
/// that is not already dying or dead.
fn is_alive(world: &dyn GameWorld, character: CharacterId) -> bool {
    use turfwar_core::enums::BehaviorState;
    world.character_is_valid(character)
        && world.character_health(character) > 0.0
        && !matches!(
            world.character_behavior(character),
            BehaviorState::Dying | BehaviorState::Dead
        )
}
