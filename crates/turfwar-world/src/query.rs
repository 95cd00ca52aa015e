//! The `GameWorld` trait: everything the engine asks of a game world.
//!
//! The engine is a pure consumer of this interface. Probe methods are
//! cheap point queries; control methods take effect immediately and are
//! expected to be idempotent where repeat calls are plausible.

use glam::Vec3;

use turfwar_core::enums::{BehaviorState, MovePace, PickupKind};
use turfwar_core::types::{FactionId, Notoriety, WeaponLoadout};

/// Handle to a world character. Borrowed from the world's entity table;
/// always re-validate with [`GameWorld::character_is_valid`] before use.
pub type CharacterId = hecs::Entity;

/// Handle to a map marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

/// Handle to a spawned pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickupId(pub u64);

/// A candidate ambient spawn, as presented to the population bias filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    /// Requested allegiance. Faction 0 is the civilian pool.
    pub faction: FactionId,
    /// Requested character model.
    pub model: String,
    pub position: Vec3,
}

/// World capabilities consumed by the engine.
pub trait GameWorld {
    // --- Spatial probes ---

    /// Ground height at (x, y), searched near `z_hint` (probes find the
    /// highest surface at or below the probe start, including rooftops).
    /// `None` when the point is outside the loaded world.
    fn ground_z_at(&self, x: f32, y: f32, z_hint: f32) -> Option<f32>;

    /// Unobstructed straight line between two points.
    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool;

    /// No world geometry intersects a sphere at `center`.
    fn sphere_is_clear(&self, center: Vec3, radius: f32) -> bool;

    /// Distance to the nearest overhead geometry within `max_height`
    /// straight up from `pos`, if any.
    fn ceiling_above(&self, pos: Vec3, max_height: f32) -> Option<f32>;

    // --- Character queries ---

    /// The handle still refers to a live entity in the world table.
    fn character_is_valid(&self, id: CharacterId) -> bool;

    /// Current health; 0 for invalid handles.
    fn character_health(&self, id: CharacterId) -> f32;

    /// Behavioral state; `Dead` for invalid handles.
    fn character_behavior(&self, id: CharacterId) -> BehaviorState;

    fn character_position(&self, id: CharacterId) -> Option<Vec3>;

    fn character_faction(&self, id: CharacterId) -> Option<FactionId>;

    /// Living members of `faction` within `radius` of `center`.
    fn count_faction_members_near(&self, center: Vec3, radius: f32, faction: FactionId) -> usize;

    // --- Character control ---

    /// Spawn an armed hostile. `None` if the world refuses the spawn.
    fn spawn_hostile(
        &mut self,
        faction: FactionId,
        model: &str,
        position: Vec3,
        loadout: WeaponLoadout,
    ) -> Option<CharacterId>;

    /// Issue a pursue-and-attack-the-player directive at the given pace.
    fn order_attack_player(&mut self, id: CharacterId, pace: MovePace);

    /// Kill the character outright and drop it from the world table.
    fn force_kill(&mut self, id: CharacterId);

    // --- Player state ---

    fn player_position(&self) -> Vec3;

    /// Facing direction in radians, counterclockwise from +X.
    fn player_heading(&self) -> f32;

    fn player_is_on_foot(&self) -> bool;

    fn player_is_dead(&self) -> bool;

    /// A cutscene or scripted sequence currently controls the player.
    fn in_scripted_sequence(&self) -> bool;

    /// The host is inside a menu or loading screen.
    fn in_menu(&self) -> bool;

    // --- Notoriety ---

    fn notoriety(&self) -> Notoriety;

    fn set_notoriety(&mut self, notoriety: Notoriety);

    // --- Markers ---

    /// Attach a colored map marker to a character.
    fn add_character_marker(&mut self, target: CharacterId, color: [u8; 4]) -> MarkerId;

    fn set_marker_visible(&mut self, id: MarkerId, visible: bool);

    fn remove_marker(&mut self, id: MarkerId);

    // --- Pickups ---

    fn spawn_pickup(&mut self, kind: PickupKind, position: Vec3) -> PickupId;

    fn remove_pickup(&mut self, id: PickupId);

    fn pickup_exists(&self, id: PickupId) -> bool;
}
