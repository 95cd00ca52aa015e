//! `SimWorld`: a deterministic in-memory game world.
//!
//! Backs the demo binary and the integration tests. Ground comes from a
//! [`Heightfield`], geometry from a flat list of axis-aligned boxes, and
//! characters live in a `hecs` entity table. Player state is scripted
//! through plain setters so tests can walk the player around.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use hecs::World;

use turfwar_core::enums::{BehaviorState, MovePace, PickupKind};
use turfwar_core::types::{FactionId, Notoriety, WeaponLoadout};

use crate::heightfield::Heightfield;
use crate::query::{CharacterId, GameWorld, MarkerId, PickupId};

/// World position component.
#[derive(Debug, Clone, Copy)]
pub struct WorldPos(pub Vec3);

/// Health component. Characters die at zero.
#[derive(Debug, Clone, Copy)]
pub struct Health(pub f32);

/// Allegiance component. Faction 0 is the civilian pool.
#[derive(Debug, Clone, Copy)]
pub struct Affiliation(pub FactionId);

/// Behavioral state component.
#[derive(Debug, Clone, Copy)]
pub struct Behavior(pub BehaviorState);

/// Character model component.
#[derive(Debug, Clone)]
pub struct ModelName(pub String);

/// Issued weapon component.
#[derive(Debug, Clone, Copy)]
pub struct Armed(pub WeaponLoadout);

/// Active pursue-the-player directive.
#[derive(Debug, Clone, Copy)]
pub struct CombatObjective {
    pub pace: MovePace,
}

/// Axis-aligned box obstacle: building, wall, or overhang.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Build from two opposite corners, normalizing the bounds.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box covering (x, y) footprint from ground `z0` up to `z1`.
    pub fn block(min_xy: Vec2, max_xy: Vec2, z0: f32, z1: f32) -> Self {
        Self::new(
            Vec3::new(min_xy.x, min_xy.y, z0),
            Vec3::new(max_xy.x, max_xy.y, z1),
        )
    }

    fn contains_xy(&self, x: f32, y: f32) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }

    /// Squared distance from a point to the box surface (0 inside).
    fn distance_sq(&self, p: Vec3) -> f32 {
        let clamped = p.clamp(self.min, self.max);
        p.distance_squared(clamped)
    }

    /// Segment intersection via the slab method.
    fn hit_by_segment(&self, from: Vec3, to: Vec3) -> bool {
        let dir = to - from;
        let mut t_min = 0.0f32;
        let mut t_max = 1.0f32;
        for axis in 0..3 {
            let (d, o, lo, hi) = match axis {
                0 => (dir.x, from.x, self.min.x, self.max.x),
                1 => (dir.y, from.y, self.min.y, self.max.y),
                _ => (dir.z, from.z, self.min.z, self.max.z),
            };
            if d.abs() < 1e-6 {
                if o < lo || o > hi {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return false;
            }
        }
        true
    }
}

/// Scripted player state.
#[derive(Debug, Clone, Copy)]
struct PlayerState {
    position: Vec3,
    heading: f32,
    on_foot: bool,
    dead: bool,
    scripted_sequence: bool,
    in_menu: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: 0.0,
            on_foot: true,
            dead: false,
            scripted_sequence: false,
            in_menu: false,
        }
    }
}

struct MarkerState {
    target: CharacterId,
    color: [u8; 4],
    visible: bool,
}

/// LOS ray sampling interval against the heightfield (world units).
const LOS_SAMPLE_INTERVAL: f32 = 2.0;

/// Deterministic game world for tests and the demo binary.
pub struct SimWorld {
    ground: Heightfield,
    obstacles: Vec<Aabb>,
    entities: World,
    markers: HashMap<MarkerId, MarkerState>,
    pickups: HashMap<PickupId, (PickupKind, Vec3)>,
    next_marker: u64,
    next_pickup: u64,
    player: PlayerState,
    notoriety: Notoriety,
}

impl SimWorld {
    pub fn new(ground: Heightfield) -> Self {
        Self {
            ground,
            obstacles: Vec::new(),
            entities: World::new(),
            markers: HashMap::new(),
            pickups: HashMap::new(),
            next_marker: 0,
            next_pickup: 0,
            player: PlayerState::default(),
            notoriety: Notoriety::default(),
        }
    }

    /// Flat world centered on the origin: `half_extent` on each side at z = 0.
    pub fn flat(half_extent: f32, cell_size: f32) -> Self {
        let cells = ((half_extent * 2.0) / cell_size).ceil() as u32 + 1;
        let origin = Vec2::new(-half_extent, -half_extent);
        Self::new(Heightfield::flat(origin, cell_size, cells, cells, 0.0))
    }

    pub fn add_obstacle(&mut self, obstacle: Aabb) {
        self.obstacles.push(obstacle);
    }

    pub fn ground(&self) -> &Heightfield {
        &self.ground
    }

    // --- Scripted player controls ---

    pub fn set_player_position(&mut self, position: Vec3) {
        self.player.position = position;
    }

    pub fn set_player_heading(&mut self, heading: f32) {
        self.player.heading = heading;
    }

    pub fn set_player_on_foot(&mut self, on_foot: bool) {
        self.player.on_foot = on_foot;
    }

    pub fn set_player_dead(&mut self, dead: bool) {
        self.player.dead = dead;
    }

    pub fn set_scripted_sequence(&mut self, active: bool) {
        self.player.scripted_sequence = active;
    }

    pub fn set_in_menu(&mut self, in_menu: bool) {
        self.player.in_menu = in_menu;
    }

    // --- Scripted character controls ---

    /// Spawn an ambient character with no weapon or directive.
    pub fn spawn_character(
        &mut self,
        faction: FactionId,
        model: &str,
        position: Vec3,
    ) -> CharacterId {
        self.entities.spawn((
            WorldPos(position),
            Health(100.0),
            Affiliation(faction),
            Behavior(BehaviorState::Wandering),
            ModelName(model.to_string()),
        ))
    }

    /// Apply damage; at zero health the character goes `Dead`.
    pub fn damage_character(&mut self, id: CharacterId, amount: f32) {
        let mut died = false;
        if let Ok(mut health) = self.entities.get::<&mut Health>(id) {
            health.0 = (health.0 - amount).max(0.0);
            died = health.0 <= 0.0;
        }
        if died {
            if let Ok(mut behavior) = self.entities.get::<&mut Behavior>(id) {
                behavior.0 = BehaviorState::Dead;
            }
        }
    }

    /// Kill a character in place, keeping the corpse in the table.
    pub fn kill_character(&mut self, id: CharacterId) {
        self.damage_character(id, f32::MAX);
    }

    pub fn set_character_behavior(&mut self, id: CharacterId, state: BehaviorState) {
        if let Ok(mut behavior) = self.entities.get::<&mut Behavior>(id) {
            behavior.0 = state;
        }
    }

    pub fn character_model(&self, id: CharacterId) -> Option<String> {
        self.entities.get::<&ModelName>(id).map(|m| m.0.clone()).ok()
    }

    pub fn character_pace(&self, id: CharacterId) -> Option<MovePace> {
        self.entities
            .get::<&CombatObjective>(id)
            .map(|o| o.pace)
            .ok()
    }

    pub fn character_count(&self) -> usize {
        self.entities.len() as usize
    }

    /// All living members of a faction, in spawn order.
    pub fn living_members(&self, faction: FactionId) -> Vec<CharacterId> {
        let mut ids: Vec<CharacterId> = self
            .entities
            .query::<(&Affiliation, &Health, &Behavior)>()
            .iter()
            .filter(|(_, (a, h, b))| {
                a.0 == faction && h.0 > 0.0 && b.0 != BehaviorState::Dead
            })
            .map(|(id, _)| id)
            .collect();
        ids.sort_by_key(|id| id.id());
        ids
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn marker_is_visible(&self, id: MarkerId) -> bool {
        self.markers.get(&id).map(|m| m.visible).unwrap_or(false)
    }

    pub fn marker_color(&self, id: MarkerId) -> Option<[u8; 4]> {
        self.markers.get(&id).map(|m| m.color)
    }

    /// Current position of a marker, following its target character.
    pub fn marker_position(&self, id: MarkerId) -> Option<Vec3> {
        let target = self.markers.get(&id)?.target;
        self.character_position(target)
    }

    pub fn pickup_count(&self) -> usize {
        self.pickups.len()
    }

    pub fn pickup_position(&self, id: PickupId) -> Option<Vec3> {
        self.pickups.get(&id).map(|(_, pos)| *pos)
    }

    /// Highest surface at (x, y) at or below the probe start.
    fn surface_below(&self, x: f32, y: f32, start_z: f32) -> Option<f32> {
        let mut best = self.ground.height_at(Vec2::new(x, y)).filter(|z| *z <= start_z);
        for ob in &self.obstacles {
            if ob.contains_xy(x, y) && ob.max.z <= start_z {
                match best {
                    Some(b) if b >= ob.max.z => {}
                    _ => best = Some(ob.max.z),
                }
            }
        }
        best
    }
}

impl GameWorld for SimWorld {
    fn ground_z_at(&self, x: f32, y: f32, z_hint: f32) -> Option<f32> {
        // Probes start a little above the hint so standing on a surface finds it.
        self.surface_below(x, y, z_hint + 2.0)
    }

    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        for ob in &self.obstacles {
            if ob.hit_by_segment(from, to) {
                return false;
            }
        }
        // Step the ray against the ground like any other occluder.
        let delta = to - from;
        let horiz = Vec2::new(delta.x, delta.y).length();
        if horiz < LOS_SAMPLE_INTERVAL {
            return true;
        }
        let samples = (horiz / LOS_SAMPLE_INTERVAL).ceil().max(2.0) as usize;
        for i in 1..samples {
            let t = i as f32 / samples as f32;
            let sample = from + delta * t;
            if let Some(ground) = self.ground.height_at(Vec2::new(sample.x, sample.y)) {
                if ground > sample.z {
                    return false;
                }
            }
        }
        true
    }

    fn sphere_is_clear(&self, center: Vec3, radius: f32) -> bool {
        self.obstacles
            .iter()
            .all(|ob| ob.distance_sq(center) > radius * radius)
    }

    fn ceiling_above(&self, pos: Vec3, max_height: f32) -> Option<f32> {
        let mut nearest: Option<f32> = None;
        for ob in &self.obstacles {
            if !ob.contains_xy(pos.x, pos.y) {
                continue;
            }
            if ob.min.z <= pos.z {
                continue;
            }
            let dist = ob.min.z - pos.z;
            if dist <= max_height && nearest.map_or(true, |n| dist < n) {
                nearest = Some(dist);
            }
        }
        nearest
    }

    fn character_is_valid(&self, id: CharacterId) -> bool {
        self.entities.contains(id)
    }

    fn character_health(&self, id: CharacterId) -> f32 {
        self.entities.get::<&Health>(id).map(|h| h.0).unwrap_or(0.0)
    }

    fn character_behavior(&self, id: CharacterId) -> BehaviorState {
        self.entities
            .get::<&Behavior>(id)
            .map(|b| b.0)
            .unwrap_or(BehaviorState::Dead)
    }

    fn character_position(&self, id: CharacterId) -> Option<Vec3> {
        self.entities.get::<&WorldPos>(id).map(|p| p.0).ok()
    }

    fn character_faction(&self, id: CharacterId) -> Option<FactionId> {
        self.entities.get::<&Affiliation>(id).map(|a| a.0).ok()
    }

    fn count_faction_members_near(&self, center: Vec3, radius: f32, faction: FactionId) -> usize {
        let r_sq = radius * radius;
        self.entities
            .query::<(&WorldPos, &Affiliation, &Behavior)>()
            .iter()
            .filter(|(_, (pos, aff, behavior))| {
                aff.0 == faction
                    && behavior.0 != BehaviorState::Dead
                    && pos.0.distance_squared(center) <= r_sq
            })
            .count()
    }

    fn spawn_hostile(
        &mut self,
        faction: FactionId,
        model: &str,
        position: Vec3,
        loadout: WeaponLoadout,
    ) -> Option<CharacterId> {
        Some(self.entities.spawn((
            WorldPos(position),
            Health(100.0),
            Affiliation(faction),
            Behavior(BehaviorState::Idle),
            ModelName(model.to_string()),
            Armed(loadout),
        )))
    }

    fn order_attack_player(&mut self, id: CharacterId, pace: MovePace) {
        if !self.entities.contains(id) {
            return;
        }
        let alive = self.character_health(id) > 0.0;
        if !alive {
            return;
        }
        let _ = self.entities.insert_one(id, CombatObjective { pace });
        if let Ok(mut behavior) = self.entities.get::<&mut Behavior>(id) {
            behavior.0 = BehaviorState::CombatPlayer;
        }
    }

    fn force_kill(&mut self, id: CharacterId) {
        let _ = self.entities.despawn(id);
    }

    fn player_position(&self) -> Vec3 {
        self.player.position
    }

    fn player_heading(&self) -> f32 {
        self.player.heading
    }

    fn player_is_on_foot(&self) -> bool {
        self.player.on_foot
    }

    fn player_is_dead(&self) -> bool {
        self.player.dead
    }

    fn in_scripted_sequence(&self) -> bool {
        self.player.scripted_sequence
    }

    fn in_menu(&self) -> bool {
        self.player.in_menu
    }

    fn notoriety(&self) -> Notoriety {
        self.notoriety
    }

    fn set_notoriety(&mut self, notoriety: Notoriety) {
        self.notoriety = notoriety;
    }

    fn add_character_marker(&mut self, target: CharacterId, color: [u8; 4]) -> MarkerId {
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.markers.insert(
            id,
            MarkerState {
                target,
                color,
                visible: true,
            },
        );
        id
    }

    fn set_marker_visible(&mut self, id: MarkerId, visible: bool) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.visible = visible;
        }
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
    }

    fn spawn_pickup(&mut self, kind: PickupKind, position: Vec3) -> PickupId {
        let id = PickupId(self.next_pickup);
        self.next_pickup += 1;
        self.pickups.insert(id, (kind, position));
        id
    }

    fn remove_pickup(&mut self, id: PickupId) {
        self.pickups.remove(&id);
    }

    fn pickup_exists(&self, id: PickupId) -> bool {
        self.pickups.contains_key(&id)
    }
}
