//! Fundamental identifier, geometry, and clock types.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::enums::{DefenseLevel, WeaponKind};

/// Unique territory identifier.
///
/// Definition files and the ownership sidecar carry ids as all-digit
/// strings; they parse to `u32` at the boundary and format back to
/// decimal digits wherever the wire formats require a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerritoryId(pub u32);

impl std::fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Faction (gang) identifier. Faction 0 is the ambient civilian pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u32);

impl FactionId {
    /// Whether this faction can be provoked into a war.
    /// The civilian pool (id 0) never can.
    pub fn is_provokable(&self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for FactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner column/wire encoding: -1 is neutral, >= 0 a faction id.
pub fn owner_to_code(owner: Option<FactionId>) -> i32 {
    match owner {
        Some(f) => f.0 as i32,
        None => -1,
    }
}

/// Decode an owner code. Returns `None` for invalid values (below -1).
pub fn owner_from_code(code: i32) -> Option<Option<FactionId>> {
    match code {
        -1 => Some(None),
        c if c >= 0 => Some(Some(FactionId(c as u32))),
        _ => None,
    }
}

/// Axis-aligned world rectangle, stored normalized (min <= max on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Build a rectangle from two opposite corners, normalizing the bounds.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self::new(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Full diagonal length.
    pub fn diagonal(&self) -> f32 {
        self.min.distance(self.max)
    }

    /// Clamp a point into the rectangle inset by `margin` on each side.
    /// Degenerate insets collapse to the rectangle center.
    pub fn clamp_point(&self, p: Vec2, margin: f32) -> Vec2 {
        let lo_x = self.min.x + margin;
        let hi_x = self.max.x - margin;
        let lo_y = self.min.y + margin;
        let hi_y = self.max.y - margin;
        let c = self.center();
        Vec2::new(
            if lo_x <= hi_x { p.x.clamp(lo_x, hi_x) } else { c.x },
            if lo_y <= hi_y { p.y.clamp(lo_y, hi_y) } else { c.y },
        )
    }
}

/// A rectangular world region with an owning faction and defense tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub rect: Rect,
    /// Runtime owner. `None` = neutral.
    pub owner: Option<FactionId>,
    /// Owner loaded from the definition file; restored by ownership resets.
    pub default_owner: Option<FactionId>,
    /// True only while a war is running here. Never written to the definition file.
    pub under_attack: bool,
    pub defense: DefenseLevel,
}

impl Territory {
    pub fn new(
        id: TerritoryId,
        rect: Rect,
        default_owner: Option<FactionId>,
        defense: DefenseLevel,
    ) -> Self {
        Self {
            id,
            rect,
            owner: default_owner,
            default_owner,
            under_attack: false,
            defense,
        }
    }
}

/// The minimal persisted-per-slot unit: one territory's runtime owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipEntry {
    pub id: TerritoryId,
    pub owner: Option<FactionId>,
}

/// One player-credited kill of a faction member, kept in the trigger window.
#[derive(Debug, Clone, Copy)]
pub struct KillRecord {
    pub faction: FactionId,
    pub territory: TerritoryId,
    pub at_ms: u64,
    pub position: Vec3,
}

/// Player notoriety state snapshotted and frozen for a war's duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Notoriety {
    /// Current notoriety level.
    pub level: u32,
    /// Suppression flag: while set, the host must not escalate notoriety.
    pub suppressed: bool,
    /// Escalation meter feeding the next level-up.
    pub escalation: f32,
}

impl Notoriety {
    /// The state imposed while a war is active: nothing outstanding, frozen.
    pub fn frozen() -> Self {
        Self {
            level: 0,
            suppressed: true,
            escalation: 0.0,
        }
    }
}

/// A weapon with its issued ammunition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponLoadout {
    pub weapon: WeaponKind,
    pub ammo: u32,
}

/// Engine clock: tick counter plus monotonic milliseconds,
/// advanced a fixed step per tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimClock {
    pub tick: u64,
    pub now_ms: u64,
}

impl SimClock {
    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.now_ms += crate::constants::TICK_MS;
    }
}
