//! Per-tick snapshot types handed back to the host.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::{DefenseLevel, WarPhase};
use crate::events::WarEvent;
use crate::types::{FactionId, Territory, TerritoryId};

/// Read-only view of one territory for overlays and tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryView {
    pub id: TerritoryId,
    pub min: Vec2,
    pub max: Vec2,
    pub owner: Option<FactionId>,
    pub under_attack: bool,
    pub defense: DefenseLevel,
}

impl From<&Territory> for TerritoryView {
    fn from(t: &Territory) -> Self {
        TerritoryView {
            id: t.id,
            min: t.rect.min,
            max: t.rect.max,
            owner: t.owner,
            under_attack: t.under_attack,
            defense: t.defense,
        }
    }
}

/// Read-only view of the active war, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarView {
    pub phase: WarPhase,
    /// Zero-based index of the current wave; `None` until the first wave
    /// of a war begins.
    pub wave: Option<u32>,
    /// Attackers planned for the current wave.
    pub target_count: u32,
    /// Attackers spawned so far this wave.
    pub spawned_count: u32,
    /// Attackers still alive this wave.
    pub alive_count: u32,
    pub defender: Option<FactionId>,
    pub territory: Option<TerritoryId>,
    /// Territory center, set while a war is active.
    pub center: Option<Vec2>,
    /// Leaving this radius around the center forfeits the war.
    pub flee_radius: f32,
}

/// Everything the host needs to render one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub tick: u64,
    pub clock_ms: u64,
    pub overlay_enabled: bool,
    pub war: WarView,
    pub territories: Vec<TerritoryView>,
    /// Events emitted this tick, in order.
    pub events: Vec<WarEvent>,
}

impl EngineSnapshot {
    /// True while any war phase other than idle is running.
    pub fn war_active(&self) -> bool {
        self.war.phase != WarPhase::Idle
    }
}
