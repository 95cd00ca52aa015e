//! Events emitted by the engine for the host to render or log.

use serde::{Deserialize, Serialize};

use crate::enums::WarEndReason;
use crate::types::{FactionId, TerritoryId};

/// Something noteworthy that happened during a tick.
///
/// Events are collected into the tick snapshot in emission order and
/// cleared before the next tick runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WarEvent {
    /// A war began over a territory.
    WarStarted {
        territory: TerritoryId,
        defender: FactionId,
    },
    /// A wave's first cluster has spawned.
    WaveStarted { wave: u32, headcount: u32 },
    /// Every attacker in the wave is down and the next wave is pending.
    WaveSurvived { wave: u32 },
    /// The final wave fell; the territory changes hands.
    WarWon {
        territory: TerritoryId,
        new_owner: FactionId,
    },
    /// The war ended without a winner.
    WarCancelled { reason: WarEndReason },
    /// An owned territory's defender died; ownership reverts to neutral.
    TerritoryNeutralized { territory: TerritoryId },
    /// The definition file was re-read.
    TerritoriesReloaded { count: usize },
    /// A load completed and its ownership snapshot was applied.
    OwnershipApplied { slot: u32, entries: usize },
    /// The ownership sidecar was written next to a save slot.
    OwnershipSaved { slot: u32 },
    /// The editor committed a new territory.
    TerritoryCreated { territory: TerritoryId },
    /// The editor deleted a territory.
    TerritoryDeleted { territory: TerritoryId },
}

impl WarEvent {
    /// True for events that should end up in the host's message feed.
    pub fn is_player_facing(&self) -> bool {
        !matches!(
            self,
            WarEvent::TerritoriesReloaded { .. }
                | WarEvent::OwnershipApplied { .. }
                | WarEvent::OwnershipSaved { .. }
        )
    }
}
