//! War trigger: turning credited gang kills into a war declaration.
//!
//! Credited kills land in a bounded sliding window. The window is swept
//! on a fixed cadence against the territory the player is standing in;
//! enough kills of that territory's owner inside the window starts a war
//! over it. Kills that could never legally start a war are rejected at
//! record time, and the start conditions are checked again at poll time
//! since the player may have moved, mounted a vehicle, or lost the
//! territory between the kills and the sweep.

use std::collections::VecDeque;

use glam::Vec3;

use turfwar_core::constants::{
    KILL_LIST_CAP, KILL_TRIGGER_THRESHOLD, KILL_WINDOW_MS, TRIGGER_POLL_MS,
};
use turfwar_core::types::{FactionId, KillRecord, TerritoryId};
use turfwar_world::GameWorld;

use crate::territory::TerritoryStore;

/// Why a credited kill did not enter the trigger window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillRejection {
    /// A cutscene or scripted sequence controls the player.
    ScriptedSequence,
    /// A war is already running.
    WarActive,
    /// The player is in a vehicle.
    NotOnFoot,
    /// The kill happened outside every territory.
    NoTerritory,
    /// The territory's owner is not the victim's faction.
    OwnerMismatch,
    /// The territory is neutral or civilian-held; nothing to provoke.
    NotProvokable,
    /// The territory is already being fought over.
    UnderAttack,
}

/// Sliding kill window feeding the war declaration.
#[derive(Debug, Default)]
pub struct WarTrigger {
    kills: VecDeque<KillRecord>,
    next_poll_ms: u64,
}

impl WarTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a player-credited kill of a `victim_faction` member at
    /// `position` into the window, or say why not.
    pub fn record_gang_kill(
        &mut self,
        world: &dyn GameWorld,
        store: &TerritoryStore,
        war_active: bool,
        victim_faction: FactionId,
        position: Vec3,
        now_ms: u64,
    ) -> Result<(), KillRejection> {
        if world.in_scripted_sequence() {
            return Err(KillRejection::ScriptedSequence);
        }
        if war_active {
            return Err(KillRejection::WarActive);
        }
        if !world.player_is_on_foot() {
            return Err(KillRejection::NotOnFoot);
        }

        let territory = store
            .territory_at(position.truncate())
            .ok_or(KillRejection::NoTerritory)?;
        let owner = match territory.owner {
            Some(owner) if owner.is_provokable() => owner,
            _ => return Err(KillRejection::NotProvokable),
        };
        if owner != victim_faction {
            return Err(KillRejection::OwnerMismatch);
        }
        if territory.under_attack {
            return Err(KillRejection::UnderAttack);
        }

        if self.kills.len() >= KILL_LIST_CAP {
            self.kills.pop_front();
        }
        self.kills.push_back(KillRecord {
            faction: victim_faction,
            territory: territory.id,
            at_ms: now_ms,
            position,
        });
        tracing::debug!(
            faction = victim_faction.0,
            territory = %territory.id,
            window = self.kills.len(),
            "provocation recorded"
        );
        Ok(())
    }

    /// Sweep the window on the poll cadence. Counts only kills inside the
    /// territory the player currently occupies and re-checks the start
    /// conditions against the present world state. Returns the faction and
    /// territory to start a war over, clearing the window when it fires.
    pub fn evaluate(
        &mut self,
        world: &dyn GameWorld,
        store: &TerritoryStore,
        now_ms: u64,
    ) -> Option<(FactionId, TerritoryId)> {
        if now_ms < self.next_poll_ms {
            return None;
        }
        self.next_poll_ms = now_ms + TRIGGER_POLL_MS;

        while let Some(front) = self.kills.front() {
            if now_ms.saturating_sub(front.at_ms) > KILL_WINDOW_MS {
                self.kills.pop_front();
            } else {
                break;
            }
        }
        if self.kills.is_empty() {
            return None;
        }

        // The kills were legal when recorded; the player's situation may
        // not be any more. A failed check leaves the window intact.
        if world.in_scripted_sequence() || !world.player_is_on_foot() {
            return None;
        }
        let territory = store.territory_at(world.player_position().truncate())?;
        let owner = match territory.owner {
            Some(owner) if owner.is_provokable() => owner,
            _ => return None,
        };
        if territory.under_attack {
            return None;
        }

        let count = self
            .kills
            .iter()
            .filter(|k| k.faction == owner && k.territory == territory.id)
            .count();
        if count >= KILL_TRIGGER_THRESHOLD {
            let hit = (owner, territory.id);
            tracing::info!(
                faction = hit.0 .0,
                territory = %hit.1,
                count,
                "kill threshold reached, war triggering"
            );
            self.kills.clear();
            return Some(hit);
        }
        None
    }

    /// Drop the window outright. Called on war start from any source.
    pub fn clear(&mut self) {
        self.kills.clear();
    }

    pub fn pending_kills(&self) -> usize {
        self.kills.len()
    }
}
