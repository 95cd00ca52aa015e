//! Enumeration types used throughout the engine.

use serde::{Deserialize, Serialize};

/// Per-territory difficulty tier selecting the wave weapon/headcount table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefenseLevel {
    /// File code 0.
    Light,
    /// File code 1 (default).
    #[default]
    Moderate,
    /// File code 2.
    Heavy,
}

impl DefenseLevel {
    /// Decode a definition-file code. Out-of-range values fall back to Moderate.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => DefenseLevel::Light,
            2 => DefenseLevel::Heavy,
            _ => DefenseLevel::Moderate,
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            DefenseLevel::Light => 0,
            DefenseLevel::Moderate => 1,
            DefenseLevel::Heavy => 2,
        }
    }
}

/// War lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarPhase {
    /// No war running.
    #[default]
    Idle,
    /// Waiting out the delay before the next wave begins.
    BetweenWaves,
    /// Wave started, remaining clusters still being placed one per stagger tick.
    Spawning,
    /// All clusters placed; polling for wave completion.
    Combat,
    /// Final wave cleared; waiting out the victory delay.
    VictoryDelay,
    /// Victory applied; resets to Idle on the next tick.
    Completed,
}

/// Why an active war ended without a victory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarEndReason {
    /// Explicit cancel command or administrative reset.
    Cancelled,
    /// Player left the war zone past the flee radius.
    PlayerFled,
    /// Player died; the territory falls neutral.
    PlayerDied,
    /// Territory definitions were reloaded mid-war.
    DefinitionsReloaded,
    /// A save slot load was applied.
    SaveLoad,
}

/// War pickup variety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Restorative pickup placed at the start of the first wave.
    Health,
    /// Defensive pickup placed at the start of later waves.
    Armor,
}

/// Movement pace for a pursue-and-attack directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MovePace {
    Walk,
    #[default]
    Run,
    Sprint,
}

/// Coarse behavioral state of a world character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Standing around with no objective.
    #[default]
    Idle,
    /// Ambient wandering.
    Wandering,
    /// Actively pursuing and attacking the player.
    CombatPlayer,
    /// Death animation in progress; no longer a combatant.
    Dying,
    Dead,
}

impl BehaviorState {
    /// States in which an enemy needs its combat objective re-asserted.
    pub fn is_disengaged(&self) -> bool {
        matches!(self, BehaviorState::Idle | BehaviorState::Wandering)
    }
}

/// Weapon categories issued to wave hostiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Bat,
    Pistol,
    Smg,
    Rifle,
}
