//! Per-defense-tier wave tables.
//!
//! Each war runs `WAVES_PER_WAR` waves; the defending territory's defense
//! level picks one column of this table. Headcounts are inclusive ranges
//! rolled by the orchestrator; weapon options are picked uniformly.

use turfwar_core::constants::WAVES_PER_WAR;
use turfwar_core::enums::{DefenseLevel, WeaponKind};
use turfwar_core::types::WeaponLoadout;

/// Configuration for one wave of one defense tier.
pub struct WaveProfile {
    /// Inclusive minimum hostiles.
    pub min_count: u32,
    /// Inclusive maximum hostiles.
    pub max_count: u32,
    /// Equal-probability weapon options for spawned hostiles.
    pub loadouts: &'static [WeaponLoadout],
}

const fn loadout(weapon: WeaponKind, ammo: u32) -> WeaponLoadout {
    WeaponLoadout { weapon, ammo }
}

static LIGHT_WAVES: [WaveProfile; 3] = [
    WaveProfile {
        min_count: 4,
        max_count: 6,
        loadouts: &[
            loadout(WeaponKind::Bat, 1),
            loadout(WeaponKind::Pistol, 60),
        ],
    },
    WaveProfile {
        min_count: 5,
        max_count: 7,
        loadouts: &[
            loadout(WeaponKind::Pistol, 80),
            loadout(WeaponKind::Smg, 120),
        ],
    },
    WaveProfile {
        min_count: 6,
        max_count: 8,
        loadouts: &[loadout(WeaponKind::Smg, 150)],
    },
];

static MODERATE_WAVES: [WaveProfile; 3] = [
    WaveProfile {
        min_count: 5,
        max_count: 7,
        loadouts: &[
            loadout(WeaponKind::Pistol, 60),
            loadout(WeaponKind::Smg, 90),
        ],
    },
    WaveProfile {
        min_count: 6,
        max_count: 8,
        loadouts: &[loadout(WeaponKind::Smg, 120)],
    },
    WaveProfile {
        min_count: 7,
        max_count: 9,
        loadouts: &[
            loadout(WeaponKind::Smg, 180),
            loadout(WeaponKind::Rifle, 200),
        ],
    },
];

static HEAVY_WAVES: [WaveProfile; 3] = [
    WaveProfile {
        min_count: 6,
        max_count: 8,
        loadouts: &[loadout(WeaponKind::Smg, 90)],
    },
    WaveProfile {
        min_count: 7,
        max_count: 9,
        loadouts: &[
            loadout(WeaponKind::Smg, 150),
            loadout(WeaponKind::Rifle, 180),
        ],
    },
    WaveProfile {
        min_count: 8,
        max_count: 10,
        loadouts: &[loadout(WeaponKind::Rifle, 200)],
    },
];

/// Defensive default for an out-of-range wave index.
static FALLBACK_WAVE: WaveProfile = WaveProfile {
    min_count: 2,
    max_count: 4,
    loadouts: &[loadout(WeaponKind::Pistol, 999_999)],
};

/// Get the wave table column for a defense tier.
pub fn wave_table(defense: DefenseLevel) -> &'static [WaveProfile; 3] {
    match defense {
        DefenseLevel::Light => &LIGHT_WAVES,
        DefenseLevel::Moderate => &MODERATE_WAVES,
        DefenseLevel::Heavy => &HEAVY_WAVES,
    }
}

/// Get one wave's profile; out-of-range indices get the fallback.
pub fn wave_profile(defense: DefenseLevel, wave: u32) -> &'static WaveProfile {
    if wave >= WAVES_PER_WAR {
        return &FALLBACK_WAVE;
    }
    &wave_table(defense)[wave as usize]
}
