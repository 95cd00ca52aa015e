//! Faction (gang) profiles.
//!
//! Faction 0 is the ambient civilian pool and has no profile; ids 1..=3
//! are the provokable gangs that can own territory.

use turfwar_core::enums::WeaponKind;
use turfwar_core::types::FactionId;

/// Static profile for one gang.
pub struct FactionProfile {
    /// Display name for notifications and tooling.
    pub name: &'static str,
    /// Map marker color (RGBA).
    pub marker_color: [u8; 4],
    /// Character model pool for ambient members and war hostiles.
    pub models: &'static [&'static str],
    /// Sidearm carried by ambient members outside wars.
    pub default_weapon: WeaponKind,
}

/// Gang faction ids, in profile order.
pub const GANG_FACTIONS: [FactionId; 3] = [FactionId(1), FactionId(2), FactionId(3)];

static SYNDICATE: FactionProfile = FactionProfile {
    name: "Syndicate",
    marker_color: [200, 40, 40, 255],
    models: &["synd_soldier_a", "synd_soldier_b"],
    default_weapon: WeaponKind::Pistol,
};

static JADE_CIRCLE: FactionProfile = FactionProfile {
    name: "Jade Circle",
    marker_color: [40, 180, 90, 255],
    models: &["jade_enforcer_a", "jade_enforcer_b"],
    default_weapon: WeaponKind::Smg,
};

static VIPERS: FactionProfile = FactionProfile {
    name: "Vipers",
    marker_color: [230, 200, 40, 255],
    models: &["viper_runner_a", "viper_runner_b"],
    default_weapon: WeaponKind::Smg,
};

/// Get the profile for a gang faction. `None` for civilians and unknown ids.
pub fn faction_profile(faction: FactionId) -> Option<&'static FactionProfile> {
    match faction.0 {
        1 => Some(&SYNDICATE),
        2 => Some(&JADE_CIRCLE),
        3 => Some(&VIPERS),
        _ => None,
    }
}

/// Display name for any faction, with fallbacks for the civilian pool
/// and unknown ids.
pub fn faction_name(faction: FactionId) -> &'static str {
    match faction_profile(faction) {
        Some(p) => p.name,
        None if faction.0 == 0 => "Civilians",
        None => "Unknown",
    }
}
