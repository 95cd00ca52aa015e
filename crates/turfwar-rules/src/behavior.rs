//! Chase behavior selection for war hostiles.

use turfwar_core::constants::{AGGRO_RUN_DIST, AGGRO_SPRINT_DIST};
use turfwar_core::enums::MovePace;

/// Pick a pursuit pace from the hostile's distance to the player.
/// Far stragglers sprint so waves never stall on a distant spawn.
pub fn pace_for_distance(distance: f32) -> MovePace {
    if distance > AGGRO_SPRINT_DIST {
        MovePace::Sprint
    } else if distance > AGGRO_RUN_DIST {
        MovePace::Run
    } else {
        MovePace::Walk
    }
}
