//! Snapshot builder: one immutable view of the engine per tick.

use turfwar_core::events::WarEvent;
use turfwar_core::state::{EngineSnapshot, TerritoryView};
use turfwar_core::types::SimClock;
use turfwar_world::GameWorld;

use crate::territory::TerritoryStore;
use crate::war::WarOrchestrator;

/// Assemble the per-tick snapshot. Pure: reads everything, mutates nothing.
pub fn build_snapshot(
    world: &dyn GameWorld,
    clock: &SimClock,
    store: &TerritoryStore,
    orchestrator: &WarOrchestrator,
    overlay_enabled: bool,
    events: Vec<WarEvent>,
) -> EngineSnapshot {
    EngineSnapshot {
        tick: clock.tick,
        clock_ms: clock.now_ms,
        overlay_enabled,
        war: orchestrator.view(world),
        territories: store.territories().iter().map(TerritoryView::from).collect(),
        events,
    }
}
