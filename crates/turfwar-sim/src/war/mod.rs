//! Everything that runs while a war is live: the wave state machine,
//! spawn placement, enemy tracking, and wave pickups.

pub mod orchestrator;
pub mod pickups;
pub mod planner;
pub mod tracker;

pub use orchestrator::WarOrchestrator;
pub use tracker::TeardownMode;
