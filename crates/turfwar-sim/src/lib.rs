//! Territory ownership and war orchestration engine.
//!
//! Owns the territory store and its definition file, the per-save-slot
//! ownership sidecar, the kill-attribution war trigger, the multi-wave
//! war state machine with its spawn planner and combat tracker, the
//! ambient population bias, and the in-game territory editor. Everything
//! runs from a single fixed-rate tick; the host world is reached only
//! through the `turfwar-world` boundary trait.

pub mod attribution;
pub mod editor;
pub mod engine;
pub mod persistence;
pub mod population;
pub mod snapshot;
pub mod territory;
pub mod trigger;
pub mod war;

#[cfg(test)]
mod tests;
