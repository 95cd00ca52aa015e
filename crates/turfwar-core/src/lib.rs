//! Core types and definitions for the TURFWAR engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! territory and faction identifiers, geometry, enums, host commands,
//! emitted events, snapshot views, and tuning constants. It performs
//! no I/O and holds no mutable state.

pub mod commands;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
