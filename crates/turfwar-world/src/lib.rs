//! World boundary for the TURFWAR engine.
//!
//! The engine never touches a game world directly; it talks through the
//! [`query::GameWorld`] trait. This crate defines that trait plus
//! `SimWorld`, a deterministic heightfield-and-entity-table
//! implementation used by the demo binary and the integration tests.

pub mod heightfield;
pub mod query;
pub mod sim_world;

pub use query::{CharacterId, GameWorld, MarkerId, PickupId, SpawnRequest};
pub use sim_world::SimWorld;
