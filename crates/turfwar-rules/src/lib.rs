//! Faction and combat rule tables for the TURFWAR engine.
//!
//! Pure data: faction profiles, per-defense-tier wave tables, and
//! chase-pace selection. No I/O and no randomness; callers roll their
//! own dice against the ranges defined here.

pub mod behavior;
pub mod factions;
pub mod waves;
