//! Commands the host submits to the engine.
//!
//! Commands are queued during a frame and drained at the top of the next
//! tick, so host code never mutates engine state mid-update.

use serde::{Deserialize, Serialize};

/// A host-issued instruction, applied at the start of the next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostCommand {
    // --- Territory store ---
    /// Re-read the definition file now, bypassing the modification-stamp poll.
    ForceReloadTerritories,
    /// Restore every territory to its file-defined owner and clear attack flags.
    ResetOwnership,
    /// Write the current ownership sidecar to disk immediately.
    SaveTerritories,

    // --- War control ---
    /// Abort the active war, if any. Ownership is left unchanged.
    CancelWar,

    // --- Overlay ---
    /// Toggle the debug overlay flag reported in snapshots.
    ToggleOverlay,

    // --- Editor ---
    /// Drop the first rectangle corner at the player's position.
    EditorPlaceCornerA,
    /// Drop the second rectangle corner at the player's position.
    EditorPlaceCornerB,
    /// Create a territory from the placed corners and persist it.
    EditorCommit {
        /// Faction code for the new territory's default owner (-1 for neutral).
        owner_code: i32,
    },
    /// Delete the territory whose center is nearest the player, within range.
    EditorDeleteNearest,
    /// Discard any placed corners without committing.
    EditorCancel,

    // --- Save/load hooks ---
    /// A save slot finished loading; apply its ownership snapshot.
    NotifyLoadComplete {
        /// Slot index the host just loaded.
        slot: u32,
    },
}

impl HostCommand {
    /// True for commands that can mutate the territory definition set.
    pub fn touches_definitions(&self) -> bool {
        matches!(
            self,
            HostCommand::ForceReloadTerritories
                | HostCommand::EditorCommit { .. }
                | HostCommand::EditorDeleteNearest
        )
    }

    /// Editor commands are ignored while a war is running.
    pub fn is_editor(&self) -> bool {
        matches!(
            self,
            HostCommand::EditorPlaceCornerA
                | HostCommand::EditorPlaceCornerB
                | HostCommand::EditorCommit { .. }
                | HostCommand::EditorDeleteNearest
                | HostCommand::EditorCancel
        )
    }

    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            HostCommand::ForceReloadTerritories => "force_reload",
            HostCommand::ResetOwnership => "reset_ownership",
            HostCommand::SaveTerritories => "save_territories",
            HostCommand::CancelWar => "cancel_war",
            HostCommand::ToggleOverlay => "toggle_overlay",
            HostCommand::EditorPlaceCornerA => "editor_corner_a",
            HostCommand::EditorPlaceCornerB => "editor_corner_b",
            HostCommand::EditorCommit { .. } => "editor_commit",
            HostCommand::EditorDeleteNearest => "editor_delete",
            HostCommand::EditorCancel => "editor_cancel",
            HostCommand::NotifyLoadComplete { .. } => "load_complete",
        }
    }
}
