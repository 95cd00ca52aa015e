//! War engine: the single tick loop tying everything together.
//!
//! `WarEngine` owns the territory store, attribution ledger, trigger,
//! orchestrator, editor, and save/load lifecycle, all driven by one
//! fixed-rate tick against a host `GameWorld`. Host code reports raw
//! happenings (damage, deaths, save-file traffic) between ticks and queues
//! commands; each tick drains the queue, runs the systems in a fixed
//! order, and hands back a snapshot.

use std::collections::VecDeque;
use std::path::PathBuf;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use turfwar_core::commands::HostCommand;
use turfwar_core::enums::WarEndReason;
use turfwar_core::events::WarEvent;
use turfwar_core::state::EngineSnapshot;
use turfwar_core::types::{owner_from_code, FactionId, SimClock};
use turfwar_world::{CharacterId, GameWorld, SpawnRequest};

use crate::attribution::DamageLedger;
use crate::editor::TerritoryEditor;
use crate::persistence::{FileMode, LifecycleOutcome, SaveLifecycle, SidecarStore};
use crate::population;
use crate::snapshot;
use crate::territory::TerritoryStore;
use crate::trigger::WarTrigger;
use crate::war::WarOrchestrator;

/// Configuration for a new engine.
pub struct EngineConfig {
    /// RNG seed for determinism. Same seed = same engine decisions.
    pub seed: u64,
    /// Territory definition file, hot-reloaded while running.
    pub definition_path: PathBuf,
    /// Directory holding the per-slot ownership sidecars.
    pub persistence_dir: PathBuf,
    /// Faction credited with captured territories.
    pub player_faction: FactionId,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            definition_path: PathBuf::from("territories.txt"),
            persistence_dir: PathBuf::from("saves"),
            player_faction: FactionId(4),
        }
    }
}

/// The engine. Owns every subsystem; the world stays on the host side.
pub struct WarEngine {
    clock: SimClock,
    rng: ChaCha8Rng,
    store: TerritoryStore,
    sidecar: SidecarStore,
    lifecycle: SaveLifecycle,
    ledger: DamageLedger,
    trigger: WarTrigger,
    orchestrator: WarOrchestrator,
    editor: TerritoryEditor,
    command_queue: VecDeque<HostCommand>,
    events: Vec<WarEvent>,
    overlay_enabled: bool,
    /// Slot written by manual saves; follows the last applied load.
    active_slot: u32,
}

impl WarEngine {
    /// Create an engine and attempt the initial definition load. A missing
    /// or malformed file leaves the set empty until a reload succeeds.
    pub fn new(config: EngineConfig) -> Self {
        let mut store = TerritoryStore::new(config.definition_path);
        if let Err(err) = store.reload_preserving_ownership() {
            tracing::warn!(%err, "initial territory load failed, starting empty");
        }
        Self {
            clock: SimClock::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            store,
            sidecar: SidecarStore::new(config.persistence_dir),
            lifecycle: SaveLifecycle::new(),
            ledger: DamageLedger::new(),
            trigger: WarTrigger::new(),
            orchestrator: WarOrchestrator::new(config.player_faction),
            editor: TerritoryEditor::new(),
            command_queue: VecDeque::new(),
            events: Vec::new(),
            overlay_enabled: false,
            active_slot: 0,
        }
    }

    /// Queue a host command for the next tick.
    pub fn queue_command(&mut self, command: HostCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = HostCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance one tick and return the resulting snapshot.
    pub fn tick(&mut self, world: &mut dyn GameWorld) -> EngineSnapshot {
        self.clock.advance();
        let now = self.clock.now_ms;

        self.process_commands(world);

        if !self.orchestrator.is_active() {
            if let Some((defender, territory)) =
                self.trigger.evaluate(world, &self.store, now)
            {
                self.ledger.clear();
                self.orchestrator.start_war(
                    world,
                    &mut self.store,
                    defender,
                    territory,
                    now,
                    &mut self.events,
                );
            }
        }

        self.orchestrator
            .update(world, &mut self.store, &mut self.rng, now, &mut self.events);

        if let Some(slot) = self.lifecycle.take_pending_load(world.in_menu()) {
            self.apply_loaded_slot(world, slot);
        }

        if self.store.hot_reload_tick(now) {
            self.on_definitions_reloaded(world);
        }

        let events = std::mem::take(&mut self.events);
        snapshot::build_snapshot(
            world,
            &self.clock,
            &self.store,
            &self.orchestrator,
            self.overlay_enabled,
            events,
        )
    }

    // --- Host report hooks ---

    /// Host reports one damage event against a character.
    pub fn report_damage(&mut self, victim: CharacterId, from_player: bool, amount: f32) {
        self.ledger
            .record_damage(victim, from_player, amount, self.clock.now_ms);
    }

    /// Host reports a character death. Credited gang kills feed the trigger.
    pub fn report_death(&mut self, world: &dyn GameWorld, victim: CharacterId) {
        let now = self.clock.now_ms;
        if !self.ledger.credit_for_death(victim, now) {
            return;
        }
        let Some(faction) = world.character_faction(victim) else {
            return;
        };
        let Some(position) = world.character_position(victim) else {
            return;
        };
        if let Err(rejection) = self.trigger.record_gang_kill(
            world,
            &self.store,
            self.orchestrator.is_active(),
            faction,
            position,
            now,
        ) {
            tracing::debug!(?rejection, faction = faction.0, "credited kill not admissible");
        }
    }

    /// Host reports a save file opened for a slot.
    pub fn report_file_opened(&mut self, handle: u64, slot: u32, mode: FileMode) {
        self.lifecycle.file_opened(handle, slot, mode);
    }

    /// Host reports a file handle closed. Completed writes persist the
    /// sidecar now; completed reads arm a deferred load.
    pub fn report_file_closed(&mut self, handle: u64) {
        match self.lifecycle.file_closed(handle, self.clock.now_ms) {
            Some(LifecycleOutcome::SaveCompleted(slot)) => self.persist_slot(slot),
            Some(LifecycleOutcome::LoadArmed(slot)) => {
                tracing::debug!(slot, "load completion armed");
            }
            None => {}
        }
    }

    /// Propose an ambient spawn through the population bias.
    pub fn bias_ambient_spawn(
        &mut self,
        world: &dyn GameWorld,
        request: SpawnRequest,
    ) -> SpawnRequest {
        population::bias_spawn(world, &self.store, &mut self.rng, request)
    }

    // --- Accessors ---

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn store(&self) -> &TerritoryStore {
        &self.store
    }

    pub fn war_active(&self) -> bool {
        self.orchestrator.is_active()
    }

    // --- Internals ---

    fn process_commands(&mut self, world: &mut dyn GameWorld) {
        while let Some(command) = self.command_queue.pop_front() {
            if command.is_editor() && self.orchestrator.is_active() {
                tracing::warn!(command = command.label(), "editor locked during a war");
                continue;
            }
            self.handle_command(world, command);
        }
    }

    fn handle_command(&mut self, world: &mut dyn GameWorld, command: HostCommand) {
        tracing::debug!(command = command.label(), "processing command");
        match command {
            HostCommand::ForceReloadTerritories => {
                match self.store.reload_preserving_ownership() {
                    Ok(_) => self.on_definitions_reloaded(world),
                    Err(err) => tracing::warn!(%err, "forced reload failed, keeping previous set"),
                }
            }
            HostCommand::ResetOwnership => {
                self.store.reset_ownership_to_defaults();
            }
            HostCommand::SaveTerritories => {
                self.persist_slot(self.active_slot);
            }
            HostCommand::CancelWar => {
                self.orchestrator.cancel_war(
                    world,
                    &mut self.store,
                    WarEndReason::Cancelled,
                    &mut self.events,
                );
            }
            HostCommand::ToggleOverlay => {
                self.overlay_enabled = !self.overlay_enabled;
            }
            HostCommand::EditorPlaceCornerA => self.editor.place_corner_a(world),
            HostCommand::EditorPlaceCornerB => self.editor.place_corner_b(world),
            HostCommand::EditorCommit { owner_code } => {
                let Some(owner) = owner_from_code(owner_code) else {
                    tracing::warn!(owner_code, "editor commit with a bad owner code");
                    return;
                };
                if let Err(err) = self.editor.commit(&mut self.store, owner, &mut self.events) {
                    tracing::warn!(%err, "editor commit failed");
                }
            }
            HostCommand::EditorDeleteNearest => {
                if let Err(err) = self
                    .editor
                    .delete_nearest(world, &mut self.store, &mut self.events)
                {
                    tracing::warn!(%err, "editor delete failed");
                }
            }
            HostCommand::EditorCancel => self.editor.cancel(),
            HostCommand::NotifyLoadComplete { slot } => {
                self.lifecycle.notify_load_complete(slot, self.clock.now_ms);
            }
        }
    }

    /// Encode and write one slot's ownership sidecar.
    fn persist_slot(&mut self, slot: u32) {
        let entries = self.store.ownership_state();
        match self.sidecar.save_slot(slot, &entries) {
            Ok(()) => {
                self.active_slot = slot;
                self.events.push(WarEvent::OwnershipSaved { slot });
            }
            Err(err) => tracing::warn!(slot, %err, "ownership save failed"),
        }
    }

    /// Apply a loaded slot: tear down any war, then overlay the sidecar's
    /// ownership on the current definitions. A missing or bad sidecar
    /// falls back to the file-defined defaults.
    fn apply_loaded_slot(&mut self, world: &mut dyn GameWorld, slot: u32) {
        if self.orchestrator.is_active() {
            self.orchestrator.cancel_war(
                world,
                &mut self.store,
                WarEndReason::SaveLoad,
                &mut self.events,
            );
        }
        self.trigger.clear();
        self.ledger.clear();
        self.store.clear_transient_state();

        match self.sidecar.load_slot(slot) {
            Ok(Some(entries)) => {
                self.store.reset_ownership_to_defaults();
                self.store.apply_ownership(&entries);
                self.active_slot = slot;
                self.events.push(WarEvent::OwnershipApplied {
                    slot,
                    entries: entries.len(),
                });
            }
            Ok(None) => {
                tracing::info!(slot, "no sidecar for slot, using definition defaults");
                self.store.reset_ownership_to_defaults();
                self.active_slot = slot;
                self.events.push(WarEvent::OwnershipApplied { slot, entries: 0 });
            }
            Err(err) => {
                tracing::warn!(slot, %err, "sidecar decode failed, using definition defaults");
                self.store.reset_ownership_to_defaults();
            }
        }
    }

    /// A definition reload landed, from the poll or a forced command.
    fn on_definitions_reloaded(&mut self, world: &mut dyn GameWorld) {
        if self.orchestrator.is_active() {
            self.orchestrator.cancel_war(
                world,
                &mut self.store,
                WarEndReason::DefinitionsReloaded,
                &mut self.events,
            );
        }
        self.events.push(WarEvent::TerritoriesReloaded {
            count: self.store.territories().len(),
        });
    }
}
