//! War orchestrator: the multi-wave combat state machine.
//!
//! One war at a time. `Idle → BetweenWaves → Spawning → Combat` repeats
//! per wave; the final wave exits through `VictoryDelay → Completed` and
//! back to `Idle` on the next tick. All waiting is a stored deadline
//! checked against the engine clock. The orchestrator never keeps a
//! territory reference across ticks; it holds the id and re-resolves
//! against the store, so a mid-war definition reload cannot leave it
//! pointing at stale geometry.

use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use turfwar_core::constants::{
    BETWEEN_WAVE_DELAY_MS, CLUSTER_STAGGER_MS, DEATH_CHECK_MS, FLEE_CHECK_MS, FLEE_GRACE_MS,
    FLEE_RADIUS_SCALE, INITIAL_WAVE_DELAY_MS, VICTORY_DELAY_MS, WAVES_PER_WAR, WAVE_BONUS_CHANCE,
    WAVE_CHECK_MS, WAVE_MESSAGE_DELAY_MS,
};
use turfwar_core::enums::{DefenseLevel, PickupKind, WarEndReason, WarPhase};
use turfwar_core::events::WarEvent;
use turfwar_core::state::WarView;
use turfwar_core::types::{FactionId, Notoriety, Rect, TerritoryId};
use turfwar_rules::factions::faction_profile;
use turfwar_rules::waves::wave_profile;
use turfwar_world::GameWorld;

use crate::territory::TerritoryStore;
use crate::war::pickups::WarPickups;
use crate::war::planner::{self, ClusterPlan};
use crate::war::tracker::{CombatTracker, TeardownMode};

/// The active-or-idle war session.
pub struct WarOrchestrator {
    phase: WarPhase,
    /// Zero-based wave index; -1 before the first wave begins.
    wave: i32,
    target_count: u32,
    spawned_count: u32,
    defender: FactionId,
    territory: Option<TerritoryId>,
    center: Vec2,
    flee_radius: f32,
    /// Faction awarded the territory on victory.
    player_faction: FactionId,
    /// Defense tier of the contested territory, resolved at war start.
    defense: DefenseLevel,

    /// Notoriety snapshot taken at war start, restored at war end.
    saved_notoriety: Option<Notoriety>,

    plan: ClusterPlan,
    next_cluster: usize,

    tracker: CombatTracker,
    pickups: WarPickups,

    /// Shared deadline for the phase transitions (next wave, victory).
    next_action_ms: u64,
    next_cluster_ms: u64,
    next_wave_check_ms: u64,
    next_flee_check_ms: u64,
    next_death_check_ms: u64,
    /// (due time, wave index) of a scheduled "wave survived" notification.
    pending_wave_message: Option<(u64, u32)>,
    /// When the player first crossed the flee radius, if still outside.
    fled_since_ms: Option<u64>,
}

impl WarOrchestrator {
    pub fn new(player_faction: FactionId) -> Self {
        Self {
            phase: WarPhase::Idle,
            wave: -1,
            target_count: 0,
            spawned_count: 0,
            defender: FactionId(1),
            territory: None,
            center: Vec2::ZERO,
            flee_radius: 0.0,
            player_faction,
            defense: DefenseLevel::Moderate,
            saved_notoriety: None,
            plan: ClusterPlan::default(),
            next_cluster: 0,
            tracker: CombatTracker::new(),
            pickups: WarPickups::new(),
            next_action_ms: 0,
            next_cluster_ms: 0,
            next_wave_check_ms: 0,
            next_flee_check_ms: 0,
            next_death_check_ms: 0,
            pending_wave_message: None,
            fled_since_ms: None,
        }
    }

    pub fn phase(&self) -> WarPhase {
        self.phase
    }

    /// A war is running in any phase other than fully idle or completed.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, WarPhase::Idle | WarPhase::Completed)
    }

    pub fn active_territory(&self) -> Option<TerritoryId> {
        self.territory.filter(|_| self.is_active())
    }

    /// Snapshot view of the session for the host.
    pub fn view(&self, world: &dyn GameWorld) -> WarView {
        WarView {
            phase: self.phase,
            wave: u32::try_from(self.wave).ok(),
            target_count: self.target_count,
            spawned_count: self.spawned_count,
            alive_count: if self.is_active() {
                self.tracker.alive_count(world)
            } else {
                0
            },
            defender: self.is_active().then_some(self.defender),
            territory: self.active_territory(),
            center: self.is_active().then_some(self.center),
            flee_radius: if self.is_active() { self.flee_radius } else { 0.0 },
        }
    }

    /// Begin a war over a territory. A no-op while any war is running.
    #[allow(clippy::too_many_arguments)]
    pub fn start_war(
        &mut self,
        world: &mut dyn GameWorld,
        store: &mut TerritoryStore,
        defender: FactionId,
        territory_id: TerritoryId,
        now_ms: u64,
        events: &mut Vec<WarEvent>,
    ) {
        if self.is_active() {
            tracing::warn!(%territory_id, "start_war ignored: a war is already active");
            return;
        }
        let Some(territory) = store.get(territory_id) else {
            tracing::warn!(%territory_id, "start_war ignored: unknown territory");
            return;
        };

        let rect = territory.rect;
        let defense = territory.defense;
        // A previous war's despawn timer must not fire into this one.
        self.pickups.clear(world);

        self.defender = defender;
        self.territory = Some(territory_id);
        self.wave = -1;
        self.target_count = 0;
        self.spawned_count = 0;
        self.center = rect.center();
        self.flee_radius = rect.diagonal() / 2.0 * FLEE_RADIUS_SCALE;
        self.defense = defense;
        self.pending_wave_message = None;
        self.fled_since_ms = None;

        store.set_under_attack(territory_id, true);

        // Freeze notoriety for the war's duration.
        self.saved_notoriety = Some(world.notoriety());
        world.set_notoriety(Notoriety::frozen());

        self.next_action_ms = now_ms + INITIAL_WAVE_DELAY_MS;
        self.next_flee_check_ms = now_ms;
        self.next_death_check_ms = now_ms;
        self.phase = WarPhase::BetweenWaves;

        tracing::info!(%territory_id, defender = defender.0, radius = self.flee_radius, "war started");
        events.push(WarEvent::WarStarted {
            territory: territory_id,
            defender,
        });
    }

    /// Abort the active war without awarding the territory.
    pub fn cancel_war(
        &mut self,
        world: &mut dyn GameWorld,
        store: &mut TerritoryStore,
        reason: WarEndReason,
        events: &mut Vec<WarEvent>,
    ) {
        if self.phase == WarPhase::Idle {
            return;
        }
        tracing::info!(?reason, "war cancelled");
        self.teardown(world, store);
        events.push(WarEvent::WarCancelled { reason });
    }

    /// Per-tick driver. Safe to call in every phase.
    pub fn update(
        &mut self,
        world: &mut dyn GameWorld,
        store: &mut TerritoryStore,
        rng: &mut ChaCha8Rng,
        now_ms: u64,
        events: &mut Vec<WarEvent>,
    ) {
        // The despawn timer outlives the war itself.
        self.pickups.update(world, now_ms);

        if self.phase == WarPhase::Idle {
            return;
        }
        if self.phase == WarPhase::Completed {
            self.phase = WarPhase::Idle;
            return;
        }

        // Watchdogs run in every active phase.
        if now_ms >= self.next_death_check_ms {
            self.next_death_check_ms = now_ms + DEATH_CHECK_MS;
            if self.check_player_death(world, store, events) {
                return;
            }
        }
        if now_ms >= self.next_flee_check_ms {
            self.next_flee_check_ms = now_ms + FLEE_CHECK_MS;
            if self.check_for_fleeing(world, store, now_ms, events) {
                return;
            }
        }

        if let Some((due, wave)) = self.pending_wave_message {
            if now_ms >= due {
                self.pending_wave_message = None;
                events.push(WarEvent::WaveSurvived { wave });
            }
        }

        // Keep notoriety pinned; the host may try to escalate it mid-war.
        if self.saved_notoriety.is_some() && world.notoriety() != Notoriety::frozen() {
            world.set_notoriety(Notoriety::frozen());
        }

        self.tracker.update(world, now_ms);

        match self.phase {
            WarPhase::BetweenWaves => {
                if now_ms >= self.next_action_ms {
                    let next = (self.wave + 1) as u32;
                    self.begin_wave(world, store, rng, next, now_ms, events);
                }
            }
            WarPhase::Spawning => {
                if now_ms >= self.next_cluster_ms {
                    self.spawn_next_cluster(world, rng, now_ms);
                }
            }
            WarPhase::Combat => {
                self.tracker.reassert_aggression(world);
                if now_ms >= self.next_wave_check_ms {
                    self.next_wave_check_ms = now_ms + WAVE_CHECK_MS;
                    self.check_wave_completion(world, now_ms);
                }
            }
            WarPhase::VictoryDelay => {
                if now_ms >= self.next_action_ms {
                    self.complete_war(world, store, now_ms, events);
                }
            }
            WarPhase::Idle | WarPhase::Completed => {}
        }
    }

    /// Roll the wave headcount, plan clusters, place the wave pickup, and
    /// spawn the first cluster immediately.
    #[allow(clippy::too_many_arguments)]
    fn begin_wave(
        &mut self,
        world: &mut dyn GameWorld,
        store: &TerritoryStore,
        rng: &mut ChaCha8Rng,
        wave: u32,
        now_ms: u64,
        events: &mut Vec<WarEvent>,
    ) {
        let Some(rect) = self.resolve_rect(store) else {
            tracing::warn!("begin_wave: active territory vanished");
            return;
        };

        self.wave = wave as i32;
        let profile = wave_profile(self.defense, wave);
        let mut target = rng.gen_range(profile.min_count..=profile.max_count);
        if wave >= 1 && rng.gen_bool(WAVE_BONUS_CHANCE) {
            target += 1;
        }
        self.target_count = target;
        self.spawned_count = 0;

        let kind = if wave == 0 {
            PickupKind::Health
        } else {
            PickupKind::Armor
        };
        self.pickups.spawn_wave_pickup(world, rng, kind, rect);

        self.plan = planner::plan_clusters(world, rng, rect, target, wave == 0);
        self.next_cluster = 0;

        tracing::info!(
            wave,
            target,
            clusters = self.plan.centers.len(),
            "wave beginning"
        );
        events.push(WarEvent::WaveStarted {
            wave,
            headcount: target,
        });

        self.spawn_next_cluster(world, rng, now_ms);
    }

    /// Spawn the pending cluster; stagger the rest, or enter combat when
    /// every cluster is placed.
    fn spawn_next_cluster(&mut self, world: &mut dyn GameWorld, rng: &mut ChaCha8Rng, now_ms: u64) {
        if self.next_cluster >= self.plan.centers.len() {
            self.enter_combat(now_ms);
            return;
        }

        let center = self.plan.centers[self.next_cluster];
        let size = self.plan.sizes[self.next_cluster];
        let wave = self.wave.max(0) as u32;

        let profile = faction_profile(self.defender);
        let color = profile.map(|p| p.marker_color).unwrap_or([230, 30, 30, 255]);
        let models: &[&str] = profile.map(|p| p.models).unwrap_or(&["street_thug"]);

        let loadouts = wave_profile(self.defense, wave).loadouts;

        for _ in 0..size {
            let position = planner::place_entity(world, rng, center);
            let model = models[rng.gen_range(0..models.len())];
            let loadout = loadouts[rng.gen_range(0..loadouts.len())];
            match world.spawn_hostile(self.defender, model, position, loadout) {
                Some(character) => {
                    self.tracker.add_enemy(world, character, color);
                    self.spawned_count += 1;
                }
                None => tracing::warn!("world refused a hostile spawn"),
            }
        }
        tracing::debug!(
            cluster = self.next_cluster,
            of = self.plan.centers.len(),
            size,
            "cluster spawned"
        );

        self.next_cluster += 1;
        if self.next_cluster < self.plan.centers.len() {
            self.phase = WarPhase::Spawning;
            self.next_cluster_ms = now_ms + CLUSTER_STAGGER_MS;
        } else {
            self.enter_combat(now_ms);
        }
    }

    fn enter_combat(&mut self, now_ms: u64) {
        self.phase = WarPhase::Combat;
        self.next_wave_check_ms = now_ms + WAVE_CHECK_MS;
    }

    /// Zero alive: arm the next wave or the victory delay.
    fn check_wave_completion(&mut self, world: &dyn GameWorld, now_ms: u64) {
        if self.phase != WarPhase::Combat {
            tracing::warn!(phase = ?self.phase, "wave completion check in wrong phase");
            return;
        }
        if self.tracker.alive_count(world) > 0 {
            return;
        }

        let completed = self.wave.max(0) as u32;
        if completed + 1 < WAVES_PER_WAR {
            self.phase = WarPhase::BetweenWaves;
            self.next_action_ms = now_ms + BETWEEN_WAVE_DELAY_MS;
            self.pending_wave_message = Some((now_ms + WAVE_MESSAGE_DELAY_MS, completed));
            tracing::info!(wave = completed, "wave survived, next wave pending");
        } else {
            // Final wave: no survived notification, straight to victory.
            self.pending_wave_message = None;
            self.phase = WarPhase::VictoryDelay;
            self.next_action_ms = now_ms + VICTORY_DELAY_MS;
            tracing::info!("final wave cleared, victory pending");
        }
    }

    /// Finalize a won war: capture, cleanup, and the despawn timer.
    fn complete_war(
        &mut self,
        world: &mut dyn GameWorld,
        store: &mut TerritoryStore,
        now_ms: u64,
        events: &mut Vec<WarEvent>,
    ) {
        if self.phase != WarPhase::VictoryDelay {
            tracing::warn!(phase = ?self.phase, "complete_war in wrong phase");
            return;
        }

        let player_faction = self.player_faction;
        if let Some(territory_id) = self.territory {
            store.set_owner(territory_id, Some(player_faction));
            events.push(WarEvent::WarWon {
                territory: territory_id,
                new_owner: player_faction,
            });
            tracing::info!(%territory_id, new_owner = player_faction.0, "territory captured");
        }

        self.tracker.cleanup_all(world, TeardownMode::Release);
        self.restore_notoriety(world);
        self.pickups.arm_despawn_timer(world, now_ms);

        self.territory = None;
        self.wave = -1;
        self.target_count = 0;
        self.spawned_count = 0;
        self.plan = ClusterPlan::default();
        self.next_cluster = 0;
        self.pending_wave_message = None;
        self.phase = WarPhase::Completed;
    }

    /// Player death forfeits the territory to nobody.
    fn check_player_death(
        &mut self,
        world: &mut dyn GameWorld,
        store: &mut TerritoryStore,
        events: &mut Vec<WarEvent>,
    ) -> bool {
        if !world.player_is_dead() {
            return false;
        }
        tracing::info!("player died mid-war, territory goes neutral");
        if let Some(territory_id) = self.territory {
            store.set_owner(territory_id, None);
            events.push(WarEvent::TerritoryNeutralized {
                territory: territory_id,
            });
        }
        self.teardown(world, store);
        events.push(WarEvent::WarCancelled {
            reason: WarEndReason::PlayerDied,
        });
        true
    }

    /// Continuous time outside the flee radius cancels the war after the
    /// grace period; coming back inside resets it.
    fn check_for_fleeing(
        &mut self,
        world: &mut dyn GameWorld,
        store: &mut TerritoryStore,
        now_ms: u64,
        events: &mut Vec<WarEvent>,
    ) -> bool {
        let player = world.player_position().truncate();
        if player.distance(self.center) <= self.flee_radius {
            self.fled_since_ms = None;
            return false;
        }

        let since = *self.fled_since_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(since) < FLEE_GRACE_MS {
            return false;
        }
        tracing::info!("player fled the war zone");
        self.cancel_war(world, store, WarEndReason::PlayerFled, events);
        true
    }

    /// Shared teardown for every non-victory exit.
    fn teardown(&mut self, world: &mut dyn GameWorld, store: &mut TerritoryStore) {
        self.tracker.cleanup_all(world, TeardownMode::ForceKill);
        self.pickups.clear(world);
        if let Some(territory_id) = self.territory {
            store.set_under_attack(territory_id, false);
        }
        store.clear_transient_state();
        self.restore_notoriety(world);

        self.phase = WarPhase::Idle;
        self.territory = None;
        self.wave = -1;
        self.target_count = 0;
        self.spawned_count = 0;
        self.plan = ClusterPlan::default();
        self.next_cluster = 0;
        self.pending_wave_message = None;
        self.fled_since_ms = None;
    }

    fn restore_notoriety(&mut self, world: &mut dyn GameWorld) {
        if let Some(saved) = self.saved_notoriety.take() {
            world.set_notoriety(saved);
        }
    }

    fn resolve_rect(&self, store: &TerritoryStore) -> Option<Rect> {
        self.territory
            .and_then(|id| store.get(id))
            .map(|t| t.rect)
    }
}
