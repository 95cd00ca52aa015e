//! Engine constants and tuning parameters.
//!
//! Distances are meters, durations are milliseconds on the engine's
//! monotonic clock unless noted otherwise.

// --- Tick ---

/// Engine tick rate (Hz).
pub const TICK_RATE: u32 = 20;

/// Milliseconds per tick.
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

// --- Territory store ---

/// Minimum interval between definition-file modification-stamp polls.
pub const HOT_RELOAD_POLL_MS: u64 = 1000;

// --- War trigger ---

/// Hard cap on retained kill records; the oldest is evicted beyond this.
pub const KILL_LIST_CAP: usize = 100;

/// Sliding window inside which kills count toward a trigger.
pub const KILL_WINDOW_MS: u64 = 15_000;

/// Same-territory, same-faction kills inside the window needed to start a war.
pub const KILL_TRIGGER_THRESHOLD: usize = 3;

/// Trigger evaluation cadence.
pub const TRIGGER_POLL_MS: u64 = 500;

// --- Kill attribution ---

/// Damage older than this no longer counts toward kill credit.
pub const DAMAGE_WINDOW_MS: u64 = 4000;

/// Player damage share that earns kill credit.
pub const DAMAGE_SHARE_THRESHOLD: f32 = 0.6;

/// Absolute player damage that earns kill credit regardless of share.
pub const DAMAGE_MIN_POINTS: f32 = 25.0;

/// A victim credited once is not credited again within this window.
pub const KILL_DEDUP_MS: u64 = 30_000;

// --- War pacing ---

/// Waves fought per war.
pub const WAVES_PER_WAR: u32 = 3;

/// Delay between war start and the first wave.
pub const INITIAL_WAVE_DELAY_MS: u64 = 4000;

/// Delay between a cleared wave and the next one.
pub const BETWEEN_WAVE_DELAY_MS: u64 = 10_000;

/// Delay between the final kill and war completion.
pub const VICTORY_DELAY_MS: u64 = 2000;

/// Stagger between cluster spawns within one wave.
pub const CLUSTER_STAGGER_MS: u64 = 1000;

/// Wave-completion poll cadence during combat.
pub const WAVE_CHECK_MS: u64 = 1000;

/// Delay before the "wave survived" notification fires.
pub const WAVE_MESSAGE_DELAY_MS: u64 = 800;

/// Chance of one bonus enemy on waves after the first.
pub const WAVE_BONUS_CHANCE: f64 = 0.10;

// --- Watchdogs ---

/// Flee-distance poll cadence.
pub const FLEE_CHECK_MS: u64 = 500;

/// Continuous time outside the flee radius before the war cancels.
pub const FLEE_GRACE_MS: u64 = 1000;

/// Flee radius = territory half-diagonal times this factor.
pub const FLEE_RADIUS_SCALE: f32 = 1.5;

/// Player-death poll cadence.
pub const DEATH_CHECK_MS: u64 = 1000;

// --- Combat tracker ---

/// Marker upkeep sweep cadence.
pub const MARKER_SWEEP_MS: u64 = 100;

/// Forced re-engage sweep cadence for distant stragglers.
pub const FORCE_ENGAGE_MS: u64 = 2000;

/// Stragglers beyond this distance are forced back onto the player at a sprint.
pub const FORCE_ENGAGE_DIST: f32 = 50.0;

/// Beyond this distance a chase directive sprints.
pub const AGGRO_SPRINT_DIST: f32 = 30.0;

/// Beyond this distance (up to the sprint band) a chase directive runs.
pub const AGGRO_RUN_DIST: f32 = 15.0;

// --- Pickups ---

/// Annulus around the player searched for a pickup point (inner radius).
pub const PICKUP_RING_MIN: f32 = 8.0;

/// Annulus around the player searched for a pickup point (outer radius).
pub const PICKUP_RING_MAX: f32 = 20.0;

/// Randomized placement attempts before the fallback chain.
pub const PICKUP_ATTEMPTS: u32 = 20;

/// Minimum separation from any surviving pickup.
pub const PICKUP_MIN_SEPARATION: f32 = 8.0;

/// Near-player jitter extent for the second fallback.
pub const PICKUP_JITTER: f32 = 15.0;

/// Pickups sit this far above the probed ground.
pub const PICKUP_GROUND_LIFT: f32 = 0.2;

/// Surviving pickups despawn this long after a victory.
pub const PICKUP_DESPAWN_MS: u64 = 60_000;

// --- Spawn planner ---

/// Headcount at which a wave splits into three clusters.
pub const CLUSTER_BIG_HEADCOUNT: u32 = 8;

/// Headcount at which a wave splits into two clusters.
pub const CLUSTER_MID_HEADCOUNT: u32 = 5;

/// Candidate points tried per angular sector for the primary center.
pub const CENTER_ATTEMPTS_PER_SECTOR: u32 = 12;

/// Candidate points tried for each additional cluster center.
pub const EXTRA_CENTER_ATTEMPTS: u32 = 25;

/// Minimum separation between accepted spawn points.
pub const MIN_SPAWN_SEPARATION: f32 = 10.0;

/// Minimum separation between additional cluster centers.
pub const EXTRA_CENTER_SEPARATION: f32 = 40.0;

/// Forced-fallback centers offset this far from the first cluster.
pub const FALLBACK_CENTER_OFFSET: f32 = 60.0;

/// Forced-fallback centers keep this margin from the territory edge.
pub const FALLBACK_TERRITORY_MARGIN: f32 = 10.0;

/// Extra angular jitter applied to every sector candidate (radians).
pub const SECTOR_ANGLE_JITTER: f32 = 0.5;

/// Maximum ground-elevation difference from the player for a cluster center.
pub const MAX_ELEVATION_DIFF: f32 = 10.0;

/// Cardinal probe distance for the walkability test.
pub const WALKABLE_PROBE_DIST: f32 = 8.0;

/// Allowed ground-height variance across walkability probes.
pub const WALKABLE_Z_VARIANCE: f32 = 2.5;

/// Cardinal probes (of 4) that must pass for a point to be walkable.
pub const WALKABLE_MIN_DIRS: usize = 2;

/// Chest height for line-of-fire checks.
pub const CHEST_HEIGHT: f32 = 1.2;

/// Clearance sphere radius around a spawn point.
pub const SPAWN_CLEAR_RADIUS: f32 = 1.0;

/// First-wave bias: chance to reject a center visible to the player.
pub const WAVE0_VISIBILITY_REJECT_CHANCE: f64 = 0.7;

/// Per-entity jitter around the cluster center (inner radius).
pub const ENTITY_JITTER_MIN: f32 = 3.0;

/// Per-entity jitter around the cluster center (outer radius).
pub const ENTITY_JITTER_MAX: f32 = 12.0;

/// Per-entity placement attempts before the unconstrained fallback.
pub const ENTITY_PLACE_ATTEMPTS: u32 = 5;

/// An upward probe hit within this distance marks a rooftop point.
pub const ROOF_PROBE_HEIGHT: f32 = 10.0;

/// Ground this far above the cluster center marks an elevated structure.
pub const ROOF_MAX_RISE: f32 = 20.0;

// --- Ambient population bias ---

/// Chance an ambient spawn inside an owned territory is rewritten.
pub const POP_REWRITE_CHANCE: f64 = 0.35;

/// Radius of the local same-faction density check.
pub const POP_DENSITY_RADIUS: f32 = 50.0;

/// Same-faction characters within the radius that saturate the bias.
pub const POP_DENSITY_CAP: usize = 6;

// --- Save/load lifecycle ---

/// Capacity of the in-flight save-file handle table.
pub const LIFECYCLE_HANDLE_CAP: usize = 64;

/// Duplicate load completions for one slot are ignored within this window.
pub const LOAD_DEDUP_MS: u64 = 1500;

// --- Territory editor ---

/// Minimum committed territory extent on each axis.
pub const EDITOR_MIN_EXTENT: f32 = 2.0;

/// Editor-allocated ids start here.
pub const EDITOR_ID_FLOOR: u32 = 1000;

/// Delete-nearest only considers territories centered within this range.
pub const EDITOR_DELETE_RANGE: f32 = 200.0;
