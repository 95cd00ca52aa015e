//! Spawn planner: turns a wave headcount into placed spawn points.
//!
//! A wave is split into one, two, or three clusters by headcount. Each
//! cluster gets a center found by scanning angular sectors around the
//! player, rear-biased so reinforcements arrive from behind and beside
//! rather than straight ahead. Every candidate runs the full validity
//! gauntlet: inside the territory, ground near the player's elevation,
//! walkable, clear of geometry, and (first wave only) probabilistically
//! hidden from the player's view. Placement failures never block a wave;
//! the fallback chain always produces a point.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use turfwar_core::constants::{
    CENTER_ATTEMPTS_PER_SECTOR, CHEST_HEIGHT, CLUSTER_BIG_HEADCOUNT, CLUSTER_MID_HEADCOUNT,
    ENTITY_JITTER_MAX, ENTITY_JITTER_MIN, ENTITY_PLACE_ATTEMPTS, EXTRA_CENTER_ATTEMPTS,
    EXTRA_CENTER_SEPARATION, FALLBACK_CENTER_OFFSET, FALLBACK_TERRITORY_MARGIN,
    MAX_ELEVATION_DIFF, MIN_SPAWN_SEPARATION, ROOF_MAX_RISE, ROOF_PROBE_HEIGHT,
    SECTOR_ANGLE_JITTER, SPAWN_CLEAR_RADIUS, WALKABLE_MIN_DIRS, WALKABLE_PROBE_DIST,
    WALKABLE_Z_VARIANCE, WAVE0_VISIBILITY_REJECT_CHANCE,
};
use turfwar_core::types::Rect;
use turfwar_world::GameWorld;

/// Primary-center failure falls back to a point this far from the player.
const PRIMARY_FALLBACK_OFFSET: f32 = 50.0;

/// Spawn heights sit this far above the probed ground.
const SPAWN_GROUND_LIFT: f32 = 1.0;

use std::f32::consts::{FRAC_PI_4, PI, TAU};

/// One angular search sector relative to the player's facing direction.
struct SearchSector {
    /// Angle offset from the player's heading (radians).
    offset: f32,
    /// Candidate distance band from the player.
    dist_min: f32,
    dist_max: f32,
    /// Probability this sector is considered at all; the rear sector
    /// always is, forward sectors usually are not.
    weight: f64,
}

/// Rear-biased sector table: directly behind is preferred, beside is
/// likely, ahead is rare. Distances mirror the band each sector covers.
const SECTORS: [SearchSector; 6] = [
    SearchSector { offset: PI, dist_min: 35.0, dist_max: 65.0, weight: 1.0 },
    SearchSector { offset: 3.0 * FRAC_PI_4, dist_min: 35.0, dist_max: 52.0, weight: 0.7 },
    SearchSector { offset: -3.0 * FRAC_PI_4, dist_min: 35.0, dist_max: 52.0, weight: 0.7 },
    SearchSector { offset: FRAC_PI_4, dist_min: 42.0, dist_max: 58.5, weight: 0.5 },
    SearchSector { offset: -FRAC_PI_4, dist_min: 42.0, dist_max: 58.5, weight: 0.5 },
    SearchSector { offset: 0.0, dist_min: 45.5, dist_max: 52.5, weight: 0.3 },
];

/// The widest distance band, reused for the fallback full-circle scans.
const BAND_MIN: f32 = 35.0;
const BAND_MAX: f32 = 65.0;

/// A planned wave: cluster centers with the headcount assigned to each.
#[derive(Debug, Clone, Default)]
pub struct ClusterPlan {
    pub centers: Vec<Vec3>,
    pub sizes: Vec<u32>,
}

impl ClusterPlan {
    pub fn total(&self) -> u32 {
        self.sizes.iter().sum()
    }
}

/// Split a wave headcount into per-cluster sizes: as even as possible,
/// remainder added to the earliest clusters.
pub fn split_into_clusters(headcount: u32) -> Vec<u32> {
    let clusters = if headcount >= CLUSTER_BIG_HEADCOUNT {
        3
    } else if headcount >= CLUSTER_MID_HEADCOUNT {
        2
    } else {
        1
    };
    let base = headcount / clusters;
    let remainder = (headcount % clusters) as usize;
    (0..clusters as usize)
        .map(|i| base + u32::from(i < remainder))
        .collect()
}

/// Plan a full wave: sizes plus a validated center per cluster.
pub fn plan_clusters(
    world: &dyn GameWorld,
    rng: &mut ChaCha8Rng,
    territory: Rect,
    headcount: u32,
    first_wave: bool,
) -> ClusterPlan {
    let sizes = split_into_clusters(headcount);
    let player = world.player_position();

    let mut centers: Vec<Vec3> = Vec::with_capacity(sizes.len());

    let first = match find_center(world, rng, territory, first_wave, &centers) {
        Some(center) => center,
        None => {
            let fallback = fallback_primary_center(world, rng, territory, player);
            tracing::debug!(
                x = fallback.x,
                y = fallback.y,
                "no valid primary cluster center, using fallback"
            );
            fallback
        }
    };
    centers.push(first);

    for _ in 1..sizes.len() {
        let center = find_additional_center(world, rng, territory, first_wave, &centers)
            .unwrap_or_else(|| forced_center(world, rng, territory, &centers));
        centers.push(center);
    }

    ClusterPlan { centers, sizes }
}

/// Scan the sector table for one valid cluster center, then fall back to
/// a full-circle scan at the widest band.
fn find_center(
    world: &dyn GameWorld,
    rng: &mut ChaCha8Rng,
    territory: Rect,
    first_wave: bool,
    existing: &[Vec3],
) -> Option<Vec3> {
    let player = world.player_position();
    let heading = world.player_heading();

    for sector in &SECTORS {
        if rng.gen_bool(1.0 - sector.weight) {
            continue;
        }
        for _ in 0..CENTER_ATTEMPTS_PER_SECTOR {
            let angle = heading
                + sector.offset
                + rng.gen_range(-SECTOR_ANGLE_JITTER..SECTOR_ANGLE_JITTER);
            let distance = rng.gen_range(sector.dist_min..sector.dist_max);
            let candidate = offset_from(player, angle, distance);

            if let Some(valid) =
                validate_center(world, rng, territory, first_wave, existing, candidate, player)
            {
                return Some(valid);
            }
        }
    }

    // Full-circle fallback at the widest band, skipping the visibility
    // and walkability refinements; being inside and on the ground wins.
    for _ in 0..EXTRA_CENTER_ATTEMPTS {
        let angle = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(BAND_MIN..BAND_MAX);
        let candidate = offset_from(player, angle, distance);
        if !territory.contains(candidate.truncate()) {
            continue;
        }
        let Some(ground) = world.ground_z_at(candidate.x, candidate.y, player.z) else {
            continue;
        };
        if (ground - player.z).abs() > MAX_ELEVATION_DIFF {
            continue;
        }
        let placed = Vec3::new(candidate.x, candidate.y, ground + SPAWN_GROUND_LIFT);
        if world.sphere_is_clear(placed, SPAWN_CLEAR_RADIUS) {
            return Some(placed);
        }
    }

    None
}

/// Run the full validity gauntlet on one candidate point.
#[allow(clippy::too_many_arguments)]
fn validate_center(
    world: &dyn GameWorld,
    rng: &mut ChaCha8Rng,
    territory: Rect,
    first_wave: bool,
    existing: &[Vec3],
    candidate: Vec3,
    player: Vec3,
) -> Option<Vec3> {
    if !territory.contains(candidate.truncate()) {
        return None;
    }

    let ground = world.ground_z_at(candidate.x, candidate.y, player.z)?;
    if (ground - player.z).abs() > MAX_ELEVATION_DIFF {
        return None;
    }
    let placed = Vec3::new(candidate.x, candidate.y, ground + SPAWN_GROUND_LIFT);

    if !is_walkable(world, placed) {
        return None;
    }
    if !world.sphere_is_clear(placed, SPAWN_CLEAR_RADIUS) {
        return None;
    }

    // First wave only: spawning in plain sight is usually rejected so the
    // opening attack arrives out of view.
    if first_wave
        && world.has_line_of_sight(player + Vec3::Z * CHEST_HEIGHT, placed + Vec3::Z * CHEST_HEIGHT)
        && rng.gen_bool(WAVE0_VISIBILITY_REJECT_CHANCE)
    {
        return None;
    }

    let too_close = existing
        .iter()
        .any(|e| e.truncate().distance(placed.truncate()) < MIN_SPAWN_SEPARATION);
    if too_close {
        return None;
    }

    Some(placed)
}

/// A point is walkable when the ground stays level in at least two of
/// the four cardinal directions and a chest-height line to each level
/// probe is unobstructed. Corners and edges pass; isolated perches fail.
fn is_walkable(world: &dyn GameWorld, pos: Vec3) -> bool {
    let probes = [
        Vec2::new(WALKABLE_PROBE_DIST, 0.0),
        Vec2::new(-WALKABLE_PROBE_DIST, 0.0),
        Vec2::new(0.0, WALKABLE_PROBE_DIST),
        Vec2::new(0.0, -WALKABLE_PROBE_DIST),
    ];

    let mut valid_dirs = 0;
    for probe in probes {
        let px = pos.x + probe.x;
        let py = pos.y + probe.y;
        let Some(ground) = world.ground_z_at(px, py, pos.z) else {
            continue;
        };
        if (ground - pos.z).abs() > WALKABLE_Z_VARIANCE {
            continue;
        }
        let from = pos + Vec3::Z * CHEST_HEIGHT;
        let to = Vec3::new(px, py, ground + CHEST_HEIGHT);
        if world.has_line_of_sight(from, to) {
            valid_dirs += 1;
            if valid_dirs >= WALKABLE_MIN_DIRS {
                return true;
            }
        }
    }
    false
}

/// Additional cluster centers re-run the sector scan but must also keep
/// a wide separation from every already-placed center.
fn find_additional_center(
    world: &dyn GameWorld,
    rng: &mut ChaCha8Rng,
    territory: Rect,
    first_wave: bool,
    existing: &[Vec3],
) -> Option<Vec3> {
    for _ in 0..EXTRA_CENTER_ATTEMPTS {
        let candidate = find_center(world, rng, territory, first_wave, existing)?;
        let well_separated = existing
            .iter()
            .all(|e| e.truncate().distance(candidate.truncate()) >= EXTRA_CENTER_SEPARATION);
        if well_separated {
            return Some(candidate);
        }
    }
    None
}

/// Force a center by offsetting from the first cluster along a random
/// bearing and clamping back into the territory. Always produces a point.
fn forced_center(
    world: &dyn GameWorld,
    rng: &mut ChaCha8Rng,
    territory: Rect,
    existing: &[Vec3],
) -> Vec3 {
    let first = existing[0];
    let angle = rng.gen_range(0.0..TAU);
    let offset = offset_from(first, angle, FALLBACK_CENTER_OFFSET);
    let clamped = territory.clamp_point(offset.truncate(), FALLBACK_TERRITORY_MARGIN);
    let ground = world
        .ground_z_at(clamped.x, clamped.y, first.z)
        .unwrap_or(first.z);
    tracing::debug!(x = clamped.x, y = clamped.y, "forced cluster center");
    Vec3::new(clamped.x, clamped.y, ground + SPAWN_GROUND_LIFT)
}

/// Fallback when even the primary sector scan finds nothing: a random
/// bearing from the player, clamped into the territory and ground-snapped.
fn fallback_primary_center(
    world: &dyn GameWorld,
    rng: &mut ChaCha8Rng,
    territory: Rect,
    player: Vec3,
) -> Vec3 {
    let angle = rng.gen_range(0.0..TAU);
    let offset = offset_from(player, angle, PRIMARY_FALLBACK_OFFSET);
    let clamped = territory.clamp_point(offset.truncate(), FALLBACK_TERRITORY_MARGIN);
    let ground = world
        .ground_z_at(clamped.x, clamped.y, player.z)
        .unwrap_or(player.z);
    Vec3::new(clamped.x, clamped.y, ground + SPAWN_GROUND_LIFT)
}

/// Place one enemy inside its cluster: jittered around the center, with
/// a few retries to stay off rooftops, then an unconstrained ground snap.
pub fn place_entity(world: &dyn GameWorld, rng: &mut ChaCha8Rng, cluster_center: Vec3) -> Vec3 {
    let mut candidate = cluster_center;

    for _ in 0..ENTITY_PLACE_ATTEMPTS {
        let angle = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(ENTITY_JITTER_MIN..ENTITY_JITTER_MAX);
        candidate = offset_from(cluster_center, angle, distance);

        let Some(ground) = world.ground_z_at(candidate.x, candidate.y, cluster_center.z) else {
            continue;
        };
        if (ground - cluster_center.z).abs() > MAX_ELEVATION_DIFF {
            continue;
        }
        let placed = Vec3::new(candidate.x, candidate.y, ground + SPAWN_GROUND_LIFT);
        if !is_on_roof(world, placed, cluster_center) {
            return placed;
        }
    }

    // Last resort: snap the final candidate to whatever ground exists.
    let ground = world
        .ground_z_at(candidate.x, candidate.y, cluster_center.z)
        .unwrap_or(cluster_center.z);
    Vec3::new(candidate.x, candidate.y, ground + SPAWN_GROUND_LIFT)
}

/// Rooftop heuristic: an overhang close overhead, or ground rising far
/// above the cluster center, marks an elevated structure.
fn is_on_roof(world: &dyn GameWorld, pos: Vec3, cluster_center: Vec3) -> bool {
    if world.ceiling_above(pos, ROOF_PROBE_HEIGHT).is_some() {
        return true;
    }
    pos.z - cluster_center.z > ROOF_MAX_RISE
}

fn offset_from(origin: Vec3, angle: f32, distance: f32) -> Vec3 {
    Vec3::new(
        origin.x + distance * angle.cos(),
        origin.y + distance * angle.sin(),
        origin.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use turfwar_world::sim_world::Aabb;
    use turfwar_world::SimWorld;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn cluster_split_matches_thresholds() {
        assert_eq!(split_into_clusters(4), vec![4]);
        assert_eq!(split_into_clusters(5), vec![3, 2]);
        assert_eq!(split_into_clusters(7), vec![4, 3]);
        assert_eq!(split_into_clusters(8), vec![3, 3, 2]);
        assert_eq!(split_into_clusters(10), vec![4, 3, 3]);
    }

    #[test]
    fn cluster_sizes_sum_to_headcount() {
        for headcount in 1..=16 {
            let sizes = split_into_clusters(headcount);
            assert_eq!(sizes.iter().sum::<u32>(), headcount, "headcount {headcount}");
            assert!(sizes.iter().all(|s| *s > 0));
        }
    }

    #[test]
    fn plan_keeps_centers_inside_territory() {
        let world = SimWorld::flat(300.0, 10.0);
        let territory = Rect::from_bounds(-150.0, -150.0, 150.0, 150.0);
        let mut rng = rng();

        for first_wave in [true, false] {
            let plan = plan_clusters(&world, &mut rng, territory, 9, first_wave);
            assert_eq!(plan.centers.len(), 3);
            assert_eq!(plan.total(), 9);
            for center in &plan.centers {
                assert!(
                    territory.contains(center.truncate()),
                    "center {center} outside territory"
                );
            }
        }
    }

    #[test]
    fn additional_centers_keep_separation_or_are_forced_inside() {
        let world = SimWorld::flat(300.0, 10.0);
        let territory = Rect::from_bounds(-120.0, -120.0, 120.0, 120.0);
        let mut rng = rng();

        let plan = plan_clusters(&world, &mut rng, territory, 8, false);
        // Forced fallback centers may break the wide separation rule but
        // must still land inside the territory with margin.
        for center in &plan.centers {
            assert!(territory.contains(center.truncate()));
        }
    }

    #[test]
    fn tiny_territory_still_yields_a_plan() {
        // Too small for the 35-65 m band; everything must come from the
        // clamped fallback chain.
        let world = SimWorld::flat(300.0, 10.0);
        let territory = Rect::from_bounds(-12.0, -12.0, 12.0, 12.0);
        let mut rng = rng();

        let plan = plan_clusters(&world, &mut rng, territory, 6, true);
        assert_eq!(plan.centers.len(), 2);
        assert_eq!(plan.total(), 6);
        for center in &plan.centers {
            assert!(territory.contains(center.truncate()));
        }
    }

    #[test]
    fn walkable_rejects_isolated_perch() {
        let mut world = SimWorld::flat(200.0, 5.0);
        // A narrow tower: the perch on top has no level neighbors.
        world.add_obstacle(Aabb::block(
            Vec2::new(-2.0, -2.0),
            Vec2::new(2.0, 2.0),
            0.0,
            9.0,
        ));
        assert!(!is_walkable(&world, Vec3::new(0.0, 0.0, 9.0)));
        assert!(is_walkable(&world, Vec3::new(50.0, 50.0, 0.0)));
    }

    #[test]
    fn entity_placement_stays_near_cluster() {
        let world = SimWorld::flat(200.0, 10.0);
        let mut rng = rng();
        let center = Vec3::new(20.0, 30.0, 0.0);

        for _ in 0..32 {
            let pos = place_entity(&world, &mut rng, center);
            let dist = pos.truncate().distance(center.truncate());
            assert!(dist <= ENTITY_JITTER_MAX + 0.01, "jitter too wide: {dist}");
            assert!((pos.z - SPAWN_GROUND_LIFT).abs() < 0.01, "ground-snapped");
        }
    }

    #[test]
    fn entity_placement_avoids_roofed_spots() {
        let mut world = SimWorld::flat(200.0, 5.0);
        // Roof one side of the cluster's jitter disc.
        world.add_obstacle(Aabb::block(
            Vec2::new(0.0, -20.0),
            Vec2::new(40.0, 20.0),
            4.0,
            6.0,
        ));
        let mut rng = rng();
        let center = Vec3::new(-5.0, 0.0, 0.0);

        let mut clear = 0;
        for _ in 0..24 {
            let pos = place_entity(&world, &mut rng, center);
            if world.ceiling_above(pos, ROOF_PROBE_HEIGHT).is_none() {
                clear += 1;
            }
        }
        assert!(clear >= 20, "most placements avoid the roofed area: {clear}/24");
    }
}
