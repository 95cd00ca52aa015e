//! Ambient population bias: making owned turf look owned.
//!
//! Candidate ambient spawns pass through here on their way into the world.
//! Inside a faction-owned territory a fraction of them are rewritten to the
//! owning faction's model set, capped by local same-faction density so one
//! street corner never saturates. A candidate is only ever rewritten or
//! passed through, never dropped.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use turfwar_core::constants::{POP_DENSITY_CAP, POP_DENSITY_RADIUS, POP_REWRITE_CHANCE};
use turfwar_rules::factions::faction_profile;
use turfwar_world::{GameWorld, SpawnRequest};

use crate::territory::TerritoryStore;

/// Rewrite (or pass through) one candidate ambient spawn.
pub fn bias_spawn(
    world: &dyn GameWorld,
    store: &TerritoryStore,
    rng: &mut ChaCha8Rng,
    request: SpawnRequest,
) -> SpawnRequest {
    let Some(territory) = store.territory_at(request.position.truncate()) else {
        return request;
    };
    let Some(owner) = territory.owner.filter(|o| o.is_provokable()) else {
        return request;
    };
    // Already one of theirs.
    if request.faction == owner {
        return request;
    }
    let Some(profile) = faction_profile(owner) else {
        return request;
    };

    if !rng.gen_bool(POP_REWRITE_CHANCE) {
        return request;
    }
    let nearby = world.count_faction_members_near(request.position, POP_DENSITY_RADIUS, owner);
    if nearby >= POP_DENSITY_CAP {
        tracing::trace!(
            faction = owner.0,
            nearby,
            "population bias saturated, passing spawn through"
        );
        return request;
    }

    let model = profile.models[rng.gen_range(0..profile.models.len())];
    SpawnRequest {
        faction: owner,
        model: model.to_string(),
        position: request.position,
    }
}
