//! Kill attribution: deciding whether the player earns credit for a death.
//!
//! The host reports raw damage events; the ledger keeps a short per-victim
//! damage history and answers the credit question when the victim dies.
//! Credit goes to the player when their recent damage share is dominant or
//! their absolute contribution clears a floor, so a finishing shot on a
//! victim mostly worn down by someone else does not start a war.

use turfwar_core::constants::{
    DAMAGE_MIN_POINTS, DAMAGE_SHARE_THRESHOLD, DAMAGE_WINDOW_MS, KILL_DEDUP_MS,
};
use turfwar_world::CharacterId;

/// Most victims tracked at once; the stalest is evicted beyond this.
const VICTIM_CAP: usize = 64;

#[derive(Debug, Clone, Copy)]
struct Hit {
    from_player: bool,
    amount: f32,
    at_ms: u64,
}

#[derive(Debug)]
struct VictimDamage {
    victim: CharacterId,
    hits: Vec<Hit>,
    last_hit_ms: u64,
}

/// Rolling per-victim damage history with a credited-victim dedup list.
#[derive(Debug, Default)]
pub struct DamageLedger {
    victims: Vec<VictimDamage>,
    /// (victim, credited-at) pairs blocking re-credit of the same handle.
    credited: Vec<(CharacterId, u64)>,
}

impl DamageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one damage event against a victim.
    pub fn record_damage(
        &mut self,
        victim: CharacterId,
        from_player: bool,
        amount: f32,
        now_ms: u64,
    ) {
        if amount <= 0.0 {
            return;
        }
        let hit = Hit {
            from_player,
            amount,
            at_ms: now_ms,
        };
        match self.victims.iter_mut().find(|v| v.victim == victim) {
            Some(entry) => {
                entry.hits.retain(|h| now_ms.saturating_sub(h.at_ms) <= DAMAGE_WINDOW_MS);
                entry.hits.push(hit);
                entry.last_hit_ms = now_ms;
            }
            None => {
                if self.victims.len() >= VICTIM_CAP {
                    if let Some((idx, _)) = self
                        .victims
                        .iter()
                        .enumerate()
                        .min_by_key(|(_, v)| v.last_hit_ms)
                    {
                        self.victims.swap_remove(idx);
                    }
                }
                self.victims.push(VictimDamage {
                    victim,
                    hits: vec![hit],
                    last_hit_ms: now_ms,
                });
            }
        }
    }

    /// Decide whether the player is credited with this victim's death.
    ///
    /// Consumes the victim's history either way, and a credited victim
    /// handle stays blocked for the dedup window.
    pub fn credit_for_death(&mut self, victim: CharacterId, now_ms: u64) -> bool {
        self.credited
            .retain(|(_, at)| now_ms.saturating_sub(*at) <= KILL_DEDUP_MS);

        let history = match self.victims.iter().position(|v| v.victim == victim) {
            Some(idx) => self.victims.swap_remove(idx),
            None => return false,
        };
        if self.credited.iter().any(|(id, _)| *id == victim) {
            tracing::debug!(?victim, "death already credited, ignoring");
            return false;
        }

        let mut player = 0.0f32;
        let mut total = 0.0f32;
        for hit in &history.hits {
            if now_ms.saturating_sub(hit.at_ms) > DAMAGE_WINDOW_MS {
                continue;
            }
            total += hit.amount;
            if hit.from_player {
                player += hit.amount;
            }
        }
        if total <= 0.0 || player <= 0.0 {
            return false;
        }

        let credited = player / total >= DAMAGE_SHARE_THRESHOLD || player >= DAMAGE_MIN_POINTS;
        if credited {
            self.credited.push((victim, now_ms));
        }
        credited
    }

    /// Drop every record. Used when a war starts so stale damage cannot
    /// feed a second trigger.
    pub fn clear(&mut self) {
        self.victims.clear();
    }

    #[cfg(test)]
    fn tracked_victims(&self) -> usize {
        self.victims.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn victims(world: &mut turfwar_world::SimWorld, n: u32) -> Vec<CharacterId> {
        use glam::Vec3;
        use turfwar_core::types::FactionId;
        (0..n)
            .map(|i| {
                world.spawn_character(FactionId(2), "synd_soldier_a", Vec3::new(i as f32, 0.0, 0.0))
            })
            .collect()
    }

    fn world() -> turfwar_world::SimWorld {
        turfwar_world::SimWorld::flat(100.0, 10.0)
    }

    #[test]
    fn dominant_share_earns_credit() {
        let mut w = world();
        let v = victims(&mut w, 1)[0];
        let mut ledger = DamageLedger::new();

        ledger.record_damage(v, true, 15.0, 1000);
        ledger.record_damage(v, false, 5.0, 1100);
        assert!(ledger.credit_for_death(v, 1200), "75% share");
    }

    #[test]
    fn minor_share_below_floor_is_not_credited() {
        let mut w = world();
        let v = victims(&mut w, 1)[0];
        let mut ledger = DamageLedger::new();

        ledger.record_damage(v, true, 10.0, 1000);
        ledger.record_damage(v, false, 90.0, 1100);
        assert!(!ledger.credit_for_death(v, 1200), "10% share, 10 points");
    }

    #[test]
    fn absolute_points_override_a_minor_share() {
        let mut w = world();
        let v = victims(&mut w, 1)[0];
        let mut ledger = DamageLedger::new();

        ledger.record_damage(v, true, 30.0, 1000);
        ledger.record_damage(v, false, 170.0, 1100);
        assert!(ledger.credit_for_death(v, 1200), "15% share but 30 points");
    }

    #[test]
    fn stale_damage_falls_out_of_the_window() {
        let mut w = world();
        let v = victims(&mut w, 1)[0];
        let mut ledger = DamageLedger::new();

        ledger.record_damage(v, true, 80.0, 1000);
        ledger.record_damage(v, false, 20.0, DAMAGE_WINDOW_MS + 2000);
        assert!(
            !ledger.credit_for_death(v, DAMAGE_WINDOW_MS + 2100),
            "only the other party's damage is still in the window"
        );
    }

    #[test]
    fn credited_victims_are_deduplicated() {
        let mut w = world();
        let v = victims(&mut w, 1)[0];
        let mut ledger = DamageLedger::new();

        ledger.record_damage(v, true, 50.0, 1000);
        assert!(ledger.credit_for_death(v, 1100));

        // Same handle dying again inside the dedup window is ignored.
        ledger.record_damage(v, true, 50.0, 2000);
        assert!(!ledger.credit_for_death(v, 2100));

        // Past the dedup window the handle may be credited again.
        ledger.record_damage(v, true, 50.0, KILL_DEDUP_MS + 5000);
        assert!(ledger.credit_for_death(v, KILL_DEDUP_MS + 5100));
    }

    #[test]
    fn victim_table_is_bounded() {
        let mut w = world();
        let ids = victims(&mut w, VICTIM_CAP as u32 + 10);
        let mut ledger = DamageLedger::new();

        for (i, v) in ids.iter().enumerate() {
            ledger.record_damage(*v, true, 10.0, i as u64 * 10);
        }
        assert_eq!(ledger.tracked_victims(), VICTIM_CAP);

        // The most recent victims survived the evictions.
        let last = *ids.last().unwrap();
        assert!(ledger.credit_for_death(last, 10_000));
    }

    #[test]
    fn unknown_victims_earn_nothing() {
        let mut w = world();
        let v = victims(&mut w, 1)[0];
        let mut ledger = DamageLedger::new();
        assert!(!ledger.credit_for_death(v, 1000));
    }
}
