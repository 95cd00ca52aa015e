#[cfg(test)]
mod tests {
    use glam::Vec2;

    use crate::commands::HostCommand;
    use crate::constants::TICK_MS;
    use crate::enums::*;
    use crate::events::WarEvent;
    use crate::state::EngineSnapshot;
    use crate::types::{
        owner_from_code, owner_to_code, FactionId, Notoriety, Rect, SimClock, Territory,
        TerritoryId,
    };

    /// Verify defense codes map both directions, with out-of-range falling back.
    #[test]
    fn test_defense_level_codes() {
        assert_eq!(DefenseLevel::from_code(0), DefenseLevel::Light);
        assert_eq!(DefenseLevel::from_code(1), DefenseLevel::Moderate);
        assert_eq!(DefenseLevel::from_code(2), DefenseLevel::Heavy);
        assert_eq!(DefenseLevel::from_code(99), DefenseLevel::Moderate);
        for level in [DefenseLevel::Light, DefenseLevel::Moderate, DefenseLevel::Heavy] {
            assert_eq!(DefenseLevel::from_code(level.code()), level);
        }
    }

    /// Verify war phases round-trip through serde_json.
    #[test]
    fn test_war_phase_serde() {
        let variants = vec![
            WarPhase::Idle,
            WarPhase::BetweenWaves,
            WarPhase::Spawning,
            WarPhase::Combat,
            WarPhase::VictoryDelay,
            WarPhase::Completed,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: WarPhase = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_end_reason_serde() {
        let variants = vec![
            WarEndReason::Cancelled,
            WarEndReason::PlayerFled,
            WarEndReason::PlayerDied,
            WarEndReason::DefinitionsReloaded,
            WarEndReason::SaveLoad,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: WarEndReason = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    /// Verify HostCommand round-trips through serde (tagged union).
    #[test]
    fn test_host_command_serde() {
        let commands = vec![
            HostCommand::ForceReloadTerritories,
            HostCommand::ResetOwnership,
            HostCommand::SaveTerritories,
            HostCommand::CancelWar,
            HostCommand::ToggleOverlay,
            HostCommand::EditorPlaceCornerA,
            HostCommand::EditorPlaceCornerB,
            HostCommand::EditorCommit { owner_code: 2 },
            HostCommand::EditorDeleteNearest,
            HostCommand::EditorCancel,
            HostCommand::NotifyLoadComplete { slot: 3 },
        ];
        for cmd in &commands {
            let json = serde_json::to_string(cmd).unwrap();
            let back: HostCommand = serde_json::from_str(&json).unwrap();
            assert_eq!(*cmd, back);
        }
    }

    #[test]
    fn test_editor_command_classification() {
        assert!(HostCommand::EditorCommit { owner_code: -1 }.is_editor());
        assert!(HostCommand::EditorCancel.is_editor());
        assert!(!HostCommand::CancelWar.is_editor());
        assert!(HostCommand::ForceReloadTerritories.touches_definitions());
        assert!(!HostCommand::ToggleOverlay.touches_definitions());
    }

    /// Verify WarEvent round-trips through serde.
    #[test]
    fn test_war_event_serde() {
        let events = vec![
            WarEvent::WarStarted {
                territory: TerritoryId(7),
                defender: FactionId(2),
            },
            WarEvent::WaveStarted {
                wave: 1,
                headcount: 6,
            },
            WarEvent::WarCancelled {
                reason: WarEndReason::PlayerFled,
            },
            WarEvent::OwnershipApplied { slot: 0, entries: 12 },
        ];
        for event in &events {
            let json = serde_json::to_string(event).unwrap();
            let back: WarEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(*event, back);
        }
    }

    /// Verify EngineSnapshot can be serialized to JSON.
    #[test]
    fn test_snapshot_serde() {
        let snapshot = EngineSnapshot::default();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: EngineSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.tick, back.tick);
        assert_eq!(snapshot.war.phase, back.war.phase);
        assert!(!snapshot.war_active());
        // Verify the empty snapshot is reasonably small
        assert!(
            json.len() < 1024,
            "Empty snapshot should be <1KB, was {} bytes",
            json.len()
        );
    }

    /// Verify rectangle normalization and inclusive containment.
    #[test]
    fn test_rect_contains() {
        // Corners given in the wrong order still normalize.
        let r = Rect::new(Vec2::new(10.0, 20.0), Vec2::new(-10.0, -20.0));
        assert_eq!(r.min, Vec2::new(-10.0, -20.0));
        assert_eq!(r.max, Vec2::new(10.0, 20.0));

        assert!(r.contains(Vec2::ZERO));
        // Boundary points are inside.
        assert!(r.contains(Vec2::new(10.0, 20.0)));
        assert!(r.contains(Vec2::new(-10.0, -20.0)));
        assert!(!r.contains(Vec2::new(10.01, 0.0)));
    }

    #[test]
    fn test_rect_geometry() {
        let r = Rect::from_bounds(0.0, 0.0, 30.0, 40.0);
        assert_eq!(r.center(), Vec2::new(15.0, 20.0));
        assert_eq!(r.width(), 30.0);
        assert_eq!(r.height(), 40.0);
        assert!((r.diagonal() - 50.0).abs() < 1e-6);
    }

    /// Verify margin clamping, including the degenerate collapse-to-center case.
    #[test]
    fn test_rect_clamp_point() {
        let r = Rect::from_bounds(0.0, 0.0, 100.0, 100.0);
        let p = r.clamp_point(Vec2::new(200.0, -50.0), 10.0);
        assert_eq!(p, Vec2::new(90.0, 10.0));

        // Margin wider than the rect collapses to its center.
        let tiny = Rect::from_bounds(0.0, 0.0, 4.0, 4.0);
        let q = tiny.clamp_point(Vec2::new(100.0, 100.0), 10.0);
        assert_eq!(q, tiny.center());
    }

    /// Verify owner codes: -1 neutral, >= 0 faction, < -1 invalid.
    #[test]
    fn test_owner_codes() {
        assert_eq!(owner_to_code(None), -1);
        assert_eq!(owner_to_code(Some(FactionId(3))), 3);
        assert_eq!(owner_from_code(-1), Some(None));
        assert_eq!(owner_from_code(5), Some(Some(FactionId(5))));
        assert_eq!(owner_from_code(-2), None);
        assert!(!FactionId(0).is_provokable());
        assert!(FactionId(1).is_provokable());
    }

    #[test]
    fn test_territory_new_defaults() {
        let t = Territory::new(
            TerritoryId(4),
            Rect::from_bounds(0.0, 0.0, 10.0, 10.0),
            Some(FactionId(2)),
            DefenseLevel::Heavy,
        );
        assert_eq!(t.owner, Some(FactionId(2)));
        assert_eq!(t.default_owner, Some(FactionId(2)));
        assert!(!t.under_attack);
    }

    /// Verify clock advancement covers exactly one second per tick rate.
    #[test]
    fn test_clock_advance() {
        let mut clock = SimClock::default();
        for _ in 0..20 {
            clock.advance();
        }
        assert_eq!(clock.tick, 20);
        assert_eq!(clock.now_ms, 20 * TICK_MS);
        assert_eq!(clock.now_ms, 1000);
    }

    #[test]
    fn test_notoriety_frozen() {
        let n = Notoriety::frozen();
        assert_eq!(n.level, 0);
        assert!(n.suppressed);
        assert_eq!(n.escalation, 0.0);
    }

    /// Verify paces order Walk < Run < Sprint for escalation comparisons.
    #[test]
    fn test_move_pace_order() {
        assert!(MovePace::Walk < MovePace::Run);
        assert!(MovePace::Run < MovePace::Sprint);
    }

    #[test]
    fn test_behavior_disengaged() {
        assert!(BehaviorState::Idle.is_disengaged());
        assert!(BehaviorState::Wandering.is_disengaged());
        assert!(!BehaviorState::CombatPlayer.is_disengaged());
        assert!(!BehaviorState::Dying.is_disengaged());
    }
}
