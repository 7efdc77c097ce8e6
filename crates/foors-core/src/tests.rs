//! Unit tests for foors-core primitives.

#[cfg(test)]
mod ids {
    use crate::{MessageId, NodeId, TriageId};

    #[test]
    fn ordering() {
        assert!(NodeId(0) < NodeId(1));
        assert!(TriageId(100) > TriageId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(MessageId::INVALID.0, u64::MAX);
        assert_eq!(TriageId::INVALID.0, u64::MAX);
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(NodeId::default(), NodeId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
    }
}

#[cfg(test)]
mod severity {
    use crate::Severity;

    #[test]
    fn urgency_order() {
        assert!(Severity::Black < Severity::Green);
        assert!(Severity::Green < Severity::Yellow);
        assert!(Severity::Yellow < Severity::Red);
    }

    #[test]
    fn fanout_caps() {
        assert_eq!(Severity::Red.fanout_cap(), 3);
        assert_eq!(Severity::Yellow.fanout_cap(), 2);
        assert_eq!(Severity::Green.fanout_cap(), 1);
        assert_eq!(Severity::Black.fanout_cap(), 1);
    }

    #[test]
    fn labels() {
        assert_eq!(Severity::Red.as_str(), "red");
        assert_eq!(Severity::Black.to_string(), "black");
    }
}

#[cfg(test)]
mod kinds {
    use crate::{NodeKind, RoutingMode};

    #[test]
    fn toggle_roundtrip() {
        assert_eq!(NodeKind::Source.toggled(), NodeKind::Sink);
        assert_eq!(NodeKind::Sink.toggled(), NodeKind::Source);
        assert!(NodeKind::Sink.is_sink());
        assert!(!NodeKind::Source.is_sink());
    }

    #[test]
    fn flooding_modes_flood() {
        assert!(RoutingMode::Flooding.floods());
        assert!(RoutingMode::Inactive.floods());
        assert!(!RoutingMode::Intelligent.floods());
        assert!(!RoutingMode::NoConnections.floods());
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, TimeMs};

    #[test]
    fn since_saturates() {
        assert_eq!(TimeMs(500).since(TimeMs(200)), 300);
        assert_eq!(TimeMs(200).since(TimeMs(500)), 0);
    }

    #[test]
    fn clock_advances_in_ms() {
        let mut clock = SimClock::new();
        clock.advance_secs(0.6);
        assert_eq!(clock.now(), TimeMs(600));
        clock.advance_secs(1.0);
        assert_eq!(clock.now(), TimeMs(1_600));
    }

    #[test]
    fn fractional_carry_does_not_drift() {
        let mut clock = SimClock::new();
        for _ in 0..1_000 {
            clock.advance_secs(0.000_1);
        }
        assert_eq!(clock.now(), TimeMs(100));
    }

    #[test]
    fn negative_delta_ignored() {
        let mut clock = SimClock::new();
        clock.advance_secs(1.0);
        clock.advance_secs(-5.0);
        clock.advance_secs(f64::NAN);
        assert_eq!(clock.now(), TimeMs(1_000));
    }
}

#[cfg(test)]
mod vec2 {
    use crate::Vec2;

    #[test]
    fn distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn motion_step() {
        let p = Vec2::new(1.0, 1.0).advanced_by(Vec2::new(2.0, -1.0), 0.5);
        assert_eq!(p, Vec2::new(2.0, 0.5));
    }
}

#[cfg(test)]
mod config {
    use crate::EngineConfig;

    #[test]
    fn defaults_match_documentation() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.default_connection_radius, 2.0);
        assert_eq!(cfg.inactive_routing_timeout_ms, 1_000);
        assert_eq!(cfg.route_expiry_ms, 300_000);
        assert_eq!(cfg.default_message_speed, 2.0);
        assert_eq!(cfg.triage_generation_interval_ms, 3_000);
    }

    #[test]
    fn clamping() {
        assert_eq!(EngineConfig::clamp_inactive_timeout(10), 1_000);
        assert_eq!(EngineConfig::clamp_inactive_timeout(1_000_000), 300_000);
        assert_eq!(EngineConfig::clamp_inactive_timeout(5_000), 5_000);
        assert_eq!(EngineConfig::clamp_generation_interval(0), 500);
        assert_eq!(EngineConfig::clamp_generation_interval(60_000), 10_000);
    }

    #[test]
    fn validate_rejects_bad_radius() {
        let cfg = EngineConfig { default_connection_radius: 0.0, ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = EngineConfig { default_message_speed: f64::NAN, ..Default::default() };
        assert!(cfg.validate().is_err());
        assert!(EngineConfig::default().validate().is_ok());
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12_345);
        let mut r2 = SimRng::new(12_345);
        for _ in 0..100 {
            let a: u64 = r1.random();
            let b: u64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn choose_on_empty_is_none() {
        let mut rng = SimRng::new(0);
        let empty: [u32; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }

    #[test]
    fn gen_range_in_bounds() {
        let mut rng = SimRng::new(7);
        for _ in 0..1_000 {
            let v = rng.gen_range(0..4usize);
            assert!(v < 4);
        }
    }
}
