//! Interval-driven triage synthesis.
//!
//! When armed, the generator fires at most once per tick after the
//! configured interval has elapsed, picks a uniformly random source node
//! that has at least one neighbor, picks a uniform random severity, and
//! runs the normal send path.  It rearms even when no node is eligible.

use log::debug;

use foors_core::{NodeId, Severity, TimeMs};

use crate::model::MeshModel;

/// Generator arming state.  The interval itself lives in `EngineConfig`.
#[derive(Copy, Clone, Debug, Default)]
pub struct AutoGenerator {
    pub active:     bool,
    pub last_fired: TimeMs,
}

impl MeshModel {
    pub(crate) fn maybe_auto_generate(&mut self) {
        if !self.generator.active {
            return;
        }
        let now = self.clock.now();
        if now.since(self.generator.last_fired) < self.config.triage_generation_interval_ms {
            return;
        }
        self.generator.last_fired = now;

        let eligible: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| !n.is_sink() && !n.neighbors.is_empty())
            .map(|n| n.id)
            .collect();
        let Some(&from) = self.rng.choose(&eligible) else {
            return; // nothing connected to generate from
        };
        let severity = Severity::ALL[self.rng.gen_range(0..Severity::ALL.len())];

        debug!("auto-generating {severity} triage at {from}");
        self.send_triage(from, severity);
    }
}
