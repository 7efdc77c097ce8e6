//! field-run — smallest end-to-end exercise of the FOORS+ engine.
//!
//! Two triage teams work around their own collection points, out of radio
//! range of each other.  A runner walks from the west team to the east
//! team and back, bridging the two subnets; boundary replay carries each
//! side's triage catalog across whenever the runner links up.
//!
//! Run with `RUST_LOG=debug` to watch route demotions, mode transitions,
//! and replay seeding as the runner moves.

use std::time::Instant;

use anyhow::Result;

use foors_core::{EngineConfig, NodeKind};
use foors_engine::{MeshModel, ModelEvent, ModelListener};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:          u64 = 42;
const TICK_SECS:     f64 = 0.5;
const RUN_TICKS:     u64 = 240; // 2 simulated minutes
const REPORT_EVERY:  u64 = 20;
const RUNNER_SPEED:  f64 = 0.8; // plane units per second

// ── Progress listener ─────────────────────────────────────────────────────────

struct TickReporter {
    ticks: u64,
}

impl ModelListener for TickReporter {
    fn on_change(&mut self, model: &MeshModel, event: &ModelEvent) {
        if *event != ModelEvent::TickCompleted {
            return;
        }
        self.ticks += 1;
        if self.ticks % REPORT_EVERY != 0 {
            return;
        }
        let s = model.stats();
        println!(
            "t={:>6} | nodes {:>2} links {:>2} | modes i/f/x/0 = {}/{}/{}/{} | \
             in-flight {:>2} queued {:>2} | sink-seen {:>3}",
            model.now(),
            s.nodes,
            s.links,
            s.intelligent_nodes,
            s.flooding_nodes,
            s.inactive_nodes,
            s.no_connection_nodes,
            s.in_flight_messages,
            s.queued_triages,
            s.sink_triages_seen,
        );
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    pretty_env_logger::init();
    let started = Instant::now();

    let mut model = MeshModel::with_config(EngineConfig {
        seed: SEED,
        triage_generation_interval_ms: 1_500,
        ..Default::default()
    })?;
    model.subscribe(TickReporter { ticks: 0 });

    // West team: two medics around their collection point.
    let west_sink = model.add_node(0.0, 0.0, NodeKind::Sink);
    model.add_node(-1.5, 0.5, NodeKind::Source);
    model.add_node(-1.2, -1.0, NodeKind::Source);

    // East team, ~12 units away — far outside the 2.0 connection radius.
    let east_sink = model.add_node(12.0, 0.0, NodeKind::Sink);
    model.add_node(13.4, 0.6, NodeKind::Source);
    model.add_node(13.1, -0.9, NodeKind::Source);

    // The runner shuttles between the teams.
    let runner = model.add_node(1.5, 0.0, NodeKind::Source);
    model.update_node_velocity(runner, RUNNER_SPEED, 0.0);

    model.start_auto_generation();

    for tick in 0..RUN_TICKS {
        model.tick(TICK_SECS);

        // Turn the runner around at each end of the corridor.
        let x = model.node(runner).map(|n| n.position.x);
        if let Some(x) = x {
            if x > 10.5 {
                model.update_node_velocity(runner, -RUNNER_SPEED, 0.0);
            } else if x < 1.5 && tick > 0 {
                model.update_node_velocity(runner, RUNNER_SPEED, 0.0);
            }
        }
    }
    model.stop_auto_generation();

    // Let the last messages land.
    for _ in 0..10 {
        model.tick(TICK_SECS);
    }

    let stats = model.stats();
    let west = model.node(west_sink).map_or(0, |n| n.triage_store.len());
    let east = model.node(east_sink).map_or(0, |n| n.triage_store.len());
    println!("──────────────────────────────────────────────────");
    println!("distinct triages observed by any sink: {}", stats.sink_triages_seen);
    println!("west sink catalog: {west} | east sink catalog: {east}");
    println!("wall time: {:.1?}", started.elapsed());

    Ok(())
}
