//! Integration tests for the mesh model.

use std::cell::RefCell;
use std::rc::Rc;

use foors_core::{
    EngineConfig, FloodingReason, MessageKind, NodeId, NodeKind, RoutingMode, Severity, TimeMs,
};

use crate::message::{Message, TriagePayload};
use crate::observer::{ModelEvent, ModelListener};
use crate::MeshModel;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn model() -> MeshModel {
    MeshModel::new()
}

fn model_with_radius(radius: f64) -> MeshModel {
    MeshModel::with_config(EngineConfig {
        default_connection_radius: radius,
        ..Default::default()
    })
    .unwrap()
}

fn messages_between(m: &MeshModel, from: NodeId, to: NodeId) -> usize {
    m.messages().iter().filter(|msg| msg.from == from && msg.to == to).count()
}

/// Listener that appends every event into a shared log.
struct EventLog(Rc<RefCell<Vec<ModelEvent>>>);

impl ModelListener for EventLog {
    fn on_change(&mut self, _model: &MeshModel, event: &ModelEvent) {
        self.0.borrow_mut().push(*event);
    }
}

fn attach_log(m: &mut MeshModel) -> Rc<RefCell<Vec<ModelEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    m.subscribe(EventLog(Rc::clone(&log)));
    log
}

// ── End-to-end scenarios ──────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn linear_relay() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        let b = m.add_node(1.5, 0.0, NodeKind::Source);
        let c = m.add_node(3.0, 0.0, NodeKind::Sink);

        // One routing pass has already run inside add_node.
        let a_entry = &m.node(a).unwrap().routing_table[&c];
        assert_eq!(a_entry.next_hops.iter().collect::<Vec<_>>(), vec![(&b, &2)]);
        let b_entry = &m.node(b).unwrap().routing_table[&c];
        assert_eq!(b_entry.next_hops.iter().collect::<Vec<_>>(), vec![(&c, &1)]);
        assert_eq!(m.node(a).unwrap().routing_state.mode, RoutingMode::Intelligent);
        assert_eq!(m.node(b).unwrap().routing_state.mode, RoutingMode::Intelligent);

        let t = m.send_message(a, MessageKind::Triage, Some(Severity::Red)).unwrap();
        assert_eq!(messages_between(&m, a, b), 1);
        assert_eq!(m.messages().len(), 1);

        // First hop: arrival at B, which forwards to C within the tick;
        // the forward does not advance until the next tick.
        m.tick(0.6);
        assert!(m.node(b).unwrap().has_seen(t));
        assert!(!m.node(c).unwrap().has_seen(t));
        assert_eq!(m.messages().len(), 1);
        assert_eq!(messages_between(&m, b, c), 1);
        assert_eq!(m.node(b).unwrap().last_message_received_at, Some(TimeMs(600)));

        // Second hop: arrival at the sink; nothing left in flight.
        m.tick(0.6);
        assert!(m.node(c).unwrap().has_seen(t));
        assert!(m.messages().is_empty());
        assert_eq!(m.stats().sink_triages_seen, 1);
    }

    #[test]
    fn severity_multipath() {
        let mut m = model_with_radius(1.6);
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        let b = m.add_node(1.0, 1.0, NodeKind::Source);
        let c = m.add_node(1.0, -1.0, NodeKind::Source);
        let d = m.add_node(2.0, 0.0, NodeKind::Sink);

        let entry = &m.node(a).unwrap().routing_table[&d];
        assert_eq!(entry.next_hops[&b], 2);
        assert_eq!(entry.next_hops[&c], 2);

        // Red caps at 3 but only two candidate paths exist.
        m.send_message(a, MessageKind::Triage, Some(Severity::Red));
        assert_eq!(m.messages().len(), 2);
        assert_eq!(messages_between(&m, a, b), 1);
        assert_eq!(messages_between(&m, a, c), 1);

        // Green caps at 1.
        m.send_message(a, MessageKind::Triage, Some(Severity::Green));
        assert_eq!(m.messages().len(), 3);
    }

    #[test]
    fn reconnection_flush() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);

        let t = m.send_message(a, MessageKind::Triage, Some(Severity::Yellow)).unwrap();
        assert_eq!(m.node(a).unwrap().triage_queue.len(), 1);
        assert!(m.messages().is_empty());
        assert!(m.node(a).unwrap().has_seen(t));

        let b = m.add_node(1.0, 0.0, NodeKind::Source);
        // The flush belongs to the next tick, not the mutation.
        assert_eq!(m.node(a).unwrap().triage_queue.len(), 1);
        assert!(m.messages().is_empty());

        m.tick(0.6);
        assert!(m.node(a).unwrap().triage_queue.is_empty());
        assert_eq!(m.messages().len(), 1);
        assert_eq!(messages_between(&m, a, b), 1);
        assert_eq!(m.messages()[0].triage.unwrap().triage, t);
    }

    #[test]
    fn sink_disappearance_demotion() {
        let mut m = model();
        m.set_inactive_routing_timeout(5_000);
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        let b = m.add_node(1.5, 0.0, NodeKind::Source);
        let c = m.add_node(3.0, 0.0, NodeKind::Sink);

        m.remove_node(c);
        // Demotion happens on the next routing pass.
        m.tick(1.0);
        for id in [a, b] {
            let node = m.node(id).unwrap();
            assert!(node.routing_table.is_empty());
            assert!(node.inactive_routes.contains_key(&c));
            assert_eq!(node.routing_state.mode, RoutingMode::Inactive);
            assert_eq!(
                node.routing_state.flooding_reason,
                Some(FloodingReason::HasInactiveRoutes)
            );
        }

        // 5 s of grace: demoted at t=1 s, so the entry survives through t=6 s…
        for _ in 0..5 {
            m.tick(1.0);
        }
        assert_eq!(m.node(a).unwrap().routing_state.mode, RoutingMode::Inactive);

        // …and is deleted on the pass after, settling into flooding.
        m.tick(1.0);
        for id in [a, b] {
            let node = m.node(id).unwrap();
            assert!(node.inactive_routes.is_empty());
            assert_eq!(node.routing_state.mode, RoutingMode::Flooding);
            assert_eq!(node.routing_state.flooding_reason, Some(FloodingReason::NoRoutes));
            assert!(!node.neighbors.is_empty());
        }
    }

    #[test]
    fn boundary_replay_on_new_link() {
        let mut m = model();
        let s1 = m.add_node(0.0, 0.0, NodeKind::Sink);
        let a = m.add_node(1.5, 0.0, NodeKind::Source);
        let b = m.add_node(3.6, 0.0, NodeKind::Source);
        let s2 = m.add_node(5.1, 0.0, NodeKind::Sink);

        // Left component sees t; the right component never does.
        let t = m.send_message(a, MessageKind::Triage, Some(Severity::Red)).unwrap();
        m.tick(0.6);
        assert!(m.node(s1).unwrap().has_seen(t));
        assert!(!m.node(b).unwrap().has_seen(t));

        // Bring A and B into range; B keeps its link to S2.
        m.update_node_position(b, 3.5, 0.0);
        m.tick(0.6);
        assert!(m.node(a).unwrap().neighbors.contains(&b));
        let ab: Vec<&Message> = m
            .messages()
            .iter()
            .filter(|msg| msg.from == a && msg.to == b)
            .collect();
        assert_eq!(ab.len(), 1, "exactly one boundary seed A→B");
        assert_eq!(ab[0].triage.unwrap().triage, t);

        // Delivery, then intelligent forwarding toward S2.
        m.tick(0.6);
        assert!(m.node(b).unwrap().has_seen(t));
        assert_eq!(messages_between(&m, b, s2), 1);

        m.tick(0.6);
        assert!(m.node(s2).unwrap().has_seen(t));
        assert_eq!(m.stats().sink_triages_seen, 1);
    }

    #[test]
    fn flooding_loop_terminates() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        let b = m.add_node(1.5, 0.0, NodeKind::Source);
        let c = m.add_node(0.75, 1.3, NodeKind::Source);
        for id in [a, b, c] {
            assert_eq!(m.node(id).unwrap().routing_state.mode, RoutingMode::Flooding);
        }

        let t = m.send_message(a, MessageKind::Triage, Some(Severity::Red)).unwrap();
        assert_eq!(m.messages().len(), 2); // a→b, a→c

        // b and c each accept once and forward once; the echoes then die
        // against the duplicate guard.
        m.tick(0.6);
        assert_eq!(m.messages().len(), 2); // b→c, c→b
        m.tick(0.6);
        assert!(m.messages().is_empty());

        for id in [a, b, c] {
            assert!(m.node(id).unwrap().has_seen(t));
        }
        // Four messages ever — bounded, no exponential blowup.
        assert_eq!(m.next_message_id, 4);
    }
}

// ── Invariants ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod invariants {
    use super::*;

    #[test]
    fn links_stay_symmetric() {
        let mut m = model();
        for i in 0..6 {
            m.add_node(i as f64 * 1.2, (i % 2) as f64, NodeKind::Source);
        }
        m.update_node_velocity(NodeId(2), 0.4, -0.1);
        for _ in 0..8 {
            m.tick(0.5);
            for node in m.nodes() {
                for peer in &node.neighbors {
                    assert!(
                        m.node(*peer).unwrap().neighbors.contains(&node.id),
                        "asymmetric link {} -> {peer}",
                        node.id
                    );
                }
            }
        }
    }

    #[test]
    fn next_hops_are_current_neighbors() {
        let mut m = model();
        for i in 0..5 {
            m.add_node(i as f64 * 1.4, 0.0, NodeKind::Source);
        }
        m.add_node(5.0 * 1.4, 0.0, NodeKind::Sink);
        m.tick(0.5);
        for node in m.nodes() {
            for entry in node.routing_table.values() {
                assert!(!entry.next_hops.is_empty());
                for hop in entry.next_hops.keys() {
                    assert!(node.neighbors.contains(hop));
                }
            }
        }
    }

    #[test]
    fn active_and_inactive_tables_stay_disjoint() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        let s1 = m.add_node(1.5, 0.0, NodeKind::Sink);
        let _s2 = m.add_node(-1.5, 0.0, NodeKind::Sink);

        // Lose one sink, keep the other, then bring it back.
        m.remove_node(s1);
        m.tick(0.5);
        m.add_node(1.5, 0.0, NodeKind::Sink);
        m.tick(0.5);

        let node = m.node(a).unwrap();
        for sink in node.routing_table.keys() {
            assert!(
                !node.inactive_routes.contains_key(sink),
                "sink {sink} present in both tables"
            );
        }
    }

    #[test]
    fn severity_cap_respected_with_many_paths() {
        let mut m = model_with_radius(3.0);
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        for dy in [-1.0, -0.5, 0.5, 1.0] {
            m.add_node(2.0, dy, NodeKind::Source);
        }
        m.add_node(4.0, 0.0, NodeKind::Sink);

        m.send_message(a, MessageKind::Triage, Some(Severity::Red));
        assert_eq!(m.messages().len(), 3, "red fans out to at most 3 next-hops");

        let mut m2 = model_with_radius(3.0);
        let a2 = m2.add_node(0.0, 0.0, NodeKind::Source);
        for dy in [-1.0, -0.5, 0.5, 1.0] {
            m2.add_node(2.0, dy, NodeKind::Source);
        }
        m2.add_node(4.0, 0.0, NodeKind::Sink);
        m2.send_message(a2, MessageKind::Triage, Some(Severity::Black));
        assert_eq!(m2.messages().len(), 1, "black stays single-path");
    }

    #[test]
    fn queue_drains_completely_on_reconnection() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        for severity in [Severity::Red, Severity::Green, Severity::Yellow] {
            m.send_message(a, MessageKind::Triage, Some(severity));
        }
        assert_eq!(m.node(a).unwrap().triage_queue.len(), 3);

        let b = m.add_node(1.0, 0.0, NodeKind::Source);
        let c = m.add_node(0.0, 1.0, NodeKind::Source);
        m.tick(0.5);

        assert!(m.node(a).unwrap().triage_queue.is_empty());
        // One message per neighbor per queued triage.
        assert_eq!(messages_between(&m, a, b), 3);
        assert_eq!(messages_between(&m, a, c), 3);
    }
}

// ── Pipeline details ──────────────────────────────────────────────────────────

#[cfg(test)]
mod pipeline {
    use super::*;

    /// Arrival of a triage the node has already pushed toward every sink it
    /// can currently target is suppressed in intelligent mode.
    #[test]
    fn per_sink_forwarding_suppression() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        let b = m.add_node(1.5, 0.0, NodeKind::Source);
        let s = m.add_node(3.0, 0.0, NodeKind::Sink);
        let d = m.add_node(-1.5, 0.0, NodeKind::Source);

        let t = m.send_message(a, MessageKind::Triage, Some(Severity::Red)).unwrap();
        m.tick(0.6);
        m.tick(0.6);
        assert!(m.node(s).unwrap().has_seen(t));

        // An echo of t reaching A from the side must not re-forward: A has
        // already targeted S for this triage.
        let echo = Message {
            id:         foors_core::MessageId(9_999),
            from:       d,
            to:         a,
            progress:   1.0,
            speed:      2.0,
            created_at: m.now(),
            kind:       MessageKind::Triage,
            triage:     Some(TriagePayload { triage: t, severity: Severity::Red }),
            spawn_tick: 0,
        };
        let before = m.messages().len();
        m.deliver(echo);
        assert_eq!(m.messages().len(), before, "suppressed forward emitted a message");
        let _ = b;
    }

    /// A triage arriving at a node that lost all its links is queued, not
    /// dropped.
    #[test]
    fn arrival_at_isolated_node_queues() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        let ghost = m.add_node(50.0, 0.0, NodeKind::Source);

        let orphan = Message {
            id:         foors_core::MessageId(9_999),
            from:       ghost,
            to:         a,
            progress:   1.0,
            speed:      2.0,
            created_at: m.now(),
            kind:       MessageKind::Triage,
            triage:     Some(TriagePayload { triage: foors_core::TriageId(77), severity: Severity::Yellow }),
            spawn_tick: 0,
        };
        m.deliver(orphan);
        let node = m.node(a).unwrap();
        assert_eq!(node.triage_queue.len(), 1);
        assert!(node.has_seen(foors_core::TriageId(77)));
        assert!(m.messages().is_empty());
    }

    #[test]
    fn normal_messages_forward_single_path_and_die_at_sink() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        let b = m.add_node(1.5, 0.0, NodeKind::Source);
        let s = m.add_node(3.0, 0.0, NodeKind::Sink);

        assert!(m.send_message(a, MessageKind::Normal, None).is_none());
        assert_eq!(m.messages().len(), 1);

        m.tick(0.6);
        assert_eq!(messages_between(&m, b, s), 1);
        m.tick(0.6);
        // The sink has no active coverage; the message stops there.
        assert!(m.messages().is_empty());
        assert!(m.node(s).unwrap().last_message_received_at.is_some());
    }

    #[test]
    fn triage_without_severity_is_inert() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        m.add_node(1.0, 0.0, NodeKind::Source);
        assert!(m.send_message(a, MessageKind::Triage, None).is_none());
        assert!(m.messages().is_empty());
        assert!(m.node(a).unwrap().triage_store.is_empty());
    }

    #[test]
    fn forwards_spawned_in_a_tick_wait_for_the_next() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        let b = m.add_node(1.5, 0.0, NodeKind::Source);
        let c = m.add_node(3.0, 0.0, NodeKind::Sink);
        m.send_message(a, MessageKind::Triage, Some(Severity::Green));

        // Even a huge delta cannot push the forward through B→C in the
        // same tick as the A→B arrival.
        m.tick(10.0);
        assert_eq!(messages_between(&m, b, c), 1);
        assert!(m.node(c).unwrap().triage_store.is_empty());
    }
}

// ── Boundary replay details ───────────────────────────────────────────────────

#[cfg(test)]
mod replay {
    use super::*;

    #[test]
    fn promotion_to_sink_triggers_catalog_replay() {
        let mut m = model();
        let s1 = m.add_node(0.0, 0.0, NodeKind::Sink);
        let a = m.add_node(1.5, 0.0, NodeKind::Source);
        let b = m.add_node(3.0, 0.0, NodeKind::Source);

        let t = m.send_message(a, MessageKind::Triage, Some(Severity::Yellow)).unwrap();
        m.tick(0.6);
        assert!(m.node(s1).unwrap().has_seen(t));
        assert!(!m.node(b).unwrap().has_seen(t));

        // Promote B: S1 can route to it, so S1 replays its catalog through
        // the table (via A), not by flooding.
        m.toggle_node_type(b);
        assert_eq!(messages_between(&m, s1, a), 1);

        m.tick(0.6);
        m.tick(0.6);
        assert!(m.node(b).unwrap().has_seen(t));
        assert_eq!(m.stats().sink_triages_seen, 1);
    }

    #[test]
    fn boundary_is_not_reseeded_on_later_ticks() {
        let mut m = model();
        let s1 = m.add_node(0.0, 0.0, NodeKind::Sink);
        let a = m.add_node(1.5, 0.0, NodeKind::Source);
        let b = m.add_node(3.6, 0.0, NodeKind::Source);
        let s2 = m.add_node(5.1, 0.0, NodeKind::Sink);

        let t = m.send_message(a, MessageKind::Triage, Some(Severity::Red)).unwrap();
        m.tick(0.6);
        m.update_node_position(b, 3.5, 0.0);
        m.tick(0.6);
        assert_eq!(messages_between(&m, a, b), 1);

        // Drain everything, then keep ticking: the saturated suppression
        // map keeps the stable boundary quiet.
        for _ in 0..6 {
            m.tick(0.6);
        }
        assert!(m.messages().is_empty());
        let _ = (s1, s2, t);
    }

    #[test]
    fn new_sink_replay_respects_suppression_map() {
        let mut m = model();
        let s1 = m.add_node(0.0, 0.0, NodeKind::Sink);
        let a = m.add_node(1.5, 0.0, NodeKind::Source);
        let b = m.add_node(3.0, 0.0, NodeKind::Source);

        let t = m.send_message(a, MessageKind::Triage, Some(Severity::Yellow)).unwrap();
        m.tick(0.6);

        m.toggle_node_type(b);
        assert_eq!(messages_between(&m, s1, a), 1);
        // S1 marked B as targeted; toggling B back and forth again must not
        // replay a second copy.
        for _ in 0..4 {
            m.tick(0.6);
        }
        assert!(m.messages().is_empty());
        m.toggle_node_type(b);
        m.toggle_node_type(b);
        assert!(m.messages().is_empty());
        let _ = t;
    }
}

// ── Auto-generation ───────────────────────────────────────────────────────────

#[cfg(test)]
mod autogen {
    use super::*;

    #[test]
    fn generates_after_interval_from_connected_source() {
        let mut m = MeshModel::with_config(EngineConfig { seed: 7, ..Default::default() }).unwrap();
        m.add_node(0.0, 0.0, NodeKind::Source);
        m.add_node(1.0, 0.0, NodeKind::Source);
        m.set_triage_generation_interval(500);

        m.start_auto_generation();
        assert!(m.is_auto_generation_active());

        m.tick(0.6);
        assert_eq!(m.messages().len(), 1, "one generated triage flooded to the neighbor");
        let stored: usize = m.nodes().map(|n| n.triage_store.len()).sum();
        assert_eq!(stored, 1);

        m.stop_auto_generation();
        assert!(!m.is_auto_generation_active());
        m.tick(0.6); // delivers the flood, generates nothing new
        m.tick(0.6);
        let stored_after: usize = m.nodes().map(|n| n.triage_store.len()).sum();
        assert_eq!(stored_after, 2, "only the delivery added a store entry");
    }

    #[test]
    fn no_eligible_node_is_a_no_op() {
        let mut m = model();
        m.add_node(0.0, 0.0, NodeKind::Source); // isolated
        m.add_node(10.0, 0.0, NodeKind::Sink);  // sinks never generate
        m.set_triage_generation_interval(500);
        m.start_auto_generation();
        m.tick(0.6);
        assert!(m.messages().is_empty());
        assert_eq!(m.stats().queued_triages, 0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let run = || {
            let mut m =
                MeshModel::with_config(EngineConfig { seed: 99, ..Default::default() }).unwrap();
            for i in 0..4 {
                m.add_node(i as f64, 0.0, NodeKind::Source);
            }
            m.set_triage_generation_interval(500);
            m.start_auto_generation();
            for _ in 0..10 {
                m.tick(0.6);
            }
            let mut originators: Vec<(NodeId, usize)> = m
                .nodes()
                .map(|n| (n.id, n.triage_store.len()))
                .collect();
            originators.sort();
            originators
        };
        assert_eq!(run(), run());
    }
}

// ── API behavior ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod api {
    use super::*;

    #[test]
    fn unknown_ids_are_silent_no_ops() {
        let mut m = model();
        m.add_node(0.0, 0.0, NodeKind::Source);
        let log = attach_log(&mut m);

        let ghost = NodeId(9_999);
        m.remove_node(ghost);
        m.toggle_node_type(ghost);
        m.update_node_position(ghost, 1.0, 1.0);
        m.update_node_velocity(ghost, 1.0, 1.0);
        assert!(m.send_message(ghost, MessageKind::Triage, Some(Severity::Red)).is_none());

        assert!(log.borrow().is_empty(), "no listener fire for unknown IDs");
    }

    #[test]
    fn setter_with_current_value_still_notifies_once() {
        let mut m = model();
        let log = attach_log(&mut m);
        m.set_connection_radius(2.0); // already the default
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0], ModelEvent::ParameterChanged);
    }

    #[test]
    fn parameters_clamp_to_documented_bounds() {
        let mut m = model();
        m.set_inactive_routing_timeout(10);
        assert_eq!(m.config().inactive_routing_timeout_ms, 1_000);
        m.set_inactive_routing_timeout(999_999_999);
        assert_eq!(m.config().inactive_routing_timeout_ms, 300_000);

        m.set_triage_generation_interval(1);
        assert_eq!(m.config().triage_generation_interval_ms, 500);
        m.set_triage_generation_interval(60_000);
        assert_eq!(m.config().triage_generation_interval_ms, 10_000);
    }

    #[test]
    fn connection_radius_propagates_to_all_nodes() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        let b = m.add_node(3.0, 0.0, NodeKind::Source);
        assert!(m.node(a).unwrap().neighbors.is_empty());

        m.set_connection_radius(4.0);
        assert_eq!(m.node(b).unwrap().connection_radius, 4.0);
        m.tick(0.5);
        assert!(m.node(a).unwrap().neighbors.contains(&b));
    }

    #[test]
    fn remove_node_purges_its_messages() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        let b = m.add_node(1.5, 0.0, NodeKind::Source);
        m.add_node(3.0, 0.0, NodeKind::Sink);
        m.send_message(a, MessageKind::Triage, Some(Severity::Red));
        assert_eq!(m.messages().len(), 1);

        m.remove_node(b);
        assert!(m.messages().is_empty());
        assert!(!m.node(a).unwrap().neighbors.contains(&b));
    }

    #[test]
    fn unsubscribe_detaches_listener() {
        let mut m = model();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sub = m.subscribe(EventLog(Rc::clone(&log)));
        m.add_node(0.0, 0.0, NodeKind::Source);
        assert_eq!(log.borrow().len(), 1);

        assert!(m.unsubscribe(sub));
        assert!(!m.unsubscribe(sub), "second detach is a no-op");
        m.add_node(1.0, 0.0, NodeKind::Source);
        assert_eq!(log.borrow().len(), 1, "detached listener no longer fires");
    }

    #[test]
    fn tick_notifies_exactly_once() {
        let mut m = model();
        m.add_node(0.0, 0.0, NodeKind::Source);
        let log = attach_log(&mut m);
        m.tick(0.5);
        m.tick(0.5);
        assert_eq!(
            log.borrow().iter().filter(|e| **e == ModelEvent::TickCompleted).count(),
            2
        );
    }

    #[test]
    fn reset_clears_the_world() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        m.add_node(1.5, 0.0, NodeKind::Sink);
        m.send_message(a, MessageKind::Triage, Some(Severity::Red));
        m.start_auto_generation();
        let log = attach_log(&mut m);

        m.reset();
        let stats = m.stats();
        assert_eq!(stats.nodes, 0);
        assert_eq!(stats.in_flight_messages, 0);
        assert_eq!(stats.sink_triages_seen, 0);
        assert!(!m.is_auto_generation_active());
        assert_eq!(*log.borrow(), vec![ModelEvent::Reset]);

        // Fresh IDs after reset never collide with pre-reset ones.
        let fresh = m.add_node(0.0, 0.0, NodeKind::Source);
        assert!(fresh > a);
    }

    #[test]
    fn stats_summarize_the_world() {
        let mut m = model();
        let a = m.add_node(0.0, 0.0, NodeKind::Source);
        m.add_node(1.5, 0.0, NodeKind::Source);
        m.add_node(3.0, 0.0, NodeKind::Sink);
        m.add_node(50.0, 50.0, NodeKind::Source); // isolated

        m.send_message(a, MessageKind::Triage, Some(Severity::Red));
        let stats = m.stats();
        assert_eq!(stats.nodes, 4);
        assert_eq!(stats.links, 2);
        assert_eq!(stats.sinks, 1);
        assert_eq!(stats.sources, 3);
        assert_eq!(stats.intelligent_nodes, 3);
        assert_eq!(stats.no_connection_nodes, 1);
        assert_eq!(stats.in_flight_messages, 1);
        assert_eq!(stats.queued_triages, 0);
    }
}
