//! Aggregate health counters exposed through [`MeshModel::stats`].

use foors_core::RoutingMode;

use crate::model::MeshModel;

/// A point-in-time summary of the world.  Cheap to compute; recomputed on
/// every call rather than maintained incrementally.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub nodes:   usize,
    pub links:   usize,
    pub sinks:   usize,
    pub sources: usize,

    // Per-mode node counts.
    pub intelligent_nodes:   usize,
    pub flooding_nodes:      usize,
    pub inactive_nodes:      usize,
    pub no_connection_nodes: usize,

    /// Triages waiting in disconnection queues across all nodes.
    pub queued_triages: usize,

    /// Messages currently travelling a link.
    pub in_flight_messages: usize,

    /// Distinct triages ever observed by any sink.
    pub sink_triages_seen: usize,
}

pub(crate) fn compute(model: &MeshModel) -> EngineStats {
    let mut stats = EngineStats {
        nodes: model.nodes.len(),
        links: model.nodes.link_count(),
        in_flight_messages: model.messages.iter().filter(|m| m.is_in_flight()).count(),
        sink_triages_seen: model.sink_seen.len(),
        ..Default::default()
    };

    for node in model.nodes.iter() {
        if node.is_sink() {
            stats.sinks += 1;
        } else {
            stats.sources += 1;
        }
        stats.queued_triages += node.triage_queue.len();
        match node.routing_state.mode {
            RoutingMode::Intelligent   => stats.intelligent_nodes += 1,
            RoutingMode::Flooding      => stats.flooding_nodes += 1,
            RoutingMode::Inactive      => stats.inactive_nodes += 1,
            RoutingMode::NoConnections => stats.no_connection_nodes += 1,
        }
    }
    stats
}
