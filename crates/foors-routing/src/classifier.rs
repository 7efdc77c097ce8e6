//! Mode classification: map route counts and link state to a `RoutingMode`.
//!
//! Runs after every routing pass.  The decision table, first match wins:
//!
//! | Precondition                                | Mode            | Reason                |
//! |---------------------------------------------|-----------------|-----------------------|
//! | no neighbors                                | `NoConnections` | `no-connections`      |
//! | sink with zero routes of any kind           | `Intelligent`   | —                     |
//! | any inactive routes                         | `Inactive`      | `has-inactive-routes` |
//! | any active routes                           | `Intelligent`   | —                     |
//! | any expired routes                          | `Flooding`      | `routes-expired`      |
//! | otherwise                                   | `Flooding`      | `no-routes`           |
//!
//! The sink row keeps a lone sink out of flooding: with no peer sinks there
//! is nothing for its table to contain, which is not a degraded state.

use log::debug;

use foors_core::{FloodingReason, RoutingMode, TimeMs};
use foors_node::NodeStore;

/// Reclassify every node.  `route_expiry_ms` splits table entries into
/// active and expired by the age of their last update.
pub fn classify_modes(store: &mut NodeStore, now: TimeMs, route_expiry_ms: u64) {
    for node in store.iter_mut() {
        let active = node
            .routing_table
            .values()
            .filter(|e| !e.is_expired(now, route_expiry_ms))
            .count();
        let expired = node.routing_table.len() - active;
        let inactive = node.inactive_routes.len();

        let (mode, reason) = if node.neighbors.is_empty() {
            (RoutingMode::NoConnections, Some(FloodingReason::NoConnections))
        } else if node.is_sink() && active == 0 && expired == 0 && inactive == 0 {
            (RoutingMode::Intelligent, None)
        } else if inactive > 0 {
            (RoutingMode::Inactive, Some(FloodingReason::HasInactiveRoutes))
        } else if active > 0 {
            (RoutingMode::Intelligent, None)
        } else if expired > 0 {
            (RoutingMode::Flooding, Some(FloodingReason::RoutesExpired))
        } else {
            (RoutingMode::Flooding, Some(FloodingReason::NoRoutes))
        };

        let state = &mut node.routing_state;
        state.active_routes = active;
        state.expired_routes = expired;
        state.inactive_routes = inactive;
        state.flooding_reason = reason;
        if state.mode != mode {
            debug!("{}: {} -> {}", node.id, state.mode, mode);
            state.mode = mode;
            state.last_state_change = now;
        }
    }
}
