//! `foors-engine` — the FOORS+ mesh model and its tick loop.
//!
//! # Tick phases
//!
//! ```text
//! tick(delta_seconds):
//!   ① Motion        — integrate each node's velocity
//!   ② Links         — rebuild symmetric neighbor sets, capture the diff
//!   ③ Routes        — BFS from every sink; demote lost routes
//!   ④ Modes         — reclassify every node
//!   ⑤ Replay        — new-link replay, then new-sink replay
//!   ⑥ Flush         — flood queued triages of freshly reconnected nodes
//!   ⑦ Auto-generate — optional interval-driven triage synthesis
//!   ⑧ Advance       — progress messages; deliver and forward arrivals
//!   ⑨ Notify        — invoke subscribed listeners
//! ```
//!
//! Messages emitted in phases ⑤–⑧ carry the current tick's sequence number
//! and are skipped by that tick's advance phase, so arrival processing
//! always terminates.
//!
//! # Mutation API
//!
//! All world mutations (`add_node`, `remove_node`, `toggle_node_type`,
//! `send_message`, parameter setters, …) are synchronous methods on
//! [`MeshModel`] and notify listeners on completion.  Mutations naming an
//! unknown node are silent no-ops that notify nobody.

pub mod autogen;
pub mod message;
pub mod model;
pub mod observer;
pub mod stats;

mod pipeline;
mod replay;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use message::{Message, TriagePayload};
pub use model::MeshModel;
pub use observer::{ModelEvent, ModelListener, SubscriptionId};
pub use stats::EngineStats;
