//! `foors-core` — foundational types for the FOORS+ mesh-routing engine.
//!
//! This crate is a dependency of every other `foors-*` crate.  It
//! intentionally has no `foors-*` dependencies and minimal external ones
//! (only `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`ids`]     | `NodeId`, `MessageId`, `TriageId`, `SinkId`             |
//! | [`types`]   | `Severity`, `NodeKind`, `RoutingMode`, `MessageKind`    |
//! | [`time`]    | `TimeMs`, `SimClock`                                    |
//! | [`vec2`]    | `Vec2`, Euclidean distance                              |
//! | [`config`]  | `EngineConfig` and parameter clamping                   |
//! | [`rng`]     | `SimRng` (deterministic, seeded)                        |
//! | [`error`]   | `FoorsError`, `FoorsResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                    |
//! |---------|-----------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types. |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;
pub mod types;
pub mod vec2;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::EngineConfig;
pub use error::{FoorsError, FoorsResult};
pub use ids::{MessageId, NodeId, SinkId, TriageId};
pub use rng::SimRng;
pub use time::{SimClock, TimeMs};
pub use types::{FloodingReason, MessageKind, NodeKind, RoutingMode, Severity};
pub use vec2::Vec2;
