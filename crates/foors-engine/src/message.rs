//! The in-flight message unit.
//!
//! Messages are plain values owned by the model's message list.  They are
//! created by a send, a forward, a queue flush, or a boundary replay;
//! mutated only by the advance phase; and destroyed on arrival.

use foors_core::{MessageId, MessageKind, NodeId, Severity, TimeMs, TriageId};

/// The triage payload carried by `MessageKind::Triage` messages,
/// preserved verbatim across every forward and replay.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TriagePayload {
    pub triage:   TriageId,
    pub severity: Severity,
}

/// One message travelling along one link.
///
/// `from` and `to` are neighbors at creation time; `progress` runs from 0
/// to 1 and is monotonically non-decreasing.  A message whose progress
/// crosses 1 is delivered and removed within the same tick.
#[derive(Copy, Clone, Debug)]
pub struct Message {
    pub id:   MessageId,
    pub from: NodeId,
    pub to:   NodeId,

    /// Fraction of the link travelled, in [0, 1].
    pub progress: f64,

    /// Progress rate in link-lengths per second.
    pub speed: f64,

    pub created_at: TimeMs,
    pub kind:       MessageKind,

    /// Present iff `kind == MessageKind::Triage`.
    pub triage: Option<TriagePayload>,

    /// Tick sequence number at creation.  The advance phase skips messages
    /// spawned within the running tick so arrival processing terminates.
    pub(crate) spawn_tick: u64,
}

impl Message {
    /// `true` until the message has been delivered.
    #[inline]
    pub fn is_in_flight(&self) -> bool {
        self.progress < 1.0
    }
}
