//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  IDs are allocated from monotonic
//! counters owned by the stores that create the objects; an ID is never
//! reused for the life of a model, even after the object is removed.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — the all-ones bit pattern.
            pub const INVALID: $name = $name(<$inner>::MAX);
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Identity of a mesh node.  Stable for the node's lifetime; never reused.
    pub struct NodeId(u32);
}

typed_id! {
    /// Identity of an in-flight message.  `u64` so long auto-generation runs
    /// cannot wrap.
    pub struct MessageId(u64);
}

typed_id! {
    /// Identity of a triage payload.  Allocated once at the originating node
    /// and carried verbatim through every forward and replay.
    pub struct TriageId(u64);
}

/// Sinks are addressed by the `NodeId` of the sink node.
///
/// Routing tables, suppression maps, and replay all key on the sink's node
/// identity; a separate ID space would only add translation at every seam.
pub type SinkId = NodeId;
