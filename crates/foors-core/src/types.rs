//! Shared enums: triage severity, node kind, routing mode, message kind.
//!
//! All variants are always compiled in.  The enums are plain data — the
//! decision logic that consumes them lives in `foors-routing`.

// ── Severity ─────────────────────────────────────────────────────────────────

/// Triage severity, ordered from lowest to highest urgency.
///
/// The derived `Ord` follows the declaration order, so
/// `Severity::Black < Severity::Red`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Deceased / expectant.  Lowest urgency.
    Black,
    /// Minor injuries, walking wounded.
    Green,
    /// Delayed: serious but stable.
    Yellow,
    /// Immediate: life-threatening.  Highest urgency.
    Red,
}

impl Severity {
    /// All severities in ascending urgency order, for uniform random picks.
    pub const ALL: [Severity; 4] =
        [Severity::Black, Severity::Green, Severity::Yellow, Severity::Red];

    /// Maximum number of distinct next-hops a single emission of this
    /// severity may fan out to.
    #[inline]
    pub fn fanout_cap(self) -> usize {
        match self {
            Severity::Red => 3,
            Severity::Yellow => 2,
            Severity::Green | Severity::Black => 1,
        }
    }

    /// Stable lowercase label, useful for logs and stats output.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Black  => "black",
            Severity::Green  => "green",
            Severity::Yellow => "yellow",
            Severity::Red    => "red",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── NodeKind ─────────────────────────────────────────────────────────────────

/// Whether a node originates triages or collects them.
///
/// Both kinds forward for their peers; the distinction drives routing-table
/// construction (BFS roots at sinks) and replay triggers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Produces triage reports (default for new nodes).
    #[default]
    Source,
    /// Collects triage reports; destination of routing tables.
    Sink,
}

impl NodeKind {
    #[inline]
    pub fn is_sink(self) -> bool {
        matches!(self, NodeKind::Sink)
    }

    /// The other kind — used by `toggle_node_type`.
    #[inline]
    pub fn toggled(self) -> NodeKind {
        match self {
            NodeKind::Source => NodeKind::Sink,
            NodeKind::Sink   => NodeKind::Source,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Source => "source",
            NodeKind::Sink   => "sink",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── RoutingMode ──────────────────────────────────────────────────────────────

/// The per-node forwarding discipline, recomputed after every routing pass.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoutingMode {
    /// Forwarding restricted to routing-table next-hops.
    Intelligent,
    /// Forwarding to all neighbors except the sender.
    #[default]
    Flooding,
    /// Recently lost every route; floods while the grace period lasts.
    Inactive,
    /// No neighbors at all; nothing can be emitted.
    NoConnections,
}

impl RoutingMode {
    /// `true` for the modes that apply the strict duplicate-drop guard.
    #[inline]
    pub fn floods(self) -> bool {
        matches!(self, RoutingMode::Flooding | RoutingMode::Inactive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoutingMode::Intelligent   => "intelligent",
            RoutingMode::Flooding      => "flooding",
            RoutingMode::Inactive      => "inactive",
            RoutingMode::NoConnections => "no-connections",
        }
    }
}

impl std::fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FloodingReason ───────────────────────────────────────────────────────────

/// Why a node is not in intelligent mode.  Observability only.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FloodingReason {
    NoConnections,
    HasInactiveRoutes,
    RoutesExpired,
    NoRoutes,
}

impl FloodingReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FloodingReason::NoConnections     => "no-connections",
            FloodingReason::HasInactiveRoutes => "has-inactive-routes",
            FloodingReason::RoutesExpired     => "routes-expired",
            FloodingReason::NoRoutes          => "no-routes",
        }
    }
}

impl std::fmt::Display for FloodingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── MessageKind ──────────────────────────────────────────────────────────────

/// What an in-flight message carries.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    /// Plain payload; single-path, no dedup state.
    #[default]
    Normal,
    /// Severity-tagged triage report with a `TriageId`.
    Triage,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Normal => "normal",
            MessageKind::Triage => "triage",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
