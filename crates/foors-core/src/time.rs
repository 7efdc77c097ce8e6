//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing millisecond counter
//! (`TimeMs`).  The caller drives the clock with fractional-second deltas
//! (`tick(delta_seconds)`); `SimClock` accumulates the sub-millisecond
//! remainder so repeated small deltas do not drift against the integer
//! counter.
//!
//! Using integer milliseconds as the canonical unit means every timeout in
//! the domain (route expiry, inactive-route grace period, generation
//! interval) is an exact integer comparison.

use std::fmt;

// ── TimeMs ───────────────────────────────────────────────────────────────────

/// An absolute simulation timestamp in milliseconds since model creation.
///
/// Stored as `u64`: at 1 ms resolution a u64 lasts ~585 million years, far
/// longer than any conceivable run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeMs(pub u64);

impl TimeMs {
    pub const ZERO: TimeMs = TimeMs(0);

    /// Milliseconds elapsed from `earlier` to `self`, saturating at zero if
    /// `earlier` is in the future.
    #[inline]
    pub fn since(self, earlier: TimeMs) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// The timestamp `ms` milliseconds after `self`.
    #[inline]
    pub fn offset(self, ms: u64) -> TimeMs {
        TimeMs(self.0 + ms)
    }
}

impl std::ops::Add<u64> for TimeMs {
    type Output = TimeMs;
    #[inline]
    fn add(self, rhs: u64) -> TimeMs {
        TimeMs(self.0 + rhs)
    }
}

impl std::ops::Sub for TimeMs {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: TimeMs) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for TimeMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ── SimClock ─────────────────────────────────────────────────────────────────

/// Advances simulation time by fractional-second deltas.
///
/// The clock is cheap to copy and holds no heap data.  The fractional
/// carry keeps long runs of small deltas exact: advancing 1000 times by
/// 0.0001 s lands on exactly 100 ms.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    now: TimeMs,
    /// Sub-millisecond remainder from previous advances, in [0, 1) ms.
    carry_ms: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current simulation instant.
    #[inline]
    pub fn now(&self) -> TimeMs {
        self.now
    }

    /// Advance the clock by `delta_secs` seconds.
    ///
    /// Negative or non-finite deltas are ignored — the clock never moves
    /// backwards.
    pub fn advance_secs(&mut self, delta_secs: f64) {
        if !delta_secs.is_finite() || delta_secs <= 0.0 {
            return;
        }
        let total = self.carry_ms + delta_secs * 1_000.0;
        let whole = total.floor();
        self.now = TimeMs(self.now.0 + whole as u64);
        self.carry_ms = total - whole;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.now.0 / 1_000;
        let ms = self.now.0 % 1_000;
        write!(f, "{secs}.{ms:03}s")
    }
}
