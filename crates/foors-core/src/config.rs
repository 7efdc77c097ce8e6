//! Engine configuration.
//!
//! All parameters are dynamically settable on a running model; the two
//! bounded parameters are clamped to their documented ranges at the setter
//! rather than rejected, so a misbehaving UI slider can never wedge the
//! engine.

use crate::{FoorsError, FoorsResult};

/// Bounds for [`EngineConfig::inactive_routing_timeout_ms`].
pub const INACTIVE_TIMEOUT_BOUNDS_MS: (u64, u64) = (1_000, 300_000);

/// Bounds for [`EngineConfig::triage_generation_interval_ms`].
pub const GENERATION_INTERVAL_BOUNDS_MS: (u64, u64) = (500, 10_000);

/// Top-level engine configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Link eligibility cutoff in plane units.  A link forms when the
    /// distance between two nodes is within the larger of their radii.
    pub default_connection_radius: f64,

    /// Grace period before a demoted (inactive) route is deleted.
    /// Clamped to [`INACTIVE_TIMEOUT_BOUNDS_MS`].
    pub inactive_routing_timeout_ms: u64,

    /// Age past which an active route counts as expired for mode
    /// classification.
    pub route_expiry_ms: u64,

    /// Progress rate of new messages, in link-lengths per second.
    pub default_message_speed: f64,

    /// Auto-generation cadence.  Clamped to
    /// [`GENERATION_INTERVAL_BOUNDS_MS`].
    pub triage_generation_interval_ms: u64,

    /// Master RNG seed.  The same seed always produces identical
    /// auto-generation sequences.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_connection_radius:     2.0,
            inactive_routing_timeout_ms:   1_000,
            route_expiry_ms:               300_000,
            default_message_speed:         2.0,
            triage_generation_interval_ms: 3_000,
            seed:                          0,
        }
    }
}

impl EngineConfig {
    /// Clamp `ms` to the documented inactive-route timeout bounds.
    #[inline]
    pub fn clamp_inactive_timeout(ms: u64) -> u64 {
        let (lo, hi) = INACTIVE_TIMEOUT_BOUNDS_MS;
        ms.clamp(lo, hi)
    }

    /// Clamp `ms` to the documented generation-interval bounds.
    #[inline]
    pub fn clamp_generation_interval(ms: u64) -> u64 {
        let (lo, hi) = GENERATION_INTERVAL_BOUNDS_MS;
        ms.clamp(lo, hi)
    }

    /// Check the free-form parameters a clamp cannot fix.
    ///
    /// Used by the fallible model constructor; the running setters clamp
    /// instead.
    pub fn validate(&self) -> FoorsResult<()> {
        if !(self.default_connection_radius.is_finite() && self.default_connection_radius > 0.0) {
            return Err(FoorsError::Config(format!(
                "connection radius must be positive and finite, got {}",
                self.default_connection_radius
            )));
        }
        if !(self.default_message_speed.is_finite() && self.default_message_speed > 0.0) {
            return Err(FoorsError::Config(format!(
                "message speed must be positive and finite, got {}",
                self.default_message_speed
            )));
        }
        Ok(())
    }

    /// Return a copy with both bounded parameters clamped into range.
    pub fn clamped(mut self) -> Self {
        self.inactive_routing_timeout_ms =
            Self::clamp_inactive_timeout(self.inactive_routing_timeout_ms);
        self.triage_generation_interval_ms =
            Self::clamp_generation_interval(self.triage_generation_interval_ms);
        self
    }
}
