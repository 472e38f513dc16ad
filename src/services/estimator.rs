//! Drive-time estimation with a safety buffer.
//!
//! The provider returns the raw road duration; the buffer policy widens it
//! into the worst-case figure the schedule builder plans around. Historical
//! deployments disagreed on the formula (30% slow-truck margin vs a flat
//! half-hour tolerance), so the policy is a tagged value rather than a
//! hard-coded expression, with per-leg overrides for known-bad corridors.

use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use super::routing::{DirectionsError, DirectionsProvider};

/// How the safety margin is applied to a raw drive duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BufferPolicy {
    /// buffered = base × (1 + fraction)
    Fraction(f64),
    /// buffered = base + minutes
    FixedMinutes(i64),
}

impl BufferPolicy {
    pub fn apply(&self, base: Duration) -> Duration {
        match *self {
            BufferPolicy::Fraction(fraction) => {
                let secs = (base.num_seconds() as f64 * (1.0 + fraction)).round() as i64;
                Duration::seconds(secs)
            }
            BufferPolicy::FixedMinutes(minutes) => base + Duration::minutes(minutes),
        }
    }
}

/// Replaces the default buffer policy on legs whose endpoints match both
/// address fragments (case-insensitive substring match, first rule wins).
#[derive(Debug, Clone)]
pub struct LegOverride {
    pub from_contains: String,
    pub to_contains: String,
    pub policy: BufferPolicy,
}

/// Raw and buffered duration for one hop. Computed per leg, never stored.
#[derive(Debug, Clone, Copy)]
pub struct DriveEstimate {
    pub base: Duration,
    pub buffered: Duration,
}

/// Wraps the directions provider and applies the buffer policy.
pub struct DriveTimeEstimator {
    provider: Arc<dyn DirectionsProvider>,
    policy: BufferPolicy,
    overrides: Vec<LegOverride>,
}

impl DriveTimeEstimator {
    pub fn new(provider: Arc<dyn DirectionsProvider>, policy: BufferPolicy) -> Self {
        Self {
            provider,
            policy,
            overrides: Vec::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: Vec<LegOverride>) -> Self {
        self.overrides = overrides;
        self
    }

    fn policy_for(&self, from: &str, to: &str) -> BufferPolicy {
        let from_lower = from.to_lowercase();
        let to_lower = to.to_lowercase();

        self.overrides
            .iter()
            .find(|rule| {
                from_lower.contains(&rule.from_contains.to_lowercase())
                    && to_lower.contains(&rule.to_contains.to_lowercase())
            })
            .map(|rule| rule.policy)
            .unwrap_or(self.policy)
    }

    /// Estimate one hop: raw provider duration plus its buffered companion.
    pub async fn estimate(&self, from: &str, to: &str) -> Result<DriveEstimate, DirectionsError> {
        let secs = self.provider.drive_duration(from, to).await?;
        let base = Duration::seconds(secs as i64);
        let buffered = self.policy_for(from, to).apply(base);

        debug!(
            "Estimated {:?} -> {:?}: {} min base, {} min buffered",
            from,
            to,
            base.num_minutes(),
            buffered.num_minutes()
        );

        Ok(DriveEstimate { base, buffered })
    }
}
