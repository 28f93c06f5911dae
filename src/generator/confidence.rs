//! Confidence trajectory generation.
//!
//! The trajectory starts at the first deliberation's stated confidence and
//! gets one value per timeline event:
//!
//! - a deliberation moves confidence toward its own stated value by a damped
//!   step with a little jitter, never more than `volatility * 100` at once;
//! - a reality break subtracts a penalty between half and all of
//!   `volatility * 100` (at least one point).
//!
//! Every value after the first is clamped to
//! [`CONFIDENCE_FLOOR`, `CONFIDENCE_CEILING`]: a trace is never fully certain
//! or fully hopeless once work has started.

use rand::RngExt;
use rand_chacha::ChaCha8Rng;

use crate::difficulty::DifficultyProfile;

use super::deliberation::Deliberation;
use super::reality_break::RealityBreak;

pub const CONFIDENCE_FLOOR: u8 = 5;
pub const CONFIDENCE_CEILING: u8 = 95;

/// Fraction of the gap to a deliberation's stated confidence closed per step.
const DAMPING: f64 = 0.6;
/// Jitter amplitude as a multiple of volatility.
const JITTER_SCALE: f64 = 20.0;
/// Lower bound of the break penalty as a fraction of the maximum step.
const MIN_PENALTY_FRACTION: f64 = 0.5;

/// One event on a scenario's timeline, in order of occurrence.
#[derive(Debug, Clone, Copy)]
pub enum TimelineEvent<'a> {
    Deliberation(&'a Deliberation),
    RealityBreak(&'a RealityBreak),
}

/// Builds the confidence trajectory for an ordered event timeline.
///
/// The result always has `events.len() + 1` values.
pub fn build_trajectory(
    initial_confidence: u8,
    events: &[TimelineEvent<'_>],
    profile: &DifficultyProfile,
    rng: &mut ChaCha8Rng,
) -> Vec<u8> {
    let max_step = profile.max_confidence_step();
    let jitter = profile.confidence_volatility * JITTER_SCALE;

    let mut trajectory = Vec::with_capacity(events.len() + 1);
    let initial = initial_confidence.min(100);
    trajectory.push(initial);

    let mut current = f64::from(initial);
    for event in events {
        let next = match event {
            TimelineEvent::Deliberation(deliberation) => {
                let target = f64::from(deliberation.confidence);
                let noise = if jitter > 0.0 {
                    rng.random_range(-jitter..=jitter)
                } else {
                    0.0
                };
                let delta = ((target - current) * DAMPING + noise).clamp(-max_step, max_step);
                current + delta
            }
            TimelineEvent::RealityBreak(_) => {
                let fraction = rng.random_range(MIN_PENALTY_FRACTION..=1.0);
                current - (fraction * max_step).max(1.0)
            }
        };

        let clamped = next
            .round()
            .clamp(f64::from(CONFIDENCE_FLOOR), f64::from(CONFIDENCE_CEILING));
        trajectory.push(clamped as u8);
        current = clamped;
    }

    trajectory
}
