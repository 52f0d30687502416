// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Individual motion along the path as a pure function of elapsed time.

use crate::error::SimError;
use crate::path::PathSpec;

/// A walker with a fixed speed and a start delay derived from its ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual {
    /// Path-units per second.
    pub speed: f64,
    /// Seconds after time 0 before the individual departs.
    pub start_delay: f64,
}

impl Individual {
    /// Convenience constructor; validation happens when the arrangement is built.
    pub const fn new(speed: f64, start_delay: f64) -> Self {
        Self { speed, start_delay }
    }
}

/// Where an individual is in its journey at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Stage {
    /// At the start, not yet departed.
    Waiting,
    /// Strictly between start and end.
    Traversing,
    /// Reached the path end. Terminal.
    Finished,
}

/// Position of `individual` on `path` at `elapsed` seconds.
///
/// Zero before departure, then `(elapsed - start_delay) * speed`, saturating
/// at [`PathSpec::end`].
pub fn position_at(individual: &Individual, path: &PathSpec, elapsed: f64) -> Result<f64, SimError> {
    if !(elapsed.is_finite() && elapsed >= 0.0) {
        return Err(SimError::InvalidArgument {
            what: "elapsed",
            value: elapsed,
        });
    }
    if elapsed < individual.start_delay {
        return Ok(0.0);
    }
    Ok(((elapsed - individual.start_delay) * individual.speed).min(path.end()))
}

/// Instant at which `individual` reaches the path end.
pub fn finish_time(individual: &Individual, path: &PathSpec) -> f64 {
    individual.start_delay + path.end() / individual.speed
}

/// Classifies a position produced by [`position_at`].
pub fn stage_of(position: f64, path: &PathSpec) -> Stage {
    if position >= path.end() {
        Stage::Finished
    } else if position > 0.0 {
        Stage::Traversing
    } else {
        Stage::Waiting
    }
}
