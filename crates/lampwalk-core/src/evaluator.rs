// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Arrangement-level verdicts.
//!
//! The evaluator chooses a step, picks the success rule, runs the engine (or
//! the analytic crossing check) and folds per-individual outcomes into a
//! [`VerdictReport`].
//!
//! Step-size sensitivity: a stepped verdict only sees the instants
//! `k * step`. A dark window shorter than the step, or an individual that
//! clips a lamp node between two samples, can be missed, so shrinking the
//! step may flip a borderline verdict. [`StepPolicy::Bounded`] keeps the step
//! at or below a tenth of the shortest lamp period and one node-width per
//! sample for the fastest individual; [`IlluminationRule::NodeCrossings`]
//! avoids the question entirely.

use blake3::Hasher;
use tracing::debug;

use crate::arrangement::Arrangement;
use crate::crossing::{all_crossings_lit, crossings, NodeCrossing};
use crate::engine::{CancelToken, SimulationEngine, Trace, DEFAULT_MAX_STEPS};
use crate::error::{ArrangementFault, SimError};
use crate::lamp::{check_epsilon, DEFAULT_LIT_EPSILON};
use crate::path::DEFAULT_MAX_PATH_LENGTH;
use crate::rule::IlluminationRule;
use crate::traversal::{finish_time, Individual};

/// Upper bound on the step chosen by [`StepPolicy::Bounded`] by default.
pub const DEFAULT_MAX_STEP_SECONDS: f64 = 0.05;

/// Floor applied by [`StepPolicy::Bounded`] so pathological lamps cannot
/// force a near-zero step.
pub const MIN_STEP_SECONDS: f64 = 1e-4;

/// 32-byte report digest.
pub type Digest = [u8; 32];

/// How the evaluator picks the simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum StepPolicy {
    /// Always use this many seconds.
    Fixed {
        /// Step in seconds.
        seconds: f64,
    },
    /// `min(max, min_lamp_period / 10, node_spacing / max_speed)`, floored at
    /// [`MIN_STEP_SECONDS`].
    Bounded {
        /// Largest step allowed.
        max: f64,
    },
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self::Bounded {
            max: DEFAULT_MAX_STEP_SECONDS,
        }
    }
}

impl StepPolicy {
    /// Step to use for `arrangement`.
    pub fn resolve(&self, arrangement: &Arrangement) -> f64 {
        match *self {
            Self::Fixed { seconds } => seconds,
            Self::Bounded { max } => {
                if !(max.is_finite() && max > 0.0) {
                    // Let the engine reject it.
                    return max;
                }
                let mut step = max;
                if let Some(period) = arrangement.min_lamp_period() {
                    step = step.min(period / 10.0);
                }
                if let Some(speed) = arrangement.max_speed() {
                    step = step.min(arrangement.path().node_spacing() / speed);
                }
                step.max(MIN_STEP_SECONDS)
            }
        }
    }
}

/// Evaluation knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvaluationConfig {
    /// Success rule.
    pub rule: IlluminationRule,
    /// Step selection.
    pub step: StepPolicy,
    /// Bright-edge tolerance for duty-cycle checks.
    pub epsilon: f64,
    /// Sample cap passed to the engine.
    pub max_steps: u64,
    /// Longest path, in nodes, this evaluator accepts.
    pub max_path_length: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            rule: IlluminationRule::default(),
            step: StepPolicy::default(),
            epsilon: DEFAULT_LIT_EPSILON,
            max_steps: DEFAULT_MAX_STEPS,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
        }
    }
}

/// Outcome for one individual.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndividualVerdict {
    /// Speed as supplied.
    pub speed: f64,
    /// Start delay as supplied.
    pub start_delay: f64,
    /// When the individual reaches the path end.
    pub finish_time: f64,
    /// Whether the individual satisfied the rule.
    pub success: bool,
    /// Arrival at each node with the hosted lamp's state.
    pub timeline: Vec<NodeCrossing>,
}

/// Per-individual and overall success for one arrangement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerdictReport {
    /// Rule that produced the verdicts.
    pub rule: IlluminationRule,
    /// Step used (informational for [`IlluminationRule::NodeCrossings`]).
    pub step_seconds: f64,
    /// True iff every individual succeeded (vacuously true when empty).
    pub overall_success: bool,
    /// The arrangement had no individuals.
    pub empty_arrangement: bool,
    /// Verdicts in input order.
    pub individuals: Vec<IndividualVerdict>,
}

impl VerdictReport {
    /// Success flags in input order.
    pub fn per_individual(&self) -> Vec<bool> {
        self.individuals.iter().map(|v| v.success).collect()
    }

    /// blake3 over a canonical little-endian encoding of the report.
    ///
    /// Layout (v1): version `u16`, rule id (len-prefixed), step bits, flags,
    /// individual count, then per individual: success, speed, delay, finish
    /// bits and the crossing timeline. Floats hash by bit pattern.
    pub fn digest(&self) -> Digest {
        let mut h = Hasher::new();
        h.update(&1u16.to_le_bytes());
        let rule = self.rule.as_str().as_bytes();
        h.update(&(rule.len() as u64).to_le_bytes());
        h.update(rule);
        h.update(&self.step_seconds.to_bits().to_le_bytes());
        h.update(&[u8::from(self.overall_success), u8::from(self.empty_arrangement)]);
        h.update(&(self.individuals.len() as u64).to_le_bytes());
        for v in &self.individuals {
            h.update(&[u8::from(v.success)]);
            h.update(&v.speed.to_bits().to_le_bytes());
            h.update(&v.start_delay.to_bits().to_le_bytes());
            h.update(&v.finish_time.to_bits().to_le_bytes());
            h.update(&(v.timeline.len() as u64).to_le_bytes());
            for c in &v.timeline {
                h.update(&(c.node as u64).to_le_bytes());
                h.update(&c.time.to_bits().to_le_bytes());
                match c.lamp_index {
                    Some(i) => {
                        h.update(&[1]);
                        h.update(&(i as u64).to_le_bytes());
                    }
                    None => {
                        h.update(&[0]);
                    }
                }
                h.update(&[match c.lamp_bright {
                    None => 0,
                    Some(false) => 1,
                    Some(true) => 2,
                }]);
            }
        }
        h.finalize().into()
    }
}

/// Runs arrangements and folds the result into a [`VerdictReport`].
#[derive(Debug, Clone, Default)]
pub struct ArrangementEvaluator {
    config: EvaluationConfig,
    cancel: Option<CancelToken>,
}

impl ArrangementEvaluator {
    /// Evaluator with the given configuration.
    pub fn new(config: EvaluationConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Attaches a cancel token forwarded to every engine run.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Active configuration.
    pub const fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Engine configured for `arrangement` under this evaluator's settings.
    pub fn engine_for(&self, arrangement: &Arrangement) -> Result<SimulationEngine, SimError> {
        let mut engine = SimulationEngine::new(self.config.step.resolve(arrangement))?
            .with_rule(self.config.rule)
            .with_epsilon(check_epsilon(self.config.epsilon)?)
            .with_max_steps(self.config.max_steps);
        if let Some(token) = &self.cancel {
            engine = engine.with_cancel_token(token.clone());
        }
        Ok(engine)
    }

    /// Verdicts for `arrangement`.
    pub fn evaluate(&self, arrangement: &Arrangement) -> Result<VerdictReport, SimError> {
        self.evaluate_inner(arrangement, false)
            .map(|(report, _)| report)
    }

    /// Verdicts plus the stepped trace, for callers that animate the run.
    ///
    /// The verdicts match [`evaluate`](Self::evaluate). Under a rule that
    /// does not step, the trace is best-effort: a walk that would pass the
    /// safety ceiling yields a [`Trace::truncated`] trace, not an error.
    pub fn evaluate_with_trace(
        &self,
        arrangement: &Arrangement,
    ) -> Result<(VerdictReport, Trace), SimError> {
        let (report, trace) = self.evaluate_inner(arrangement, true)?;
        Ok((report, trace.unwrap_or_default()))
    }

    fn check_cancelled(&self) -> Result<(), SimError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(SimError::Cancelled { elapsed: 0.0 });
        }
        Ok(())
    }

    /// Fails before any work when the path exceeds the configured limit.
    fn check_path(&self, arrangement: &Arrangement) -> Result<(), SimError> {
        let length = arrangement.path().length();
        if length > self.config.max_path_length {
            return Err(ArrangementFault::PathTooLong {
                length,
                max: self.config.max_path_length,
            }
            .into());
        }
        Ok(())
    }

    fn timeline(
        &self,
        arrangement: &Arrangement,
        walker: &Individual,
        epsilon: f64,
    ) -> Result<Vec<NodeCrossing>, SimError> {
        let mut timeline = Vec::with_capacity(arrangement.path().length());
        for crossing in crossings(arrangement, walker, epsilon) {
            self.check_cancelled()?;
            timeline.push(crossing?);
        }
        Ok(timeline)
    }

    fn evaluate_inner(
        &self,
        arrangement: &Arrangement,
        want_trace: bool,
    ) -> Result<(VerdictReport, Option<Trace>), SimError> {
        self.check_cancelled()?;
        self.check_path(arrangement)?;
        let rule = self.config.rule;
        let epsilon = check_epsilon(self.config.epsilon)?;
        let engine = self.engine_for(arrangement)?;

        let timelines = arrangement
            .individuals()
            .iter()
            .map(|walker| self.timeline(arrangement, walker, epsilon))
            .collect::<Result<Vec<_>, _>>()?;

        let (stepped, trace) = match (rule.is_stepped(), want_trace) {
            (true, true) => {
                let run = engine.run(arrangement)?;
                (Some(run.illuminated), Some(run.trace))
            }
            (true, false) => {
                // Verdicts only: drain the snapshots without keeping them.
                let mut walk = engine.snapshots(arrangement);
                for snapshot in &mut walk {
                    snapshot?;
                }
                (Some(walk.verdicts().to_vec()), None)
            }
            (false, true) => (None, Some(engine.replay(arrangement)?)),
            (false, false) => (None, None),
        };

        let success: Vec<bool> = match stepped {
            Some(verdicts) => verdicts,
            None => timelines.iter().map(|t| all_crossings_lit(t)).collect(),
        };

        let path = arrangement.path();
        let individuals: Vec<IndividualVerdict> = arrangement
            .individuals()
            .iter()
            .zip(timelines)
            .zip(success)
            .map(|((walker, timeline), success)| IndividualVerdict {
                speed: walker.speed,
                start_delay: walker.start_delay,
                finish_time: finish_time(walker, path),
                success,
                timeline,
            })
            .collect();

        let report = VerdictReport {
            rule,
            step_seconds: engine.step_seconds(),
            overall_success: individuals.iter().all(|v| v.success),
            empty_arrangement: arrangement.is_empty(),
            individuals,
        };
        debug!(
            rule = %rule,
            step = report.step_seconds,
            overall = report.overall_success,
            truncated = trace.as_ref().is_some_and(|t| t.truncated),
            "arrangement evaluated"
        );
        Ok((report, trace))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arrangement::LampPlacement;
    use crate::lamp::Lamp;
    use crate::path::PathSpec;

    fn arrangement(lamps: Vec<Lamp>, speeds: &[f64]) -> Arrangement {
        let count = lamps.len();
        Arrangement::new(
            PathSpec::new(5).unwrap(),
            lamps,
            LampPlacement::identity(count),
            speeds.iter().map(|s| Individual::new(*s, 0.0)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn bounded_step_respects_lamp_period_and_speed() {
        let a = arrangement(
            vec![Lamp {
                bright: 0.1,
                dark: 0.1,
            }],
            &[1.0],
        );
        assert!((StepPolicy::default().resolve(&a) - 0.02).abs() < 1e-12);

        let fast = arrangement(vec![], &[100.0]);
        assert_eq!(StepPolicy::default().resolve(&fast), 0.0125);

        let tiny = arrangement(
            vec![Lamp {
                bright: 1e-7,
                dark: 1e-7,
            }],
            &[1.0],
        );
        assert_eq!(StepPolicy::default().resolve(&tiny), MIN_STEP_SECONDS);
    }

    #[test]
    fn fixed_step_is_passed_through_and_validated() {
        let a = arrangement(vec![], &[1.0]);
        let eval = ArrangementEvaluator::new(EvaluationConfig {
            step: StepPolicy::Fixed { seconds: 0.0 },
            ..EvaluationConfig::default()
        });
        assert!(matches!(
            eval.evaluate(&a),
            Err(SimError::InvalidArgument { what: "step_seconds", .. })
        ));
    }

    #[test]
    fn oversized_path_is_refused_before_any_work() {
        let long = Arrangement::new(
            PathSpec::bounded(20_000_000, usize::MAX).unwrap(),
            vec![],
            LampPlacement::identity(0),
            vec![Individual::new(1e9, 0.0); 4],
        )
        .unwrap();
        let err = ArrangementEvaluator::default().evaluate(&long).unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidArrangement(ArrangementFault::PathTooLong {
                length: 20_000_000,
                max: DEFAULT_MAX_PATH_LENGTH,
            })
        );
    }

    #[test]
    fn pre_cancelled_evaluation_returns_before_building_timelines() {
        let long = Arrangement::new(
            PathSpec::bounded(20_000_000, usize::MAX).unwrap(),
            vec![],
            LampPlacement::identity(0),
            vec![Individual::new(1e9, 0.0); 4],
        )
        .unwrap();
        let token = CancelToken::new();
        token.cancel();
        let eval = ArrangementEvaluator::new(EvaluationConfig {
            max_path_length: usize::MAX,
            ..EvaluationConfig::default()
        })
        .with_cancel_token(token);
        let started = std::time::Instant::now();
        let err = eval.evaluate(&long).unwrap_err();
        assert!(matches!(err, SimError::Cancelled { .. }));
        assert!(started.elapsed() < std::time::Duration::from_millis(500));
    }

    #[test]
    fn cancel_is_checked_while_building_timelines() {
        let a = arrangement(vec![Lamp { bright: 1.0, dark: 1.0 }], &[1.0]);
        let token = CancelToken::new();
        let eval = ArrangementEvaluator::new(EvaluationConfig {
            rule: IlluminationRule::NodeCrossings,
            ..EvaluationConfig::default()
        })
        .with_cancel_token(token.clone());
        let walker = &a.individuals()[0];
        assert_eq!(eval.timeline(&a, walker, 0.0).unwrap().len(), 5);
        token.cancel();
        assert!(matches!(
            eval.timeline(&a, walker, 0.0),
            Err(SimError::Cancelled { .. })
        ));
    }

    #[test]
    fn negative_epsilon_is_rejected_under_every_rule() {
        let a = arrangement(vec![Lamp { bright: 0.001, dark: 100.0 }], &[1.0]);
        for rule in [
            IlluminationRule::LampedNodes,
            IlluminationRule::Continuous,
            IlluminationRule::NodeCrossings,
        ] {
            let eval = ArrangementEvaluator::new(EvaluationConfig {
                rule,
                epsilon: -200.0,
                ..EvaluationConfig::default()
            });
            let err = eval.evaluate(&a).unwrap_err();
            assert!(
                matches!(err, SimError::InvalidArgument { what: "epsilon", .. }),
                "rule {rule}"
            );
        }
    }

    #[test]
    fn digest_tracks_verdict_changes() {
        let lit = arrangement(vec![Lamp { bright: 1.0, dark: 0.0 }; 5], &[1.0]);
        let dark = arrangement(vec![Lamp { bright: 0.0, dark: 1.0 }; 5], &[1.0]);
        let eval = ArrangementEvaluator::default();
        let a = eval.evaluate(&lit).unwrap();
        let b = eval.evaluate(&dark).unwrap();
        assert!(a.overall_success);
        assert!(!b.overall_success);
        assert_ne!(a.digest(), b.digest());
    }
}
