// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fixed-step simulation over an immutable [`Arrangement`].
//!
//! The engine holds no per-run state. [`SimulationEngine::snapshot_at`] is a
//! pure function of the arrangement and a tick index; [`Snapshots`] walks the
//! ticks in order and folds per-individual verdicts as it goes; [`run`]
//! collects a whole [`Trace`].
//!
//! Determinism:
//! - Sample `k` is taken at `k * step`, never by accumulating `step`, so the
//!   same arrangement and step always visit the same instants.
//! - Individuals and lamps are reported in input order.
//!
//! [`run`]: SimulationEngine::run

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::arrangement::Arrangement;
use crate::error::SimError;
use crate::illumination::{exposure_at, Exposure};
use crate::lamp::{is_lit_within, DEFAULT_LIT_EPSILON};
use crate::rule::IlluminationRule;
use crate::traversal::{position_at, stage_of, Stage};

/// Slowest speed (path-units per second) the safety ceiling allows for.
pub const MIN_PLAUSIBLE_SPEED: f64 = 1e-3;

/// Hard cap on samples per run, independent of the time ceiling.
pub const DEFAULT_MAX_STEPS: u64 = 2_000_000;

/// Shared flag a caller can trip to stop a run at the next snapshot boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an untripped token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// State of the whole arrangement at one sampled instant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Sample index.
    pub tick: u64,
    /// `tick * step`, in seconds.
    pub elapsed: f64,
    /// Per-individual path coordinate.
    pub positions: Vec<f64>,
    /// Per-individual journey stage.
    pub stages: Vec<Stage>,
    /// Per-individual view of the nearest node's lamp.
    pub exposures: Vec<Exposure>,
    /// Per-lamp bright flag.
    pub lamps_lit: Vec<bool>,
}

impl Snapshot {
    /// True once every individual has reached the path end.
    pub fn all_finished(&self) -> bool {
        self.stages.iter().all(|s| *s == Stage::Finished)
    }
}

/// Ordered snapshots from one run.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trace {
    /// Seconds between snapshots.
    pub step_seconds: f64,
    /// Snapshots in tick order.
    pub snapshots: Vec<Snapshot>,
    /// Recording stopped at the safety ceiling before everyone finished.
    #[cfg_attr(feature = "serde", serde(default))]
    pub truncated: bool,
}

impl Trace {
    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Final snapshot, if any.
    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Every `stride`-th snapshot plus the final one; useful for animation
    /// at a coarser frame rate than the simulation step.
    pub fn thinned(&self, stride: usize) -> Vec<&Snapshot> {
        let stride = stride.max(1);
        let last = self.snapshots.len().saturating_sub(1);
        self.snapshots
            .iter()
            .enumerate()
            .filter(|(i, _)| i % stride == 0 || *i == last)
            .map(|(_, s)| s)
            .collect()
    }
}

/// Outcome of [`SimulationEngine::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    /// Every sampled snapshot.
    pub trace: Trace,
    /// Per-individual verdict under the engine's rule.
    pub illuminated: Vec<bool>,
    /// The arrangement had no individuals; `illuminated` is vacuously empty.
    pub empty_arrangement: bool,
    /// Elapsed time of the last snapshot.
    pub finished_at: f64,
}

/// Fixed-step simulator.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    step: f64,
    rule: IlluminationRule,
    epsilon: f64,
    max_steps: u64,
    cancel: Option<CancelToken>,
}

impl SimulationEngine {
    /// Creates an engine sampling every `step_seconds`.
    pub fn new(step_seconds: f64) -> Result<Self, SimError> {
        if !(step_seconds.is_finite() && step_seconds > 0.0) {
            return Err(SimError::InvalidArgument {
                what: "step_seconds",
                value: step_seconds,
            });
        }
        Ok(Self {
            step: step_seconds,
            rule: IlluminationRule::default(),
            epsilon: DEFAULT_LIT_EPSILON,
            max_steps: DEFAULT_MAX_STEPS,
            cancel: None,
        })
    }

    /// Selects the per-sample rule. [`IlluminationRule::NodeCrossings`] is not
    /// stepped; the engine judges samples with its lamp-node criterion.
    pub fn with_rule(mut self, rule: IlluminationRule) -> Self {
        self.rule = rule;
        self
    }

    /// Sets the bright-edge tolerance passed to the duty-cycle check. A
    /// negative or non-finite value fails the first lamp lookup.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Caps the number of samples per run.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Attaches a cancel token checked at every snapshot boundary.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Seconds between samples.
    pub const fn step_seconds(&self) -> f64 {
        self.step
    }

    /// Rule used to judge samples.
    pub const fn rule(&self) -> IlluminationRule {
        self.rule
    }

    /// Time limit for `arrangement`: the latest departure plus the time an
    /// individual at [`MIN_PLAUSIBLE_SPEED`] would need to cross.
    pub fn ceiling(&self, arrangement: &Arrangement) -> f64 {
        if arrangement.is_empty() {
            return 0.0;
        }
        let latest_departure = arrangement
            .individuals()
            .iter()
            .map(|w| w.start_delay)
            .fold(0.0, f64::max);
        latest_departure + arrangement.path().end() / MIN_PLAUSIBLE_SPEED
    }

    /// Snapshot at sample `tick`, computed from scratch.
    pub fn snapshot_at(&self, arrangement: &Arrangement, tick: u64) -> Result<Snapshot, SimError> {
        let elapsed = tick as f64 * self.step;
        let path = arrangement.path();
        let walkers = arrangement.individuals();

        let mut positions = Vec::with_capacity(walkers.len());
        let mut stages = Vec::with_capacity(walkers.len());
        let mut exposures = Vec::with_capacity(walkers.len());
        for walker in walkers {
            let position = position_at(walker, path, elapsed)?;
            positions.push(position);
            stages.push(stage_of(position, path));
            exposures.push(exposure_at(
                position,
                path,
                arrangement.placement(),
                arrangement.lamps(),
                elapsed,
                self.epsilon,
            )?);
        }

        let lamps_lit = arrangement
            .lamps()
            .iter()
            .enumerate()
            .map(|(i, lamp)| {
                is_lit_within(lamp, elapsed, self.epsilon).map_err(|e| e.with_lamp_index(i))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Snapshot {
            tick,
            elapsed,
            positions,
            stages,
            exposures,
            lamps_lit,
        })
    }

    /// Lazy, finite snapshot sequence for `arrangement`.
    ///
    /// Ends after the first snapshot in which everyone has finished, or after
    /// yielding a single error. Not restartable; call again for a fresh walk.
    pub fn snapshots<'a>(&'a self, arrangement: &'a Arrangement) -> Snapshots<'a> {
        Snapshots {
            engine: self,
            arrangement,
            ceiling: self.ceiling(arrangement),
            tick: 0,
            last_elapsed: 0.0,
            verdicts: vec![true; arrangement.individuals().len()],
            done: false,
        }
    }

    /// Steps `arrangement` to completion and returns the full trace.
    pub fn run(&self, arrangement: &Arrangement) -> Result<SimulationRun, SimError> {
        debug!(
            individuals = arrangement.individuals().len(),
            lamps = arrangement.lamps().len(),
            step = self.step,
            rule = %self.rule,
            "simulation run starting"
        );
        let mut walk = self.snapshots(arrangement);
        let mut snapshots = Vec::new();
        for snapshot in &mut walk {
            snapshots.push(snapshot?);
        }
        let finished_at = walk.last_elapsed;
        let illuminated = walk.verdicts;
        debug!(
            samples = snapshots.len(),
            finished_at,
            failures = illuminated.iter().filter(|ok| !**ok).count(),
            "simulation run complete"
        );
        Ok(SimulationRun {
            trace: Trace {
                step_seconds: self.step,
                snapshots,
                truncated: false,
            },
            illuminated,
            empty_arrangement: arrangement.is_empty(),
            finished_at,
        })
    }

    /// Trace for display only. Reaching the safety ceiling ends the
    /// recording with [`Trace::truncated`] set instead of failing; any other
    /// error, cancellation included, still fails.
    pub fn replay(&self, arrangement: &Arrangement) -> Result<Trace, SimError> {
        let mut snapshots = Vec::new();
        let mut truncated = false;
        for snapshot in self.snapshots(arrangement) {
            match snapshot {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(SimError::SimulationDivergent { elapsed, .. }) => {
                    debug!(elapsed, samples = snapshots.len(), "replay truncated at ceiling");
                    truncated = true;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(Trace {
            step_seconds: self.step,
            snapshots,
            truncated,
        })
    }
}

/// Iterator returned by [`SimulationEngine::snapshots`].
#[derive(Debug)]
pub struct Snapshots<'a> {
    engine: &'a SimulationEngine,
    arrangement: &'a Arrangement,
    ceiling: f64,
    tick: u64,
    last_elapsed: f64,
    verdicts: Vec<bool>,
    done: bool,
}

impl Snapshots<'_> {
    /// Per-individual verdicts over the snapshots yielded so far.
    pub fn verdicts(&self) -> &[bool] {
        &self.verdicts
    }

    fn fail(&mut self, err: SimError) -> Option<Result<Snapshot, SimError>> {
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for Snapshots<'_> {
    type Item = Result<Snapshot, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self
            .engine
            .cancel
            .as_ref()
            .is_some_and(CancelToken::is_cancelled)
        {
            return self.fail(SimError::Cancelled {
                elapsed: self.last_elapsed,
            });
        }
        let elapsed = self.tick as f64 * self.engine.step;
        if elapsed > self.ceiling || self.tick >= self.engine.max_steps {
            return self.fail(SimError::SimulationDivergent {
                elapsed,
                ceiling: self.ceiling,
                steps: self.tick,
            });
        }
        let snapshot = match self.engine.snapshot_at(self.arrangement, self.tick) {
            Ok(snapshot) => snapshot,
            Err(err) => return self.fail(err),
        };

        for (i, verdict) in self.verdicts.iter_mut().enumerate() {
            if snapshot.stages[i] == Stage::Traversing
                && !self.engine.rule.admits(snapshot.exposures[i])
            {
                if *verdict {
                    trace!(
                        individual = i,
                        elapsed,
                        position = snapshot.positions[i],
                        "individual left in the dark"
                    );
                }
                *verdict = false;
            }
        }

        self.last_elapsed = elapsed;
        self.tick += 1;
        if snapshot.all_finished() {
            self.done = true;
        }
        Some(Ok(snapshot))
    }
}
