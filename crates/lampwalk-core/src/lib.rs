// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! lampwalk-core: deterministic lamp-lit path traversal.
//!
//! Individuals walk a linear path of nodes at fixed speeds, departing at
//! staggered start delays. Lamps sit on nodes and blink on independent
//! bright/dark duty cycles. The core answers, for each individual and for the
//! arrangement as a whole, whether the walk stayed lit, and records a
//! positional trace for replay.
//!
//! Layers, leaves first:
//! - [`lamp`]: duty-cycle state as a pure function of elapsed time.
//! - [`traversal`]: position as a pure function of elapsed time.
//! - [`illumination`]: nearest-node lamp lookup at an instant.
//! - [`engine`]: fixed-step sampling into a [`Trace`].
//! - [`evaluator`]: rule selection and [`VerdictReport`] assembly.
//!
//! Nothing here performs I/O or keeps state between calls; concurrent
//! evaluations of different arrangements share nothing.
#![forbid(unsafe_code)]

/// Immutable, validated simulation input.
pub mod arrangement;
pub mod crossing;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod illumination;
pub mod lamp;
pub mod path;
pub mod rule;
pub mod traversal;

pub use arrangement::{Arrangement, LampPlacement};
pub use crossing::{all_crossings_lit, crossings, NodeCrossing};
pub use engine::{
    CancelToken, SimulationEngine, SimulationRun, Snapshot, Snapshots, Trace, DEFAULT_MAX_STEPS,
    MIN_PLAUSIBLE_SPEED,
};
pub use error::{ArrangementFault, ErrorKind, LampFault, SimError};
pub use evaluator::{
    ArrangementEvaluator, Digest, EvaluationConfig, IndividualVerdict, StepPolicy, VerdictReport,
    DEFAULT_MAX_STEP_SECONDS, MIN_STEP_SECONDS,
};
pub use illumination::{exposure_at, is_illuminated, Exposure};
pub use lamp::{check_epsilon, is_lit, is_lit_within, Lamp, DEFAULT_LIT_EPSILON};
pub use path::{PathSpec, DEFAULT_MAX_PATH_LENGTH};
pub use rule::IlluminationRule;
pub use traversal::{finish_time, position_at, stage_of, Individual, Stage};
