// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy shared by every stage of an evaluation.
//!
//! Validation errors (`InvalidArrangement`, `InvalidLamp`) are raised before
//! any stepping begins, so a failed evaluation never leaves a partial trace
//! behind. `InvalidArgument` marks a broken internal contract (negative
//! elapsed time, non-positive step). `SimulationDivergent` and `Cancelled`
//! are the only errors that can surface once stepping has started.

use thiserror::Error;

/// Structural problem with an arrangement, detected before stepping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArrangementFault {
    /// The path needs at least a start node and an end node.
    #[error("path length {length} is below the minimum of 2 nodes")]
    PathTooShort {
        /// Requested node count.
        length: usize,
    },
    /// The path has more nodes than this evaluation accepts.
    #[error("path length {length} exceeds the limit of {max} nodes")]
    PathTooLong {
        /// Requested node count.
        length: usize,
        /// Largest accepted node count.
        max: usize,
    },
    /// Lamp definitions and node assignments disagree in length.
    #[error("{lamps} lamps but {assignments} node assignments")]
    AssignmentLengthMismatch {
        /// Number of lamp definitions.
        lamps: usize,
        /// Number of node assignments.
        assignments: usize,
    },
    /// A lamp was assigned to a node that does not exist on the path.
    #[error("lamp {lamp} assigned to node {node}, outside path of {length} nodes")]
    NodeOutOfRange {
        /// Lamp index.
        lamp: usize,
        /// Offending node index.
        node: usize,
        /// Path length in nodes.
        length: usize,
    },
    /// Two lamps were assigned to the same node.
    #[error("node {node} hosts both lamp {first} and lamp {second}")]
    DuplicateNode {
        /// Shared node index.
        node: usize,
        /// First lamp claiming the node.
        first: usize,
        /// Second lamp claiming the node.
        second: usize,
    },
    /// An individual's speed is zero, negative or not finite.
    #[error("individual {individual} has non-positive speed {speed}")]
    NonPositiveSpeed {
        /// Individual index.
        individual: usize,
        /// Offending speed.
        speed: f64,
    },
    /// An individual's start delay is negative or not finite.
    #[error("individual {individual} has invalid start delay {start_delay}")]
    InvalidStartDelay {
        /// Individual index.
        individual: usize,
        /// Offending delay.
        start_delay: f64,
    },
    /// A start delay was omitted for an individual other than the first.
    #[error("individual {individual} is missing a start delay")]
    MissingStartDelay {
        /// Individual index.
        individual: usize,
    },
    /// A traversal order is not a permutation of the individuals.
    #[error("order entry {position} names individual {index}, which is repeated or outside 0..{individuals}")]
    InvalidOrder {
        /// Position within the order.
        position: usize,
        /// Individual index found there.
        index: usize,
        /// Number of individuals.
        individuals: usize,
    },
    /// The request body could not be decoded into an arrangement at all.
    #[error("malformed arrangement document: {0}")]
    Malformed(String),
}

/// Reason a lamp's duty cycle is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LampFault {
    /// A duration is negative, NaN or infinite.
    #[error("durations must be finite and non-negative")]
    NegativeOrNonFinite,
    /// `bright + dark` is zero, so the cycle has no period.
    #[error("bright + dark must be positive")]
    ZeroPeriod,
}

/// Errors produced by the simulation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Structural arrangement problem.
    #[error("invalid arrangement: {0}")]
    InvalidArrangement(#[from] ArrangementFault),
    /// A lamp definition cannot produce a duty cycle.
    #[error("invalid lamp{}: {fault} (bright={bright}, dark={dark})", lamp_label(.index))]
    InvalidLamp {
        /// Index of the lamp within the arrangement, when known.
        index: Option<usize>,
        /// What is wrong with it.
        fault: LampFault,
        /// Bright duration as supplied.
        bright: f64,
        /// Dark duration as supplied.
        dark: f64,
    },
    /// An internal contract was violated (negative elapsed time, bad step).
    #[error("invalid argument: {what} = {value}")]
    InvalidArgument {
        /// Name of the offending argument.
        what: &'static str,
        /// Offending value.
        value: f64,
    },
    /// Stepping passed the safety ceiling without every individual finishing.
    #[error("simulation diverged at t={elapsed}s (ceiling {ceiling}s, {steps} steps)")]
    SimulationDivergent {
        /// Elapsed time when the run was abandoned.
        elapsed: f64,
        /// Ceiling in seconds.
        ceiling: f64,
        /// Samples taken before abandoning.
        steps: u64,
    },
    /// The caller tripped the cancel token.
    #[error("simulation cancelled at t={elapsed}s")]
    Cancelled {
        /// Elapsed time of the last completed snapshot boundary.
        elapsed: f64,
    },
}

fn lamp_label(index: &Option<usize>) -> String {
    index.map(|i| format!(" {i}")).unwrap_or_default()
}

/// Stable, caller-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`SimError::InvalidArrangement`].
    InvalidArrangement,
    /// See [`SimError::InvalidLamp`].
    InvalidLamp,
    /// See [`SimError::InvalidArgument`].
    InvalidArgument,
    /// See [`SimError::SimulationDivergent`].
    SimulationDivergent,
    /// See [`SimError::Cancelled`].
    Cancelled,
}

impl ErrorKind {
    /// Kind string used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArrangement => "InvalidArrangement",
            Self::InvalidLamp => "InvalidLamp",
            Self::InvalidArgument => "InvalidArgument",
            Self::SimulationDivergent => "SimulationDivergent",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether the caller can fix the failure by changing its input.
    pub const fn is_caller_error(self) -> bool {
        matches!(
            self,
            Self::InvalidArrangement | Self::InvalidLamp | Self::InvalidArgument
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SimError {
    /// Classifies this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArrangement(_) => ErrorKind::InvalidArrangement,
            Self::InvalidLamp { .. } => ErrorKind::InvalidLamp,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::SimulationDivergent { .. } => ErrorKind::SimulationDivergent,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Attaches a lamp index to an [`SimError::InvalidLamp`]; other errors pass through.
    #[must_use]
    pub fn with_lamp_index(self, lamp: usize) -> Self {
        match self {
            Self::InvalidLamp {
                fault, bright, dark, ..
            } => Self::InvalidLamp {
                index: Some(lamp),
                fault,
                bright,
                dark,
            },
            other => other,
        }
    }
}
