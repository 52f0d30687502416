// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Response side of the wire schema.

use serde::{Deserialize, Serialize};

use lampwalk_core::{
    Arrangement, IlluminationRule, NodeCrossing, SimError, Stage, Trace, VerdictReport,
};

use crate::request::LampSpec;

/// One individual's verdict, echoing its input descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndividualOutcome {
    /// Position in the request's `individuals` array.
    pub individual_id: usize,
    /// Speed as supplied.
    pub speed: f64,
    /// Start delay in effect (0 when the first individual omitted it).
    pub start_delay: f64,
    /// Whether the walk stayed lit under the selected rule.
    pub success: bool,
    /// Seconds at which the individual reaches the path end.
    pub finish_time: f64,
    /// Arrival at each node with the hosted lamp's state.
    pub timeline: Vec<NodeCrossing>,
}

/// One sampled instant, trimmed for transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceFrame {
    /// Sample index.
    pub tick: u64,
    /// Elapsed seconds.
    pub t: f64,
    /// Per-individual path coordinate.
    pub positions: Vec<f64>,
    /// Per-individual journey stage.
    pub stages: Vec<Stage>,
    /// Per-lamp bright flag.
    pub lamps_lit: Vec<bool>,
}

/// Sampled trace for replay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceView {
    /// Seconds between consecutive ticks.
    pub step_seconds: f64,
    /// Frames in tick order.
    pub frames: Vec<TraceFrame>,
    /// Recording stopped at the safety ceiling before everyone finished.
    #[serde(default)]
    pub truncated: bool,
}

impl TraceView {
    /// Every `stride`-th snapshot of `trace`, always ending on the last one.
    pub fn from_trace(trace: &Trace, stride: usize) -> Self {
        let frames = trace
            .thinned(stride)
            .into_iter()
            .map(|s| TraceFrame {
                tick: s.tick,
                t: s.elapsed,
                positions: s.positions.clone(),
                stages: s.stages.clone(),
                lamps_lit: s.lamps_lit.clone(),
            })
            .collect();
        Self {
            step_seconds: trace.step_seconds,
            frames,
            truncated: trace.truncated,
        }
    }
}

/// Body of a successful `POST /simulate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulateResponse {
    /// True iff every individual succeeded.
    pub success: bool,
    /// The request had no individuals, so `success` is vacuous.
    pub empty_arrangement: bool,
    /// Rule that produced the verdicts.
    pub rule: IlluminationRule,
    /// Step used by the engine.
    pub step_seconds: f64,
    /// Hex blake3 digest of the verdict report.
    pub digest: String,
    /// Node hosting each lamp.
    pub lamp_assignment: Vec<usize>,
    /// Per-individual outcomes in input order.
    pub individuals: Vec<IndividualOutcome>,
    /// Lamp definitions echoed back.
    pub lamps: Vec<LampSpec>,
    /// Sampled trace, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceView>,
}

impl SimulateResponse {
    /// Assembles the response for `report`, produced from `arrangement`.
    pub fn new(report: &VerdictReport, arrangement: &Arrangement, trace: Option<TraceView>) -> Self {
        let individuals = report
            .individuals
            .iter()
            .enumerate()
            .map(|(individual_id, v)| IndividualOutcome {
                individual_id,
                speed: v.speed,
                start_delay: v.start_delay,
                success: v.success,
                finish_time: v.finish_time,
                timeline: v.timeline.clone(),
            })
            .collect();
        Self {
            success: report.overall_success,
            empty_arrangement: report.empty_arrangement,
            rule: report.rule,
            step_seconds: report.step_seconds,
            digest: hex::encode(report.digest()),
            lamp_assignment: arrangement.placement().nodes().to_vec(),
            individuals,
            lamps: arrangement.lamps().iter().map(LampSpec::from).collect(),
            trace,
        }
    }

    /// Success flags in input order.
    pub fn per_individual(&self) -> Vec<bool> {
        self.individuals.iter().map(|i| i.success).collect()
    }
}

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Error kind (`InvalidArrangement`, `InvalidLamp`, ...).
    pub error: String,
    /// Human-readable detail.
    pub message: String,
    /// Offending lamp, for `InvalidLamp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lamp_index: Option<usize>,
}

impl From<&SimError> for ErrorBody {
    fn from(err: &SimError) -> Self {
        let lamp_index = match err {
            SimError::InvalidLamp { index, .. } => *index,
            _ => None,
        };
        Self {
            error: err.kind().as_str().to_owned(),
            message: err.to_string(),
            lamp_index,
        }
    }
}
