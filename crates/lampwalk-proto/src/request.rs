// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Request side of the wire schema.

use serde::{Deserialize, Serialize};

use lampwalk_core::{
    Arrangement, ArrangementFault, EvaluationConfig, IlluminationRule, Individual, Lamp,
    LampPlacement, PathSpec, SimError, StepPolicy, DEFAULT_MAX_PATH_LENGTH,
};

/// Lamp duty cycle as sent on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LampSpec {
    /// Seconds lit at the start of each period.
    pub bright: f64,
    /// Seconds dark after the bright window.
    pub dark: f64,
}

impl From<LampSpec> for Lamp {
    fn from(spec: LampSpec) -> Self {
        Self {
            bright: spec.bright,
            dark: spec.dark,
        }
    }
}

impl From<&Lamp> for LampSpec {
    fn from(lamp: &Lamp) -> Self {
        Self {
            bright: lamp.bright,
            dark: lamp.dark,
        }
    }
}

/// Individual as sent on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndividualSpec {
    /// Path-units per second.
    pub speed: f64,
    /// Seconds before departure. Optional only for the first individual.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_delay: Option<f64>,
}

/// Body of `POST /simulate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulateRequest {
    /// Number of nodes on the path.
    pub path_length: usize,
    /// Lamp definitions, indexed by lamp.
    pub lamps: Vec<LampSpec>,
    /// Node for each lamp; lamp `i` on node `i` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lamp_assignment: Option<Vec<usize>>,
    /// Individuals in traversal order.
    pub individuals: Vec<IndividualSpec>,
    /// Bright-edge tolerance; server default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsilon_check: Option<f64>,
    /// Success rule; server default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<IlluminationRule>,
    /// Fixed step in seconds; server step policy when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_seconds: Option<f64>,
    /// Return the sampled trace alongside the verdicts.
    #[serde(default)]
    pub include_trace: bool,
}

impl SimulateRequest {
    /// Node assignment in effect, with the identity default applied.
    pub fn effective_assignment(&self) -> Vec<usize> {
        self.lamp_assignment
            .clone()
            .unwrap_or_else(|| (0..self.lamps.len()).collect())
    }

    /// Validates the request and builds an [`Arrangement`] whose path is at
    /// most [`DEFAULT_MAX_PATH_LENGTH`] nodes.
    pub fn into_arrangement(&self) -> Result<Arrangement, SimError> {
        self.arrangement_within(DEFAULT_MAX_PATH_LENGTH)
    }

    /// Like [`into_arrangement`](Self::into_arrangement) with an explicit
    /// node limit.
    pub fn arrangement_within(&self, max_path_length: usize) -> Result<Arrangement, SimError> {
        let path = PathSpec::bounded(self.path_length, max_path_length)?;
        let lamps: Vec<Lamp> = self.lamps.iter().copied().map(Lamp::from).collect();
        let placement = LampPlacement::new(self.effective_assignment())?;
        let individuals = self
            .individuals
            .iter()
            .enumerate()
            .map(|(index, spec)| match (index, spec.start_delay) {
                (_, Some(delay)) => Ok(Individual::new(spec.speed, delay)),
                (0, None) => Ok(Individual::new(spec.speed, 0.0)),
                (individual, None) => {
                    Err(ArrangementFault::MissingStartDelay { individual }.into())
                }
            })
            .collect::<Result<Vec<_>, SimError>>()?;
        Arrangement::new(path, lamps, placement, individuals)
    }

    /// `defaults` with this request's overrides applied.
    pub fn evaluation_config(&self, defaults: EvaluationConfig) -> EvaluationConfig {
        EvaluationConfig {
            rule: self.rule.unwrap_or(defaults.rule),
            step: self
                .step_seconds
                .map_or(defaults.step, |seconds| StepPolicy::Fixed { seconds }),
            epsilon: self.epsilon_check.unwrap_or(defaults.epsilon),
            max_steps: defaults.max_steps,
            max_path_length: defaults.max_path_length,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use lampwalk_core::ErrorKind;

    fn request(json: &str) -> SimulateRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn omitted_assignment_places_lamps_in_order() {
        let req = request(
            r#"{"path_length":4,"lamps":[{"bright":1,"dark":1},{"bright":2,"dark":1}],
                "individuals":[{"speed":1}]}"#,
        );
        assert_eq!(req.effective_assignment(), vec![0, 1]);
        let arrangement = req.into_arrangement().unwrap();
        assert_eq!(arrangement.placement().lamp_at(1), Some(1));
        assert_eq!(arrangement.individuals()[0].start_delay, 0.0);
    }

    #[test]
    fn later_individuals_need_a_start_delay() {
        let req = request(
            r#"{"path_length":3,"lamps":[],"individuals":[{"speed":1},{"speed":2}]}"#,
        );
        let err = req.into_arrangement().unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidArrangement(ArrangementFault::MissingStartDelay { individual: 1 })
        );
    }

    #[test]
    fn overrides_replace_only_what_was_sent() {
        let req = request(
            r#"{"path_length":3,"lamps":[],"individuals":[],"rule":"node_crossings","step_seconds":0.2}"#,
        );
        let defaults = EvaluationConfig::default();
        let config = req.evaluation_config(defaults);
        assert_eq!(config.rule, IlluminationRule::NodeCrossings);
        assert_eq!(config.step, StepPolicy::Fixed { seconds: 0.2 });
        assert_eq!(config.epsilon, defaults.epsilon);
    }

    #[test]
    fn path_limit_is_enforced_before_anything_is_allocated() {
        let req = request(r#"{"path_length":20000000,"lamps":[],"individuals":[{"speed":1e9}]}"#);
        let err = req.into_arrangement().unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidArrangement(ArrangementFault::PathTooLong {
                length: 20_000_000,
                max: DEFAULT_MAX_PATH_LENGTH,
            })
        );
        assert!(req.arrangement_within(20_000_000).is_ok());
    }

    #[test]
    fn negative_path_length_does_not_decode() {
        let err = crate::decode_request(br#"{"path_length":-1,"lamps":[],"individuals":[]}"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArrangement);
    }
}
