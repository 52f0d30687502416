// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON wire schema for `POST /simulate`.
//!
//! [`SimulateRequest`] is what callers send; [`SimulateRequest::into_arrangement`]
//! turns it into a validated [`lampwalk_core::Arrangement`]. Verdicts travel
//! back as [`SimulateResponse`], failures as [`ErrorBody`]. The [`ordering`]
//! module derives start delays for callers that only know speeds and an order.

mod example;
pub mod ordering;
mod request;
mod response;

pub use example::{example_request, EXAMPLE_ARRANGEMENT_JSON};
pub use request::{IndividualSpec, LampSpec, SimulateRequest};
pub use response::{ErrorBody, IndividualOutcome, SimulateResponse, TraceFrame, TraceView};

use lampwalk_core::{ArrangementEvaluator, CancelToken, EvaluationConfig, SimError};

/// Decodes a request body, folding decode failures into the arrangement
/// error kind so transports report them uniformly.
pub fn decode_request(bytes: &[u8]) -> Result<SimulateRequest, SimError> {
    serde_json::from_slice(bytes)
        .map_err(|e| lampwalk_core::ArrangementFault::Malformed(e.to_string()).into())
}

/// Validates `req`, evaluates it under `defaults` plus the request's
/// overrides and assembles the response. A trace is attached only when the
/// request asks for one.
pub fn run_request(
    req: &SimulateRequest,
    defaults: EvaluationConfig,
    cancel: Option<CancelToken>,
) -> Result<SimulateResponse, SimError> {
    let config = req.evaluation_config(defaults);
    let arrangement = req.arrangement_within(config.max_path_length)?;
    let mut evaluator = ArrangementEvaluator::new(config);
    if let Some(token) = cancel {
        evaluator = evaluator.with_cancel_token(token);
    }
    if req.include_trace {
        let (report, trace) = evaluator.evaluate_with_trace(&arrangement)?;
        Ok(SimulateResponse::new(
            &report,
            &arrangement,
            Some(TraceView::from_trace(&trace, 1)),
        ))
    } else {
        let report = evaluator.evaluate(&arrangement)?;
        Ok(SimulateResponse::new(&report, &arrangement, None))
    }
}
