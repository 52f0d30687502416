// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Start delays from a traversal order.
//!
//! Individuals cross one at a time: the first departs at 0 and each later
//! one departs the moment its predecessor reaches the end of the path.

use lampwalk_core::{ArrangementFault, PathSpec, SimError};

use crate::request::IndividualSpec;

/// Cumulative departure times for `speeds`, in the order given.
///
/// `delay[0] = 0`, `delay[k] = delay[k-1] + path_length / speed[k-1]`.
pub fn sequential_start_delays(path_length: usize, speeds: &[f64]) -> Result<Vec<f64>, SimError> {
    let path = PathSpec::new(path_length)?;
    let mut delays = Vec::with_capacity(speeds.len());
    let mut next = 0.0;
    for (individual, &speed) in speeds.iter().enumerate() {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ArrangementFault::NonPositiveSpeed { individual, speed }.into());
        }
        delays.push(next);
        next += path.end() / speed;
    }
    Ok(delays)
}

/// Individuals reordered by `order` (entry `k` names who walks `k`-th), each
/// with its derived start delay.
pub fn ordered_individuals(
    path_length: usize,
    speeds: &[f64],
    order: &[usize],
) -> Result<Vec<IndividualSpec>, SimError> {
    check_permutation(order, speeds.len())?;
    let ordered: Vec<f64> = order.iter().map(|&i| speeds[i]).collect();
    let delays = sequential_start_delays(path_length, &ordered)?;
    Ok(ordered
        .into_iter()
        .zip(delays)
        .map(|(speed, delay)| IndividualSpec {
            speed,
            start_delay: Some(delay),
        })
        .collect())
}

fn check_permutation(order: &[usize], individuals: usize) -> Result<(), SimError> {
    if order.len() != individuals {
        return Err(ArrangementFault::Malformed(format!(
            "order has {} entries for {individuals} individuals",
            order.len()
        ))
        .into());
    }
    let mut seen = vec![false; individuals];
    for (position, &index) in order.iter().enumerate() {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => {
                return Err(ArrangementFault::InvalidOrder {
                    position,
                    index,
                    individuals,
                }
                .into())
            }
        }
    }
    Ok(())
}
