// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Lamp duty cycles.
//!
//! A [`Lamp`] stores only its bright and dark durations. Phase is always
//! derived from elapsed time, so the same value can be queried at any instant
//! without prior calls and reused across simulations.

use crate::error::{LampFault, SimError};

/// Tolerance applied by [`is_lit_within`] when a caller does not choose one.
pub const DEFAULT_LIT_EPSILON: f64 = 1e-9;

/// Bright/dark duty-cycle definition for a single lamp.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lamp {
    /// Seconds spent bright at the start of each period.
    pub bright: f64,
    /// Seconds spent dark after the bright phase.
    pub dark: f64,
}

impl Lamp {
    /// Creates a lamp and validates its cycle.
    pub fn new(bright: f64, dark: f64) -> Result<Self, SimError> {
        let lamp = Self { bright, dark };
        lamp.validate()?;
        Ok(lamp)
    }

    /// Full cycle length (`bright + dark`).
    pub fn period(&self) -> f64 {
        self.bright + self.dark
    }

    /// Checks that both durations are finite, non-negative and sum to a
    /// positive period. `dark == 0` (always lit) and `bright == 0` (never lit)
    /// are both accepted.
    pub fn validate(&self) -> Result<(), SimError> {
        let fault = if !(self.bright.is_finite() && self.dark.is_finite())
            || self.bright < 0.0
            || self.dark < 0.0
        {
            Some(LampFault::NegativeOrNonFinite)
        } else if self.period() <= 0.0 {
            Some(LampFault::ZeroPeriod)
        } else {
            None
        };
        match fault {
            None => Ok(()),
            Some(fault) => Err(SimError::InvalidLamp {
                index: None,
                fault,
                bright: self.bright,
                dark: self.dark,
            }),
        }
    }

    /// Position within the current cycle at `elapsed` seconds.
    pub fn phase_at(&self, elapsed: f64) -> Result<f64, SimError> {
        check_elapsed(elapsed)?;
        self.validate()?;
        Ok(elapsed % self.period())
    }
}

/// Returns whether `lamp` is bright at `elapsed` seconds.
///
/// Lit iff `elapsed mod (bright + dark) < bright`. Negative elapsed time is a
/// contract violation and yields [`SimError::InvalidArgument`].
pub fn is_lit(lamp: &Lamp, elapsed: f64) -> Result<bool, SimError> {
    is_lit_within(lamp, elapsed, 0.0)
}

/// Like [`is_lit`], but the phase must clear the bright window by `epsilon`.
///
/// A positive `epsilon` makes instants that land exactly on (or within
/// floating-point noise of) the bright-to-dark edge count as dark. A negative
/// or non-finite `epsilon` is [`SimError::InvalidArgument`].
pub fn is_lit_within(lamp: &Lamp, elapsed: f64, epsilon: f64) -> Result<bool, SimError> {
    check_epsilon(epsilon)?;
    let phase = lamp.phase_at(elapsed)?;
    Ok(phase + epsilon < lamp.bright)
}

/// Accepts finite, non-negative bright-edge tolerances.
pub fn check_epsilon(epsilon: f64) -> Result<f64, SimError> {
    if epsilon.is_finite() && epsilon >= 0.0 {
        Ok(epsilon)
    } else {
        Err(SimError::InvalidArgument {
            what: "epsilon",
            value: epsilon,
        })
    }
}

fn check_elapsed(elapsed: f64) -> Result<(), SimError> {
    if elapsed.is_finite() && elapsed >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidArgument {
            what: "elapsed",
            value: elapsed,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn bright_window_opens_each_period() {
        let lamp = Lamp::new(1.0, 2.0).unwrap();
        assert!(is_lit(&lamp, 0.0).unwrap());
        assert!(is_lit(&lamp, 0.99).unwrap());
        assert!(!is_lit(&lamp, 1.0).unwrap());
        assert!(!is_lit(&lamp, 2.5).unwrap());
        assert!(is_lit(&lamp, 3.0).unwrap());
        assert!(is_lit(&lamp, 3.5).unwrap());
    }

    #[test]
    fn zero_dark_is_always_lit_and_zero_bright_never() {
        let always = Lamp::new(10.0, 0.0).unwrap();
        let never = Lamp::new(0.0, 4.0).unwrap();
        for t in [0.0, 3.3, 9.99, 10.0, 57.25] {
            assert!(is_lit(&always, t).unwrap(), "t={t}");
            assert!(!is_lit(&never, t).unwrap(), "t={t}");
        }
    }

    #[test]
    fn epsilon_darkens_the_closing_edge() {
        let lamp = Lamp::new(1.0, 1.0).unwrap();
        let t = 1.0 - 1e-12;
        assert!(is_lit(&lamp, t).unwrap());
        assert!(!is_lit_within(&lamp, t, DEFAULT_LIT_EPSILON).unwrap());
    }

    #[test]
    fn negative_or_non_finite_epsilon_is_rejected() {
        let lamp = Lamp::new(0.001, 100.0).unwrap();
        for epsilon in [-200.0, -1e-12, f64::NAN, f64::INFINITY] {
            let err = is_lit_within(&lamp, 2.0, epsilon).unwrap_err();
            assert!(matches!(err, SimError::InvalidArgument { what: "epsilon", .. }));
        }
        assert_eq!(check_epsilon(0.0), Ok(0.0));
    }

    #[test]
    fn negative_elapsed_is_rejected() {
        let lamp = Lamp::new(1.0, 1.0).unwrap();
        let err = is_lit(&lamp, -0.5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn degenerate_cycles_are_invalid() {
        for (bright, dark, fault) in [
            (0.0, 0.0, LampFault::ZeroPeriod),
            (-1.0, 2.0, LampFault::NegativeOrNonFinite),
            (1.0, f64::NAN, LampFault::NegativeOrNonFinite),
            (f64::INFINITY, 1.0, LampFault::NegativeOrNonFinite),
        ] {
            match Lamp::new(bright, dark) {
                Err(SimError::InvalidLamp { fault: got, .. }) => assert_eq!(got, fault),
                other => panic!("expected InvalidLamp for ({bright}, {dark}), got {other:?}"),
            }
        }
    }
}
