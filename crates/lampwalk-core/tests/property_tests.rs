// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use lampwalk_core::{
    finish_time, is_lit, position_at, ArrangementEvaluator, Individual, Lamp, PathSpec,
};
use lampwalk_dry_tests::ArrangementBuilder;

// Pinned seed so a failing case reproduces on every machine. Override locally
// with PROPTEST_SEED if exploring.
const SEED_BYTES: [u8; 32] = [
    0x1a, 0x3b, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0,
];

fn pinned_runner() -> TestRunner {
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    TestRunner::new_with_rng(PropConfig::default(), rng)
}

#[test]
fn lamp_state_repeats_every_period() {
    // Eighths are exact in binary, so `t + period` introduces no rounding and
    // the comparison tests the cycle itself rather than float noise.
    let eighths = |lo: u32, hi: u32| (lo..hi).prop_map(|q| f64::from(q) * 0.125);
    let strategy = (eighths(0, 64), eighths(1, 64), eighths(0, 8_000), 1u32..5);

    pinned_runner()
        .run(&strategy, |(bright, dark, t, cycles)| {
            let lamp = Lamp::new(bright, dark).expect("valid lamp");
            let shifted = t + f64::from(cycles) * lamp.period();
            prop_assert_eq!(is_lit(&lamp, t).unwrap(), is_lit(&lamp, shifted).unwrap());
            Ok(())
        })
        .expect("periodicity holds");
}

proptest! {
    #[test]
    fn position_is_monotone_and_bounded(
        length in 2usize..40,
        speed in 0.01f64..50.0,
        delay in 0.0f64..30.0,
        a in 0.0f64..200.0,
        b in 0.0f64..200.0,
    ) {
        let path = PathSpec::new(length).unwrap();
        let walker = Individual::new(speed, delay);
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        let p_early = position_at(&walker, &path, early).unwrap();
        let p_late = position_at(&walker, &path, late).unwrap();
        prop_assert!(p_early <= p_late);
        prop_assert!(p_late <= path.end());
        prop_assert!(p_early >= 0.0);
        let after = finish_time(&walker, &path) + 1.0;
        prop_assert_eq!(position_at(&walker, &path, after).unwrap(), path.end());
    }

    #[test]
    fn stepped_trace_never_overshoots_and_ends_finished(
        length in 2usize..12,
        speeds in prop::collection::vec(0.5f64..5.0, 0..4),
        bright in 0.25f64..3.0,
        dark in 0.0f64..3.0,
    ) {
        let mut builder = ArrangementBuilder::new(length).lamp_everywhere(bright, dark);
        for speed in speeds {
            builder = builder.walker_after_previous(speed);
        }
        let arrangement = builder.build().unwrap();
        let (report, trace) = ArrangementEvaluator::default()
            .evaluate_with_trace(&arrangement)
            .unwrap();
        let end = arrangement.path().end();
        for snapshot in &trace.snapshots {
            prop_assert!(snapshot.positions.iter().all(|p| (0.0..=end).contains(p)));
            prop_assert_eq!(snapshot.lamps_lit.len(), length);
        }
        prop_assert!(trace.last().unwrap().all_finished());
        prop_assert_eq!(report.individuals.len(), arrangement.individuals().len());
        prop_assert_eq!(
            report.overall_success,
            report.individuals.iter().all(|v| v.success)
        );
    }
}
