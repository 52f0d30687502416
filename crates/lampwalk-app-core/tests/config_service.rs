// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
use lampwalk_app_core::{ConfigError, ConfigService, ServicePrefs, SERVICE_PREFS_KEY};
use lampwalk_core::{IlluminationRule, StepPolicy, DEFAULT_MAX_STEPS};
use lampwalk_dry_tests::config::{FailOn, StoreOp};
use lampwalk_dry_tests::InMemoryConfigStore;

#[test]
fn load_or_init_persists_defaults_once() {
    let store = InMemoryConfigStore::new();
    let service = ConfigService::new(store.clone());

    let first = service.load_or_init::<ServicePrefs>(SERVICE_PREFS_KEY).unwrap();
    assert!(first.created);
    assert_eq!(first.value, ServicePrefs::default());
    assert_eq!(first.location, "memory://simulate_service");
    assert_eq!(store.saves(), 1);

    let second = service.load_or_init::<ServicePrefs>(SERVICE_PREFS_KEY).unwrap();
    assert!(!second.created);
    assert_eq!(second.value, first.value);
    assert_eq!(store.saves(), 1, "existing prefs must not be rewritten");
}

#[test]
fn partial_prefs_fill_in_defaults() {
    let json = br#"{ "listen": "0.0.0.0:9000", "evaluation": { "rule": "continuous", "max_path_length": 500 } }"#;
    let service = ConfigService::new(InMemoryConfigStore::seeded(SERVICE_PREFS_KEY, json));
    let prefs: ServicePrefs = service.load(SERVICE_PREFS_KEY).unwrap().unwrap();
    assert_eq!(prefs.listen, "0.0.0.0:9000");
    assert_eq!(prefs.evaluation.rule, IlluminationRule::Continuous);
    assert_eq!(prefs.evaluation.step, StepPolicy::default());
    assert_eq!(prefs.evaluation.max_path_length, 500);
    assert_eq!(prefs.evaluation.max_steps, DEFAULT_MAX_STEPS);
    assert_eq!(prefs.eval_timeout_ms, ServicePrefs::default().eval_timeout_ms);
}

#[test]
fn corrupt_blob_is_reported_not_overwritten() {
    let store = InMemoryConfigStore::seeded(SERVICE_PREFS_KEY, b"{not json");
    let service = ConfigService::new(store.clone());
    let err = service.load_or_init::<ServicePrefs>(SERVICE_PREFS_KEY).unwrap_err();
    assert!(matches!(err, ConfigError::Decode { ref key, .. } if key == SERVICE_PREFS_KEY));
    assert_eq!(store.saves(), 0);
}

#[test]
fn empty_blob_reads_as_missing() {
    let service = ConfigService::new(InMemoryConfigStore::seeded(SERVICE_PREFS_KEY, b""));
    assert!(service.load::<ServicePrefs>(SERVICE_PREFS_KEY).unwrap().is_none());
}

#[test]
fn store_failures_propagate() {
    let store = InMemoryConfigStore::new();
    store.fail_on(FailOn::Load);
    let service = ConfigService::new(store.clone());
    assert!(matches!(
        service.load_or_init::<ServicePrefs>(SERVICE_PREFS_KEY),
        Err(ConfigError::Other(_))
    ));
    assert_eq!(store.journal(), vec![StoreOp::Load(SERVICE_PREFS_KEY.into())]);
}
