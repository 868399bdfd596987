//! Fallback chain integration tests
//!
//! Tests for stop-on-success, fall-through, first-error re-raise and
//! per-entry option scoping.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::{jpeg_source, registry, Behavior, FakeConverter};
use serde_json::json;
use tempfile::tempdir;
use webpconv::{ConversionOptions, ConverterSpec, Error, FallbackOrchestrator, OptionOverrides};

fn ids(list: &[&str]) -> Vec<ConverterSpec> {
    list.iter().map(|id| ConverterSpec::from(*id)).collect()
}

#[test]
fn test_success_stops_the_chain() {
    let dir = tempdir().unwrap();
    let source = jpeg_source(dir.path());
    let destination = dir.path().join("a.webp");

    let absent = FakeConverter::new("absent", Behavior::NotOperational);
    let broken = FakeConverter::new("broken", Behavior::Fail);
    let picky = FakeConverter::new("picky", Behavior::Decline);
    let good = FakeConverter::new("good", Behavior::Succeed);
    let later = FakeConverter::new("later", Behavior::Succeed);
    let registry = registry(&[
        absent.clone(),
        broken.clone(),
        picky.clone(),
        good.clone(),
        later.clone(),
    ]);

    let orchestrator =
        FallbackOrchestrator::new(&registry, &ids(&["absent", "broken", "picky", "good", "later"]));
    let winner = orchestrator
        .convert_detailed(&source, &destination, &ConversionOptions::default())
        .unwrap();

    assert_eq!(winner.as_deref(), Some("good"));
    assert!(destination.exists());
    assert_eq!(absent.calls(), 1);
    assert_eq!(broken.calls(), 1);
    assert_eq!(picky.calls(), 1);
    assert_eq!(good.calls(), 1);
    assert_eq!(later.calls(), 0);
}

#[test]
fn test_all_not_operational_returns_false() {
    let dir = tempdir().unwrap();
    let source = jpeg_source(dir.path());
    let destination = dir.path().join("a.webp");

    let first = FakeConverter::new("first", Behavior::NotOperational);
    let second = FakeConverter::new("second", Behavior::NotOperational);
    let registry = registry(&[first.clone(), second.clone()]);

    let converted = FallbackOrchestrator::new(&registry, &ids(&["first", "second"]))
        .convert(&source, &destination, &ConversionOptions::default())
        .unwrap();

    assert!(!converted);
    assert!(!destination.exists());
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
}

#[test]
fn test_first_decline_is_reraised() {
    let dir = tempdir().unwrap();
    let source = jpeg_source(dir.path());

    let registry = registry(&[
        FakeConverter::new("absent", Behavior::NotOperational),
        FakeConverter::new("picky", Behavior::Decline),
        FakeConverter::new("broken", Behavior::Fail),
    ]);

    let err = FallbackOrchestrator::new(&registry, &ids(&["absent", "picky", "broken", "absent"]))
        .convert(&source, &dir.path().join("a.webp"), &ConversionOptions::default())
        .unwrap_err();

    assert_matches!(err, Error::Declined { ref converter, .. } if converter == "picky");
    assert_eq!(err.to_string(), "picky declined: picky said no");
}

#[test]
fn test_first_failure_is_reraised_over_later_declines() {
    let dir = tempdir().unwrap();
    let source = jpeg_source(dir.path());

    let registry = registry(&[
        FakeConverter::new("broken", Behavior::Fail),
        FakeConverter::new("picky", Behavior::Decline),
    ]);

    let err = FallbackOrchestrator::new(&registry, &ids(&["broken", "picky"]))
        .convert(&source, &dir.path().join("a.webp"), &ConversionOptions::default())
        .unwrap_err();

    assert_matches!(err, Error::Failed { ref converter, .. } if converter == "broken");
}

#[test]
fn test_overrides_are_scoped_to_their_entry() {
    let dir = tempdir().unwrap();
    let source = jpeg_source(dir.path());

    let spy = FakeConverter::new("spy", Behavior::NotOperational);
    let registry = registry(&[spy.clone()]);

    let mut with_key = OptionOverrides::default();
    with_key.extra.insert("api-key".into(), json!("second-account"));

    let specs = vec![
        ConverterSpec::with_options(
            "spy",
            OptionOverrides {
                quality: Some(10),
                low_memory: Some(true),
                ..Default::default()
            },
        ),
        ConverterSpec::from("spy"),
        ConverterSpec::with_options("spy", with_key),
    ];

    let mut defaults = ConversionOptions::default();
    defaults.extra.insert("api-key".into(), json!("first-account"));

    let converted = FallbackOrchestrator::new(&registry, &specs)
        .convert(&source, &dir.path().join("a.webp"), &defaults)
        .unwrap();
    assert!(!converted);

    let seen = spy.seen_options();
    assert_eq!(seen.len(), 3);

    assert_eq!(seen[0].quality, 10);
    assert!(seen[0].low_memory);
    assert_eq!(seen[0].extra_str("api-key"), Some("first-account"));

    assert_eq!(seen[1], defaults);

    assert_eq!(seen[2].quality, 85);
    assert!(!seen[2].low_memory);
    assert_eq!(seen[2].extra_str("api-key"), Some("second-account"));

    // The caller's defaults are never mutated.
    assert_eq!(defaults.quality, 85);
    assert_eq!(defaults.extra_str("api-key"), Some("first-account"));
}

#[test]
fn test_fail_then_success_discards_the_failure() {
    let dir = tempdir().unwrap();
    let source = jpeg_source(dir.path());
    let destination = dir.path().join("a.webp");

    let registry = registry(&[
        FakeConverter::new("fake-fail", Behavior::Fail),
        FakeConverter::new("fake-success", Behavior::Succeed),
    ]);

    let converted = FallbackOrchestrator::new(&registry, &ids(&["fake-fail", "fake-success"]))
        .convert(&source, &destination, &ConversionOptions::default())
        .unwrap();

    assert!(converted);
    assert!(destination.exists());
}

#[test]
fn test_fail_only_raises_and_leaves_no_destination() {
    let dir = tempdir().unwrap();
    let source = jpeg_source(dir.path());
    let destination = dir.path().join("a.webp");

    let registry = registry(&[FakeConverter::new("fake-fail", Behavior::Fail)]);

    let err = FallbackOrchestrator::new(&registry, &ids(&["fake-fail"]))
        .convert(&source, &destination, &ConversionOptions::default())
        .unwrap_err();

    assert_eq!(err.to_string(), "fake-fail failed: fake-fail exploded");
    assert!(!destination.exists());
}

#[test]
fn test_independent_conversions_run_concurrently() {
    let dir = tempdir().unwrap();
    let source = jpeg_source(dir.path());

    let good = FakeConverter::new("good", Behavior::Succeed);
    let registry = registry(&[FakeConverter::new("absent", Behavior::NotOperational), good.clone()]);
    let orchestrator = Arc::new(FallbackOrchestrator::new(&registry, &ids(&["absent", "good"])));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let orchestrator = Arc::clone(&orchestrator);
            let source = source.clone();
            let destination = dir.path().join(format!("out-{i}/a.webp"));
            std::thread::spawn(move || {
                let converted = orchestrator
                    .convert(&source, &destination, &ConversionOptions::default())
                    .unwrap();
                (converted, destination)
            })
        })
        .collect();

    for handle in handles {
        let (converted, destination) = handle.join().unwrap();
        assert!(converted);
        assert!(destination.exists());
    }
    assert_eq!(good.calls(), 8);
}

#[test]
fn test_library_convert_with_native_only() {
    let dir = tempdir().unwrap();
    let source = common::png_source(dir.path());
    let destination = dir.path().join("nested/logo.webp");

    let config = webpconv::config::Config {
        converters: ids(&["native"]),
        ..Default::default()
    };

    assert!(webpconv::convert(&source, &destination, &config).unwrap());
    let decoded = image::open(&destination).unwrap();
    assert_eq!(decoded.width(), 8);
}

#[cfg(unix)]
#[test]
#[serial_test::serial]
fn test_default_config_uses_system_cwebp() {
    let dir = tempdir().unwrap();
    let source = jpeg_source(dir.path());
    let destination = dir.path().join("a.webp");
    let cwebp = common::fake_cwebp(dir.path());

    let mut config = webpconv::config::Config {
        converters: ids(&["cwebp"]),
        ..Default::default()
    };
    config.cwebp.system_paths = vec![cwebp];
    config.cwebp.search_path = false;

    assert!(config.options.try_supplied_binary_for_os);
    assert!(webpconv::convert(&source, &destination, &config).unwrap());
    assert!(destination.exists());
}

#[cfg(unix)]
#[test]
#[serial_test::serial]
fn test_failed_encoder_leaves_no_destination() {
    let dir = tempdir().unwrap();
    let source = jpeg_source(dir.path());
    let destination = dir.path().join("a.webp");
    let cwebp = common::truncating_cwebp(dir.path());

    let mut config = webpconv::config::Config {
        converters: ids(&["cwebp"]),
        ..Default::default()
    };
    config.cwebp.system_paths = vec![cwebp];
    config.cwebp.search_path = false;
    config.options.use_nice = false;

    let err = webpconv::convert(&source, &destination, &config).unwrap_err();

    assert_matches!(err, Error::Failed { ref converter, .. } if converter == "cwebp");
    assert!(err.to_string().contains("exit code 1"));
    assert!(!destination.exists());
}
