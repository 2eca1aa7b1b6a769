//! Config file round trip and rejection.

use std::path::PathBuf;

use drape::{network, ClothConfig, ConfigError, PinPolicy, Vec3};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("drape-{}-{}.json", name, std::process::id()))
}

#[test]
fn test_save_and_load() {
    let path = temp_path("round-trip");
    let config = ClothConfig::new()
        .with_grid(6, 9)
        .with_gravity(Vec3::new(0.0, -9.81, 0.0))
        .with_pins(PinPolicy::Indices(vec![0, 6]));
    config.save(&path).unwrap();

    let loaded = ClothConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, config);

    let cloth = network::build(&loaded).unwrap();
    assert_eq!(cloth.point_count(), 70);
    assert!(cloth.is_pinned(6));
    assert!(!cloth.is_pinned(69));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = ClothConfig::load(temp_path("does-not-exist")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_bad_json_is_parse_error() {
    let path = temp_path("bad-json");
    std::fs::write(&path, "{ cols: ").unwrap();
    let err = ClothConfig::load(&path).unwrap_err();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_invalid_values_rejected_on_load() {
    let path = temp_path("invalid");
    std::fs::write(&path, r#"{ "time_step": -1.0 }"#).unwrap();
    let err = ClothConfig::load(&path).unwrap_err();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, ConfigError::NotPositive { name: "time_step", .. }));
}

#[test]
fn test_build_rejects_invalid_config() {
    let err = network::build(&ClothConfig::new().with_grid(1, 1)).unwrap_err();
    assert!(err.to_string().contains("2x2"));
}
