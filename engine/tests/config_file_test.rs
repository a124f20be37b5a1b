//! Loading engine configuration from disk

use glam::Vec3;
use scene_engine::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "physics": {{
                "gravity": [0.0, -9.81, 0.0],
                "time_scale": 2.0,
                "resolution": "initiator_only"
            }},
            "log_filter": "scene_engine=debug"
        }}"#
    )
    .unwrap();

    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config.physics.gravity, Vec3::new(0.0, -9.81, 0.0));
    assert_eq!(config.log_filter.as_deref(), Some("scene_engine=debug"));

    let engine = Engine::with_config(config);
    assert_eq!(engine.physics.gravity(), Vec3::new(0.0, -9.81, 0.0));
    assert_eq!(engine.physics.time_scale(), 2.0);
    assert_eq!(engine.physics.resolution(), ResolutionMode::InitiatorOnly);
}

#[test]
fn test_empty_object_uses_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{}}").unwrap();

    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_invalid_file_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{ "physics": {{ "time_scale": -3.0 }} }}"#).unwrap();

    assert!(matches!(
        EngineConfig::load(file.path()),
        Err(EngineError::InvalidConfig(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = EngineConfig::load(dir.path().join("missing.json"));
    assert!(matches!(result, Err(EngineError::Io(_))));
}
