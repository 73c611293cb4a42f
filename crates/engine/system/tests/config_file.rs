//! Configuration files on disk

use std::fs;
use system::{ConfigError, EngineConfig, LogicScope};
use tempfile::TempDir;

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.toml");
    fs::write(
        &path,
        r#"
            global_flags = 2048
            allocation_step = 32
            logic_scope = "closest"
            early_exit = false
        "#,
    )
    .unwrap();

    // Environment overrides apply on load; compare against a file-only parse
    let from_file = EngineConfig::from_toml(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(from_file.global_flags, 2048);
    assert_eq!(from_file.allocation_step, 32);
    assert_eq!(from_file.logic_scope, LogicScope::Closest);
    assert!(!from_file.early_exit);

    let loaded = EngineConfig::load(&path).unwrap();
    assert_eq!(loaded.logic_scope, LogicScope::Closest);
    assert!(!loaded.early_exit);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = EngineConfig::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_saved_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.toml");
    let config = EngineConfig {
        resource_path: Some(dir.path().to_path_buf()),
        logic_scope: LogicScope::All,
        ..EngineConfig::default()
    };
    fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("logic_scope = \"all\""));
    assert_eq!(EngineConfig::from_toml(&text).unwrap(), config);
}

#[test]
fn test_resource_layout() {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig {
        resource_path: Some(dir.path().to_path_buf()),
        ..EngineConfig::default()
    };
    let paths = config.paths();
    paths.ensure_dirs().unwrap();

    assert!(paths.maps_dir().is_dir());
    assert!(paths.textures_dir().is_dir());

    fs::write(paths.texture(3), b"png").unwrap();
    assert_eq!(paths.texture_or_dummy(3), paths.texture(3));
    assert_eq!(paths.texture_or_dummy(4), paths.dummy_texture());
}
