use tempfile::tempdir;
use tracker_config::{Config, ConfigError, ConfigManager};
use tracker_domain::Money;

#[test]
fn default_config_has_non_empty_fields() {
    let cfg = Config::default();

    assert!(!cfg.currency.is_empty());
    assert!(!cfg.locale.is_empty());
    assert!(cfg.remembered_email.is_none());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let mut cfg = Config::default();
    cfg.currency = "USD".to_string();
    cfg.currency_symbol = "$".to_string();
    cfg.remember_email(Some(" ada@example.com "));

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(loaded.remembered_email.as_deref(), Some("ada@example.com"));
    assert!(!dir.path().join("config.json.partial").exists());
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    assert_eq!(manager.load().expect("load"), Config::default());
    assert!(manager.config_path().ends_with("config/config.json"));
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").expect("write");
    let manager = ConfigManager::new(path);
    assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));
}

#[test]
fn update_applies_and_persists_change() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    manager
        .update(|cfg| cfg.set("default_target_balance", "2000"))
        .expect("update");
    let loaded = manager.load().expect("load");
    assert_eq!(loaded.default_target_balance, Money::from_cents(200_000));

    let err = manager.update(|cfg| cfg.set("recent_activity_limit", "many"));
    assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
    assert_eq!(manager.load().expect("load").recent_activity_limit, 5);
}

#[test]
fn clearing_remembered_email() {
    let mut cfg = Config::default();
    cfg.remember_email(Some("ada@example.com"));
    cfg.remember_email(None);
    assert!(cfg.remembered_email.is_none());
}
