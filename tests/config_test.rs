use deepmem::config::DeepMemConfig;
use tempfile::TempDir;

#[test]
fn missing_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = DeepMemConfig::load_from(tmp.path().join("absent.toml")).unwrap();

    assert_eq!(config.search.thresholds, vec![0.5, 0.4, 0.3, 0.2]);
    assert!(config.validate().is_ok());
}

#[test]
fn file_values_feed_research_settings() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[search]
thresholds = [0.8, 0.6, 0.4]
fallback_limit = 25

[research]
max_iterations = 4
default_query = "latest events"
max_context_bytes = 2048
"#,
    )
    .unwrap();

    let config = DeepMemConfig::load_from(&path).unwrap();
    config.validate().unwrap();
    let settings = config.research_settings().unwrap();

    assert_eq!(settings.max_iterations, 4);
    assert_eq!(settings.default_query.as_deref(), Some("latest events"));
    assert_eq!(settings.max_context_bytes, 2048);
    assert_eq!(settings.search.thresholds.as_slice(), &[0.8, 0.6, 0.4]);
    assert_eq!(settings.search.fallback_limit, 25);
}

#[test]
fn invalid_thresholds_load_but_fail_validation() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[search]\nthresholds = [0.2, 0.4]\n").unwrap();

    let config = DeepMemConfig::load_from(&path).unwrap();
    assert!(config.validate().is_err());
    assert!(config.research_settings().is_err());
}

#[test]
fn malformed_toml_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[search\nthresholds = ").unwrap();

    let err = DeepMemConfig::load_from(&path).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse config TOML"));
}
