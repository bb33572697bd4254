use formprobe_config::ProbeConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: "0.1"
webdriver:
  endpoint: "http://localhost:4444"
  headless: true
timing:
  credential_timeout_secs: 15
  candidate_timeout_secs: 10
  poll_interval_ms: 100
"#;
    let p = write_yaml(&tmp, "formprobe.yaml", file_yaml);

    let config = ProbeConfigLoader::new()
        .with_file(p)
        .load()
        .expect("load probe config");

    assert_eq!(config.version.as_deref(), Some("0.1"));
    assert_eq!(config.webdriver.endpoint, "http://localhost:4444");
    assert!(config.webdriver.headless);
    assert_eq!(config.timing.credential_timeout_secs, Some(15));
    assert_eq!(config.timing.candidate_timeout_secs, Some(10));
    assert_eq!(config.timing.poll_interval_ms, Some(100));
    // Unset knobs stay unset so the engine's defaults apply.
    assert_eq!(config.timing.retry_timeout_secs, None);
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    let config = ProbeConfigLoader::new()
        .with_file("/nonexistent/formprobe.yaml")
        .load()
        .expect("missing file is not an error");

    assert_eq!(config.webdriver.endpoint, "http://localhost:9515");
    assert!(!config.webdriver.headless);
    assert_eq!(config.timing.navigation_settle_ms, None);
}

#[test]
#[serial]
fn test_env_placeholder_expansion() {
    temp_env::with_var("FP_DRIVER_PORT", Some("9516"), || {
        let config = ProbeConfigLoader::new()
            .with_yaml_str(
                r#"
webdriver:
  endpoint: "http://localhost:${FP_DRIVER_PORT}"
"#,
            )
            .load()
            .expect("load probe config");

        assert_eq!(config.webdriver.endpoint, "http://localhost:9516");
    });
}
