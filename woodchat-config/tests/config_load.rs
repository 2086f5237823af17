use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;
use woodchat_config::WoodchatConfigLoader;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_file_with_env_placeholders() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
version: "0.1"
typing:
  start_delay_ms: 50
  base_delay_ms: 10
  jitter_ms: 3
faq:
  data_dir: "${WOODCHAT_TEST_ASSETS}"
  confidence_threshold: 0.45
database:
  url: "sqlite://woodchat-test.db"
server:
  bind: "0.0.0.0:8080"
  base_url: "http://chat.internal:8080"
log:
  format: json
  stderr: true
"#;
    let p = write_yaml(&tmp, "woodchat.yaml", file_yaml);

    let config = temp_env::with_var("WOODCHAT_TEST_ASSETS", Some("/srv/assets"), || {
        WoodchatConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config")
    });

    assert_eq!(config.version.as_deref(), Some("0.1"));
    assert_eq!(config.typing.start_delay_ms, 50);
    assert_eq!(config.typing.jitter_ms, 3);
    assert_eq!(config.faq.data_dir, PathBuf::from("/srv/assets"));
    assert!((config.faq.confidence_threshold - 0.45).abs() < f64::EPSILON);
    assert_eq!(config.server.bind, "0.0.0.0:8080");
    assert_eq!(config.log.format.as_deref(), Some("json"));
    assert_eq!(config.log.stderr, Some(true));
    assert!(!config.speech.enabled);
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "woodchat.yaml",
        "typing:\n  base_delay_ms: 10\nserver:\n  bind: \"127.0.0.1:5000\"\n",
    );

    let config = temp_env::with_vars(
        [
            ("WOODCHAT__TYPING__BASE_DELAY_MS", Some("2")),
            ("WOODCHAT__SERVER__BIND", Some("0.0.0.0:9000")),
        ],
        || {
            WoodchatConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config")
        },
    );

    assert_eq!(config.typing.base_delay_ms, 2);
    assert_eq!(config.server.bind, "0.0.0.0:9000");
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = WoodchatConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults");

    assert_eq!(config.typing.base_delay_ms, 5);
    assert_eq!(config.database.url, "sqlite://chatbot.db?mode=rwc");
    assert_eq!(config.server.base_url, "http://localhost:5000");
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = WoodchatConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(err.is_err());
}
