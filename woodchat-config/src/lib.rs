//! Loader for woodchat configuration with YAML + environment overlays.
//!
//! Sources are merged in order: an optional `woodchat.yaml` (or any file the
//! `config` crate can read), inline YAML snippets, then `WOODCHAT__`-prefixed
//! environment variables (`WOODCHAT__TYPING__BASE_DELAY_MS=2`). After merging,
//! `${VAR}` placeholders inside string values are expanded recursively.
//!
//! Every section has defaults, so an empty document is a valid configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WoodchatConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub typing: TypingConfig,
    #[serde(default)]
    pub faq: FaqConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub log: LogSettings,
}

/// Pacing of the typing animation, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TypingConfig {
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Exclusive upper bound of the random extra delay per step.
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: default_start_delay_ms(),
            base_delay_ms: default_base_delay_ms(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqConfig {
    /// Directory scanned for `*_FAQs.json` / `*.yaml` files.
    #[serde(default = "default_faq_dir")]
    pub data_dir: PathBuf,
    /// Answers at or below this score are replaced by the contact fallback.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            data_dir: default_faq_dir(),
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP API binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Base URL clients use to reach the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            base_url: default_base_url(),
        }
    }
}

/// Text-to-speech hand-off for completed bot messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Program invoked with the text appended as the last argument (e.g. `espeak`).
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogSettings {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// `text` or `json`.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub stderr: Option<bool>,
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_start_delay_ms() -> u64 {
    100
}
fn default_base_delay_ms() -> u64 {
    5
}
fn default_jitter_ms() -> u64 {
    5
}
fn default_faq_dir() -> PathBuf {
    PathBuf::from("attached_assets")
}
fn default_confidence_threshold() -> f64 {
    0.3
}
fn default_database_url() -> String {
    "sqlite://chatbot.db?mode=rwc".into()
}
fn default_bind() -> String {
    "127.0.0.1:5000".into()
}
fn default_base_url() -> String {
    "http://localhost:5000".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct WoodchatConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for WoodchatConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WoodchatConfigLoader {
    /// Start with `WOODCHAT__` environment overrides only.
    ///
    /// ```
    /// use woodchat_config::WoodchatConfigLoader;
    ///
    /// let config = WoodchatConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.typing.start_delay_ms, 100);
    /// assert_eq!(config.faq.confidence_threshold, 0.3);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is merged only when present, so deployments can
    /// rely purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use woodchat_config::WoodchatConfigLoader;
    ///
    /// let cfg = WoodchatConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// typing:
    ///   base_delay_ms: 0
    ///   jitter_ms: 0
    /// speech:
    ///   enabled: true
    ///   command: espeak
    ///   args: ["-v", "en-us"]
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.typing.base_delay_ms, 0);
    /// assert_eq!(cfg.typing.start_delay_ms, 100);
    /// assert_eq!(cfg.speech.command.as_deref(), Some("espeak"));
    /// assert_eq!(cfg.speech.args.len(), 2);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use woodchat_config::WoodchatConfigLoader;
    ///
    /// unsafe { std::env::set_var("CHATBOT_DB", "sqlite::memory:"); }
    ///
    /// let config = WoodchatConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// database:
    ///   url: "${CHATBOT_DB}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.database.url, "sqlite::memory:");
    ///
    /// unsafe { std::env::remove_var("CHATBOT_DB"); }
    /// ```
    pub fn load(self) -> Result<WoodchatConfig, ConfigError> {
        // Environment last so it wins over every file and snippet.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("WOODCHAT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        if v.is_null() {
            v = Value::Object(Default::default());
        }
        expand_env_in_value(&mut v);

        let typed: WoodchatConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_nested_sections() {
        temp_env::with_vars([("DATA", Some("/srv/faqs")), ("PORT", Some("8080"))], || {
            let mut v = json!({
                "faq": { "data_dir": "${DATA}" },
                "server": { "bind": "0.0.0.0:${PORT}" },
                "speech": { "args": ["-o", "$DATA/out.wav"] },
                "typing": { "jitter_ms": 5 }
            });
            expand_env_in_value(&mut v);
            assert_eq!(v["faq"]["data_dir"], json!("/srv/faqs"));
            assert_eq!(v["server"]["bind"], json!("0.0.0.0:8080"));
            assert_eq!(v["speech"]["args"][1], json!("/srv/faqs/out.wav"));
            assert_eq!(v["typing"]["jitter_ms"], json!(5));
        });
    }

    #[test]
    fn expansion_stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${WOODCHAT_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${WOODCHAT_DOES_NOT_EXIST}"));
    }

    #[test]
    fn defaults_match_widget_pacing() {
        let typing = WoodchatConfig::default().typing;
        assert_eq!(
            (typing.start_delay_ms, typing.base_delay_ms, typing.jitter_ms),
            (100, 5, 5)
        );
        assert_eq!(FaqConfig::default().data_dir, PathBuf::from("attached_assets"));
    }
}
