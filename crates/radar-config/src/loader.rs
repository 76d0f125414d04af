use std::path::{Path, PathBuf};

use radar_common::{Error, Result};
use tracing::{debug, info};

use crate::model::AppConfig;

const CONFIG_DIR: &str = ".radar";
const CONFIG_FILE: &str = "config.yml";

/// Loads [`AppConfig`] from a YAML file and applies environment overrides.
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Use `path` when given, otherwise `~/.radar/config.yml`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path: path.unwrap_or_else(default_config_path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config file (defaults if it does not exist) and apply the
    /// process environment on top.
    pub fn load(&self) -> Result<AppConfig> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigLoader::load`] with an injectable environment lookup.
    pub fn load_with_env<F>(&self, env: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if self.path.is_file() {
            let contents = std::fs::read_to_string(&self.path).map_err(|e| {
                Error::Config(format!("failed to read {}: {e}", self.path.display()))
            })?;
            info!("loaded config from {}", self.path.display());
            parse_yaml(&contents)?
        } else {
            debug!(
                "no config file at {}, using defaults",
                self.path.display()
            );
            AppConfig::default()
        };

        apply_env_overrides(&mut config, env)?;
        Ok(config)
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

fn parse_yaml(contents: &str) -> Result<AppConfig> {
    if contents.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str(contents).map_err(|e| Error::Config(format!("invalid config: {e}")))
}

fn apply_env_overrides<F>(config: &mut AppConfig, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
        config.telegram.bot_token = Some(v);
    }
    if let Some(v) = get("ALLOWED_CHAT_ID") {
        config.telegram.allowed_chat_id = Some(v);
    }
    if let Some(v) = get("TELEGRAM_CHAT_ID") {
        config.telegram.alert_chat_id = Some(v);
    }
    if let Some(v) = get("OPENAI_API_KEY") {
        config.llm.api_key = Some(v);
    }
    if let Some(v) = get("OPENAI_BASE_URL") {
        config.llm.base_url = Some(v);
    }
    if let Some(v) = get("OPENAI_MODEL") {
        config.llm.model = v;
    }
    if let Some(v) = get("RADAR_SECRET_KEY") {
        config.ingest.secret_key = Some(v);
    }
    if let Some(v) = get("RADAR_INGEST_URL") {
        config.ingest.url = Some(v);
    }
    if let Some(v) = get("RADAR_HOST") {
        config.gateway.host = v;
    }
    if let Some(v) = get("RADAR_PORT") {
        config.gateway.port = v
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("invalid RADAR_PORT '{v}': {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TelegramMode;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new(Some(dir.path().join("absent.yml")));
        let config = loader.load_with_env(no_env).unwrap();
        assert_eq!(config.gateway.port, 5000);
        assert!(config.telegram.bot_token.is_none());
    }

    #[test]
    fn yaml_sections_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            r#"
gateway:
  port: 8088
telegram:
  allowed_chat_id: "12345"
  mode: polling
analysis:
  deepen_enabled: false
"#,
        )
        .unwrap();

        let config = ConfigLoader::new(Some(path)).load_with_env(no_env).unwrap();
        assert_eq!(config.gateway.port, 8088);
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.telegram.allowed_chat_id.as_deref(), Some("12345"));
        assert_eq!(config.telegram.mode, TelegramMode::Polling);
        assert_eq!(config.analysis.link_cap(), 4);
    }

    #[test]
    fn env_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "llm:\n  api_key: from-file\n  model: gpt-4o\n").unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "from-env"),
            ("RADAR_SECRET_KEY", "s3cret"),
            ("RADAR_PORT", "9000"),
            ("ALLOWED_CHAT_ID", ""),
        ]);
        let config = ConfigLoader::new(Some(path))
            .load_with_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.llm.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.ingest.secret_key.as_deref(), Some("s3cret"));
        assert_eq!(config.gateway.port, 9000);
        assert!(config.telegram.allowed_chat_id.is_none());
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new(Some(dir.path().join("absent.yml")));
        let err = loader
            .load_with_env(|k| (k == "RADAR_PORT").then(|| "not-a-port".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("RADAR_PORT"));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "gateway: [unclosed").unwrap();
        assert!(ConfigLoader::new(Some(path)).load_with_env(no_env).is_err());
    }
}
