//! BuilderBot configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main BuilderBot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text-generation provider configuration
    pub llm: LlmConfig,

    /// Image-generation provider configuration
    pub image: ImageConfig,

    /// Conversation behaviour
    pub bot: BotConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that required environment variables are set and numeric limits
    /// are usable. Call this early in startup to fail fast.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key().is_none() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if self.image.api_key().is_none() {
            return Err(eyre::eyre!(
                "Image API key not found. Set the {} environment variable.",
                self.image.api_key_env
            ));
        }
        if self.bot.history_capacity == 0 {
            return Err(eyre::eyre!("bot.history-capacity must be at least 1"));
        }
        if self.bot.max_message_chars == 0 {
            return Err(eyre::eyre!("bot.max-message-chars must be at least 1"));
        }
        if self.image.poll_interval_ms == 0 || self.image.deadline_ms == 0 {
            return Err(eyre::eyre!("image.poll-interval-ms and image.deadline-ms must be non-zero"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: builderbot.yml
        let local_config = PathBuf::from("builderbot.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/builderbot/builderbot.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("builderbot").join("builderbot.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialised
    ///
    /// Errors are swallowed; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = match config_path {
            Some(path) => path.clone(),
            None => {
                let local = PathBuf::from("builderbot.yml");
                if local.exists() {
                    local
                } else {
                    dirs::config_dir()?.join("builderbot").join("builderbot.yml")
                }
            }
        };
        let content = fs::read_to_string(path).ok()?;
        let config: Self = serde_yaml::from_str(&content).ok()?;
        config.log_level
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Text-generation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("mistral" or "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "mistral".to_string(),
            model: "mistral-large-latest".to_string(),
            api_key_env: "MISTRAL_API_KEY".to_string(),
            base_url: "https://api.mistral.ai".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

/// Image-generation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Model path segment, e.g. flux-pro-1.1
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Per-request HTTP timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Delay between status polls in milliseconds
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Overall wait budget per job in milliseconds
    #[serde(rename = "deadline-ms")]
    pub deadline_ms: u64,
}

impl ImageConfig {
    /// API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: "flux-pro-1.1".to_string(),
            api_key_env: "BFL_API_KEY".to_string(),
            base_url: "https://api.us1.bfl.ai".to_string(),
            width: 1024,
            height: 1024,
            timeout_ms: 30_000,
            poll_interval_ms: 1_000,
            deadline_ms: 30_000,
        }
    }
}

/// Conversation behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Message prefix that starts a new build
    #[serde(rename = "build-trigger")]
    pub build_trigger: String,

    /// Message prefix that requests an ad hoc illustration
    #[serde(rename = "picture-trigger")]
    pub picture_trigger: String,

    /// Prefix for bot commands such as `!ping`
    #[serde(rename = "command-prefix")]
    pub command_prefix: String,

    /// Number of builds remembered for elaboration
    #[serde(rename = "history-capacity")]
    pub history_capacity: usize,

    /// Maximum characters per outgoing message
    #[serde(rename = "max-message-chars")]
    pub max_message_chars: usize,

    /// Illustrate representative steps of each new build
    #[serde(rename = "illustrate-builds")]
    pub illustrate_builds: bool,

    /// Upper bound on illustrations per build
    #[serde(rename = "max-illustrations")]
    pub max_illustrations: usize,

    /// Directory of `.pmt` prompt overrides
    #[serde(rename = "prompts-dir", skip_serializing_if = "Option::is_none")]
    pub prompts_dir: Option<PathBuf>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            build_trigger: "Bob, please build me".to_string(),
            picture_trigger: "Bob, please draw".to_string(),
            command_prefix: "!".to_string(),
            history_capacity: stepstore::DEFAULT_HISTORY_CAPACITY,
            max_message_chars: stepstore::DEFAULT_MAX_CHUNK_SIZE,
            illustrate_builds: true,
            max_illustrations: 3,
            prompts_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "mistral");
        assert_eq!(config.image.model, "flux-pro-1.1");
        assert_eq!(config.bot.history_capacity, 2);
        assert_eq!(config.bot.max_message_chars, 1995);
        assert_eq!(config.image.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.image.deadline(), Duration::from_secs(30));
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: openai
  model: gpt-4o
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  max-tokens: 2048
  timeout-ms: 60000

image:
  model: flux-dev
  poll-interval-ms: 500
  deadline-ms: 10000

bot:
  build-trigger: "Hey Bob, build"
  history-capacity: 4
  illustrate-builds: false

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.image.model, "flux-dev");
        assert_eq!(config.image.poll_interval_ms, 500);
        assert_eq!(config.image.width, 1024);
        assert_eq!(config.bot.build_trigger, "Hey Bob, build");
        assert_eq!(config.bot.history_capacity, 4);
        assert!(!config.bot.illustrate_builds);
        assert_eq!(config.bot.picture_trigger, "Bob, please draw");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: mistral-small-latest
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "mistral-small-latest");
        assert_eq!(config.llm.provider, "mistral");
        assert_eq!(config.llm.api_key_env, "MISTRAL_API_KEY");
        assert_eq!(config.bot.max_illustrations, 3);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("builderbot.yml");
        fs::write(&path, "bot:\n  history-capacity: 3\nlog-level: warn\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.bot.history_capacity, 3);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_validate_rejects_missing_key() {
        let mut config = Config::default();
        config.llm.api_key_env = "BUILDERBOT_TEST_UNSET_LLM_KEY".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("BUILDERBOT_TEST_UNSET_LLM_KEY"));
    }
}
