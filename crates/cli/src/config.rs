//! Configuration loading from autodev.toml, `.env` and the environment.

use runtime::{AgentLimits, AnthropicAuth, prompt};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tools::ToolSettings;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Model provider configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Agent loop configuration.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Tool configuration.
    #[serde(default)]
    pub tools: ToolSettings,
}

/// Supported model providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Anthropic,
    #[value(name = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
}

impl Provider {
    fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::OpenAi => "gpt-4-turbo-preview",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn key_var(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            _ => Err(ConfigError::UnknownProvider(name.to_string())),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anthropic => write!(f, "anthropic"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

/// Backend provider configuration.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub provider: Provider,

    /// Model to use. Defaults per provider.
    pub model: Option<String>,

    pub api_key: Option<String>,

    /// Anthropic OAuth access token, used when no API key is set.
    pub auth_token: Option<String>,

    /// Override for the provider's API root.
    pub base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound for one model request.
    #[serde(default = "default_model_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_model_timeout_secs() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            api_key: None,
            auth_token: None,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_model_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Agent loop configuration.
#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    /// Prompt file; a built-in prompt is used when it does not exist.
    #[serde(default = "default_system_prompt_file")]
    pub system_prompt_file: PathBuf,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default = "default_max_parse_retries")]
    pub max_parse_retries: usize,
}

fn default_system_prompt_file() -> PathBuf {
    PathBuf::from("system_prompt.md")
}

fn default_max_iterations() -> usize {
    AgentLimits::default().max_iterations
}

fn default_max_parse_retries() -> usize {
    AgentLimits::default().max_parse_retries
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt_file: default_system_prompt_file(),
            max_iterations: default_max_iterations(),
            max_parse_retries: default_max_parse_retries(),
        }
    }
}

impl AgentConfig {
    pub fn limits(&self) -> AgentLimits {
        AgentLimits {
            max_iterations: self.max_iterations,
            max_parse_retries: self.max_parse_retries,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply environment overrides. `var` looks a variable up by name.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(provider) = var("AUTODEV_PROVIDER") {
            self.backend.provider = Provider::parse(&provider)?;
        }
        if let Some(model) = var("AUTODEV_MODEL") {
            self.backend.model = Some(model);
        }
        if let Some(key) = var(self.backend.provider.key_var()) {
            self.backend.api_key = Some(key);
        }
        if let Some(token) = var("ANTHROPIC_AUTH_TOKEN") {
            self.backend.auth_token = Some(token);
        }
        if let Some(url) = var("DB_URL") {
            self.tools.database_url = Some(url);
        }
        if let Some(os) = var("OS") {
            self.tools.operating_system = os;
        }
        if let Some(base) = var("BASE_PATH") {
            self.tools.base_path = PathBuf::from(base);
        }
        if let Some(file) = var("AUTODEV_SYSTEM_PROMPT") {
            self.agent.system_prompt_file = PathBuf::from(file);
        }
        Ok(())
    }

    /// Check everything a session needs before it starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend.provider {
            Provider::Anthropic => self.anthropic_auth().map(drop)?,
            Provider::OpenAi => self.api_key().map(drop)?,
        }
        if self.tools.database_url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingDatabase);
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "backend.timeout_secs must be at least 1".into(),
            ));
        }
        if self.tools.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "tools.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// API key for the configured provider.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.backend.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey {
                var: self.backend.provider.key_var(),
            }),
        }
    }

    /// Anthropic credentials: the API key if set, else the OAuth token.
    pub fn anthropic_auth(&self) -> Result<AnthropicAuth, ConfigError> {
        if let Ok(key) = self.api_key() {
            return Ok(AnthropicAuth::ApiKey(key.to_string()));
        }
        match self.backend.auth_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(AnthropicAuth::OAuthToken(token.to_string())),
            _ => Err(ConfigError::MissingApiKey {
                var: Provider::Anthropic.key_var(),
            }),
        }
    }

    /// System prompt with `{base_path}` and `{operating_system}` filled in.
    pub fn system_prompt(&self) -> Result<String, ConfigError> {
        let path = &self.agent.system_prompt_file;
        let template = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?
        } else {
            tracing::debug!(path = %path.display(), "no prompt file, using built-in prompt");
            prompt::DEFAULT_SYSTEM_PROMPT.to_string()
        };

        Ok(prompt::fill_template(
            &template,
            &self.tools.base_path.display().to_string(),
            &self.tools.operating_system,
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("credentials not configured: set backend.api_key or {var}")]
    MissingApiKey { var: &'static str },

    #[error("database not configured: set tools.database_url or DB_URL")]
    MissingDatabase,

    #[error("unknown provider '{0}' (expected 'anthropic' or 'openai')")]
    UnknownProvider(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
