// ABOUTME: Configuration loading for apoteker.
// ABOUTME: Reads ~/.apoteker/config.toml, resolves the API key, and applies CLI overrides.

use std::path::{Path, PathBuf};

use anyhow::Context;
use secrecy::Secret;
use serde::Deserialize;

use crate::error::ConfigurationError;
use crate::relay::ContextMode;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub persona: PersonaConfig,
}

/// Generation service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub context: ContextMode,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub gemini: EndpointConfig,
    pub responses: EndpointConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_seconds: 60,
            context: ContextMode::Resend,
            max_output_tokens: 1024,
            temperature: 0.7,
            gemini: EndpointConfig::default(),
            responses: EndpointConfig::default(),
        }
    }
}

impl LlmConfig {
    /// Environment variable holding the API key for the configured provider.
    pub fn credential_var(&self) -> &'static str {
        match self.provider.as_str() {
            "responses" => "OPENAI_API_KEY",
            _ => "GEMINI_API_KEY",
        }
    }
}

/// Per-provider endpoint override. Empty means the provider's public URL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
}

/// Chat persona: what the screen says and how the conversation is seeded.
/// Unset texts fall back to the compiled-in pharmacist persona.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub instruction: Option<String>,
    pub greeting: Option<String>,
    pub input_placeholder: Option<String>,
    pub error_prefix: Option<String>,
    pub system_instruction: Option<String>,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Config {
    /// Load config from `path`, or ~/.apoteker/config.toml, falling back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ConfigurationError::Unreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply CLI overrides in place.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(ref provider) = overrides.provider {
            self.llm.provider = provider.clone();
        }
        if let Some(ref model) = overrides.model {
            self.llm.model = model.clone();
        }
        if let Some(secs) = overrides.timeout_seconds {
            self.llm.timeout_seconds = secs;
        }
    }

    /// Base directory for apoteker's user files.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".apoteker")
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Path to the dotenv-style secrets file loaded at startup.
    pub fn secrets_env_path() -> PathBuf {
        Self::config_dir().join("secrets.env")
    }

    /// Path to the TOML secrets file consulted when the environment has no key.
    pub fn secrets_toml_path() -> PathBuf {
        Self::config_dir().join("secrets.toml")
    }

    /// Directory for the log file; the terminal belongs to the TUI.
    pub fn log_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("apoteker")
    }
}

/// The generation service API key.
pub struct Credentials {
    pub api_key: Secret<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Resolve the key for the configured provider from the process environment,
    /// then from ~/.apoteker/secrets.toml.
    pub fn resolve(llm: &LlmConfig) -> Result<Self, ConfigurationError> {
        let var = llm.credential_var();
        Self::from_sources(var, std::env::var(var).ok(), &Config::secrets_toml_path())
    }

    /// Resolve from an explicit environment value and secrets file.
    pub fn from_sources(
        var: &str,
        env_value: Option<String>,
        secrets_file: &Path,
    ) -> Result<Self, ConfigurationError> {
        let key = env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| read_secrets_toml(secrets_file, var));

        match key {
            Some(key) => Ok(Self {
                api_key: Secret::new(key.trim().to_string()),
            }),
            None => Err(ConfigurationError::MissingCredential {
                var: var.to_string(),
                secrets: secrets_file.display().to_string(),
            }),
        }
    }
}

fn read_secrets_toml(path: &Path, var: &str) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let table: toml::Table = toml::from_str(&content).ok()?;
    table
        .get(var)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.llm.timeout_seconds, 60);
        assert_eq!(config.llm.context, ContextMode::Resend);
        assert!(config.persona.greeting.is_none());
    }

    #[test]
    fn parse_config_toml() {
        let toml_str = r#"
[llm]
provider = "responses"
model = "gpt-4o-mini"
timeout_seconds = 30
context = "stateful"

[llm.responses]
base_url = "http://localhost:8080"

[persona]
title = "Pharmacy Bot"
greeting = "Ask me about medicine."
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.provider, "responses");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout_seconds, 30);
        assert_eq!(config.llm.context, ContextMode::Stateful);
        assert_eq!(
            config.llm.responses.base_url.as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(config.persona.title.as_deref(), Some("Pharmacy Bot"));
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[llm]\nmodel = \"gemini-2.0-flash\"\n").unwrap();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.timeout_seconds, 60);
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&tmp.path().join("nope.toml"))).unwrap();
        assert_eq!(config.llm.provider, "gemini");
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[llm\nprovider = ").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = Config::default();
        config.apply(&Overrides {
            provider: None,
            model: Some("gemini-2.0-flash".to_string()),
            timeout_seconds: Some(5),
        });
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.timeout_seconds, 5);
    }

    #[test]
    fn credential_var_follows_provider() {
        let mut llm = LlmConfig::default();
        assert_eq!(llm.credential_var(), "GEMINI_API_KEY");
        llm.provider = "responses".to_string();
        assert_eq!(llm.credential_var(), "OPENAI_API_KEY");
    }

    #[test]
    fn credentials_prefer_environment() {
        let tmp = tempfile::tempdir().unwrap();
        let secrets = tmp.path().join("secrets.toml");
        std::fs::write(&secrets, "GEMINI_API_KEY = \"from-file\"\n").unwrap();

        let creds =
            Credentials::from_sources("GEMINI_API_KEY", Some("from-env".to_string()), &secrets)
                .unwrap();
        assert_eq!(creds.api_key.expose_secret(), "from-env");
    }

    #[test]
    fn credentials_fall_back_to_secrets_file() {
        let tmp = tempfile::tempdir().unwrap();
        let secrets = tmp.path().join("secrets.toml");
        std::fs::write(&secrets, "GEMINI_API_KEY = \"from-file\"\n").unwrap();

        let creds = Credentials::from_sources("GEMINI_API_KEY", None, &secrets).unwrap();
        assert_eq!(creds.api_key.expose_secret(), "from-file");
    }

    #[test]
    fn missing_credential_is_configuration_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Credentials::from_sources(
            "GEMINI_API_KEY",
            Some("   ".to_string()),
            &tmp.path().join("secrets.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingCredential { .. }));
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let tmp = tempfile::tempdir().unwrap();
        let creds = Credentials::from_sources(
            "GEMINI_API_KEY",
            Some("sk-secret".to_string()),
            &tmp.path().join("secrets.toml"),
        )
        .unwrap();
        assert!(!format!("{:?}", creds).contains("sk-secret"));
    }
}
