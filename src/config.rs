//! Configuration for voicetask.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ASSEMBLYAI_API_KEY, GEMINI_API_KEY,
//!    VOICETASK_GEMINI_MODEL, VOICETASK_TRANSCRIPTION_PROVIDER, WHISPER_PATH)
//! 2. Config file (.voicetask/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .voicetask/config.yaml
//! - Falls back to ~/.voicetask/config.yaml

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::adapters::{assemblyai, gemini};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".voicetask";
const CONFIG_FILE: &str = "config.yaml";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub transcription: Option<TranscriptionConfig>,
    #[serde(default)]
    pub extraction: Option<ExtractionConfig>,
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptionConfig {
    pub provider: Option<TranscriptionProvider>,
    pub base_url: Option<String>,
    pub language_code: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub whisper_path: Option<String>,
    pub whisper_model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Which speech-to-text backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptionProvider {
    #[default]
    #[serde(rename = "assemblyai")]
    AssemblyAi,
    #[serde(rename = "whisper")]
    Whisper,
}

impl TranscriptionProvider {
    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "assemblyai" => Some(Self::AssemblyAi),
            "whisper" => Some(Self::Whisper),
            _ => None,
        }
    }
}

impl fmt::Display for TranscriptionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssemblyAi => f.write_str("assemblyai"),
            Self::Whisper => f.write_str("whisper"),
        }
    }
}

/// Resolved transcription settings
#[derive(Debug, Clone)]
pub struct TranscriptionSettings {
    pub provider: TranscriptionProvider,
    pub base_url: String,
    pub language_code: String,
    pub poll_interval_ms: u64,
    pub timeout_seconds: u64,
    pub whisper_path: String,
    pub whisper_model: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProvider::AssemblyAi,
            base_url: assemblyai::DEFAULT_BASE_URL.to_string(),
            language_code: "en".to_string(),
            poll_interval_ms: 1000,
            timeout_seconds: 120,
            whisper_path: "whisper".to_string(),
            whisper_model: "base".to_string(),
        }
    }
}

/// Resolved extraction settings
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            base_url: gemini::DEFAULT_BASE_URL.to_string(),
            model: gemini::DEFAULT_MODEL.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub transcription: TranscriptionSettings,
    pub extraction: ExtractionSettings,
    pub assemblyai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Caller-level bound on a whole parse
    pub request_timeout_seconds: u64,
}

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 180;

impl ResolvedConfig {
    /// Merge a config file with an environment lookup
    pub fn resolve(
        config_file: Option<PathBuf>,
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let t = file.transcription.unwrap_or_default();
        let defaults = TranscriptionSettings::default();
        let transcription = TranscriptionSettings {
            provider: non_empty("VOICETASK_TRANSCRIPTION_PROVIDER")
                .and_then(|v| TranscriptionProvider::from_env_value(&v))
                .or(t.provider)
                .unwrap_or(defaults.provider),
            base_url: t.base_url.unwrap_or(defaults.base_url),
            language_code: t.language_code.unwrap_or(defaults.language_code),
            poll_interval_ms: t.poll_interval_ms.unwrap_or(defaults.poll_interval_ms),
            timeout_seconds: t.timeout_seconds.unwrap_or(defaults.timeout_seconds),
            whisper_path: non_empty("WHISPER_PATH")
                .or(t.whisper_path)
                .unwrap_or(defaults.whisper_path),
            whisper_model: t.whisper_model.unwrap_or(defaults.whisper_model),
        };

        let e = file.extraction.unwrap_or_default();
        let defaults = ExtractionSettings::default();
        let extraction = ExtractionSettings {
            base_url: e.base_url.unwrap_or(defaults.base_url),
            model: non_empty("VOICETASK_GEMINI_MODEL")
                .or(e.model)
                .unwrap_or(defaults.model),
            timeout_seconds: e.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        };

        Self {
            config_file,
            transcription,
            extraction,
            assemblyai_api_key: non_empty("ASSEMBLYAI_API_KEY"),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            request_timeout_seconds: file
                .request_timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        }
    }

    /// Environment variables that are required but unset
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.transcription.provider == TranscriptionProvider::AssemblyAi
            && self.assemblyai_api_key.is_none()
        {
            missing.push("ASSEMBLYAI_API_KEY");
        }
        if self.gemini_api_key.is_none() {
            missing.push("GEMINI_API_KEY");
        }
        missing
    }
}

/// Find config file by searching current directory and parents, then home
fn find_config_file() -> Option<PathBuf> {
    let start = std::env::current_dir().ok()?;
    find_config_from(&start).or_else(|| {
        let home = dirs::home_dir()?.join(CONFIG_DIR).join(CONFIG_FILE);
        home.exists().then_some(home)
    })
}

fn find_config_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();

    let file = match config_file {
        Some(ref path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    let resolved = ResolvedConfig::resolve(config_file, file, |key| std::env::var(key).ok());

    let missing = resolved.missing_keys();
    if !missing.is_empty() {
        warn!(missing = ?missing, "Missing environment variables");
    }

    Ok(resolved)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let config = ResolvedConfig::resolve(None, ConfigFile::default(), env_from(&[]));

        assert_eq!(config.transcription.provider, TranscriptionProvider::AssemblyAi);
        assert_eq!(config.transcription.base_url, "https://api.assemblyai.com");
        assert_eq!(config.extraction.model, "gemini-2.5-flash");
        assert_eq!(config.extraction.timeout_seconds, 30);
        assert_eq!(config.request_timeout_seconds, 180);
        assert!(config.config_file.is_none());
        assert_eq!(config.missing_keys(), vec!["ASSEMBLYAI_API_KEY", "GEMINI_API_KEY"]);
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".voicetask");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
transcription:
  provider: whisper
  whisper_model: small
  timeout_seconds: 45
extraction:
  model: gemini-2.0-flash
request_timeout_seconds: 60
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version.as_deref(), Some("1.0"));

        let config = ResolvedConfig::resolve(Some(config_path), parsed, env_from(&[]));
        assert_eq!(config.transcription.provider, TranscriptionProvider::Whisper);
        assert_eq!(config.transcription.whisper_model, "small");
        assert_eq!(config.transcription.timeout_seconds, 45);
        assert_eq!(config.extraction.model, "gemini-2.0-flash");
        assert_eq!(config.request_timeout_seconds, 60);
        // Whisper needs no AssemblyAI key
        assert_eq!(config.missing_keys(), vec!["GEMINI_API_KEY"]);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile {
            extraction: Some(ExtractionConfig {
                model: Some("from-file".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = ResolvedConfig::resolve(
            None,
            file,
            env_from(&[
                ("VOICETASK_GEMINI_MODEL", "from-env"),
                ("GEMINI_API_KEY", "g-key"),
                ("ASSEMBLYAI_API_KEY", "   "),
                ("VOICETASK_TRANSCRIPTION_PROVIDER", "Whisper"),
            ]),
        );

        assert_eq!(config.extraction.model, "from-env");
        assert_eq!(config.gemini_api_key.as_deref(), Some("g-key"));
        assert_eq!(config.assemblyai_api_key, None);
        assert_eq!(config.transcription.provider, TranscriptionProvider::Whisper);
    }

    #[test]
    fn test_find_config_in_parent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".voicetask");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.yaml"), "version: \"1.0\"\n").unwrap();

        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_from(&nested), Some(dir.join("config.yaml")));
    }
}
