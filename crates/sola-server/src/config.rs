//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use sola_llm::GenerationConfig;
use sola_voice::{ConverterConfig, SynthesisConfig, TranscriptionConfig};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Speech-to-text settings.
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Generation server settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Speech synthesis settings.
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Audio converter settings.
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Role catalog source.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "sola_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Where roles and skills come from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// TOML catalog file. When unset the built-in catalog is used.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Applies environment overrides using `lookup` to read variables.
///
/// Unparseable host/port values are ignored and the file value is kept.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("SOLA_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = lookup("SOLA_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = lookup("SOLA_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("SOLA_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    if let Some(binary) = lookup("FW_BIN") {
        config.transcription.binary = binary.into();
    }
    if let Some(model) = lookup("FW_MODEL") {
        config.transcription.model = model;
    }
    if let Some(device) = lookup("FW_DEVICE") {
        config.transcription.device = device;
    }
    if let Some(compute) = lookup("FW_COMPUTE") {
        config.transcription.compute_type = compute;
    }

    if let Some(host) = lookup("OLLAMA_HOST") {
        config.generation.host = host;
    }
    if let Some(model) = lookup("OLLAMA_MODEL") {
        config.generation.model = model;
    }
    if let Some(timeout) = lookup("OLLAMA_TIMEOUT_SECS") {
        if let Ok(parsed) = timeout.parse() {
            config.generation.timeout_secs = parsed;
        }
    }

    if let Some(binary) = lookup("PIPER_BIN") {
        config.synthesis.binary = binary.into();
    }
    if let Some(model) = lookup("PIPER_MODEL") {
        config.synthesis.model_path = model.into();
    }

    if let Some(binary) = lookup("FFMPEG_BIN") {
        config.converter.binary = binary.into();
    }

    if let Some(path) = lookup("SOLA_CATALOG_PATH") {
        config.catalog.path = (!path.trim().is_empty()).then(|| path.into());
    }
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `SOLA_HOST`, `SOLA_PORT` override `server.host` / `server.port`
/// - `SOLA_LOG_LEVEL`, `SOLA_LOG_JSON` override `logging.level` / `logging.json`
/// - `FW_BIN`, `FW_MODEL`, `FW_DEVICE`, `FW_COMPUTE` override `transcription.*`
/// - `OLLAMA_HOST`, `OLLAMA_MODEL`, `OLLAMA_TIMEOUT_SECS` override `generation.*`
/// - `PIPER_BIN`, `PIPER_MODEL` override `synthesis.binary` / `synthesis.model_path`
/// - `FFMPEG_BIN` overrides `converter.binary`
/// - `SOLA_CATALOG_PATH` overrides `catalog.path`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_original_deployment() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.transcription.model, "base");
        assert_eq!(config.transcription.device, "cpu");
        assert_eq!(config.transcription.compute_type, "int8");
        assert_eq!(config.generation.host, "http://localhost:11434");
        assert_eq!(config.generation.model, "llama3:8b");
        assert_eq!(config.synthesis.binary, PathBuf::from("piper"));
        assert_eq!(config.converter.binary, PathBuf::from("ffmpeg"));
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn parses_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [generation]
            model = "qwen2:7b"

            [synthesis]
            model_path = "/srv/voices/zh_CN-huayan-medium.onnx"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.generation.model, "qwen2:7b");
        assert_eq!(config.generation.host, "http://localhost:11434");
        assert_eq!(
            config.synthesis.model_path,
            PathBuf::from("/srv/voices/zh_CN-huayan-medium.onnx")
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn env_overrides_take_precedence() {
        let vars: HashMap<&str, &str> = [
            ("SOLA_PORT", "8100"),
            ("SOLA_HOST", "not-an-ip"),
            ("SOLA_LOG_JSON", "1"),
            ("FW_MODEL", "small"),
            ("FW_COMPUTE", "float16"),
            ("OLLAMA_HOST", "http://gpu-box:11434"),
            ("OLLAMA_TIMEOUT_SECS", "120"),
            ("PIPER_BIN", "/opt/piper/piper"),
            ("PIPER_MODEL", "/opt/voices/a.onnx"),
            ("SOLA_CATALOG_PATH", "/etc/sola/roles.toml"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 8100);
        assert_eq!(config.server.host, default_host());
        assert!(config.logging.json);
        assert_eq!(config.transcription.model, "small");
        assert_eq!(config.transcription.compute_type, "float16");
        assert_eq!(config.transcription.device, "cpu");
        assert_eq!(config.generation.host, "http://gpu-box:11434");
        assert_eq!(config.generation.timeout_secs, 120);
        assert_eq!(config.synthesis.binary, PathBuf::from("/opt/piper/piper"));
        assert_eq!(config.synthesis.model_path, PathBuf::from("/opt/voices/a.onnx"));
        assert_eq!(
            config.catalog.path,
            Some(PathBuf::from("/etc/sola/roles.toml"))
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.generation.timeout_secs, 600);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(
            load_config(Some(path.to_str().unwrap())),
            Err(ConfigError::Parse(_))
        ));
    }
}
