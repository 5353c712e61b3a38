//! Application Configuration Module
//!
//! Loads settings for the chat front-end from environment variables (and a
//! `.env` file, if present) into a single struct built once at startup.

use chatkick_core::generator::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use chatkick_core::synthesizer::{DEFAULT_AUDIO_PATH, DEFAULT_ELEVENLABS_BASE_URL};
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Per-request timeout applied to both remote APIs unless overridden.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Holds all configuration loaded from the environment.
#[derive(Debug)]
pub struct Config {
    pub gemini_api_key: Option<SecretString>,
    pub elevenlabs_api_key: Option<SecretString>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub elevenlabs_base_url: String,
    pub audio_output_path: PathBuf,
    pub audio_player: Option<String>,
    pub http_timeout: Duration,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// *   `GEMINI_API`: Secret key for the Gemini API.
    /// *   `ELEVENLABS_API`: Secret key for the ElevenLabs API.
    /// *   `GEMINI_MODEL`: (Optional) Generator model. Defaults to "gemini-2.0-flash".
    /// *   `GEMINI_BASE_URL` / `ELEVENLABS_BASE_URL`: (Optional) Endpoint roots.
    /// *   `AUDIO_OUTPUT_PATH`: (Optional) Where synthesized audio is written. Defaults to "audiofile.mp3".
    /// *   `AUDIO_PLAYER`: (Optional) Command line used to play audio, e.g. "mpv --no-video".
    /// *   `HTTP_TIMEOUT_SECS`: (Optional) Per-request timeout. Defaults to 120.
    /// *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    ///
    /// Missing API keys are not an error here. The first call that needs one fails instead.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(SecretString::from)
        };

        let gemini_api_key = secret("GEMINI_API");
        let elevenlabs_api_key = secret("ELEVENLABS_API");

        let gemini_model =
            lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let gemini_base_url =
            lookup("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        let elevenlabs_base_url = lookup("ELEVENLABS_BASE_URL")
            .unwrap_or_else(|| DEFAULT_ELEVENLABS_BASE_URL.to_string());
        let audio_output_path = lookup("AUDIO_OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_AUDIO_PATH));
        let audio_player = lookup("AUDIO_PLAYER").filter(|value| !value.trim().is_empty());

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidValue("HTTP_TIMEOUT_SECS".to_string(), e.to_string())
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue(
                        "HTTP_TIMEOUT_SECS".to_string(),
                        "timeout must be at least one second".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            gemini_api_key,
            elevenlabs_api_key,
            gemini_model,
            gemini_base_url,
            elevenlabs_base_url,
            audio_output_path,
            audio_player,
            http_timeout,
            log_level,
        })
    }
}
