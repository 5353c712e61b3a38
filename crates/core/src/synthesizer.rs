use crate::error::SynthesizerError;
use crate::session_state::AudioRef;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_AUDIO_PATH: &str = "audiofile.mp3";

/// Turns text into speech audio stored on disk.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<AudioRef, SynthesizerError>;
}

/// Fixed synthesis knobs sent with every request. Not user-configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
}

pub const VOICE_SETTINGS: VoiceSettings = VoiceSettings {
    stability: 0.75,
    similarity_boost: 0.85,
};

#[derive(Serialize)]
struct TextToSpeechRequest<'a> {
    text: &'a str,
    voice_settings: VoiceSettings,
}

/// `SpeechSynthesizer` backed by the ElevenLabs text-to-speech endpoint.
///
/// Every successful call overwrites the same output file. Callers must not run
/// two syntheses concurrently against one instance.
pub struct ElevenLabsSynthesizer {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    output_path: PathBuf,
}

impl ElevenLabsSynthesizer {
    pub fn new(client: Client, api_key: Option<SecretString>) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
            output_path: PathBuf::from(DEFAULT_AUDIO_PATH),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}", self.base_url, voice_id)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<AudioRef, SynthesizerError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(SynthesizerError::MissingApiKey)?;

        let body = TextToSpeechRequest {
            text,
            voice_settings: VOICE_SETTINGS,
        };

        tracing::debug!(voice_id, text_chars = text.chars().count(), "Requesting speech synthesis");
        let response = self
            .client
            .post(self.endpoint(voice_id))
            .header("xi-api-key", api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        // Only a plain 200 counts; other 2xx codes are reported like any failure.
        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            return Err(SynthesizerError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let audio = response.bytes().await?;
        tokio::fs::write(&self.output_path, &audio).await?;
        tracing::info!(path = %self.output_path.display(), bytes = audio.len(), "Wrote synthesized audio");

        Ok(AudioRef::new(self.output_path.clone(), audio.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_carries_fixed_voice_settings() {
        let body = TextToSpeechRequest {
            text: "Hi there",
            voice_settings: VOICE_SETTINGS,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "text": "Hi there",
                "voice_settings": {"stability": 0.75, "similarity_boost": 0.85}
            })
        );
    }

    #[test]
    fn test_defaults() {
        let synth = ElevenLabsSynthesizer::new(Client::new(), None);
        assert_eq!(synth.output_path(), Path::new("audiofile.mp3"));
        assert_eq!(
            synth.endpoint("abc"),
            "https://api.elevenlabs.io/v1/text-to-speech/abc"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_at_first_use() {
        let synth = ElevenLabsSynthesizer::new(Client::new(), None);
        let err = synth.synthesize("hi", "abc").await.unwrap_err();
        assert!(matches!(err, SynthesizerError::MissingApiKey));
    }
}
