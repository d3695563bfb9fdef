use async_trait::async_trait;

use crate::tts::request::AudioEncoding;

/// A voice record as listed by the remote service, before tier derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteVoice {
    pub name: String,
    pub language_codes: Vec<String>,
    pub ssml_gender: Option<String>,
    pub natural_sample_rate_hertz: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechInput {
    Text(String),
    Ssml(String),
}

/// The request actually forwarded to the remote service, after any
/// capability downgrades have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub input: SpeechInput,
    pub voice_name: String,
    pub language_code: String,
    pub audio_encoding: AudioEncoding,
    pub speaking_rate: Option<f64>,
    pub pitch: Option<f64>,
    pub volume_gain_db: Option<f64>,
}

#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Remote returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid remote response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait TtsBackend: Send + Sync {
    async fn list_voices(&self) -> Result<Vec<RemoteVoice>, BackendError>;

    /// Returns the raw audio bytes.
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, BackendError>;
}
