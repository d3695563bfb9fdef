use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::tts::backend::{BackendError, RemoteVoice, SpeechInput, SpeechRequest, TtsBackend};

pub const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com";

/// Client for the Cloud Text-to-Speech REST API.
pub struct GoogleTtsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleTtsClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("voice-compare-server/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("x-goog-api-key", key),
            None => builder,
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListVoicesResponse {
    #[serde(default)]
    voices: Vec<WireVoice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVoice {
    name: String,
    #[serde(default)]
    language_codes: Vec<String>,
    ssml_gender: Option<String>,
    natural_sample_rate_hertz: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireSynthesizeRequest<'a> {
    input: WireInput<'a>,
    voice: WireVoiceSelection<'a>,
    audio_config: WireAudioConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum WireInput<'a> {
    Text(&'a str),
    Ssml(&'a str),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireVoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireAudioConfig {
    audio_encoding: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaking_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pitch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume_gain_db: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

#[async_trait]
impl TtsBackend for GoogleTtsClient {
    async fn list_voices(&self) -> Result<Vec<RemoteVoice>, BackendError> {
        let url = format!("{}/v1/voices", self.base_url);
        let response = self.authorize(self.http.get(&url)).send().await?;
        let listed: ListVoicesResponse = Self::read_json(response).await?;

        Ok(listed
            .voices
            .into_iter()
            .map(|v| RemoteVoice {
                name: v.name,
                language_codes: v.language_codes,
                ssml_gender: v.ssml_gender,
                natural_sample_rate_hertz: v.natural_sample_rate_hertz,
            })
            .collect())
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, BackendError> {
        let url = format!("{}/v1/text:synthesize", self.base_url);
        let body = WireSynthesizeRequest {
            input: match &request.input {
                SpeechInput::Text(text) => WireInput::Text(text),
                SpeechInput::Ssml(ssml) => WireInput::Ssml(ssml),
            },
            voice: WireVoiceSelection {
                language_code: &request.language_code,
                name: &request.voice_name,
            },
            audio_config: WireAudioConfig {
                audio_encoding: request.audio_encoding.as_str(),
                speaking_rate: request.speaking_rate,
                pitch: request.pitch,
                volume_gain_db: request.volume_gain_db,
            },
        };

        let response = self.authorize(self.http.post(&url)).json(&body).send().await?;
        let synthesized: WireSynthesizeResponse = Self::read_json(response).await?;

        STANDARD
            .decode(synthesized.audio_content.as_bytes())
            .map_err(|e| BackendError::Decode(format!("audioContent is not base64: {}", e)))
    }
}
