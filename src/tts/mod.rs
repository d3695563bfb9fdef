pub mod backend;
pub mod capabilities;
pub mod directory;
pub mod google;
pub mod pricing;
pub mod request;
pub mod voice;

#[cfg(test)]
pub mod testing;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::AppError;

pub use backend::{SpeechInput, SpeechRequest, TtsBackend};
pub use capabilities::CapabilityTable;
pub use directory::{Clock, SystemClock, VoiceDirectory};
pub use pricing::PricingTable;
pub use request::{AudioEncoding, InputType, SynthesisRequest};
pub use voice::{PricingTier, Voice};

/// Everything one successful synthesis produced.
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub audio: Vec<u8>,
    pub encoding: AudioEncoding,
    pub mime_type: &'static str,
    pub voice: Voice,
    pub input_type: InputType,
    pub char_count: usize,
    pub estimated_cost: f64,
    pub rate_per_million: f64,
    pub tts_ms: u64,
    pub total_ms: u64,
    pub started_at: DateTime<Utc>,
    pub warnings: Vec<String>,
}

pub struct TtsService {
    directory: VoiceDirectory,
    backend: Arc<dyn TtsBackend>,
    clock: Arc<dyn Clock>,
    pricing: PricingTable,
    capabilities: CapabilityTable,
}

impl TtsService {
    pub fn new(backend: Arc<dyn TtsBackend>, clock: Arc<dyn Clock>, cache_ttl: Duration) -> Self {
        Self {
            directory: VoiceDirectory::new(Arc::clone(&backend), Arc::clone(&clock), cache_ttl),
            backend,
            clock,
            pricing: PricingTable::default(),
            capabilities: CapabilityTable::default(),
        }
    }

    pub fn directory(&self) -> &VoiceDirectory {
        &self.directory
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    pub async fn synthesize(&self, mut request: SynthesisRequest) -> Result<SynthesisOutcome, AppError> {
        let started = Instant::now();
        let started_at = self.clock.now();

        // 1. Look up the voice
        let snapshot = self.directory.get_voices().await?;
        let voice = snapshot
            .find(&request.voice_name)
            .cloned()
            .ok_or_else(|| AppError::UnknownVoice(request.voice_name.clone()))?;

        // 2. Bill the raw input, before any downgrade
        let char_count = request.char_count();

        // 3. Downgrade what the tier rejects
        let warnings = self.capabilities.apply(voice.tier, &mut request);
        if request.text.is_empty() {
            return Err(AppError::invalid(
                "Input has no speakable text once markup is removed",
            ));
        }

        // 4. Call the remote service
        let speech = SpeechRequest {
            language_code: voice.resolve_language(request.language_code.as_deref()),
            input: match request.input_type {
                InputType::Text => SpeechInput::Text(request.text),
                InputType::Ssml => SpeechInput::Ssml(request.text),
            },
            voice_name: voice.name.clone(),
            audio_encoding: request.audio_encoding,
            speaking_rate: request.speaking_rate,
            pitch: request.pitch,
            volume_gain_db: request.volume_gain_db,
        };

        let remote_started = Instant::now();
        let audio = self.backend.synthesize(&speech).await.map_err(|e| {
            tracing::error!(voice = %voice.name, "Remote synthesis failed: {}", e);
            AppError::RemoteError("The speech service rejected or failed the request".into())
        })?;
        let tts_ms = round_ms(remote_started.elapsed());

        if audio.is_empty() {
            return Err(AppError::RemoteError("The speech service returned no audio".into()));
        }

        let rate_per_million = self.pricing.rate_per_million(voice.tier);
        let estimated_cost = self.pricing.estimate_cost(voice.tier, char_count);
        let total_ms = round_ms(started.elapsed());

        tracing::info!(
            voice = %voice.name,
            tier = %voice.tier,
            chars = char_count,
            tts_ms,
            total_ms,
            "Synthesized {} bytes",
            audio.len()
        );

        Ok(SynthesisOutcome {
            audio,
            encoding: request.audio_encoding,
            mime_type: request.audio_encoding.mime_type(),
            input_type: request.input_type,
            voice,
            char_count,
            estimated_cost,
            rate_per_million,
            tts_ms,
            total_ms,
            started_at,
            warnings,
        })
    }
}

fn round_ms(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::testing::{remote_voice, FakeBackend, ManualClock};

    fn service(backend: Arc<FakeBackend>) -> TtsService {
        TtsService::new(
            backend,
            Arc::new(ManualClock::at_epoch()),
            Duration::from_secs(3600),
        )
    }

    fn backend() -> Arc<FakeBackend> {
        Arc::new(FakeBackend::with_voices(vec![
            remote_voice("en-US-Standard-A"),
            remote_voice("en-US-Chirp3-HD-Aoede"),
        ]))
    }

    fn request(voice: &str, input_type: InputType, text: &str) -> SynthesisRequest {
        SynthesisRequest {
            input_type,
            text: text.into(),
            voice_name: voice.into(),
            language_code: None,
            audio_encoding: AudioEncoding::Mp3,
            speaking_rate: None,
            pitch: None,
            volume_gain_db: None,
        }
    }

    #[tokio::test]
    async fn standard_hello_cost_and_mime() {
        let backend = backend();
        let svc = service(backend.clone());

        let out = svc
            .synthesize(request("en-US-Standard-A", InputType::Text, "Hello"))
            .await
            .unwrap();

        assert_eq!(out.voice.tier, PricingTier::Standard);
        assert_eq!(out.mime_type, "audio/mpeg");
        assert_eq!(out.char_count, 5);
        assert_eq!(out.rate_per_million, 4.0);
        assert_eq!(out.estimated_cost, (4.0 / 1_000_000.0) * 5.0);
        assert!(out.warnings.is_empty());
        assert!(out.total_ms >= out.tts_ms);

        let sent = backend.synth_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].input, SpeechInput::Text("Hello".into()));
        assert_eq!(sent[0].language_code, "en-US");
    }

    #[tokio::test]
    async fn markup_is_downgraded_for_restricted_tier() {
        let backend = backend();
        let svc = service(backend.clone());

        let mut req = request(
            "en-US-Chirp3-HD-Aoede",
            InputType::Ssml,
            "<speak>Hello <break time=\"300ms\"/>there</speak>",
        );
        req.speaking_rate = Some(1.5);
        req.volume_gain_db = Some(2.0);
        let raw_len = req.text.chars().count();

        let out = svc.synthesize(req).await.unwrap();

        assert_eq!(out.warnings.len(), 2);
        assert_eq!(out.input_type, InputType::Text);
        // Billing counts the tags that were sent by the caller
        assert_eq!(out.char_count, raw_len);

        let sent = backend.synth_requests();
        assert_eq!(sent[0].input, SpeechInput::Text("Hello there".into()));
        assert_eq!(sent[0].speaking_rate, None);
        assert_eq!(sent[0].volume_gain_db, Some(2.0));
    }

    #[tokio::test]
    async fn markup_kept_for_unrestricted_tier() {
        let backend = backend();
        let svc = service(backend.clone());

        svc.synthesize(request("en-US-Standard-A", InputType::Ssml, "<speak>Hi</speak>"))
            .await
            .unwrap();

        assert_eq!(
            backend.synth_requests()[0].input,
            SpeechInput::Ssml("<speak>Hi</speak>".into())
        );
    }

    #[tokio::test]
    async fn unknown_voice_never_reaches_remote() {
        let backend = backend();
        let svc = service(backend.clone());

        let err = svc
            .synthesize(request("xx-XX-Imaginary-Z", InputType::Text, "Hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnknownVoice(_)));
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert!(backend.synth_requests().is_empty());
    }

    #[tokio::test]
    async fn empty_audio_is_failure() {
        let backend = backend();
        backend.set_audio(Vec::new());
        let svc = service(backend.clone());

        let err = svc
            .synthesize(request("en-US-Standard-A", InputType::Text, "Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RemoteError(_)));
    }

    #[tokio::test]
    async fn remote_failure_is_remote_error() {
        let backend = backend();
        backend.fail_synthesis(true);
        let svc = service(backend.clone());

        let err = svc
            .synthesize(request("en-US-Standard-A", InputType::Text, "Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RemoteError(_)));
    }

    #[tokio::test]
    async fn voice_list_failure_is_remote_unavailable() {
        let backend = backend();
        backend.fail_listing(true);
        let svc = service(backend.clone());

        let err = svc
            .synthesize(request("en-US-Standard-A", InputType::Text, "Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RemoteUnavailable(_)));
        assert!(backend.synth_requests().is_empty());
    }

    #[tokio::test]
    async fn markup_with_no_text_is_rejected_after_downgrade() {
        let backend = backend();
        let svc = service(backend.clone());

        let err = svc
            .synthesize(request(
                "en-US-Chirp3-HD-Aoede",
                InputType::Ssml,
                "<speak><break time=\"1s\"/></speak>",
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest { .. }));
        assert!(backend.synth_requests().is_empty());
    }

    #[tokio::test]
    async fn language_override_is_forwarded() {
        let backend = backend();
        let svc = service(backend.clone());

        let mut req = request("en-US-Standard-A", InputType::Text, "Hello");
        req.language_code = Some("en-GB".into());
        svc.synthesize(req).await.unwrap();

        assert_eq!(backend.synth_requests()[0].language_code, "en-GB");
    }
}
