//! Deterministic stand-ins for the remote service and the wall clock.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::tts::backend::{BackendError, RemoteVoice, SpeechRequest, TtsBackend};
use crate::tts::directory::Clock;

pub fn remote_voice(name: &str) -> RemoteVoice {
    let locale = name.splitn(3, '-').take(2).collect::<Vec<_>>().join("-");
    RemoteVoice {
        name: name.to_string(),
        language_codes: vec![locale],
        ssml_gender: Some("FEMALE".into()),
        natural_sample_rate_hertz: Some(24000),
    }
}

pub struct FakeBackend {
    voices: Vec<RemoteVoice>,
    audio: Mutex<Vec<u8>>,
    fail_listing: AtomicBool,
    fail_synthesis: AtomicBool,
    list_calls: AtomicUsize,
    synth_requests: Mutex<Vec<SpeechRequest>>,
}

impl FakeBackend {
    pub fn with_voices(voices: Vec<RemoteVoice>) -> Self {
        Self {
            voices,
            audio: Mutex::new(b"ID3fake-mp3".to_vec()),
            fail_listing: AtomicBool::new(false),
            fail_synthesis: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            synth_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_audio(&self, audio: Vec<u8>) {
        *self.audio.lock().unwrap() = audio;
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn fail_synthesis(&self, fail: bool) {
        self.fail_synthesis.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn synth_requests(&self) -> Vec<SpeechRequest> {
        self.synth_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TtsBackend for FakeBackend {
    async fn list_voices(&self) -> Result<Vec<RemoteVoice>, BackendError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.voices.clone())
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, BackendError> {
        self.synth_requests.lock().unwrap().push(request.clone());
        if self.fail_synthesis.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: 429,
                body: "quota exceeded".into(),
            });
        }
        Ok(self.audio.lock().unwrap().clone())
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at_epoch() -> Self {
        Self {
            now: Mutex::new(Utc.timestamp_opt(0, 0).unwrap()),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
