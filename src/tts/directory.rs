use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::tts::backend::TtsBackend;
use crate::tts::voice::Voice;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One fetched voice list. Replaced wholesale on refresh.
#[derive(Debug)]
pub struct DirectorySnapshot {
    pub voices: Vec<Voice>,
    pub fetched_at: DateTime<Utc>,
}

impl DirectorySnapshot {
    pub fn find(&self, name: &str) -> Option<&Voice> {
        self.voices.iter().find(|v| v.name == name)
    }
}

/// Process-wide voice list cache.
///
/// Reads are lock-free. Callers that see an expired snapshot at the same
/// moment may each refresh; the last successful fetch is the one kept. A
/// failed refresh is an error even if an older snapshot exists.
pub struct VoiceDirectory {
    backend: Arc<dyn TtsBackend>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    current: ArcSwapOption<DirectorySnapshot>,
}

impl VoiceDirectory {
    pub fn new(backend: Arc<dyn TtsBackend>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            backend,
            clock,
            ttl,
            current: ArcSwapOption::empty(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_voices(&self) -> Result<Arc<DirectorySnapshot>, AppError> {
        let now = self.clock.now();

        if let Some(snapshot) = self.current.load_full() {
            if self.is_fresh(&snapshot, now) {
                tracing::debug!(count = snapshot.voices.len(), "Voice list served from cache");
                return Ok(snapshot);
            }
        }

        let remote = self.backend.list_voices().await.map_err(|e| {
            tracing::error!("Voice list fetch failed: {}", e);
            AppError::RemoteUnavailable(e.to_string())
        })?;

        let voices: Vec<Voice> = remote.into_iter().map(Voice::from_remote).collect();
        tracing::info!(count = voices.len(), "Voice list refreshed");

        let snapshot = Arc::new(DirectorySnapshot {
            voices,
            fetched_at: now,
        });
        self.current.store(Some(Arc::clone(&snapshot)));

        Ok(snapshot)
    }

    fn is_fresh(&self, snapshot: &DirectorySnapshot, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(snapshot.fetched_at).to_std() {
            Ok(age) => age < self.ttl,
            // Fetched "in the future" after a clock step back
            Err(_) => true,
        }
    }
}
