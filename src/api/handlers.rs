use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::{
    AudioPayload, BillingEstimate, CacheInfo, HealthResponse, InputMetrics, Metrics,
    PricingResponse, ServerMetrics, SynthesizeResponse, VoicesResponse,
};
use crate::api::routes::AppState;
use crate::error::AppError;
use crate::tts::pricing::{CURRENCY, PRICING_NOTE};
use crate::tts::request::{SynthesisRequest, SynthesizeBody};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        time: Utc::now(),
    })
}

pub async fn pricing(State(state): State<Arc<AppState>>) -> Json<PricingResponse> {
    let table = state.tts.pricing();
    Json(PricingResponse {
        currency: CURRENCY,
        per_1m_characters_usd: table.rates().clone(),
        default_per_1m_characters_usd: table.default_rate(),
        note: PRICING_NOTE,
    })
}

pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VoicesResponse>, AppError> {
    let directory = state.tts.directory();
    let snapshot = directory.get_voices().await?;

    let languages: BTreeSet<&String> = snapshot
        .voices
        .iter()
        .flat_map(|v| v.language_codes.iter())
        .collect();
    let mut tiers: Vec<_> = snapshot.voices.iter().map(|v| v.tier).collect();
    tiers.sort_by_key(|t| t.as_str());
    tiers.dedup();

    Ok(Json(VoicesResponse {
        languages: languages.into_iter().cloned().collect(),
        tiers,
        restrictions: state.tts.capabilities().restrictions().clone(),
        cache: CacheInfo {
            ttl_seconds: directory.ttl().as_secs(),
            last_fetch_iso: snapshot.fetched_at,
            count: snapshot.voices.len(),
        },
        voices: snapshot.voices.clone(),
    }))
}

pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SynthesizeBody>, JsonRejection>,
) -> Result<Json<SynthesizeResponse>, AppError> {
    // Validate input
    let Json(body) = payload?;
    let request = SynthesisRequest::try_from(body)?;

    let outcome = state.tts.synthesize(request).await?;

    Ok(Json(SynthesizeResponse {
        audio: AudioPayload {
            base64: STANDARD.encode(&outcome.audio),
            mime_type: outcome.mime_type,
            encoding: outcome.encoding.as_str(),
        },
        metrics: Metrics {
            server: ServerMetrics {
                tts_ms: outcome.tts_ms,
                total_ms: outcome.total_ms,
                started_at_iso: outcome.started_at,
            },
            input: InputMetrics {
                char_count: outcome.char_count,
                input_type: outcome.input_type,
            },
            billing_estimate: BillingEstimate {
                currency: CURRENCY,
                estimated_cost_usd: outcome.estimated_cost,
                per_1m_characters_usd: outcome.rate_per_million,
            },
        },
        voice: outcome.voice,
        warnings: outcome.warnings,
    }))
}
