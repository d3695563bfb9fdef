pub mod handlers;
pub mod routes;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::tts::capabilities::RequestFeature;
use crate::tts::{InputType, PricingTier, Voice};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResponse {
    pub currency: &'static str,
    #[serde(rename = "per1MCharactersUsd")]
    pub per_1m_characters_usd: BTreeMap<PricingTier, f64>,
    #[serde(rename = "defaultPer1MCharactersUsd")]
    pub default_per_1m_characters_usd: f64,
    pub note: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicesResponse {
    pub voices: Vec<Voice>,
    pub languages: Vec<String>,
    pub tiers: Vec<PricingTier>,
    pub restrictions: BTreeMap<PricingTier, Vec<RequestFeature>>,
    pub cache: CacheInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub ttl_seconds: u64,
    pub last_fetch_iso: DateTime<Utc>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    pub audio: AudioPayload,
    pub voice: Voice,
    pub metrics: Metrics,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPayload {
    pub base64: String,
    pub mime_type: &'static str,
    pub encoding: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub server: ServerMetrics,
    pub input: InputMetrics,
    pub billing_estimate: BillingEstimate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMetrics {
    pub tts_ms: u64,
    pub total_ms: u64,
    pub started_at_iso: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputMetrics {
    pub char_count: usize,
    pub input_type: InputType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingEstimate {
    pub currency: &'static str,
    pub estimated_cost_usd: f64,
    #[serde(rename = "per1MCharactersUsd")]
    pub per_1m_characters_usd: f64,
}
