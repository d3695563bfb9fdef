use serde::Serialize;

use crate::tts::backend::RemoteVoice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingTier {
    Studio,
    Neural2,
    Wavenet,
    Standard,
    Chirp,
    Polyglot,
    Other,
}

/// Name patterns checked in order; the first match wins.
const TIER_PATTERNS: &[(&str, PricingTier)] = &[
    ("-Studio-", PricingTier::Studio),
    ("-Neural", PricingTier::Neural2),
    ("-Wavenet-", PricingTier::Wavenet),
    ("-Standard-", PricingTier::Standard),
    ("-Chirp", PricingTier::Chirp),
    ("-Polyglot-", PricingTier::Polyglot),
];

impl PricingTier {
    pub fn classify(voice_name: &str) -> Self {
        TIER_PATTERNS
            .iter()
            .find(|(pattern, _)| voice_name.contains(pattern))
            .map(|(_, tier)| *tier)
            .unwrap_or(PricingTier::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PricingTier::Studio => "STUDIO",
            PricingTier::Neural2 => "NEURAL2",
            PricingTier::Wavenet => "WAVENET",
            PricingTier::Standard => "STANDARD",
            PricingTier::Chirp => "CHIRP",
            PricingTier::Polyglot => "POLYGLOT",
            PricingTier::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for PricingTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Neutral,
    Unspecified,
}

impl Gender {
    pub fn from_remote(value: &str) -> Self {
        match value {
            "MALE" => Gender::Male,
            "FEMALE" => Gender::Female,
            "NEUTRAL" => Gender::Neutral,
            _ => Gender::Unspecified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    pub name: String,
    pub language_codes: Vec<String>,
    pub ssml_gender: Gender,
    pub natural_sample_rate_hertz: Option<u32>,
    pub tier: PricingTier,
}

impl Voice {
    pub fn from_remote(remote: RemoteVoice) -> Self {
        let tier = PricingTier::classify(&remote.name);
        Self {
            tier,
            ssml_gender: remote
                .ssml_gender
                .as_deref()
                .map(Gender::from_remote)
                .unwrap_or(Gender::Unspecified),
            natural_sample_rate_hertz: remote.natural_sample_rate_hertz.filter(|hz| *hz > 0),
            language_codes: remote.language_codes,
            name: remote.name,
        }
    }

    /// Language for a request: explicit override, else the voice's first
    /// language, else the locale prefix of the name (e.g. `en-US-Standard-A`).
    pub fn resolve_language(&self, requested: Option<&str>) -> String {
        if let Some(code) = requested {
            return code.to_string();
        }
        if let Some(first) = self.language_codes.first() {
            return first.clone();
        }
        self.name.splitn(3, '-').take(2).collect::<Vec<_>>().join("-")
    }
}
