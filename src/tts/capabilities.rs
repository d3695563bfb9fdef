use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::tts::request::{InputType, SynthesisRequest};
use crate::tts::voice::PricingTier;

lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref CDATA: Regex = Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap();
    static ref MARKUP_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref ENTITY: Regex =
        Regex::new(r"&(amp|lt|gt|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// A request feature some tiers reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestFeature {
    Ssml,
    SpeakingRate,
    Pitch,
}

/// Tier to disallowed features. Consulted once per request.
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    restrictions: BTreeMap<PricingTier, Vec<RequestFeature>>,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self {
            restrictions: BTreeMap::from([
                (
                    PricingTier::Chirp,
                    vec![
                        RequestFeature::Ssml,
                        RequestFeature::SpeakingRate,
                        RequestFeature::Pitch,
                    ],
                ),
                (PricingTier::Studio, vec![RequestFeature::Pitch]),
            ]),
        }
    }
}

impl CapabilityTable {
    pub fn disallowed(&self, tier: PricingTier) -> &[RequestFeature] {
        self.restrictions
            .get(&tier)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn restrictions(&self) -> &BTreeMap<PricingTier, Vec<RequestFeature>> {
        &self.restrictions
    }

    /// Drops whatever the tier rejects and returns one warning per downgrade.
    pub fn apply(&self, tier: PricingTier, request: &mut SynthesisRequest) -> Vec<String> {
        let mut warnings = Vec::new();

        for feature in self.disallowed(tier) {
            match feature {
                RequestFeature::Ssml if request.input_type == InputType::Ssml => {
                    request.input_type = InputType::Text;
                    request.text = strip_markup(&request.text);
                    warnings.push(format!(
                        "{} voices do not accept SSML; the input was sent as plain text with tags removed.",
                        tier
                    ));
                }
                RequestFeature::SpeakingRate if request.speaking_rate.is_some() => {
                    request.speaking_rate = None;
                    warnings.push(format!(
                        "{} voices do not support speaking rate; it was ignored.",
                        tier
                    ));
                }
                RequestFeature::Pitch if request.pitch.is_some() => {
                    request.pitch = None;
                    warnings.push(format!("{} voices do not support pitch; it was ignored.", tier));
                }
                _ => {}
            }
        }

        warnings
    }
}

/// Reduces SSML to the text it would speak: comments dropped, tags removed,
/// entities decoded, CDATA content kept verbatim.
pub fn strip_markup(input: &str) -> String {
    let input = COMMENT.replace_all(input, " ");
    let mut output = String::new();
    let mut last_end = 0;

    for cap in CDATA.captures_iter(&input) {
        let m = cap.get(0).unwrap();
        output.push_str(&markup_to_text(&input[last_end..m.start()]));
        output.push_str(cap.get(1).map_or("", |c| c.as_str()));
        last_end = m.end();
    }
    output.push_str(&markup_to_text(&input[last_end..]));

    WHITESPACE.replace_all(&output, " ").trim().to_string()
}

fn markup_to_text(fragment: &str) -> String {
    let without_tags = MARKUP_TAG.replace_all(fragment, " ");
    ENTITY
        .replace_all(&without_tags, |cap: &regex::Captures| decode_entity(&cap[1], &cap[0]))
        .into_owned()
}

fn decode_entity(name: &str, raw: &str) -> String {
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = match name.strip_prefix("#x") {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => name[1..].parse().ok(),
            };
            code.and_then(char::from_u32)
        }
    };
    decoded.map_or_else(|| raw.to_string(), String::from)
}
