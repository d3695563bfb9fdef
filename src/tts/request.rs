use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::{AppError, FieldError};

pub const MAX_INPUT_CHARS: usize = 4000;
pub const SPEAKING_RATE_RANGE: RangeInclusive<f64> = 0.25..=4.0;
pub const PITCH_RANGE: RangeInclusive<f64> = -20.0..=20.0;
pub const VOLUME_GAIN_DB_RANGE: RangeInclusive<f64> = -96.0..=16.0;

lazy_static! {
    static ref LANGUAGE_TAG: Regex =
        Regex::new(r"^[a-zA-Z]{2,3}(-[a-zA-Z0-9]{2,8})*$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Ssml,
}

impl InputType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(InputType::Text),
            "ssml" => Some(InputType::Ssml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AudioEncoding {
    #[default]
    #[serde(rename = "MP3")]
    Mp3,
    #[serde(rename = "LINEAR16")]
    Linear16,
    #[serde(rename = "OGG_OPUS")]
    OggOpus,
    #[serde(rename = "MULAW")]
    Mulaw,
    #[serde(rename = "ALAW")]
    Alaw,
}

impl AudioEncoding {
    pub const ALL: [AudioEncoding; 5] = [
        AudioEncoding::Mp3,
        AudioEncoding::Linear16,
        AudioEncoding::OggOpus,
        AudioEncoding::Mulaw,
        AudioEncoding::Alaw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::OggOpus => "OGG_OPUS",
            AudioEncoding::Mulaw => "MULAW",
            AudioEncoding::Alaw => "ALAW",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == value)
    }

    pub fn mime_type(&self) -> &'static str {
        mime_type_for(self.as_str())
    }
}

/// Fixed encoding-name to MIME mapping.
pub fn mime_type_for(encoding: &str) -> &'static str {
    match encoding {
        "MP3" => "audio/mpeg",
        "LINEAR16" => "audio/wav",
        "OGG_OPUS" => "audio/ogg",
        "MULAW" => "audio/basic",
        "ALAW" => "audio/x-alaw-basic",
        _ => "application/octet-stream",
    }
}

/// `POST /synthesize` body as it arrives on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeBody {
    pub input_type: Option<String>,
    pub text: Option<String>,
    pub voice_name: Option<String>,
    pub language_code: Option<String>,
    pub audio_encoding: Option<String>,
    pub speaking_rate: Option<f64>,
    pub pitch: Option<f64>,
    pub volume_gain_db: Option<f64>,
}

/// A validated synthesis request.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub input_type: InputType,
    pub text: String,
    pub voice_name: String,
    pub language_code: Option<String>,
    pub audio_encoding: AudioEncoding,
    pub speaking_rate: Option<f64>,
    pub pitch: Option<f64>,
    pub volume_gain_db: Option<f64>,
}

impl SynthesisRequest {
    /// Billed size: the raw input, markup included.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

impl TryFrom<SynthesizeBody> for SynthesisRequest {
    type Error = AppError;

    fn try_from(body: SynthesizeBody) -> Result<Self, AppError> {
        let mut errors = Vec::new();

        let input_type = match body.input_type.as_deref() {
            None => InputType::Text,
            Some(raw) => InputType::parse(raw).unwrap_or_else(|| {
                errors.push(FieldError::new("inputType", "must be one of: text, ssml"));
                InputType::Text
            }),
        };

        let text = body.text.unwrap_or_default();
        let chars = text.chars().count();
        if text.trim().is_empty() {
            errors.push(FieldError::new("text", "must not be empty"));
        } else if chars > MAX_INPUT_CHARS {
            errors.push(FieldError::new(
                "text",
                format!("must be at most {} characters (got {})", MAX_INPUT_CHARS, chars),
            ));
        }

        let voice_name = body.voice_name.unwrap_or_default().trim().to_string();
        if voice_name.is_empty() {
            errors.push(FieldError::new("voiceName", "is required"));
        }

        let language_code = body
            .language_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());
        if let Some(code) = &language_code {
            if !LANGUAGE_TAG.is_match(code) {
                errors.push(FieldError::new("languageCode", "must be a language tag like en-US"));
            }
        }

        let audio_encoding = match body.audio_encoding.as_deref() {
            None => AudioEncoding::default(),
            Some(raw) => AudioEncoding::parse(raw).unwrap_or_else(|| {
                let allowed: Vec<&str> = AudioEncoding::ALL.iter().map(|e| e.as_str()).collect();
                errors.push(FieldError::new(
                    "audioEncoding",
                    format!("must be one of: {}", allowed.join(", ")),
                ));
                AudioEncoding::default()
            }),
        };

        check_range(&mut errors, "speakingRate", body.speaking_rate, &SPEAKING_RATE_RANGE);
        check_range(&mut errors, "pitch", body.pitch, &PITCH_RANGE);
        check_range(&mut errors, "volumeGainDb", body.volume_gain_db, &VOLUME_GAIN_DB_RANGE);

        if !errors.is_empty() {
            return Err(AppError::invalid_fields(errors));
        }

        Ok(Self {
            input_type,
            text,
            voice_name,
            language_code,
            audio_encoding,
            speaking_rate: body.speaking_rate,
            pitch: body.pitch,
            volume_gain_db: body.volume_gain_db,
        })
    }
}

fn check_range(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<f64>,
    range: &RangeInclusive<f64>,
) {
    if let Some(v) = value {
        if !range.contains(&v) {
            errors.push(FieldError::new(
                field,
                format!("must be between {} and {}", range.start(), range.end()),
            ));
        }
    }
}
