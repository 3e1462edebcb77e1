//! Ad Generation Brief
//!
//! The request body of `POST /api/generate`. A brief describes one store and
//! how the generated captions should sound. Deserialization accepts the
//! wire format; [`GenerateAdRequest::validate`] enforces the value ranges.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::shared::error::SharedError;

/// Maximum number of avoid-texts forwarded to the prompt
pub const MAX_AVOID_TEXTS: usize = 10;

/// Caption tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Casual,
    #[serde(rename = "professional")]
    Professional,
    Witty,
    #[serde(rename = "emotional")]
    Emotional,
    #[serde(rename = "urgent")]
    Urgent,
    #[serde(rename = "luxury")]
    Luxury,
}

impl Tone {
    /// Style rule injected into the prompt
    pub fn style_rule(self) -> &'static str {
        match self {
            Tone::Casual => "친근하고 일상적인 말투, 이모지 적절히 사용",
            Tone::Professional => "신뢰감 있는 존댓말, 간결하고 정확한 표현",
            Tone::Witty => "위트 있는 가벼운 유머를 한두 군데 사용",
            Tone::Emotional => "따뜻하고 감성적인 문장 위주",
            Tone::Urgent => "행동을 재촉하는 짧은 문장과 명확한 혜택 강조",
            Tone::Luxury => "절제된 어휘, 고급스러운 톤, 불필요한 감탄사 금지",
        }
    }
}

/// Opening hours, `HH:MM` or `HH:MM:SS` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    #[serde(serialize_with = "serialize_time", deserialize_with = "deserialize_time")]
    pub open: NaiveTime,
    #[serde(serialize_with = "serialize_time", deserialize_with = "deserialize_time")]
    pub close: NaiveTime,
}

impl BusinessHours {
    /// `HH:MM ~ HH:MM`
    pub fn display(&self) -> String {
        format!("{} ~ {}", self.open.format("%H:%M"), self.close.format("%H:%M"))
    }
}

fn serialize_time<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format("%H:%M:%S").to_string())
}

fn deserialize_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_time(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time: {raw}")))
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn default_hashtag_limit() -> u32 {
    15
}

fn default_num_variants() -> u32 {
    3
}

/// Generation brief
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateAdRequest {
    pub store_name: String,
    pub area_keywords: Vec<String>,
    pub address: String,
    pub price: String,
    pub business_hours: BusinessHours,
    pub category: String,
    pub store_intro: String,

    #[serde(default)]
    pub tone: Option<Tone>,
    #[serde(default)]
    pub reference_links: Option<Vec<String>>,
    #[serde(default)]
    pub product_service_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub target_customers: Option<Vec<String>>,
    #[serde(default)]
    pub instagram_id: Option<String>,
    #[serde(default)]
    pub promotions: Option<Vec<String>>,
    #[serde(default)]
    pub thumbnail_image: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default = "default_hashtag_limit")]
    pub hashtag_limit: u32,
    #[serde(default = "default_num_variants")]
    pub num_variants: u32,
    #[serde(default)]
    pub avoid_texts: Option<Vec<String>>,
}

impl GenerateAdRequest {
    /// Effective tone (Casual when absent)
    pub fn tone(&self) -> Tone {
        self.tone.unwrap_or_default()
    }

    /// First non-blank area keyword
    pub fn district(&self) -> Option<&str> {
        first_district(&self.area_keywords)
    }

    /// Check value ranges and URL fields
    pub fn validate(&self) -> Result<(), SharedError> {
        for (field, value) in [
            ("store_name", &self.store_name),
            ("address", &self.address),
            ("price", &self.price),
            ("category", &self.category),
            ("store_intro", &self.store_intro),
        ] {
            if value.trim().is_empty() {
                return Err(SharedError::validation(field, "must not be blank"));
            }
        }
        if !(1..=30).contains(&self.hashtag_limit) {
            return Err(SharedError::validation("hashtag_limit", "must be between 1 and 30"));
        }
        if !(1..=5).contains(&self.num_variants) {
            return Err(SharedError::validation("num_variants", "must be between 1 and 5"));
        }
        if let Some(url) = &self.thumbnail_image {
            check_http_url("thumbnail_image", url)?;
        }
        for url in self.reference_links.iter().flatten() {
            check_http_url("reference_links", url)?;
        }
        for url in self.image_urls.iter().flatten() {
            check_http_url("image_urls", url)?;
        }
        Ok(())
    }
}

/// First non-blank keyword, trimmed
pub fn first_district(keywords: &[String]) -> Option<&str> {
    keywords.iter().map(|k| k.trim()).find(|k| !k.is_empty())
}

fn check_http_url(field: &str, raw: &str) -> Result<(), SharedError> {
    match reqwest::Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(SharedError::validation(field, format!("invalid URL: {raw}"))),
    }
}
