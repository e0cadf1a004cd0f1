use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentiment label derived from the sign of a sentence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    /// Only reachable when the score is not comparable to zero (NaN).
    Unknown,
}

impl Sentiment {
    pub fn from_score(score: f32) -> Self {
        match score.partial_cmp(&0.0) {
            Some(Ordering::Greater) => Sentiment::Positive,
            Some(Ordering::Less) => Sentiment::Negative,
            Some(Ordering::Equal) => Sentiment::Neutral,
            None => Sentiment::Unknown,
        }
    }
}

/// One occurrence of an entity within a sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionRecord {
    pub text: String,
    #[serde(rename = "type")]
    pub mention_type: String,
}

/// A named entity found in a sentence, normalized from the language API.
///
/// `entity_type` and `mention_type` values come from the external taxonomy
/// (PERSON, LOCATION, PROPER, ...) and are passed through as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub salience: f32,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub mentions: Vec<MentionRecord>,
}

/// One persisted unit per analyzed sentence. The store-assigned id lives
/// outside the record; the store is the sole owner of persisted identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub sentiment: Sentiment,
    pub entities: Vec<EntityRecord>,
}

/// Per-sentence output of the language client, before persistence.
#[derive(Debug, Clone)]
pub struct SentenceAnalysis {
    pub text: String,
    pub score: f32,
    pub magnitude: f32,
    pub entities: Vec<EntityRecord>,
}
