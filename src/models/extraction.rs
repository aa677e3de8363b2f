use serde::{Deserialize, Serialize};

/// Output of the text-extraction/correction adapter (stage 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    pub raw_text: String,
    pub confidence: f64,
}

/// Structured guess at the user's intent, as extracted by the entity
/// adapter. All fields are optional: the adapter returns its best effort
/// and the pipeline decides whether that is enough to continue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub date_phrase: Option<String>,
    #[serde(default)]
    pub time_phrase: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl Entities {
    /// Date and time phrases are the two fields normalization cannot
    /// proceed without.
    pub fn has_required_fields(&self) -> bool {
        self.date_phrase.is_some() && self.time_phrase.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityExtraction {
    pub entities: Entities,
    pub entities_confidence: f64,
}
