use serde::{Serialize, Deserialize};
use serde_with::skip_serializing_none;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{GenerationError, Result};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One user action: the pasted lecture and the language to answer in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub lecture_text: String,
    pub language: Language,
}

impl GenerationRequest {
    pub fn new(lecture_text: impl Into<String>, language: Language) -> Result<Self> {
        let lecture_text = lecture_text.into();
        if lecture_text.trim().is_empty() {
            return Err(GenerationError::EmptyInput);
        }
        Ok(Self { lecture_text, language })
    }
}

// --- StudyMaterial ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StudyMaterial {
    pub summary: Summary,
    pub visualization: Visualization,
    pub quiz: Quiz,
    pub simplified: Simplified,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Summary {
    pub ultra_short: String,
    pub medium: Vec<String>,
    pub detailed: String,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Visualization {
    pub ideas: Vec<String>,
    #[serde(default)]
    pub mermaid: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub mcq: Vec<Mcq>,
    pub short_answer: Vec<String>,
    pub flashcards: Vec<Flashcard>,
    pub critical_thinking: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Mcq {
    #[serde(rename = "q")]
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl Mcq {
    /// The provider is asked for, but not held to, an answer that is one of the options.
    pub fn answer_matches_option(&self) -> bool {
        self.options.iter().any(|o| o.trim() == self.answer.trim())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Simplified {
    pub beginner_friendly: String,
    #[serde(default)]
    pub hindi: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(rename = "link")]
    pub url: String,
}

// --- HTTP envelopes ---

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerateBody {
    pub lecture_text: String,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerateResponse {
    pub request_id: Uuid,
    pub language: Language,
    pub generated_at: DateTime<Utc>,
    pub material: StudyMaterial,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_lecture_text_is_rejected() {
        assert_eq!(GenerationRequest::new("", Language::English), Err(GenerationError::EmptyInput));
        assert_eq!(GenerationRequest::new(" \n\t ", Language::Hindi), Err(GenerationError::EmptyInput));
    }

    #[test]
    fn lecture_text_is_kept_verbatim() {
        let req = GenerationRequest::new("  Photosynthesis 101  ", Language::Hindi).unwrap();
        assert_eq!(req.lecture_text, "  Photosynthesis 101  ");
        assert_eq!(req.language, Language::Hindi);
    }

    #[test]
    fn language_wire_names() {
        assert_eq!(serde_json::to_string(&Language::English).unwrap(), "\"English\"");
        let hindi: Language = serde_json::from_str("\"Hindi\"").unwrap();
        assert_eq!(hindi, Language::Hindi);
        assert!(serde_json::from_str::<Language>("\"French\"").is_err());
    }

    #[test]
    fn body_language_defaults_to_english() {
        let body: GenerateBody = serde_json::from_str(r#"{"lecture_text":"cells"}"#).unwrap();
        assert_eq!(body.language, Language::English);
    }

    #[test]
    fn renamed_fields_use_provider_names() {
        let mcq = Mcq { question: "2+2?".into(), options: vec!["3".into(), "4".into()], answer: "4".into() };
        let res = Resource { kind: "video".into(), title: "Intro".into(), url: "https://example.com".into() };
        let mcq_json = serde_json::to_value(&mcq).unwrap();
        let res_json = serde_json::to_value(&res).unwrap();
        assert_eq!(mcq_json["q"], "2+2?");
        assert_eq!(res_json["type"], "video");
        assert_eq!(res_json["link"], "https://example.com");
        assert!(mcq.answer_matches_option());
    }

    #[test]
    fn absent_optionals_are_not_serialized_as_null() {
        let simplified = Simplified { beginner_friendly: "easy".into(), hindi: None };
        let viz = Visualization { ideas: vec![], mermaid: None };
        assert_eq!(serde_json::to_string(&simplified).unwrap(), r#"{"beginner_friendly":"easy"}"#);
        assert_eq!(serde_json::to_string(&viz).unwrap(), r#"{"ideas":[]}"#);
    }
}
