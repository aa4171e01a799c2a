use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{GenerationError, Result};
use crate::models::{GenerationRequest, Language, StudyMaterial};
use crate::prompt::build_instruction;
use crate::provider::GenerationProvider;
use crate::schema::study_material_schema;

/// Turns raw provider output into a validated [`StudyMaterial`].
///
/// No partial results: the payload is either fully usable or rejected.
pub fn parse_study_material(raw: &str, language: Language) -> Result<StudyMaterial> {
    let text = raw.trim();
    if !text.starts_with('{') && !text.starts_with('[') {
        warn!("Received non-JSON response: {}", text.chars().take(200).collect::<String>());
        return Err(GenerationError::MalformedOutput("response is not a JSON document".into()));
    }

    let mut value: Value = serde_json::from_str(text)
        .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?;

    study_material_schema(language).validate(&value)?;

    if language == Language::Hindi {
        let removed = value
            .get_mut("simplified")
            .and_then(Value::as_object_mut)
            .and_then(|s| s.remove("hindi"));
        if removed.is_some_and(|v| !v.is_null()) {
            warn!("Dropping simplified.hindi returned for a Hindi request");
        }
    }

    let mut material: StudyMaterial = serde_json::from_value(value)
        .map_err(|e| GenerationError::mismatch("$", e.to_string()))?;

    if material.simplified.hindi.as_deref().is_some_and(|h| h.trim().is_empty()) {
        material.simplified.hindi = None;
    }
    if language == Language::English && material.simplified.hindi.is_none() {
        warn!("Response has no Hindi explanation for an English request");
    }
    let mismatched = material.quiz.mcq.iter().filter(|m| !m.answer_matches_option()).count();
    if mismatched > 0 {
        warn!("{} multiple-choice answer(s) do not match any option", mismatched);
    }

    Ok(material)
}

/// The generation pipeline: build the instruction, make one provider call,
/// validate what comes back. Holds no per-request state.
#[derive(Clone)]
pub struct StudyPipeline {
    provider: Arc<dyn GenerationProvider>,
}

impl StudyPipeline {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn generate(&self, lecture_text: &str, language: Language) -> Result<StudyMaterial> {
        let request = GenerationRequest::new(lecture_text, language)?;
        self.run(&request).await
    }

    pub async fn run(&self, request: &GenerationRequest) -> Result<StudyMaterial> {
        let instruction = build_instruction(request);
        info!(
            "🎯 Generating study material ({}, {} chars) via {}",
            request.language,
            request.lecture_text.chars().count(),
            self.provider.name()
        );

        let raw = self.provider.generate(&instruction.prompt, &instruction.schema).await?;
        let material = parse_study_material(&raw, request.language)?;

        info!(
            "✅ Study material ready: {} mcq, {} flashcards, {} resources",
            material.quiz.mcq.len(),
            material.quiz.flashcards.len(),
            material.resources.len()
        );
        Ok(material)
    }
}
