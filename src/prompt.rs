use serde_json::Value;

use crate::models::{GenerationRequest, Language};
use crate::schema::study_material_schema;

/// Everything the provider needs for one call.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub prompt: String,
    pub schema: Value,
}

pub fn build_instruction(request: &GenerationRequest) -> Instruction {
    Instruction {
        prompt: build_prompt(request),
        schema: study_material_schema(request.language).to_provider_schema(),
    }
}

fn simplified_section(language: Language) -> &'static str {
    match language {
        Language::English => "   - `beginner_friendly`: A simple explanation in English.\n   - `hindi`: A simple explanation in Hindi.",
        Language::Hindi => "   - `beginner_friendly`: A simple explanation in Hindi. (Important: Do NOT generate a separate 'hindi' field in this case).",
    }
}

fn language_rule(language: Language) -> &'static str {
    match language {
        Language::English => "With the exception of the 'simplified.hindi' field which must always be in Hindi and must be included, all other textual output MUST be in English.",
        Language::Hindi => "All textual output MUST be in Hindi.",
    }
}

pub fn build_prompt(request: &GenerationRequest) -> String {
    let lecture = &request.lecture_text;
    let rule = language_rule(request.language);
    let simplified = simplified_section(request.language);
    format!(
        "You are an AI Lecture Companion and Study Guide Generator. Your output must be a single JSON object that conforms to the provided schema.

Lecture Content:
---
{lecture}
---

Based on the lecture content, generate a comprehensive study guide.
{rule}

Generate the following structured data:

1. **summary**: An object with three levels of summary.
   - `ultra_short`: A 1-2 line, tweet-length summary.
   - `medium`: A list of key bullet points.
   - `detailed`: A detailed paragraph explanation, including examples.

2. **visualization**: An object for concept visualization.
   - `ideas`: Textual ideas for diagrams like flowcharts or mind maps.
   - `mermaid`: Optional Mermaid.js code for a diagram.

3. **quiz**: An object containing various question types.
   - `mcq`: A list of multiple-choice questions, each with a 'q', 'options' array, and 'answer'. The answer must be one of the options.
   - `short_answer`: A list of short answer question strings.
   - `flashcards`: A list of flashcards, each with a 'front' and 'back'.
   - `critical_thinking`: A list of open-ended critical thinking questions.

4. **simplified**: An object with simplified explanations.
{simplified}

5. **resources**: A list of 2-3 external learning resources.
   - Each resource should have a 'type' (e.g., book, video), 'title', and 'link' (URL).
"
    )
}
