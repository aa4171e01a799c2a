//! Declarative description of the study-material output shape.
//!
//! The same tree is serialized into the provider's `responseSchema` and used
//! to validate whatever comes back, so the two can never drift apart.

use serde_json::{json, Map, Value};

use crate::error::{GenerationError, Result};
use crate::models::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Required by the provider schema and enforced on parse.
    Required,
    /// Required by the provider schema, tolerated as absent on parse.
    Requested,
    /// Never required.
    Optional,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    String,
    Array(Box<SchemaNode>),
    Object(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: Kind,
    pub description: Option<&'static str>,
    /// Strings only: reject blank values.
    pub non_empty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub node: SchemaNode,
    pub presence: Presence,
}

impl SchemaNode {
    pub fn string() -> Self {
        Self { kind: Kind::String, description: None, non_empty: false }
    }

    pub fn array(items: SchemaNode) -> Self {
        Self { kind: Kind::Array(Box::new(items)), description: None, non_empty: false }
    }

    pub fn object(fields: Vec<Field>) -> Self {
        Self { kind: Kind::Object(fields), description: None, non_empty: false }
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    pub fn required(self, name: &'static str) -> Field {
        Field { name, node: self, presence: Presence::Required }
    }

    pub fn requested(self, name: &'static str) -> Field {
        Field { name, node: self, presence: Presence::Requested }
    }

    pub fn optional(self, name: &'static str) -> Field {
        Field { name, node: self, presence: Presence::Optional }
    }

    /// Looks up a nested field by dotted path, e.g. `simplified.hindi`.
    pub fn field(&self, path: &str) -> Option<&Field> {
        let mut node = self;
        let mut found = None;
        for segment in path.split('.') {
            let Kind::Object(fields) = &node.kind else { return None };
            let field = fields.iter().find(|f| f.name == segment)?;
            node = &field.node;
            found = Some(field);
        }
        found
    }

    /// Renders the tree in the Gemini `responseSchema` dialect.
    pub fn to_provider_schema(&self) -> Value {
        let mut out = Map::new();
        match &self.kind {
            Kind::String => {
                out.insert("type".into(), json!("STRING"));
            }
            Kind::Array(items) => {
                out.insert("type".into(), json!("ARRAY"));
                out.insert("items".into(), items.to_provider_schema());
            }
            Kind::Object(fields) => {
                out.insert("type".into(), json!("OBJECT"));
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.name.to_string(), f.node.to_provider_schema()))
                    .collect();
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|f| f.presence != Presence::Optional)
                    .map(|f| f.name)
                    .collect();
                out.insert("properties".into(), Value::Object(properties));
                out.insert("required".into(), json!(required));
            }
        }
        if let Some(description) = self.description {
            out.insert("description".into(), json!(description));
        }
        Value::Object(out)
    }

    /// Checks a decoded payload against the tree. Extra keys are ignored and
    /// `null` counts as absent.
    pub fn validate(&self, value: &Value) -> Result<()> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<()> {
        match (&self.kind, value) {
            (Kind::String, Value::String(s)) => {
                if self.non_empty && s.trim().is_empty() {
                    return Err(GenerationError::mismatch(path, "is empty"));
                }
                Ok(())
            }
            (Kind::Array(items), Value::Array(values)) => {
                for (i, v) in values.iter().enumerate() {
                    items.validate_at(v, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }
            (Kind::Object(fields), Value::Object(map)) => {
                for field in fields {
                    let child_path = if path == "$" { field.name.to_string() } else { format!("{path}.{}", field.name) };
                    match map.get(field.name) {
                        None | Some(Value::Null) => {
                            if field.presence == Presence::Required {
                                return Err(GenerationError::mismatch(child_path, "is missing"));
                            }
                        }
                        Some(v) => field.node.validate_at(v, &child_path)?,
                    }
                }
                Ok(())
            }
            (kind, _) => Err(GenerationError::mismatch(path, format!("should be {}", kind_name(kind)))),
        }
    }
}

fn kind_name(kind: &Kind) -> &'static str {
    match kind {
        Kind::String => "a string",
        Kind::Array(_) => "a list",
        Kind::Object(_) => "an object",
    }
}

fn string_list() -> SchemaNode {
    SchemaNode::array(SchemaNode::string())
}

/// The full output shape for one request. When the lecture language is Hindi
/// the separate `simplified.hindi` field is left out entirely.
pub fn study_material_schema(language: Language) -> SchemaNode {
    let summary = SchemaNode::object(vec![
        SchemaNode::string().non_empty().describe("An ultra-short, tweet-length (1-2 lines) summary.").required("ultra_short"),
        string_list().describe("A medium-length summary as bullet points.").required("medium"),
        SchemaNode::string().describe("A detailed paragraph-style summary with examples.").required("detailed"),
    ]);

    let visualization = SchemaNode::object(vec![
        string_list().describe("Ideas for visualizing concepts (flowcharts, mind maps).").required("ideas"),
        SchemaNode::string().describe("Optional Mermaid.js code for a diagram.").optional("mermaid"),
    ]);

    let mcq = SchemaNode::object(vec![
        SchemaNode::string().describe("The question text.").required("q"),
        string_list().describe("A list of options.").required("options"),
        SchemaNode::string().describe("The correct answer.").required("answer"),
    ]);
    let flashcard = SchemaNode::object(vec![
        SchemaNode::string().required("front"),
        SchemaNode::string().required("back"),
    ]);
    let quiz = SchemaNode::object(vec![
        SchemaNode::array(mcq).describe("Multiple Choice Questions.").required("mcq"),
        string_list().describe("Short answer questions.").required("short_answer"),
        SchemaNode::array(flashcard).describe("Flashcards with a front (question) and back (answer).").required("flashcards"),
        string_list().describe("Critical thinking questions.").required("critical_thinking"),
    ]);

    let mut simplified_fields = vec![SchemaNode::string()
        .non_empty()
        .describe("A simple explanation for beginners.")
        .required("beginner_friendly")];
    if language == Language::English {
        simplified_fields.push(
            SchemaNode::string()
                .describe("A simple explanation in Hindi, always written in Hindi.")
                .requested("hindi"),
        );
    }
    let simplified = SchemaNode::object(simplified_fields);

    let resource = SchemaNode::object(vec![
        SchemaNode::string().describe("Type of resource (e.g., 'book', 'video', 'article').").required("type"),
        SchemaNode::string().required("title"),
        SchemaNode::string().describe("URL to the resource.").required("link"),
    ]);

    SchemaNode::object(vec![
        summary.required("summary"),
        visualization.required("visualization"),
        quiz.required("quiz"),
        simplified.required("simplified"),
        SchemaNode::array(resource).describe("External resources for deeper learning.").required("resources"),
    ])
}
