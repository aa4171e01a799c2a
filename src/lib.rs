//! Lecture companion: turns pasted lecture text into a structured study guide
//! (summaries, quiz, flashcards, resources) using schema-guided generation.

pub mod config;
pub mod error;
pub mod gemini;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod render;
pub mod routes;
pub mod schema;

pub use error::GenerationError;
pub use models::{GenerationRequest, Language, StudyMaterial};
pub use pipeline::{parse_study_material, StudyPipeline};
