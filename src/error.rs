use thiserror::Error;

/// Every way a study-material generation can fail.
///
/// The `Display` text is what the user sees, one message per failure class.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Please enter some lecture text.")]
    EmptyInput,

    #[error("Missing API key: set the {env_var} environment variable")]
    MissingCredential { env_var: String },

    #[error("Failed to generate study material: {0}")]
    Provider(String),

    #[error("The AI returned an invalid format. Please try again. ({0})")]
    MalformedOutput(String),

    #[error("The AI response was incomplete: {path} {problem}. Please try again.")]
    SchemaMismatch { path: String, problem: String },
}

impl GenerationError {
    /// Stable tag for API clients and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::EmptyInput => "empty_input",
            GenerationError::MissingCredential { .. } => "missing_credential",
            GenerationError::Provider(_) => "provider_error",
            GenerationError::MalformedOutput(_) => "malformed_output",
            GenerationError::SchemaMismatch { .. } => "schema_mismatch",
        }
    }

    pub(crate) fn mismatch(path: impl Into<String>, problem: impl Into<String>) -> Self {
        GenerationError::SchemaMismatch { path: path.into(), problem: problem.into() }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_distinct_per_class() {
        let all = [
            GenerationError::EmptyInput,
            GenerationError::MissingCredential { env_var: "GEMINI_API_KEY".into() },
            GenerationError::Provider("quota exceeded".into()),
            GenerationError::MalformedOutput("not json".into()),
            GenerationError::mismatch("summary.ultra_short", "is missing"),
        ];
        let messages: std::collections::HashSet<String> = all.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages.len(), all.len());
        let kinds: std::collections::HashSet<&str> = all.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), all.len());
    }

    #[test]
    fn provider_detail_is_kept_in_message() {
        let err = GenerationError::Provider("status=429 API quota exceeded".into());
        assert!(err.to_string().contains("API quota exceeded"));
    }

    #[test]
    fn mismatch_names_the_path() {
        let err = GenerationError::mismatch("quiz.mcq[0].answer", "is missing");
        assert_eq!(
            err.to_string(),
            "The AI response was incomplete: quiz.mcq[0].answer is missing. Please try again."
        );
    }
}
