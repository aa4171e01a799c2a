use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// An external service that can do schema-guided text generation.
///
/// Implementations make exactly one outbound call per `generate` and never
/// retry; resubmitting is up to the caller.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the raw text the provider produced for `prompt`, which should be
    /// a JSON document matching `schema`.
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<String>;
}
