use pb_domain::error::Result;

/// Trait every answer-provider adapter must implement.
///
/// The single suspend point of the resolution pipeline: implementations
/// may take arbitrarily long or fail, and the pipeline must tolerate
/// both without blocking other requests.
#[async_trait::async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Produce an answer for a user question, verbatim.
    async fn answer(&self, question: &str) -> Result<String>;

    /// A unique identifier for this provider instance.
    fn provider_id(&self) -> &str;
}
