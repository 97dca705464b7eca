use async_trait::async_trait;

/// Chat completion backend used to answer shopper questions.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "provider"
    }
}
