use crate::{
    config::PlannerConfig,
    core::completion::CompletionBackend,
    error::Result,
    services::openai_client::OpenAIClient,
};
use std::{fmt, sync::Arc, time::Duration};

/// Itinerary planner: owns the completion backend and the retry policy
#[derive(Clone)]
pub struct Planner {
    backend: Arc<dyn CompletionBackend>,
    config: PlannerConfig,
}

impl fmt::Debug for Planner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planner")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .field("max_attempts", &self.config.max_attempts)
            .finish_non_exhaustive()
    }
}

impl Planner {
    /// Planner talking to the default OpenAI-compatible endpoint.
    pub fn new(api_key: String) -> Self {
        let config = PlannerConfig::default().with_api_key(api_key.clone());
        Self {
            backend: Arc::new(OpenAIClient::new(api_key)),
            config,
        }
    }

    /// Planner over any backend; the config's key and base URL are not used.
    pub fn with_backend(backend: Arc<dyn CompletionBackend>, config: PlannerConfig) -> Self {
        Self { backend, config }
    }

    /// Build the HTTP backend from a config. Fails fast on a missing key.
    pub fn from_config(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        let api_key = config.require_api_key()?.to_string();
        let mut client = OpenAIClient::new(api_key);
        client.set_base_url(config.base_url.clone());
        Ok(Self {
            backend: Arc::new(client),
            config,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(PlannerConfig::from_env()?)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_total_timeout(timeout);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub(crate) fn backend(&self) -> &dyn CompletionBackend {
        self.backend.as_ref()
    }
}
