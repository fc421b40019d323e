use thiserror::Error;

/// Main error type for the itinerary planner
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid trip request: {0}")]
    InvalidRequest(String),

    #[error("Completion timed out: {0}")]
    CompletionTimeout(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Meal coverage error: {0}")]
    MealCoverage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Whether the orchestrator may spend another attempt on this failure
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlannerError::CompletionTimeout(_)
                | PlannerError::Completion(_)
                | PlannerError::RateLimit { .. }
                | PlannerError::Parse(_)
                | PlannerError::Schema(_)
                | PlannerError::MealCoverage(_)
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            PlannerError::Config(_) => "CONFIG_ERROR",
            PlannerError::InvalidRequest(_) => "INVALID_REQUEST",
            PlannerError::CompletionTimeout(_) => "COMPLETION_TIMEOUT",
            PlannerError::Completion(_) => "COMPLETION_ERROR",
            PlannerError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            PlannerError::Parse(_) => "PARSE_ERROR",
            PlannerError::Schema(_) => "SCHEMA_ERROR",
            PlannerError::MealCoverage(_) => "MEAL_COVERAGE_ERROR",
            PlannerError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}
