use std::{env, time::Duration};

use crate::{
    error::{PlannerError, Result},
    schemas::ValidationMode,
    services::openai_client::DEFAULT_BASE_URL,
};

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Keys checked in order for the completion API credential
pub const API_KEY_VARS: [&str; 2] = ["GROQ_API_KEY", "OPENAI_API_KEY"];
/// Keys checked in order for the completion API base URL
pub const BASE_URL_VARS: [&str; 2] = ["PLANNER_BASE_URL", "OPENAI_BASE_URL"];

/// Tunables for one planner instance
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Completion attempts before falling back; at least 1
    pub max_attempts: usize,
    /// Sampling temperature of the first attempt
    pub temperature: f64,
    /// Added to the temperature on every retry
    pub temperature_step: f64,
    pub max_temperature: f64,
    /// Upper bound for a single completion call
    pub attempt_timeout: Duration,
    /// Upper bound for the whole run, kept under the host's request lifetime
    pub total_timeout: Duration,
    /// Pause before the first retry; doubles on each further retry
    pub retry_backoff: Duration,
    pub validation: ValidationMode,
    pub json_mode: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            max_attempts: 2,
            temperature: 0.7,
            temperature_step: 0.2,
            max_temperature: 1.2,
            attempt_timeout: Duration::from_secs(45),
            total_timeout: Duration::from_secs(50),
            retry_backoff: Duration::from_millis(500),
            validation: ValidationMode::Strict,
            json_mode: false,
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by environment variables.
    ///
    /// Reads `GROQ_API_KEY`/`OPENAI_API_KEY`, `PLANNER_BASE_URL`/`OPENAI_BASE_URL`,
    /// `PLANNER_MODEL`, `PLANNER_MAX_ATTEMPTS`, `PLANNER_TIMEOUT_SECS`,
    /// `PLANNER_VALIDATION` and `PLANNER_JSON_MODE`. A missing key is not an
    /// error here; [`PlannerConfig::require_api_key`] reports it.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`PlannerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let first_of = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .find(|value| !value.trim().is_empty())
        };

        config.api_key = first_of(&API_KEY_VARS);
        if let Some(base_url) = first_of(&BASE_URL_VARS) {
            config.base_url = base_url;
        }
        if let Some(model) = first_of(&["PLANNER_MODEL"]) {
            config.model = model;
        }
        if let Some(attempts) = first_of(&["PLANNER_MAX_ATTEMPTS"]) {
            config.max_attempts = parse_var("PLANNER_MAX_ATTEMPTS", &attempts)?;
        }
        if let Some(seconds) = first_of(&["PLANNER_TIMEOUT_SECS"]) {
            let seconds: u64 = parse_var("PLANNER_TIMEOUT_SECS", &seconds)?;
            config = config.with_total_timeout(Duration::from_secs(seconds));
        }
        if let Some(mode) = first_of(&["PLANNER_VALIDATION"]) {
            config.validation = mode.parse()?;
        }
        if let Some(flag) = first_of(&["PLANNER_JSON_MODE"]) {
            config.json_mode = matches!(flag.trim(), "1" | "true" | "yes" | "on");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Set the overall deadline; a longer per-attempt timeout is shortened to match.
    pub fn with_total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = timeout;
        self.attempt_timeout = self.attempt_timeout.min(timeout);
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    /// Sampling temperature for a 1-based attempt number.
    pub fn temperature_for_attempt(&self, attempt: usize) -> f64 {
        let retries = attempt.saturating_sub(1) as f64;
        (self.temperature + self.temperature_step * retries).min(self.max_temperature)
    }

    /// Delay before the given 1-based attempt; zero for the first.
    pub fn backoff_before(&self, attempt: usize) -> Duration {
        match attempt {
            0 | 1 => Duration::ZERO,
            n => {
                let doublings = (n - 2).min(16) as u32;
                self.retry_backoff.saturating_mul(1 << doublings)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(PlannerError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(PlannerError::Config("model must not be empty".to_string()));
        }
        if self.total_timeout.is_zero() || self.attempt_timeout.is_zero() {
            return Err(PlannerError::Config(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(PlannerError::Config(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        Ok(())
    }

    /// The configured credential, or the configuration error reported to the caller.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                PlannerError::Config(format!(
                    "completion API key not configured (set {})",
                    API_KEY_VARS.join(" or ")
                ))
            })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|err| PlannerError::Config(format!("invalid {name} `{value}`: {err}")))
}
