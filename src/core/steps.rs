use serde::{Deserialize, Serialize};

/// Represents a single transition of the generation state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineStep {
    /// A completion call is being made
    Attempting { attempt: usize, temperature: f64 },
    /// The model answered and the normalized text is being validated
    Validating { attempt: usize, chars: usize },
    /// The attempt failed and another one will follow
    Retrying {
        attempt: usize,
        error_code: String,
        reason: String,
    },
    /// A validated plan was accepted
    Succeeded { attempt: usize, days: usize },
    /// No attempts (or no time) remain; the fallback plan is used
    Exhausted {
        attempts: usize,
        error_code: Option<String>,
        reason: String,
    },
    /// The caller went away before a plan was accepted
    Cancelled { attempt: usize },
}

impl PipelineStep {
    /// Get a human-readable description of the step
    pub fn describe(&self) -> String {
        match self {
            PipelineStep::Attempting {
                attempt,
                temperature,
            } => format!("Attempt {} (temperature {:.2})", attempt, temperature),
            PipelineStep::Validating { attempt, chars } => {
                format!("Validating attempt {} ({} chars)", attempt, chars)
            }
            PipelineStep::Retrying {
                attempt,
                error_code,
                reason,
            } => format!("Attempt {} rejected [{}]: {}", attempt, error_code, reason),
            PipelineStep::Succeeded { attempt, days } => {
                format!("Attempt {} accepted with {} days", attempt, days)
            }
            PipelineStep::Exhausted {
                attempts,
                error_code,
                reason,
            } => match error_code {
                Some(code) => format!(
                    "Exhausted after {} attempt(s) [{}]: {}",
                    attempts, code, reason
                ),
                None => format!("Exhausted after {} attempt(s): {}", attempts, reason),
            },
            PipelineStep::Cancelled { attempt } => {
                format!("Cancelled during attempt {}", attempt)
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineStep::Succeeded { .. }
                | PipelineStep::Exhausted { .. }
                | PipelineStep::Cancelled { .. }
        )
    }
}
