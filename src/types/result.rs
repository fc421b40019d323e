use super::itinerary::ItineraryPlan;
use crate::core::steps::PipelineStep;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the returned plan came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// Produced by the completion model and validated
    Generated,
    /// Synthesized locally after every attempt failed
    Fallback,
}

/// Result of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// The plan handed to the caller, always schema-complete
    pub plan: ItineraryPlan,
    pub source: PlanSource,
    /// Budget variant the prompt was built for
    pub variant: String,
    /// Completion attempts actually made
    pub attempts: usize,
    /// Sampling temperature of the last attempt
    pub final_temperature: f64,
    /// All state transitions in order
    pub steps: Vec<PipelineStep>,
    /// Total wall-clock duration
    pub duration: Duration,
}

impl GenerationResult {
    pub fn is_fallback(&self) -> bool {
        self.source == PlanSource::Fallback
    }

    /// Error codes of every rejected attempt, in order
    pub fn rejections(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                PipelineStep::Retrying { error_code, .. } => Some(error_code.as_str()),
                PipelineStep::Exhausted {
                    error_code: Some(code),
                    ..
                } => Some(code.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Generate a human-readable replay of the run
    pub fn replay(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Itinerary Generation Trace ===".to_string());
        lines.push(format!("Variant: {}", self.variant));
        lines.push(format!("Duration: {:.2}s", self.duration.as_secs_f64()));
        lines.push(format!("Attempts: {}", self.attempts));
        lines.push(format!(
            "Source: {}",
            match self.source {
                PlanSource::Generated => "generated",
                PlanSource::Fallback => "fallback",
            }
        ));

        lines.push(String::new());
        lines.push("--- Steps ---".to_string());

        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, step.describe()));
        }

        lines.push(String::new());
        lines.push("--- Plan ---".to_string());
        lines.push(format!(
            "{} day(s), total {}",
            self.plan.day_count(),
            self.plan.total_budget
        ));

        lines.join("\n")
    }
}

/// One named plan inside a variants envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanVariant {
    pub name: String,
    pub plan: ItineraryPlan,
}

/// Storage envelope holding one plan per budget variant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanVariants {
    pub variants: Vec<PlanVariant>,
}

impl PlanVariants {
    pub fn first(&self) -> Option<&ItineraryPlan> {
        self.variants.first().map(|variant| &variant.plan)
    }

    pub fn get(&self, name: &str) -> Option<&ItineraryPlan> {
        self.variants
            .iter()
            .find(|variant| variant.name.eq_ignore_ascii_case(name))
            .map(|variant| &variant.plan)
    }

    /// Serialize for the persistence layer
    pub fn to_json_string(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fallback::synthesize_fallback;
    use crate::types::trip::{BudgetLevel, Destination, TripRequest};

    fn sample_plan() -> ItineraryPlan {
        let request = TripRequest::new("Sample", BudgetLevel::Low).with_destination(
            Destination::new(
                "Porto",
                "2024-09-01".parse().unwrap(),
                "2024-09-01".parse().unwrap(),
            ),
        );
        synthesize_fallback(&request)
    }

    #[test]
    fn test_replay_and_rejections() {
        let result = GenerationResult {
            plan: sample_plan(),
            source: PlanSource::Fallback,
            variant: "Smart Saver".to_string(),
            attempts: 2,
            final_temperature: 0.9,
            steps: vec![
                PipelineStep::Retrying {
                    attempt: 1,
                    error_code: "PARSE_ERROR".to_string(),
                    reason: "not json".to_string(),
                },
                PipelineStep::Exhausted {
                    attempts: 2,
                    error_code: Some("MEAL_COVERAGE_ERROR".to_string()),
                    reason: "day 1 missing dinner".to_string(),
                },
            ],
            duration: Duration::from_millis(1500),
        };

        assert!(result.is_fallback());
        assert_eq!(result.rejections(), vec!["PARSE_ERROR", "MEAL_COVERAGE_ERROR"]);

        let replay = result.replay();
        assert!(replay.contains("Itinerary Generation Trace"));
        assert!(replay.contains("Smart Saver"));
        assert!(replay.contains("fallback"));
        assert!(replay.contains("1 day(s)"));
    }

    #[test]
    fn test_variants_lookup_is_case_insensitive() {
        let variants = PlanVariants {
            variants: vec![PlanVariant {
                name: "Local Experience".to_string(),
                plan: sample_plan(),
            }],
        };
        assert!(variants.get("local experience").is_some());
        assert!(variants.get("Luxury Escape").is_none());
        assert_eq!(variants.first(), Some(&variants.variants[0].plan));

        let json = variants.to_json_string().unwrap();
        assert!(json.starts_with("{\"variants\":[{\"name\":\"Local Experience\""));
    }
}
