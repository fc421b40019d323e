//! trip-planner-rs: LLM-backed travel itinerary generation that always returns a usable plan
//!
//! A trip request is turned into a prompt, sent to an OpenAI-compatible
//! completion endpoint, and the untrusted reply is normalized, parsed and
//! checked against the `ItineraryPlan` schema plus a meal-coverage rule.
//! Rejected replies are retried with a higher temperature; when attempts or
//! time run out a deterministic itinerary is synthesized from the request.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trip_planner_rs::{BudgetLevel, Destination, Planner, TripRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let planner = Planner::from_env()?;
//!
//!     let request = TripRequest::new("Weekend Getaway", BudgetLevel::Medium)
//!         .with_destination(Destination::new(
//!             "Austin",
//!             "2024-06-01".parse()?,
//!             "2024-06-02".parse()?,
//!         ));
//!
//!     let result = planner.generate(&request).await?;
//!     println!("{}", serde_json::to_string_pretty(&result.plan)?);
//!     Ok(())
//! }
//! ```

extern crate self as trip_planner_rs;

pub mod config;
pub mod core;
pub mod error;
pub mod schemas;
pub mod services;
pub mod types;

pub use config::PlannerConfig;
pub use crate::core::{
    CompletionBackend, CompletionRequest, GenerationResult, PipelineStep, PlanSource, Planner,
};
pub use error::{PlannerError, Result};
pub use schemas::{schema_type_name, CompletionSchema, SchemaHandle, ValidationMode};
pub use services::{normalize_response, synthesize_fallback, OpenAIClient};
pub use trip_planner_macros::completion_schema;
pub use types::{
    decode_stored_plan, BudgetLevel, DayPlan, Destination, Event, EventKind, ItineraryPlan,
    PlanVariant, PlanVariants, PracticalInfo, TripRequest, WeatherCondition, WeatherSnapshot,
};

pub use schemas as schema;

#[cfg(feature = "cli")]
pub mod cli;
