pub mod completion;
pub mod planner;
pub mod steps;

pub use crate::types::result::{GenerationResult, PlanSource};
pub use completion::{CompletionBackend, CompletionRequest};
pub use planner::Planner;
pub use steps::PipelineStep;
