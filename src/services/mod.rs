pub mod budget;
pub mod fallback;
pub mod generation;
pub mod normalizer;
pub mod openai_client;
pub mod prompt;

pub use budget::{format_usd, itemized_total, parse_cost, recalculate_total_budget};
pub use fallback::{is_fallback_overview, synthesize_fallback};
pub use normalizer::normalize_response;
pub use openai_client::OpenAIClient;
pub use prompt::{budget_variants, build_itinerary_prompt, select_variant, BudgetVariant};
