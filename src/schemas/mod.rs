pub mod schema;
pub mod validation;
pub mod validator;

pub use schema::{apply_schema_metadata, schema_type_name, CompletionSchema, SchemaHandle};
pub use validation::{
    check_day_coverage, check_meal_coverage, classify_meals, missing_meals,
    validate_plan_for_request, validate_plan_text, Meal,
};
pub use validator::ValidationMode;
