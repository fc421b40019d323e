use crate::{
    error::{PlannerError, Result},
    schemas::{validator::ValidationMode, CompletionSchema, SchemaHandle},
    types::{
        itinerary::{DayPlan, Event, EventKind, ItineraryPlan},
        trip::TripRequest,
    },
};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::fmt;

const MAX_SCHEMA_ERRORS: usize = 3;
const ITINERARY_ARRAY_KEY: &str = "dailyItinerary";
const TOTAL_BUDGET_KEY: &str = "totalBudget";

/// Decode normalized model text into a validated plan.
///
/// Failures are tagged by stage: `Parse` for invalid JSON, `Schema` for
/// missing or mistyped fields, `MealCoverage` for days without all three meals.
pub fn validate_plan_text(normalized: &str, mode: ValidationMode) -> Result<ItineraryPlan> {
    let mut payload = parse_json(normalized)?;
    let schema = ItineraryPlan::schema();

    check_required_fields(schema, &mut payload)?;
    let plan = mode.validate::<ItineraryPlan>(&payload, schema)?;
    check_meal_coverage(&plan)?;
    Ok(plan)
}

/// [`validate_plan_text`] plus the calendar checks that need the request.
pub fn validate_plan_for_request(
    normalized: &str,
    mode: ValidationMode,
    request: &TripRequest,
) -> Result<ItineraryPlan> {
    let plan = validate_plan_text(normalized, mode)?;
    check_day_coverage(&plan, request)?;
    Ok(plan)
}

/// One day per trip date, in travel order, numbered from 1 without gaps.
pub fn check_day_coverage(plan: &ItineraryPlan, request: &TripRequest) -> Result<()> {
    let expected = request.trip_dates();
    if plan.day_count() != expected.len() {
        return Err(PlannerError::Schema(format!(
            "`{}` has {} day(s) but the trip covers {}",
            ITINERARY_ARRAY_KEY,
            plan.day_count(),
            expected.len()
        )));
    }

    for (idx, (day, date)) in plan.daily_itinerary.iter().zip(&expected).enumerate() {
        let number = idx as u32 + 1;
        if day.day_number != number {
            return Err(PlannerError::Schema(format!(
                "day {} is numbered {}; day numbers must run from 1 without gaps",
                number, day.day_number
            )));
        }
        if day.date != *date {
            return Err(PlannerError::Schema(format!(
                "day {} is dated {} but the trip expects {}",
                number, day.date, date
            )));
        }
    }

    Ok(())
}

pub fn parse_json(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|err| {
        PlannerError::Parse(format!(
            "model output is not valid JSON ({}): {}",
            err,
            excerpt(text)
        ))
    })
}

/// Require every top-level key the schema marks as required.
///
/// The model-reported total is recomputed later, so a numeric total is
/// coerced to a string here instead of costing an attempt.
pub fn check_required_fields(schema: &SchemaHandle, payload: &mut Value) -> Result<()> {
    let kind = json_kind(payload);
    let object = payload.as_object_mut().ok_or_else(|| {
        PlannerError::Schema(format!(
            "expected a JSON object for `{}`, got {}",
            schema.schema_name(),
            kind
        ))
    })?;

    let missing: Vec<&str> = schema
        .required_keys()
        .into_iter()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(PlannerError::Schema(format!(
            "missing required field(s): {}",
            missing.join(", ")
        )));
    }

    if !object
        .get(ITINERARY_ARRAY_KEY)
        .map(Value::is_array)
        .unwrap_or(false)
    {
        return Err(PlannerError::Schema(format!(
            "`{}` must be an array",
            ITINERARY_ARRAY_KEY
        )));
    }

    if let Some(total) = object.get_mut(TOTAL_BUDGET_KEY) {
        if !total.is_string() {
            *total = Value::String(total.to_string());
        }
    }

    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Validate a structured payload against a schema
pub fn validate_structured_payload(schema: &SchemaHandle, payload: &Value) -> Result<()> {
    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema.schema_json())
        .map_err(|err| {
            PlannerError::Schema(format!(
                "failed to prepare `{}` schema for validation: {}",
                schema.schema_name(),
                err
            ))
        })?;

    if let Err(errors) = validator.validate(payload) {
        let mut details = Vec::new();
        let mut truncated = false;

        for (idx, error) in errors.enumerate() {
            if idx < MAX_SCHEMA_ERRORS {
                let mut path = error.instance_path.to_string();
                if path.is_empty() {
                    path = "<root>".to_string();
                }
                details.push(format!("{}: {}", path, error));
            } else {
                truncated = true;
                break;
            }
        }

        let mut detail_str = if details.is_empty() {
            "payload failed schema validation".to_string()
        } else {
            details.join("; ")
        };

        if truncated {
            detail_str.push_str("; additional errors truncated");
        }

        return Err(PlannerError::Schema(format!(
            "payload does not match `{}` schema: {}",
            schema.schema_name(),
            detail_str
        )));
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

impl Meal {
    pub const ALL: [Meal; 3] = [Meal::Breakfast, Meal::Lunch, Meal::Dinner];

    pub fn keyword(&self) -> &'static str {
        match self {
            Meal::Breakfast => "breakfast",
            Meal::Lunch => "lunch",
            Meal::Dinner => "dinner",
        }
    }

    /// Meal slot for a `meal`-typed event whose name names no meal.
    fn from_start_time(start_time: &str) -> Option<Meal> {
        let (hour, _) = start_time.trim().split_once(':')?;
        let hour: u32 = hour.trim().parse().ok()?;
        match hour {
            0..=10 => Some(Meal::Breakfast),
            11..=15 => Some(Meal::Lunch),
            16..=23 => Some(Meal::Dinner),
            _ => None,
        }
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Meals an event counts toward.
///
/// Case-insensitive substring match on the name. An event typed `meal`
/// without a meal word in its name is slotted by start hour instead.
///
/// Known precision limit: the keyword match is English-only and loose
/// ("dinner cruise" counts as dinner), and the hour slots accept any
/// `meal`-typed event ("brunch", "tapas") as whichever meal its hour falls in.
pub fn classify_meals(event: &Event) -> Vec<Meal> {
    let name = event.name.to_lowercase();
    let named: Vec<Meal> = Meal::ALL
        .into_iter()
        .filter(|meal| name.contains(meal.keyword()))
        .collect();

    if !named.is_empty() || event.kind != EventKind::Meal {
        return named;
    }

    Meal::from_start_time(&event.start_time)
        .into_iter()
        .collect()
}

/// Meals with no matching event on the given day.
pub fn missing_meals(day: &DayPlan) -> Vec<Meal> {
    let covered: Vec<Meal> = day.events.iter().flat_map(classify_meals).collect();
    Meal::ALL
        .into_iter()
        .filter(|meal| !covered.contains(meal))
        .collect()
}

pub fn check_meal_coverage(plan: &ItineraryPlan) -> Result<()> {
    let gaps: Vec<String> = plan
        .daily_itinerary
        .iter()
        .filter_map(|day| {
            let missing = missing_meals(day);
            if missing.is_empty() {
                return None;
            }
            let names: Vec<&str> = missing.iter().map(Meal::keyword).collect();
            Some(format!(
                "day {} ({}) is missing {}",
                day.day_number,
                day.date,
                names.join(", ")
            ))
        })
        .collect();

    if gaps.is_empty() {
        Ok(())
    } else {
        Err(PlannerError::MealCoverage(gaps.join("; ")))
    }
}

fn excerpt(text: &str) -> String {
    const LIMIT: usize = 120;
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
