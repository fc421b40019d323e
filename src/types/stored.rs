//! Decoding of persisted itinerary plans.
//!
//! Plans have been stored in several shapes over time:
//!
//! - an API envelope: `{"plans": {"variants": [{"name", "plan"}]}}`
//! - a stored envelope: `{"variants": [{"name", "plan"}]}`
//! - a bare plan object (has `dailyItinerary`)
//! - an object with a single field wrapping a plan (`dailyItinerary` and `weather`)
//!
//! Older records may lack `weather`; the default snapshot is filled in.

use serde_json::{Map, Value};

use super::{
    itinerary::{ItineraryPlan, WeatherSnapshot},
    response::deserialize_structured_response,
    result::{PlanVariant, PlanVariants},
};
use crate::{
    error::{PlannerError, Result},
    schemas::CompletionSchema,
};

/// Name given to a plan that was stored without a variants envelope
pub const DEFAULT_VARIANT_NAME: &str = "default";

/// Decode any stored format into a variants envelope.
pub fn decode_stored_variants(raw: &str) -> Result<PlanVariants> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|err| PlannerError::Parse(format!("stored plan is not valid JSON: {err}")))?;

    let object = value.as_object().ok_or_else(|| {
        PlannerError::Schema("stored plan must be a JSON object".to_string())
    })?;

    if let Some(variants) = object
        .get("plans")
        .and_then(|plans| plans.get("variants"))
        .or_else(|| object.get("variants"))
    {
        return decode_variant_list(variants);
    }

    if object.contains_key("dailyItinerary") {
        let plan = decode_plan_value(value.clone())?;
        return Ok(single(DEFAULT_VARIANT_NAME, plan));
    }

    let wrapped = object.iter().find(|(_, field)| {
        field
            .as_object()
            .map(|inner| inner.contains_key("dailyItinerary") && inner.contains_key("weather"))
            .unwrap_or(false)
    });

    match wrapped {
        Some((name, field)) => {
            let plan = decode_plan_value(field.clone())?;
            Ok(single(name, plan))
        }
        None => Err(PlannerError::Schema(
            "unrecognized stored plan format".to_string(),
        )),
    }
}

/// Decode any stored format and return its first plan.
pub fn decode_stored_plan(raw: &str) -> Result<ItineraryPlan> {
    decode_stored_variants(raw)?
        .variants
        .into_iter()
        .next()
        .map(|variant| variant.plan)
        .ok_or_else(|| PlannerError::Schema("stored plan has no variants".to_string()))
}

fn decode_variant_list(variants: &Value) -> Result<PlanVariants> {
    let entries = variants.as_array().ok_or_else(|| {
        PlannerError::Schema("`variants` must be an array".to_string())
    })?;

    let mut decoded = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("variant {}", idx + 1));
        let plan = entry.get("plan").cloned().ok_or_else(|| {
            PlannerError::Schema(format!("variant `{name}` has no `plan` field"))
        })?;
        decoded.push(PlanVariant {
            name,
            plan: decode_plan_value(plan)?,
        });
    }

    Ok(PlanVariants { variants: decoded })
}

fn decode_plan_value(mut plan: Value) -> Result<ItineraryPlan> {
    if let Some(object) = plan.as_object_mut() {
        fill_missing_weather(object)?;
    }
    deserialize_structured_response(&plan, ItineraryPlan::schema())
}

fn fill_missing_weather(object: &mut Map<String, Value>) -> Result<()> {
    if object.get("weather").map_or(true, Value::is_null) {
        object.insert(
            "weather".to_string(),
            serde_json::to_value(WeatherSnapshot::default())?,
        );
    }
    Ok(())
}

fn single(name: &str, plan: ItineraryPlan) -> PlanVariants {
    PlanVariants {
        variants: vec![PlanVariant {
            name: name.to_string(),
            plan,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::itinerary::WeatherCondition;
    use serde_json::json;

    fn plan_value(with_weather: bool) -> Value {
        let mut plan = json!({
            "overview": "A day in Lisbon.",
            "totalBudget": "$40.00",
            "dailyItinerary": [{
                "date": "2024-05-10",
                "dayNumber": 1,
                "location": "Lisbon",
                "events": [{
                    "name": "Dinner in Alfama",
                    "startTime": "20:00",
                    "duration": "2 hours",
                    "cost": "$40",
                    "description": "Fado and grilled sardines.",
                    "type": "meal",
                    "bookingRequired": true
                }]
            }],
            "practicalInfo": {
                "transportation": ["Tram 28"],
                "documentation": ["Passport"],
                "packingList": ["Walking shoes"]
            }
        });
        if with_weather {
            plan["weather"] = json!({
                "temperature": 24,
                "condition": "Sunny",
                "icon": "https://openweathermap.org/img/wn/01d@2x.png",
                "humidity": 50,
                "windSpeed": 8
            });
        }
        plan
    }

    #[test]
    fn test_api_envelope() {
        let raw = json!({"plans": {"variants": [
            {"name": "Cultural Immersion", "plan": plan_value(true)},
            {"name": "Comfort Seeker", "plan": plan_value(true)}
        ]}})
        .to_string();

        let variants = decode_stored_variants(&raw).unwrap();
        assert_eq!(variants.variants.len(), 2);
        assert_eq!(variants.variants[1].name, "Comfort Seeker");
        assert_eq!(
            variants.first().unwrap().weather.condition,
            WeatherCondition::Sunny
        );
    }

    #[test]
    fn test_stored_envelope_fills_weather() {
        let raw = json!({"variants": [{"name": "Smart Saver", "plan": plan_value(false)}]})
            .to_string();

        let plan = decode_stored_plan(&raw).unwrap();
        assert_eq!(plan.weather, WeatherSnapshot::default());
        assert_eq!(plan.day_count(), 1);
    }

    #[test]
    fn test_direct_plan() {
        let raw = plan_value(false).to_string();
        let variants = decode_stored_variants(&raw).unwrap();
        assert_eq!(variants.variants[0].name, DEFAULT_VARIANT_NAME);
    }

    #[test]
    fn test_wrapped_plan_uses_field_name() {
        let raw = json!({"Luxury Escape": plan_value(true)}).to_string();
        let variants = decode_stored_variants(&raw).unwrap();
        assert!(variants.get("luxury escape").is_some());
    }

    #[test]
    fn test_unrecognized_format() {
        let err = decode_stored_plan(r#"{"title": "not a plan"}"#).unwrap_err();
        assert!(matches!(err, PlannerError::Schema(_)));

        let err = decode_stored_plan("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, PlannerError::Schema(_)));

        let err = decode_stored_plan("{not json").unwrap_err();
        assert!(matches!(err, PlannerError::Parse(_)));
    }

    #[test]
    fn test_bad_plan_reports_path() {
        let mut plan = plan_value(true);
        plan["dailyItinerary"][0]["dayNumber"] = json!("one");
        let err = decode_stored_plan(&plan.to_string()).unwrap_err();
        assert!(err.to_string().contains("dailyItinerary[0].dayNumber"));
    }
}
