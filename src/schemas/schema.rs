use schemars::schema::{RootSchema, SchemaObject};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
    any::{type_name, TypeId},
    sync::Arc,
};

/// Cached JSON schema handle associated with a response type.
#[derive(Clone, Debug)]
pub struct SchemaHandle {
    schema_name: &'static str,
    type_name: &'static str,
    type_id: TypeId,
    schema_json: Arc<Value>,
}

impl SchemaHandle {
    pub fn from_root_schema<T: 'static>(
        schema_name: &'static str,
        type_name: &'static str,
        root: RootSchema,
    ) -> Self {
        // RootSchema is plain data; serializing it cannot fail.
        let schema_json = serde_json::to_value(root).unwrap_or(Value::Null);

        Self {
            schema_name,
            type_name,
            type_id: TypeId::of::<T>(),
            schema_json: Arc::new(schema_json),
        }
    }

    pub fn schema_name(&self) -> &'static str {
        self.schema_name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn schema_json(&self) -> &Value {
        self.schema_json.as_ref()
    }

    /// Top-level keys the schema marks as required, in declaration order.
    pub fn required_keys(&self) -> Vec<&str> {
        self.schema_json
            .get("required")
            .and_then(|value| value.as_array())
            .map(|keys| keys.iter().filter_map(|key| key.as_str()).collect())
            .unwrap_or_default()
    }

    /// Pretty-printed schema for embedding in prompts.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self.schema_json()).unwrap_or_default()
    }
}

pub trait CompletionSchema: DeserializeOwned + Send + Sync + 'static {
    fn schema() -> &'static SchemaHandle;
}

/// Apply the title and description captured by the procedural macro.
pub fn apply_schema_metadata(
    root: &mut RootSchema,
    title: &'static str,
    description: Option<&'static str>,
) {
    apply_struct_metadata(&mut root.schema, title, description);
}

fn apply_struct_metadata(
    schema_object: &mut SchemaObject,
    title: &'static str,
    description: Option<&'static str>,
) {
    let metadata = schema_object.metadata();

    if metadata.title.is_none() {
        metadata.title = Some(title.to_string());
    }

    if let Some(description) = description {
        if metadata.description.is_none() {
            metadata.description = Some(description.to_string());
        }
    }
}

/// Helper so callers can retrieve the Rust type name of a schema provider.
pub fn schema_type_name<T>() -> &'static str {
    type_name::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::itinerary::ItineraryPlan;

    #[test]
    fn test_handle_metadata() {
        let handle = ItineraryPlan::schema();
        assert_eq!(handle.type_name(), "ItineraryPlan");
        assert_eq!(handle.type_id(), TypeId::of::<ItineraryPlan>());
        assert_eq!(handle.schema_json()["title"], "ItineraryPlan");
        assert!(handle
            .schema_json()
            .get("description")
            .and_then(|value| value.as_str())
            .unwrap()
            .contains("day-by-day"));
    }

    #[test]
    fn test_required_keys_and_prompt_json() {
        let handle = ItineraryPlan::schema();
        let keys = handle.required_keys();
        assert!(keys.contains(&"dailyItinerary"));
        assert!(handle.to_prompt_json().contains("\"dailyItinerary\""));
        assert!(schema_type_name::<ItineraryPlan>().ends_with("ItineraryPlan"));
    }
}
