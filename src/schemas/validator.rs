use crate::{
    error::Result,
    schemas::{validation::validate_structured_payload, CompletionSchema, SchemaHandle},
    types::response::deserialize_structured_response,
};
use serde_json::Value;

/// How strictly model output is checked before typed decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Decode with serde only; types and enum spellings are still checked while decoding
    SerdeFirst,
    /// Validate against the JSON schema first, reporting every offending path
    #[default]
    Strict,
}

impl ValidationMode {
    /// Check and decode a payload that passed the required-field checks into `T`
    pub fn validate<T: CompletionSchema>(
        &self,
        payload: &Value,
        schema: &SchemaHandle,
    ) -> Result<T> {
        if *self == ValidationMode::Strict {
            validate_structured_payload(schema, payload)?;
        }
        deserialize_structured_response::<T>(payload, schema)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::SerdeFirst => "serde-first",
            ValidationMode::Strict => "strict",
        }
    }
}

impl std::str::FromStr for ValidationMode {
    type Err = crate::error::PlannerError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "serde" | "serde-first" | "lenient" => Ok(ValidationMode::SerdeFirst),
            other => Err(crate::error::PlannerError::Config(format!(
                "unknown validation mode `{other}` (expected strict or serde-first)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("strict".parse::<ValidationMode>().unwrap(), ValidationMode::Strict);
        assert_eq!(
            "Lenient".parse::<ValidationMode>().unwrap(),
            ValidationMode::SerdeFirst
        );
        assert!("loose".parse::<ValidationMode>().is_err());
        assert_eq!(ValidationMode::default(), ValidationMode::Strict);
    }
}
