// 📐 Region schema - JSON in, validated Region out (and back again)

use super::region::Region;
use serde::Deserialize;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Body could not be read as a region at all (wrong types, missing keys)
    #[error("Malformed region payload: {0}")]
    Malformed(String),

    /// Body parsed but one or more fields break the rules
    #[error("Invalid region: {}", join_errors(.0))]
    Invalid(Vec<FieldError>),
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// PAYLOADS
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct RegionInput {
    #[serde(rename = "NOC")]
    #[validate(length(equal = 3, message = "must be a three letter code"))]
    noc: String,

    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    region: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    notes: Option<String>,
}

/// Partial update for an existing region. `notes: null` clears the notes,
/// an absent key leaves them alone.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegionPatch {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub region: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub notes: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl RegionInput {
    fn into_region(self) -> Result<Region, SchemaError> {
        self.validate().map_err(to_schema_error)?;

        if !self.noc.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(SchemaError::Invalid(vec![FieldError {
                field: "NOC".to_string(),
                message: "must contain only uppercase letters".to_string(),
            }]));
        }

        Ok(Region {
            noc: self.noc,
            region: self.region,
            notes: self.notes,
        })
    }
}

impl RegionPatch {
    pub fn apply(self, region: &mut Region) {
        if let Some(name) = self.region {
            region.region = name;
        }
        if let Some(notes) = self.notes {
            region.notes = notes;
        }
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Converts regions to and from their JSON representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionSchema;

impl RegionSchema {
    /// Deserialize and validate a new region.
    pub fn load(&self, payload: Value) -> Result<Region, SchemaError> {
        let input: RegionInput =
            serde_json::from_value(payload).map_err(|e| SchemaError::Malformed(e.to_string()))?;
        input.into_region()
    }

    /// Apply the `load` rules to a region that did not come in as JSON.
    pub fn check(&self, region: &Region) -> Result<(), SchemaError> {
        RegionInput {
            noc: region.noc.clone(),
            region: region.region.clone(),
            notes: region.notes.clone(),
        }
        .into_region()
        .map(|_| ())
    }

    pub fn load_patch(&self, payload: Value) -> Result<RegionPatch, SchemaError> {
        let patch: RegionPatch =
            serde_json::from_value(payload).map_err(|e| SchemaError::Malformed(e.to_string()))?;
        patch.validate().map_err(to_schema_error)?;
        Ok(patch)
    }

    pub fn dump(&self, region: &Region) -> Value {
        serde_json::json!({
            "NOC": region.noc,
            "region": region.region,
            "notes": region.notes,
        })
    }

    pub fn dump_many(&self, regions: &[Region]) -> Value {
        Value::Array(regions.iter().map(|r| self.dump(r)).collect())
    }
}

fn to_schema_error(errors: ValidationErrors) -> SchemaError {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = match &*field {
                "noc" => "NOC".to_string(),
                other => other.to_string(),
            };
            errs.iter()
                .map(move |e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    SchemaError::Invalid(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn region_json() -> Value {
        json!({
            "NOC": "NEW",
            "region": "New Region",
            "notes": "Some notes about the new region",
        })
    }

    #[test]
    fn test_load_valid_region() {
        let region = RegionSchema.load(region_json()).unwrap();

        assert_eq!(region.noc, "NEW");
        assert_eq!(region.region, "New Region");
        assert_eq!(region.notes.as_deref(), Some("Some notes about the new region"));
    }

    #[test]
    fn test_load_without_notes() {
        let region = RegionSchema
            .load(json!({"NOC": "GBR", "region": "UK"}))
            .unwrap();
        assert_eq!(region.notes, None);
    }

    #[test]
    fn test_load_missing_region_is_malformed() {
        let err = RegionSchema.load(json!({"NOC": "NEW"})).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }

    #[test]
    fn test_load_rejects_bad_code() {
        let err = RegionSchema
            .load(json!({"NOC": "TOOLONG", "region": "Somewhere"}))
            .unwrap_err();

        match err {
            SchemaError::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "NOC");
            }
            other => panic!("expected invalid, got {:?}", other),
        }

        let err = RegionSchema
            .load(json!({"NOC": "gb1", "region": "Somewhere"}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Invalid(_)));
    }

    #[test]
    fn test_load_rejects_empty_region_name() {
        let err = RegionSchema
            .load(json!({"NOC": "NEW", "region": ""}))
            .unwrap_err();
        assert!(err.to_string().contains("region"));
    }

    #[test]
    fn test_dump_round_trips_field_names() {
        let region = Region::new("NEW", "New Region", None);
        let dumped = RegionSchema.dump(&region);

        assert_eq!(dumped, json!({"NOC": "NEW", "region": "New Region", "notes": null}));
        assert_eq!(RegionSchema.dump_many(&[region]).as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let mut region = Region::new("NEW", "New Region", Some("old"));

        RegionSchema
            .load_patch(json!({"region": "Renamed"}))
            .unwrap()
            .apply(&mut region);
        assert_eq!(region.region, "Renamed");
        assert_eq!(region.notes.as_deref(), Some("old"));

        RegionSchema
            .load_patch(json!({"notes": null}))
            .unwrap()
            .apply(&mut region);
        assert_eq!(region.notes, None);
    }

    #[test]
    fn test_patch_rejects_long_notes() {
        let err = RegionSchema
            .load_patch(json!({"notes": "x".repeat(1001)}))
            .unwrap_err();

        match err {
            SchemaError::Invalid(errors) => assert_eq!(errors[0].field, "notes"),
            other => panic!("expected invalid, got {:?}", other),
        }
        assert!(RegionSchema.load_patch(json!({"notes": "x".repeat(1000)})).is_ok());
    }

    #[test]
    fn test_check_applies_load_rules() {
        assert!(RegionSchema.check(&Region::new("GBR", "UK", None)).is_ok());
        assert!(RegionSchema.check(&Region::new("gbr", "UK", None)).is_err());
        assert!(RegionSchema.check(&Region::new("GBR", "", None)).is_err());
    }

    #[test]
    fn test_patch_rejects_code_change() {
        let err = RegionSchema.load_patch(json!({"NOC": "ABC"})).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed(_)));
    }
}
