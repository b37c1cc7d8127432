//! Value validation against schemas

use super::schema::{FieldType, Schema};
use super::value::Value;
use thiserror::Error;

/// Validation error. Field names are dot paths from the validated root.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Unknown field: {field}")]
    UnknownField { field: String },

    #[error("Array item validation failed for '{field}' at index {index}: {message}")]
    ArrayItemError {
        field: String,
        index: usize,
        message: String,
    },
}

/// Validator for values against schemas
#[derive(Debug, Clone, Default)]
pub struct Validator {
    /// Accept unknown fields even when a schema disallows them
    allow_unknown_fields: bool,
}

impl Validator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow unknown fields in validation
    pub fn allow_unknown_fields(mut self, allow: bool) -> Self {
        self.allow_unknown_fields = allow;
        self
    }

    /// Validate a value against a schema, collecting every violation
    pub fn validate(&self, value: &Value, schema: &Schema) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        self.validate_object("", value, schema, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(schema = %schema.name, count = errors.len(), "schema validation failed");
            Err(errors)
        }
    }

    fn validate_object(
        &self,
        prefix: &str,
        value: &Value,
        schema: &Schema,
        errors: &mut Vec<ValidationError>,
    ) {
        let obj = match value {
            Value::Object(obj) => obj,
            _ => {
                errors.push(ValidationError::TypeMismatch {
                    field: if prefix.is_empty() { "root".to_string() } else { prefix.to_string() },
                    expected: "object".to_string(),
                    actual: value.type_name().to_string(),
                });
                return;
            }
        };

        for (field_name, field) in &schema.fields {
            if field.required && !obj.contains_key(field_name) {
                errors.push(ValidationError::RequiredFieldMissing {
                    field: join(prefix, field_name),
                });
            }
        }

        for (field_name, field_value) in obj {
            let path = join(prefix, field_name);
            match schema.get_field(field_name) {
                Some(schema_field) => {
                    if schema_field.nullable && field_value.is_null() {
                        continue;
                    }
                    self.validate_field(&path, field_value, &schema_field.field_type, errors);
                }
                None => {
                    if !schema.additional_properties && !self.allow_unknown_fields {
                        errors.push(ValidationError::UnknownField { field: path });
                    }
                }
            }
        }
    }

    fn validate_field(
        &self,
        path: &str,
        value: &Value,
        field_type: &FieldType,
        errors: &mut Vec<ValidationError>,
    ) {
        let matches_type = match (field_type, value) {
            (FieldType::Any, _) => true,
            (FieldType::Null, Value::Null) => true,
            (FieldType::Boolean, Value::Bool(_)) => true,
            (FieldType::Number, Value::Number(_)) => true,
            (FieldType::Integer, Value::Number(n)) => n.fract() == 0.0,
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Array { item_type }, Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    let mut item_errors = Vec::new();
                    self.validate_field(&format!("{}[{}]", path, index), item, item_type, &mut item_errors);
                    if let Some(first) = item_errors.into_iter().next() {
                        errors.push(ValidationError::ArrayItemError {
                            field: path.to_string(),
                            index,
                            message: first.to_string(),
                        });
                    }
                }
                true
            }
            (FieldType::Object { schema }, Value::Object(_)) => {
                if let Some(nested_schema) = schema {
                    self.validate_object(path, value, nested_schema, errors);
                }
                true
            }
            _ => false,
        };

        if !matches_type {
            errors.push(ValidationError::TypeMismatch {
                field: path.to_string(),
                expected: field_type.type_name().to_string(),
                actual: value.type_name().to_string(),
            });
        }
    }
}

fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
