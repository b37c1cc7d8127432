//! Schema definitions for input and output validation
//!
//! Decision documents attach a JSON Schema to input and output nodes. Only the
//! structural subset used by decision models is understood: `type`,
//! `properties`, `required`, `items` and `additionalProperties`. Everything
//! else in the schema document is ignored.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A schema defines the structure and types of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name (the JSON Schema `title`, or `root`)
    pub name: String,

    /// Schema description
    pub description: Option<String>,

    /// Fields in the schema
    pub fields: BTreeMap<String, SchemaField>,

    /// Whether keys not listed in `fields` are accepted
    #[serde(default = "default_true")]
    pub additional_properties: bool,
}

fn default_true() -> bool {
    true
}

/// A field in a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name
    pub name: String,

    /// Field type
    pub field_type: FieldType,

    /// Whether this field is required
    #[serde(default)]
    pub required: bool,

    /// Whether `null` is accepted in place of `field_type`
    #[serde(default)]
    pub nullable: bool,

    /// Optional description
    pub description: Option<String>,
}

/// Field type enumeration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Null,
    Boolean,
    Number,
    /// Number without a fractional part
    Integer,
    String,
    Array {
        /// Type of array elements
        item_type: Box<FieldType>,
    },
    Object {
        /// Schema for the object (optional)
        schema: Option<Box<Schema>>,
    },
    /// Any type (no validation)
    Any,
}

impl Schema {
    /// Create a new schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: BTreeMap::new(),
            additional_properties: true,
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a field
    pub fn add_field(mut self, field: SchemaField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Reject keys that are not declared
    pub fn deny_additional_properties(mut self) -> Self {
        self.additional_properties = false;
        self
    }

    /// Get a field by name
    pub fn get_field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.get(name)
    }

    /// Check if a field is required
    pub fn is_required(&self, name: &str) -> bool {
        self.fields.get(name).map(|f| f.required).unwrap_or(false)
    }

    /// Build a schema from a JSON Schema document whose root is an object type.
    pub fn from_json_schema(document: &serde_json::Value) -> Result<Self> {
        let root = document.as_object().ok_or_else(|| {
            CoreError::InvalidValue("schema document must be a JSON object".to_string())
        })?;

        let (field_type, _) = FieldType::from_json_schema("root", document)?;
        if !matches!(field_type, FieldType::Object { .. } | FieldType::Any) {
            return Err(CoreError::InvalidValue(format!(
                "schema root must describe an object, found {}",
                field_type.type_name()
            )));
        }

        let name = root
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or("root")
            .to_string();
        object_schema(name, root)
    }
}

fn object_schema(name: String, node: &serde_json::Map<String, serde_json::Value>) -> Result<Schema> {
    let mut schema = Schema::new(name);
    schema.description = node
        .get("description")
        .and_then(|d| d.as_str())
        .map(str::to_string);
    schema.additional_properties = node
        .get("additionalProperties")
        .map(|a| !matches!(a, serde_json::Value::Bool(false)))
        .unwrap_or(true);

    let required: Vec<&str> = node
        .get("required")
        .and_then(|r| r.as_array())
        .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    if let Some(properties) = node.get("properties") {
        let properties = properties.as_object().ok_or_else(|| {
            CoreError::InvalidValue("'properties' must be an object".to_string())
        })?;
        for (key, property) in properties {
            let (field_type, nullable) = FieldType::from_json_schema(key, property)?;
            let mut field = SchemaField::new(key.clone(), field_type);
            field.nullable = nullable;
            field.required = required.contains(&key.as_str());
            field.description = property
                .get("description")
                .and_then(|d| d.as_str())
                .map(str::to_string);
            schema.fields.insert(key.clone(), field);
        }
    }

    for key in required {
        if !schema.fields.contains_key(key) {
            schema
                .fields
                .insert(key.to_string(), SchemaField::new(key, FieldType::Any).required());
        }
    }

    Ok(schema)
}

impl SchemaField {
    /// Create a new field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            nullable: false,
            description: None,
        }
    }

    /// Mark field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept null values
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

impl FieldType {
    /// Create an array type
    pub fn array(item_type: FieldType) -> Self {
        FieldType::Array {
            item_type: Box::new(item_type),
        }
    }

    /// Create an object type
    pub fn object() -> Self {
        FieldType::Object { schema: None }
    }

    /// Create an object type with schema
    pub fn object_with_schema(schema: Schema) -> Self {
        FieldType::Object {
            schema: Some(Box::new(schema)),
        }
    }

    /// Get type name as string
    pub fn type_name(&self) -> &str {
        match self {
            FieldType::Null => "null",
            FieldType::Boolean => "boolean",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::String => "string",
            FieldType::Array { .. } => "array",
            FieldType::Object { .. } => "object",
            FieldType::Any => "any",
        }
    }

    /// Translate one JSON Schema node. Returns the type and whether `null`
    /// is additionally permitted (`"type": ["string", "null"]`).
    fn from_json_schema(name: &str, node: &serde_json::Value) -> Result<(FieldType, bool)> {
        let Some(object) = node.as_object() else {
            // `true` / `{}` style schemas accept anything
            return Ok((FieldType::Any, false));
        };

        let mut names: Vec<&str> = match object.get("type") {
            None => return Ok((FieldType::Any, false)),
            Some(serde_json::Value::String(t)) => vec![t.as_str()],
            Some(serde_json::Value::Array(types)) => {
                types.iter().filter_map(|t| t.as_str()).collect()
            }
            Some(other) => {
                return Err(CoreError::InvalidValue(format!(
                    "invalid 'type' for '{}': {}",
                    name, other
                )))
            }
        };

        let nullable = names.len() > 1 && names.contains(&"null");
        if nullable {
            names.retain(|t| *t != "null");
        }
        if names.len() != 1 {
            return Ok((FieldType::Any, nullable));
        }

        let field_type = match names[0] {
            "null" => FieldType::Null,
            "boolean" => FieldType::Boolean,
            "number" => FieldType::Number,
            "integer" => FieldType::Integer,
            "string" => FieldType::String,
            "array" => {
                let items = match object.get("items") {
                    Some(items) => FieldType::from_json_schema(name, items)?.0,
                    None => FieldType::Any,
                };
                FieldType::array(items)
            }
            "object" => {
                if object.contains_key("properties") || object.contains_key("required") {
                    FieldType::object_with_schema(object_schema(name.to_string(), object)?)
                } else {
                    FieldType::object()
                }
            }
            other => {
                return Err(CoreError::InvalidValue(format!(
                    "unsupported type '{}' for '{}'",
                    other, name
                )))
            }
        };

        Ok((field_type, nullable))
    }
}
