//! Tool specifications exposed to the model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// JSON type accepted for a tool input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Boolean,
}

impl FieldType {
    fn json_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// One named, typed input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Constraint text shown to the model.
    pub description: String,
}

/// A tool definition: name, description and ordered input fields.
///
/// Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub fields: Vec<FieldSpec>,
}

impl ToolSpec {
    /// Create a spec with no input fields.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    /// Append a required input field.
    pub fn field(
        mut self,
        name: impl Into<String>,
        ty: FieldType,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            ty,
            description: description.into(),
        });
        self
    }

    /// JSON Schema rendering of the input fields.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| {
                (
                    f.name.clone(),
                    json!({
                        "type": f.ty.json_name(),
                        "description": f.description,
                    }),
                )
            })
            .collect();
        let required: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check `input` against the fields and return the argument map.
    ///
    /// A bare string is accepted for single-field tools and wrapped into that
    /// field. Missing, ill-typed and unknown fields are rejected.
    pub fn coerce(&self, input: Value) -> Result<Map<String, Value>, String> {
        let args = match input {
            Value::Object(map) => map,
            Value::String(s) if self.fields.len() == 1 => {
                let mut map = Map::new();
                map.insert(self.fields[0].name.clone(), Value::String(s));
                map
            }
            Value::Null if self.fields.is_empty() => Map::new(),
            other => {
                return Err(format!(
                    "expected an object with fields [{}], got {}",
                    self.field_names().join(", "),
                    type_name(&other)
                ));
            }
        };

        for field in &self.fields {
            match args.get(&field.name) {
                None => return Err(format!("missing field `{}`", field.name)),
                Some(value) if !field.ty.accepts(value) => {
                    return Err(format!(
                        "field `{}` must be a {}, got {}",
                        field.name,
                        field.ty.json_name(),
                        type_name(value)
                    ));
                }
                Some(_) => {}
            }
        }

        if let Some(unknown) = args
            .keys()
            .find(|k| !self.fields.iter().any(|f| &f.name == *k))
        {
            return Err(format!("unknown field `{unknown}`"));
        }

        Ok(args)
    }

    fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
