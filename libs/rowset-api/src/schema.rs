use std::fmt;

use crate::error::CursorError;
use crate::value::Value;

/// Declared logical type of an output column.
///
/// Taken from the query engine's result signature. Drives the generic
/// object accessor; typed getters ignore it and look at the runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Numeric,
    Boolean,
    String,
    Array,
    Object,
    Null,
}

impl TypeTag {
    /// Map a signature type name (`"number"`, `"string"`, `"json"`, ...) to a tag.
    ///
    /// Unknown names are treated as `Object`: the column holds an arbitrary
    /// JSON document.
    pub fn from_signature(name: &str) -> Self {
        match name {
            "number" | "numeric" => TypeTag::Numeric,
            "boolean" => TypeTag::Boolean,
            "string" => TypeTag::String,
            "array" => TypeTag::Array,
            "null" => TypeTag::Null,
            _ => TypeTag::Object,
        }
    }

    /// Tag describing the runtime shape of a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Number(_) | Value::Decimal(_) => TypeTag::Numeric,
            Value::String(_) | Value::Date(_) | Value::Time(_) | Value::Timestamp(_) => {
                TypeTag::String
            }
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) => TypeTag::Object,
        }
    }

    /// SQL type name reported through result metadata.
    pub fn sql_name(&self) -> &'static str {
        match self {
            TypeTag::Numeric => "NUMERIC",
            TypeTag::Boolean => "BOOLEAN",
            TypeTag::String => "VARCHAR",
            TypeTag::Array => "ARRAY",
            TypeTag::Object => "JSON",
            TypeTag::Null => "NULL",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Numeric => f.write_str("numeric"),
            TypeTag::Boolean => f.write_str("boolean"),
            TypeTag::String => f.write_str("string"),
            TypeTag::Array => f.write_str("array"),
            TypeTag::Object => f.write_str("object"),
            TypeTag::Null => f.write_str("null"),
        }
    }
}

/// One declared output column.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Field {
    pub name: String,
    pub type_tag: TypeTag,
}

impl Field {
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
        }
    }
}

/// Ordered, immutable list of declared columns.
///
/// Position in `fields` defines the 1-based column index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRegistry {
    fields: Vec<Field>,
}

impl FieldRegistry {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field at a 1-based column index.
    pub fn field(&self, index: usize) -> Result<&Field, CursorError> {
        index
            .checked_sub(1)
            .and_then(|i| self.fields.get(i))
            .ok_or(CursorError::InvalidColumn {
                index,
                count: self.fields.len(),
            })
    }

    /// First field with exactly this name (case-sensitive).
    pub fn find(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// 1-based index of the first field with exactly this name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name).map(|i| i + 1)
    }

    pub fn index_of(&self, name: &str) -> Result<usize, CursorError> {
        self.position(name)
            .ok_or_else(|| CursorError::UnknownColumn(name.to_string()))
    }
}

impl FromIterator<Field> for FieldRegistry {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
