use serde::Deserialize;

use rowset_api::{CursorError, Field, FieldRegistry, Row, TypeTag, Value};

/// Column name given to non-object result items (`SELECT RAW ...`).
pub const RAW_COLUMN: &str = "$1";

/// Warning or error record attached to a query response.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct Warning {
    pub code: i64,
    #[serde(rename = "msg")]
    pub message: String,
}

impl Warning {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[serde(default)]
    pub result_count: u64,
    #[serde(default)]
    pub result_size: u64,
}

/// Body of a query-service response, fully materialized.
///
/// Only the members the cursor consumes are decoded; the rest is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default, rename = "requestID")]
    pub request_id: Option<String>,
    /// Column name → type name, in projection order. `"*"` marks a wildcard.
    #[serde(default)]
    pub signature: Option<serde_json::Value>,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Vec<Warning>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    #[serde(default)]
    pub metrics: Metrics,
}

/// Everything a cursor is built from.
#[derive(Debug, Clone)]
pub struct ResultSetParts {
    pub rows: Vec<Row>,
    pub fields: FieldRegistry,
    pub warnings: Vec<Warning>,
}

impl QueryResponse {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CursorError> {
        serde_json::from_slice(bytes)
            .map_err(|e| CursorError::from(e).with_context("decode query response"))
    }

    pub fn parse(json: &str) -> Result<Self, CursorError> {
        Self::from_slice(json.as_bytes())
    }

    /// Declared columns, in signature order.
    ///
    /// A wildcard (`"*"`) or a missing signature falls back to the keys of
    /// the first result row, typed by their runtime shape.
    pub fn fields(&self) -> FieldRegistry {
        let mut fields = Vec::new();
        let mut wildcard = false;

        match &self.signature {
            Some(serde_json::Value::Object(signature)) => {
                for (name, type_name) in signature {
                    if name == "*" {
                        wildcard = true;
                        continue;
                    }
                    let tag = type_name
                        .as_str()
                        .map(TypeTag::from_signature)
                        .unwrap_or(TypeTag::Object);
                    fields.push(Field::new(name.clone(), tag));
                }
            }
            // RAW projection: a bare type name
            Some(serde_json::Value::String(type_name)) => {
                fields.push(Field::new(RAW_COLUMN, TypeTag::from_signature(type_name)));
            }
            _ => wildcard = true,
        }

        if wildcard {
            match self.results.first() {
                Some(serde_json::Value::Object(first)) => {
                    for (name, value) in first {
                        if !fields.iter().any(|f| &f.name == name) {
                            fields.push(Field::new(name.clone(), tag_of_json(value)));
                        }
                    }
                }
                // RAW items without a signature
                Some(first) if !fields.iter().any(|f| f.name == RAW_COLUMN) => {
                    fields.push(Field::new(RAW_COLUMN, tag_of_json(first)));
                }
                _ => {}
            }
        }

        FieldRegistry::new(fields)
    }

    /// Split into cursor input. A response carrying errors yields no cursor.
    pub fn into_parts(self) -> Result<ResultSetParts, CursorError> {
        if let Some(first) = self.errors.first() {
            return Err(CursorError::Response(format!(
                "query failed with {} error(s), first: [{}] {}",
                self.errors.len(),
                first.code,
                first.message
            )));
        }

        for warning in &self.warnings {
            tracing::warn!(code = warning.code, message = %warning.message, "query response warning");
        }

        let fields = self.fields();
        let rows: Vec<Row> = self
            .results
            .into_iter()
            .map(|item| match item {
                serde_json::Value::Object(map) => Row::from(map),
                other => std::iter::once((RAW_COLUMN, Value::from(other))).collect(),
            })
            .collect();

        let result_count = self.metrics.result_count;
        tracing::debug!(
            status = self.status.as_deref().unwrap_or("unknown"),
            result_count,
            result_size = self.metrics.result_size,
            "decoded query response"
        );
        if result_count != 0 && result_count != rows.len() as u64 {
            tracing::warn!(
                result_count,
                rows = rows.len(),
                "metrics.resultCount disagrees with materialized rows, using rows"
            );
        }

        Ok(ResultSetParts {
            rows,
            fields,
            warnings: self.warnings,
        })
    }
}

fn tag_of_json(value: &serde_json::Value) -> TypeTag {
    match value {
        serde_json::Value::Null => TypeTag::Null,
        serde_json::Value::Bool(_) => TypeTag::Boolean,
        serde_json::Value::Number(_) => TypeTag::Numeric,
        serde_json::Value::String(_) => TypeTag::String,
        serde_json::Value::Array(_) => TypeTag::Array,
        serde_json::Value::Object(_) => TypeTag::Object,
    }
}
