use std::sync::Arc;

use rowset_api::{CursorError, Field, FieldRegistry, TypeTag};

/// Whether a column may hold null. The schema never says, so always `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    NoNulls,
    Nullable,
    Unknown,
}

/// Column description of a result set. Stays usable after the cursor is closed.
#[derive(Debug, Clone)]
pub struct ResultMetadata {
    fields: Arc<FieldRegistry>,
}

impl ResultMetadata {
    pub fn new(fields: Arc<FieldRegistry>) -> Self {
        Self { fields }
    }

    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, index: usize) -> Result<&Field, CursorError> {
        self.fields.field(index)
    }

    pub fn column_name(&self, index: usize) -> Result<&str, CursorError> {
        Ok(&self.fields.field(index)?.name)
    }

    /// Labels equal names: the query engine reports aliases as names.
    pub fn column_label(&self, index: usize) -> Result<&str, CursorError> {
        self.column_name(index)
    }

    pub fn column_type(&self, index: usize) -> Result<TypeTag, CursorError> {
        Ok(self.fields.field(index)?.type_tag)
    }

    pub fn column_type_name(&self, index: usize) -> Result<&'static str, CursorError> {
        Ok(self.column_type(index)?.sql_name())
    }

    pub fn is_nullable(&self, index: usize) -> Result<Nullability, CursorError> {
        self.fields.field(index)?;
        Ok(Nullability::Unknown)
    }
}
