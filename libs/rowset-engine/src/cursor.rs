use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rowset_api::{CursorError, Field, FieldRegistry, Row, TypeTag, Value};
use rust_decimal::Decimal;

use crate::coerce::{self, Charset, SqlArray};
use crate::column::{Column, FromColumn};
use crate::config::CursorOptions;
use crate::metadata::ResultMetadata;
use crate::response::{QueryResponse, ResultSetParts, Warning};
use crate::temporal::{Calendar, SqlDate, SqlTime, SqlTimestamp};

/// The statement a cursor was produced by.
pub trait StatementSource: Send + Sync {
    /// Statement text as submitted.
    fn text(&self) -> &str;
}

impl StatementSource for String {
    fn text(&self) -> &str {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorType {
    ForwardOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    ReadOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holdability {
    CloseCursorsAtCommit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDirection {
    Forward,
    Reverse,
    Unknown,
}

/// Closes a cursor from another thread.
///
/// Shares the cursor's closed flag; once `close()` returns every later
/// cursor call observes it.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    closed: Arc<AtomicBool>,
}

impl CloseHandle {
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// A JSON column together with its declared field (if the column is declared).
#[derive(Debug, Clone, PartialEq)]
pub struct JsonColumn {
    pub value: Value,
    pub field: Option<Field>,
}

impl JsonColumn {
    pub fn to_json_string(&self) -> String {
        self.value.to_json().to_string()
    }
}

/// Forward-only, read-only cursor over a materialized result.
///
/// Position is `None` before the first row, `Some(i)` on row `i`, and
/// `Some(row_count)` after the last row. The cursor never moves backwards.
///
/// Every column read overwrites the null/missing flags; read them through
/// [`was_null`](Self::was_null) / [`was_missing`](Self::was_missing) right
/// after the getter.
pub struct RowCursor {
    rows: Vec<Row>,
    fields: Arc<FieldRegistry>,
    position: Option<usize>,
    closed: Arc<AtomicBool>,
    last_was_null: bool,
    last_was_missing: bool,
    warnings: Vec<Warning>,
    options: CursorOptions,
    statement: Option<Arc<dyn StatementSource>>,
}

impl RowCursor {
    pub fn new(rows: Vec<Row>, fields: FieldRegistry) -> Self {
        tracing::debug!(rows = rows.len(), columns = fields.len(), "loaded result set");
        Self {
            rows,
            fields: Arc::new(fields),
            position: None,
            closed: Arc::new(AtomicBool::new(false)),
            last_was_null: false,
            last_was_missing: false,
            warnings: Vec::new(),
            options: CursorOptions::default(),
            statement: None,
        }
    }

    pub fn from_parts(parts: ResultSetParts) -> Self {
        Self::new(parts.rows, parts.fields).with_warnings(parts.warnings)
    }

    pub fn from_response(response: QueryResponse) -> Result<Self, CursorError> {
        Ok(Self::from_parts(response.into_parts()?))
    }

    pub fn with_options(mut self, options: CursorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<Warning>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_statement(mut self, statement: Arc<dyn StatementSource>) -> Self {
        self.statement = Some(statement);
        self
    }

    // ── Lifecycle & position ──

    /// Advance one row. `false` once past the last row; further calls stay there.
    pub fn next(&mut self) -> Result<bool, CursorError> {
        self.ensure_open()?;
        let row_count = self.rows.len();
        let position = match self.position {
            None => 0,
            Some(p) => (p + 1).min(row_count),
        };
        self.position = Some(position);
        Ok(position < row_count)
    }

    /// Idempotent.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(rows = self.rows.len(), "result set closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            closed: Arc::clone(&self.closed),
        }
    }

    /// 1-based row number: 0 before the first row, `row_count + 1` after the last.
    pub fn get_row(&self) -> Result<usize, CursorError> {
        self.ensure_open()?;
        Ok(self.row_number())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Jump to the first row. `false` if the result is empty.
    pub fn first(&mut self) -> Result<bool, CursorError> {
        self.ensure_open()?;
        self.position = Some(0);
        Ok(!self.rows.is_empty())
    }

    pub fn after_last(&mut self) -> Result<(), CursorError> {
        self.ensure_open()?;
        self.position = Some(self.rows.len());
        Ok(())
    }

    pub fn is_before_first(&self) -> Result<bool, CursorError> {
        self.ensure_open()?;
        Ok(self.position.is_none() && !self.rows.is_empty())
    }

    pub fn is_after_last(&self) -> Result<bool, CursorError> {
        self.ensure_open()?;
        Ok(!self.rows.is_empty() && self.position == Some(self.rows.len()))
    }

    pub fn is_first(&self) -> Result<bool, CursorError> {
        self.ensure_open()?;
        Ok(!self.rows.is_empty() && self.position == Some(0))
    }

    pub fn is_last(&self) -> Result<bool, CursorError> {
        self.ensure_open()?;
        Ok(matches!(self.position, Some(p) if p + 1 == self.rows.len()))
    }

    // ── Null / missing flags ──

    /// Whether the last column read was present and null.
    pub fn was_null(&self) -> bool {
        self.last_was_null
    }

    /// Whether the last column read is declared but absent from the row.
    pub fn was_missing(&self) -> bool {
        self.last_was_missing
    }

    // ── Typed getters ──

    pub fn get_boolean<'c>(&mut self, column: impl Into<Column<'c>>) -> Result<bool, CursorError> {
        self.read(column.into(), "boolean", false, coerce::to_bool)
    }

    pub fn get_byte<'c>(&mut self, column: impl Into<Column<'c>>) -> Result<i8, CursorError> {
        self.read(column.into(), "byte", 0, coerce::to_i8)
    }

    pub fn get_short<'c>(&mut self, column: impl Into<Column<'c>>) -> Result<i16, CursorError> {
        self.read(column.into(), "short", 0, coerce::to_i16)
    }

    pub fn get_int<'c>(&mut self, column: impl Into<Column<'c>>) -> Result<i32, CursorError> {
        self.read(column.into(), "int", 0, coerce::to_i32)
    }

    pub fn get_long<'c>(&mut self, column: impl Into<Column<'c>>) -> Result<i64, CursorError> {
        self.read(column.into(), "long", 0, coerce::to_i64)
    }

    pub fn get_float<'c>(&mut self, column: impl Into<Column<'c>>) -> Result<f32, CursorError> {
        self.read(column.into(), "float", 0.0, coerce::to_f32)
    }

    pub fn get_double<'c>(&mut self, column: impl Into<Column<'c>>) -> Result<f64, CursorError> {
        self.read(column.into(), "double", 0.0, coerce::to_f64)
    }

    pub fn get_decimal<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
    ) -> Result<Option<Decimal>, CursorError> {
        self.read(column.into(), "decimal", None, |v| coerce::to_decimal(v).map(Some))
    }

    /// Decimal rounded half-up to `scale` fractional digits.
    pub fn get_decimal_scaled<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
        scale: u32,
    ) -> Result<Option<Decimal>, CursorError> {
        self.read(column.into(), "decimal", None, |v| {
            coerce::to_decimal(v).map(|d| Some(coerce::with_scale(d, scale)))
        })
    }

    pub fn get_string<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
    ) -> Result<Option<String>, CursorError> {
        self.read(column.into(), "string", None, |v| Ok(Some(coerce::to_text(v))))
    }

    /// Bytes of a string column in the configured charset.
    pub fn get_bytes<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
    ) -> Result<Option<Vec<u8>>, CursorError> {
        let charset = self.options.charset;
        self.get_bytes_with(column, charset)
    }

    pub fn get_bytes_with<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
        charset: Charset,
    ) -> Result<Option<Vec<u8>>, CursorError> {
        self.read(column.into(), "bytes", None, |v| coerce::to_bytes(v, charset).map(Some))
    }

    pub fn get_date<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
    ) -> Result<Option<SqlDate>, CursorError> {
        let default = self.options.calendar;
        self.read(column.into(), "date", None, |v| coerce::to_date(v, default).map(Some))
    }

    /// Date parsed in the default calendar, fields reprojected into `calendar`.
    pub fn get_date_in<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
        calendar: Calendar,
    ) -> Result<Option<SqlDate>, CursorError> {
        Ok(self.get_date(column)?.map(|d| d.reproject(calendar)))
    }

    pub fn get_time<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
    ) -> Result<Option<SqlTime>, CursorError> {
        let default = self.options.calendar;
        self.read(column.into(), "time", None, |v| coerce::to_time(v, default).map(Some))
    }

    pub fn get_time_in<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
        calendar: Calendar,
    ) -> Result<Option<SqlTime>, CursorError> {
        Ok(self.get_time(column)?.map(|t| t.reproject(calendar)))
    }

    pub fn get_timestamp<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
    ) -> Result<Option<SqlTimestamp>, CursorError> {
        let default = self.options.calendar;
        self.read(column.into(), "timestamp", None, |v| {
            coerce::to_timestamp(v, default).map(Some)
        })
    }

    pub fn get_timestamp_in<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
        calendar: Calendar,
    ) -> Result<Option<SqlTimestamp>, CursorError> {
        Ok(self.get_timestamp(column)?.map(|ts| ts.reproject(calendar)))
    }

    pub fn get_array<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
    ) -> Result<Option<SqlArray>, CursorError> {
        self.read(column.into(), "array", None, |v| coerce::to_array(v).map(Some))
    }

    /// Raw value, shaped by the column's declared type.
    ///
    /// Columns present in the row but not declared read as `None`.
    pub fn get_object<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
    ) -> Result<Option<Value>, CursorError> {
        let column = column.into();
        self.ensure_readable()?;
        let declared = self.declared_field(column)?.map(|f| f.type_tag);
        self.read(column, "object", None, |v| {
            Ok(declared.and_then(|tag| coerce::to_object(v, tag)))
        })
    }

    pub fn get_json<'c>(
        &mut self,
        column: impl Into<Column<'c>>,
    ) -> Result<Option<JsonColumn>, CursorError> {
        let column = column.into();
        self.ensure_readable()?;
        let field = self.declared_field(column)?.cloned();
        self.read(column, "json", None, move |v| {
            Ok(Some(JsonColumn {
                value: v.clone(),
                field,
            }))
        })
    }

    /// Generic accessor: `cursor.get::<i32>("age")`, `cursor.get::<Option<SqlDate>>(2)`.
    pub fn get<'c, T: FromColumn>(
        &mut self,
        column: impl Into<Column<'c>>,
    ) -> Result<T, CursorError> {
        T::from_column(self, column.into())
    }

    // ── Schema & statement ──

    /// 1-based index of a declared column.
    pub fn find_column(&self, label: &str) -> Result<usize, CursorError> {
        self.ensure_open()?;
        self.fields.index_of(label)
    }

    pub fn metadata(&self) -> ResultMetadata {
        ResultMetadata::new(Arc::clone(&self.fields))
    }

    pub fn warnings(&self) -> Result<&[Warning], CursorError> {
        self.ensure_open()?;
        Ok(&self.warnings)
    }

    pub fn clear_warnings(&mut self) -> Result<(), CursorError> {
        self.ensure_open()?;
        self.warnings.clear();
        Ok(())
    }

    pub fn statement(&self) -> Result<Option<&Arc<dyn StatementSource>>, CursorError> {
        self.ensure_open()?;
        Ok(self.statement.as_ref())
    }

    // ── Fixed capabilities ──

    pub fn cursor_type(&self) -> Result<CursorType, CursorError> {
        self.ensure_open()?;
        Ok(CursorType::ForwardOnly)
    }

    pub fn concurrency(&self) -> Result<Concurrency, CursorError> {
        self.ensure_open()?;
        Ok(Concurrency::ReadOnly)
    }

    pub fn holdability(&self) -> Result<Holdability, CursorError> {
        self.ensure_open()?;
        Ok(Holdability::CloseCursorsAtCommit)
    }

    pub fn fetch_direction(&self) -> Result<FetchDirection, CursorError> {
        self.ensure_open()?;
        Ok(FetchDirection::Forward)
    }

    /// Only forward fetching exists; `Reverse` is refused.
    pub fn set_fetch_direction(&mut self, direction: FetchDirection) -> Result<(), CursorError> {
        self.ensure_open()?;
        match direction {
            FetchDirection::Reverse => Err(CursorError::unsupported("reverse fetch direction")),
            FetchDirection::Forward | FetchDirection::Unknown => Ok(()),
        }
    }

    /// Rows are fully materialized; the hint is accepted and ignored.
    pub fn set_fetch_size(&mut self, _rows: usize) -> Result<(), CursorError> {
        self.ensure_open()
    }

    pub fn fetch_size(&self) -> Result<usize, CursorError> {
        self.ensure_open()?;
        Ok(0)
    }

    // ── Internals ──

    fn ensure_open(&self) -> Result<(), CursorError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CursorError::Closed);
        }
        Ok(())
    }

    fn row_number(&self) -> usize {
        self.position.map_or(0, |p| p + 1)
    }

    fn row_index(&self) -> Result<usize, CursorError> {
        match self.position {
            Some(p) if p < self.rows.len() => Ok(p),
            _ => Err(CursorError::InvalidPosition {
                row: self.row_number(),
                row_count: self.rows.len(),
            }),
        }
    }

    fn ensure_readable(&self) -> Result<(), CursorError> {
        self.ensure_open()?;
        self.row_index().map(|_| ())
    }

    fn declared_field(&self, column: Column<'_>) -> Result<Option<&Field>, CursorError> {
        match column {
            Column::Index(i) => self.fields.field(i).map(Some),
            Column::Label(label) => Ok(self.fields.find(label)),
        }
    }

    /// Resolve a column on the current row and set the null/missing flags.
    ///
    /// `Ok(None)` for null and for missing columns; the flags tell them apart.
    fn slot(&mut self, column: Column<'_>) -> Result<Option<&Value>, CursorError> {
        self.ensure_open()?;
        let index = self.row_index()?;
        let label = match column {
            Column::Index(i) => self.fields.field(i)?.name.as_str(),
            Column::Label(label) => label,
        };

        let raw = self.rows[index].get(label);
        if raw.is_none() && self.fields.position(label).is_none() {
            return Err(CursorError::UnknownColumn(label.to_string()));
        }

        self.last_was_missing = raw.is_none();
        self.last_was_null = matches!(raw, Some(Value::Null));
        Ok(raw.filter(|v| !v.is_null()))
    }

    fn read<T>(
        &mut self,
        column: Column<'_>,
        target: &'static str,
        empty: T,
        convert: impl FnOnce(&Value) -> Result<T, CursorError>,
    ) -> Result<T, CursorError> {
        let value = match self.slot(column)? {
            Some(raw) => convert(raw)?,
            None => empty,
        };
        tracing::trace!(
            %column,
            as_type = target,
            null = self.last_was_null,
            missing = self.last_was_missing,
            "read column"
        );
        Ok(value)
    }
}

/// Registry from `(name, tag)` pairs, in declaration order.
pub fn fields_from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, TypeTag)>) -> FieldRegistry {
    pairs
        .into_iter()
        .map(|(name, tag)| Field::new(name, tag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Timelike};
    use rowset_api::ErrorKind;
    use serde_json::json;

    fn row(json: serde_json::Value) -> Row {
        match json {
            serde_json::Value::Object(map) => Row::from(map),
            other => panic!("not an object: {other}"),
        }
    }

    fn cursor(rows: Vec<serde_json::Value>) -> RowCursor {
        let fields = fields_from_pairs([
            ("id", TypeTag::String),
            ("default", TypeTag::Numeric),
            ("tags", TypeTag::Array),
        ]);
        RowCursor::new(rows.into_iter().map(row).collect(), fields)
    }

    #[test]
    fn next_walks_every_row_then_stays_after_last() {
        let mut c = cursor(vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})]);
        assert_eq!(c.get_row().unwrap(), 0);
        assert!(c.is_before_first().unwrap());

        for k in 1..=3 {
            assert!(c.next().unwrap());
            assert_eq!(c.get_row().unwrap(), k);
        }
        assert!(c.is_last().unwrap());

        assert!(!c.next().unwrap());
        assert_eq!(c.get_row().unwrap(), 4);
        assert!(c.is_after_last().unwrap());

        assert!(!c.next().unwrap());
        assert_eq!(c.get_row().unwrap(), 4);
    }

    #[test]
    fn reads_require_a_current_row() {
        let mut c = cursor(vec![json!({"id": "a"})]);
        let err = c.get_string("id").unwrap_err();
        assert_eq!(err, CursorError::InvalidPosition { row: 0, row_count: 1 });

        c.next().unwrap();
        c.next().unwrap();
        assert_eq!(c.get_int(2).unwrap_err().kind(), ErrorKind::InvalidPosition);
    }

    #[test]
    fn null_missing_and_unknown_are_distinct() {
        let mut c = cursor(vec![json!({"id": "a", "default": null, "extra": 1})]);
        c.next().unwrap();

        assert_eq!(c.get_int("default").unwrap(), 0);
        assert!(c.was_null());
        assert!(!c.was_missing());

        assert_eq!(c.get_byte("tags").unwrap(), 0);
        assert!(!c.was_null());
        assert!(c.was_missing());

        assert_eq!(c.get_string("tags").unwrap(), None);
        assert!(c.was_missing());

        // present but undeclared
        assert_eq!(c.get_long("extra").unwrap(), 1);
        assert!(!c.was_missing());

        let err = c.get_int("nope").unwrap_err();
        assert_eq!(err, CursorError::UnknownColumn("nope".into()));
    }

    #[test]
    fn flags_reset_on_every_read() {
        let mut c = cursor(vec![json!({"id": null, "default": 3})]);
        c.next().unwrap();

        c.get_string("id").unwrap();
        assert!(c.was_null());
        assert_eq!(c.get_short("default").unwrap(), 3);
        assert!(!c.was_null());
        assert!(!c.was_missing());
    }

    #[test]
    fn index_and_label_agree() {
        let mut c = cursor(vec![json!({"id": "x", "default": 7})]);
        c.next().unwrap();

        assert_eq!(c.get_int(2).unwrap(), c.get_int("default").unwrap());
        assert_eq!(c.get_string(1usize).unwrap().as_deref(), Some("x"));
        assert_eq!(
            c.get_int(4).unwrap_err(),
            CursorError::InvalidColumn { index: 4, count: 3 }
        );
        assert_eq!(c.get_int(-1).unwrap_err().kind(), ErrorKind::InvalidColumn);
    }

    #[test]
    fn generic_get_dispatches_by_type() {
        let mut c = cursor(vec![json!({"id": "2024-05-06", "default": 42.7, "tags": ["a"]})]);
        c.next().unwrap();

        assert_eq!(c.get::<i32>("default").unwrap(), 42);
        assert_eq!(c.get::<f64>("default").unwrap(), 42.7);
        assert_eq!(c.get::<Option<String>>("id").unwrap().as_deref(), Some("2024-05-06"));

        let date = c.get::<Option<SqlDate>>("id").unwrap().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 5, 6));

        let tags = c.get::<Option<SqlArray>>(3).unwrap().unwrap();
        assert_eq!(tags.elements(), [Value::from("a")]);
    }

    #[test]
    fn object_uses_declared_type() {
        let mut c = cursor(vec![json!({"id": "x", "default": 1, "tags": [1, 2], "extra": true})]);
        c.next().unwrap();

        assert_eq!(c.get_object("default").unwrap(), Some(Value::from(json!(1))));
        assert_eq!(c.get_object("tags").unwrap(), Some(Value::from(json!([1, 2]))));
        assert_eq!(c.get_object("extra").unwrap(), None);
        assert!(!c.was_null());
    }

    #[test]
    fn null_typed_column_reads_as_none() {
        let fields = fields_from_pairs([("nothing", TypeTag::Null)]);
        let mut c = RowCursor::new(vec![row(json!({"nothing": 5}))], fields);
        c.next().unwrap();
        assert_eq!(c.get_object(1).unwrap(), None);
    }

    #[test]
    fn json_column_carries_its_field() {
        let mut c = cursor(vec![json!({"tags": ["x", {"y": 1}]})]);
        c.next().unwrap();

        let json = c.get_json("tags").unwrap().unwrap();
        assert_eq!(json.field, Some(Field::new("tags", TypeTag::Array)));
        assert_eq!(json.to_json_string(), r#"["x",{"y":1}]"#);
    }

    #[test]
    fn boolean_present_null_and_missing() {
        let mut c = cursor(vec![json!({"id": true, "default": null}), json!({"id": "yes"})]);
        c.next().unwrap();

        assert!(c.get_boolean("id").unwrap());
        assert!(!c.was_null());

        assert!(!c.get_boolean("default").unwrap());
        assert!(c.was_null());
        assert!(!c.was_missing());

        assert!(!c.get_boolean("tags").unwrap());
        assert!(c.was_missing());
        assert!(!c.was_null());

        c.next().unwrap();
        assert_eq!(c.get_boolean("id").unwrap_err().kind(), ErrorKind::TypeCoercion);
    }

    #[test]
    fn time_getters_parse_and_reproject() {
        let mut c = cursor(vec![json!({"id": "13:45:30", "default": "10:00:60"})]);
        c.next().unwrap();

        let time = c.get_time("id").unwrap().unwrap();
        assert_eq!(time.to_string(), "13:45:30");

        let plus_two = Calendar::parse("+02:00").unwrap();
        let shifted = c.get_time_in("id", plus_two).unwrap().unwrap();
        assert_eq!((shifted.hour(), shifted.minute()), (15, 45));
        assert_eq!(shifted.instant(), time.instant());

        assert_eq!(c.get_time_in("tags", plus_two).unwrap(), None);
        assert!(c.was_missing());

        assert_eq!(c.get_time("default").unwrap_err().kind(), ErrorKind::TypeCoercion);
    }

    #[test]
    fn native_time_values_are_not_reparsed() {
        let at = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        let row: Row = [("t", Value::Time(at.time())), ("ts", Value::Timestamp(at))]
            .into_iter()
            .collect();
        let fields = fields_from_pairs([("t", TypeTag::String), ("ts", TypeTag::String)]);
        let mut c = RowCursor::new(vec![row], fields);
        c.next().unwrap();

        let time = c.get_time("t").unwrap().unwrap();
        assert_eq!(time.to_string(), "08:15:00");
        assert_eq!(time.year(), 1970);

        let from_timestamp = c.get_time("ts").unwrap().unwrap();
        assert_eq!(from_timestamp.to_string(), "08:15:00");
        let timestamp = c.get_timestamp("ts").unwrap().unwrap();
        assert_eq!(from_timestamp.instant(), timestamp.instant());
    }

    #[test]
    fn decimal_scaled_rounds_half_up() {
        let mut c = cursor(vec![
            json!({"default": 1.125}),
            json!({"default": 7}),
            json!({"default": null}),
        ]);

        c.next().unwrap();
        let d = c.get_decimal_scaled("default", 2).unwrap().unwrap();
        assert_eq!(d.to_string(), "1.13");

        c.next().unwrap();
        let d = c.get_decimal_scaled("default", 2).unwrap().unwrap();
        assert_eq!(d.to_string(), "7.00");

        c.next().unwrap();
        assert_eq!(c.get_decimal_scaled("default", 2).unwrap(), None);
        assert!(c.was_null());
    }

    #[test]
    fn close_is_idempotent_and_final() {
        let mut c = cursor(vec![json!({"id": "a"})]);
        c.next().unwrap();
        c.close();
        c.close();

        assert!(c.is_closed());
        assert_eq!(c.next().unwrap_err(), CursorError::Closed);
        assert_eq!(c.get_string("id").unwrap_err(), CursorError::Closed);
        assert_eq!(c.get_row().unwrap_err(), CursorError::Closed);
        assert_eq!(c.warnings().unwrap_err(), CursorError::Closed);
        assert_eq!(c.find_column("id").unwrap_err(), CursorError::Closed);

        // metadata outlives the cursor
        assert_eq!(c.metadata().column_count(), 3);
    }

    #[test]
    fn close_from_another_thread_is_visible() {
        let mut c = cursor(vec![json!({"id": "a"}), json!({"id": "b"})]);
        let handle = c.close_handle();
        assert!(c.next().unwrap());

        std::thread::spawn(move || handle.close()).join().unwrap();

        assert!(c.is_closed());
        assert_eq!(c.next().unwrap_err(), CursorError::Closed);
    }

    #[test]
    fn first_and_after_last() {
        let mut c = cursor(vec![json!({"id": "a"}), json!({"id": "b"})]);
        c.next().unwrap();
        c.next().unwrap();
        assert!(c.first().unwrap());
        assert_eq!(c.get_string("id").unwrap().as_deref(), Some("a"));

        c.after_last().unwrap();
        assert!(!c.next().unwrap());
        assert_eq!(c.get_row().unwrap(), 3);

        let mut empty = cursor(vec![]);
        assert!(!empty.first().unwrap());
        assert!(!empty.is_before_first().unwrap());
    }

    #[test]
    fn capabilities_are_fixed() {
        let mut c = cursor(vec![]);
        assert_eq!(c.cursor_type().unwrap(), CursorType::ForwardOnly);
        assert_eq!(c.concurrency().unwrap(), Concurrency::ReadOnly);
        assert_eq!(c.holdability().unwrap(), Holdability::CloseCursorsAtCommit);
        assert_eq!(c.fetch_direction().unwrap(), FetchDirection::Forward);

        c.set_fetch_size(500).unwrap();
        assert_eq!(c.fetch_size().unwrap(), 0);
        c.set_fetch_direction(FetchDirection::Forward).unwrap();
        assert_eq!(
            c.set_fetch_direction(FetchDirection::Reverse).unwrap_err().kind(),
            ErrorKind::Unsupported
        );
    }

    #[test]
    fn warnings_can_be_cleared() {
        let mut c = cursor(vec![]).with_warnings(vec![Warning::new(1, "careful")]);
        assert_eq!(c.warnings().unwrap(), [Warning::new(1, "careful")]);
        c.clear_warnings().unwrap();
        assert!(c.warnings().unwrap().is_empty());
    }

    #[test]
    fn statement_is_reachable() {
        let statement: Arc<dyn StatementSource> = Arc::new("SELECT * FROM default".to_string());
        let c = cursor(vec![]).with_statement(statement);
        assert_eq!(c.statement().unwrap().map(|s| s.text()), Some("SELECT * FROM default"));
    }

    #[test]
    fn find_column_is_one_based() {
        let c = cursor(vec![]);
        assert_eq!(c.find_column("id").unwrap(), 1);
        assert_eq!(c.find_column("tags").unwrap(), 3);
        assert_eq!(c.find_column("nonexistent").unwrap_err().kind(), ErrorKind::UnknownColumn);
    }

    #[test]
    fn calendar_getters_reproject() {
        let mut c = cursor(vec![json!({"id": "2024-01-01 00:30:00"})]);
        c.next().unwrap();

        let berlin = Calendar::parse("+01:00").unwrap();
        let ts = c.get_timestamp_in("id", berlin).unwrap().unwrap();
        assert_eq!(ts.to_string(), "2024-01-01 01:30:00");

        let ts_default = c.get_timestamp("id").unwrap().unwrap();
        assert_eq!(ts.instant(), ts_default.instant());
    }

    #[test]
    fn options_change_default_calendar_and_charset() {
        let options = CursorOptions {
            calendar: Calendar::parse("+02:00").unwrap(),
            charset: Charset::Ascii,
        };
        let mut c = cursor(vec![json!({"id": "Zürich"})]).with_options(options);
        c.next().unwrap();

        assert_eq!(c.get_bytes("id").unwrap().unwrap(), b"Z?rich");
        assert_eq!(c.get_bytes_with("id", Charset::Utf8).unwrap().unwrap(), "Zürich".as_bytes());
    }
}
