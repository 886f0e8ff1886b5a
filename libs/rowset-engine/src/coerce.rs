//! Raw value → typed value conversion.
//!
//! Every function takes a value already known to be non-null; null and
//! missing columns are resolved by the cursor before dispatch.
//!
//! Integral targets go through a 32-bit intermediate, the same narrowing the
//! query engine's own clients perform: a number is first cut to `i32`
//! (floats saturate, wider integers wrap) and then wrapped to the target
//! width. `to_i64` keeps that intermediate too, so numbers beyond the `i32`
//! range lose their high bits. Strings are parsed at the full target width.

use rowset_api::{CursorError, TypeTag, Value};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Number;

use crate::temporal::{self, Calendar, SqlDate, SqlTime, SqlTimestamp};

/// Character encoding for `get_bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Charset {
    #[default]
    Utf8,
    /// Non-ASCII characters are replaced with `?`.
    Ascii,
}

impl Charset {
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            Charset::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
        }
    }
}

/// Opaque wrapper over a JSON array column. Elements are not converted.
///
/// Equality is structural over the elements.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlArray {
    elements: Vec<Value>,
}

impl SqlArray {
    pub fn new(elements: Vec<Value>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Tag of the first non-null element, `Null` for an all-null or empty array.
    pub fn base_type(&self) -> TypeTag {
        self.elements
            .iter()
            .find(|v| !v.is_null())
            .map(TypeTag::of)
            .unwrap_or(TypeTag::Null)
    }
}

pub fn to_bool(value: &Value) -> Result<bool, CursorError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(CursorError::coercion(other, "boolean")),
    }
}

/// Number → `i32` with saturating float casts and wrapping integer casts.
fn int_value(number: &Number) -> i32 {
    if let Some(i) = number.as_i64() {
        i as i32
    } else if let Some(u) = number.as_u64() {
        u as i32
    } else {
        number.as_f64().map(|f| f as i32).unwrap_or(0)
    }
}

fn decimal_int_value(d: &Decimal) -> i32 {
    d.trunc().to_i128().map(|v| v as i32).unwrap_or(0)
}

pub fn to_i8(value: &Value) -> Result<i8, CursorError> {
    match value {
        Value::Number(n) => Ok(int_value(n) as i8),
        Value::Decimal(d) => Ok(decimal_int_value(d) as i8),
        Value::String(s) => s.parse().map_err(|_| CursorError::coercion(s, "byte")),
        other => Err(CursorError::coercion(other, "byte")),
    }
}

pub fn to_i16(value: &Value) -> Result<i16, CursorError> {
    match value {
        Value::Number(n) => Ok(int_value(n) as i16),
        Value::Decimal(d) => Ok(decimal_int_value(d) as i16),
        Value::String(s) => s.parse().map_err(|_| CursorError::coercion(s, "short")),
        other => Err(CursorError::coercion(other, "short")),
    }
}

pub fn to_i32(value: &Value) -> Result<i32, CursorError> {
    match value {
        Value::Number(n) => Ok(int_value(n)),
        Value::Decimal(d) => Ok(decimal_int_value(d)),
        Value::String(s) => s.parse().map_err(|_| CursorError::coercion(s, "int")),
        other => Err(CursorError::coercion(other, "int")),
    }
}

/// Numbers pass through the `i32` intermediate; see the module docs.
// TODO: read the full i64 once callers no longer depend on the i32 narrowing.
pub fn to_i64(value: &Value) -> Result<i64, CursorError> {
    match value {
        Value::Number(n) => Ok(int_value(n) as i64),
        Value::Decimal(d) => Ok(decimal_int_value(d) as i64),
        Value::String(s) => s.parse().map_err(|_| CursorError::coercion(s, "long")),
        other => Err(CursorError::coercion(other, "long")),
    }
}

pub fn to_f32(value: &Value) -> Result<f32, CursorError> {
    match value {
        Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0) as f32),
        Value::Decimal(d) => Ok(d.to_f32().unwrap_or(0.0)),
        Value::String(s) => s.parse().map_err(|_| CursorError::coercion(s, "float")),
        other => Err(CursorError::coercion(other, "float")),
    }
}

pub fn to_f64(value: &Value) -> Result<f64, CursorError> {
    match value {
        Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0)),
        Value::Decimal(d) => Ok(d.to_f64().unwrap_or(0.0)),
        Value::String(s) => s.parse().map_err(|_| CursorError::coercion(s, "double")),
        other => Err(CursorError::coercion(other, "double")),
    }
}

/// Integers convert exactly; floats keep their full binary expansion up to
/// the decimal's 28 significant digits.
pub fn to_decimal(value: &Value) -> Result<Decimal, CursorError> {
    match value {
        Value::Decimal(d) => Ok(*d),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Decimal::from(u))
            } else {
                n.as_f64()
                    .and_then(Decimal::from_f64_retain)
                    .ok_or_else(|| CursorError::coercion(n, "decimal"))
            }
        }
        other => Err(CursorError::coercion(other, "decimal")),
    }
}

/// Round half-up (away from zero) to `scale` digits, padding with zeros
/// when the value has fewer.
pub fn with_scale(value: Decimal, scale: u32) -> Decimal {
    let mut scaled = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    scaled.rescale(scale);
    scaled
}

/// Never fails: structures serialize to compact JSON, scalars print bare.
pub fn to_text(value: &Value) -> String {
    value.to_string()
}

pub fn to_bytes(value: &Value, charset: Charset) -> Result<Vec<u8>, CursorError> {
    match value {
        Value::String(s) => Ok(charset.encode(s)),
        other => Err(CursorError::coercion(other, "string")),
    }
}

pub fn to_date(value: &Value, calendar: Calendar) -> Result<SqlDate, CursorError> {
    let date = match value {
        Value::String(s) => return temporal::parse_date(s, calendar),
        Value::Date(d) => temporal::date_from_naive(*d, calendar),
        Value::Timestamp(ts) => temporal::timestamp_from_naive(*ts, calendar)
            .map(|ts| SqlDate::new(ts.instant())),
        _ => None,
    };
    date.ok_or_else(|| CursorError::coercion(value, "date"))
}

pub fn to_time(value: &Value, calendar: Calendar) -> Result<SqlTime, CursorError> {
    let time = match value {
        Value::String(s) => return temporal::parse_time(s, calendar),
        Value::Time(t) => temporal::time_from_naive(*t, calendar),
        Value::Timestamp(ts) => temporal::timestamp_from_naive(*ts, calendar)
            .map(|ts| SqlTime::new(ts.instant())),
        _ => None,
    };
    time.ok_or_else(|| CursorError::coercion(value, "time"))
}

pub fn to_timestamp(value: &Value, calendar: Calendar) -> Result<SqlTimestamp, CursorError> {
    let ts = match value {
        Value::String(s) => return temporal::parse_timestamp(s, calendar),
        Value::Timestamp(ts) => temporal::timestamp_from_naive(*ts, calendar),
        Value::Date(d) => temporal::date_from_naive(*d, calendar)
            .map(|d| SqlTimestamp::new(d.instant())),
        _ => None,
    };
    ts.ok_or_else(|| CursorError::coercion(value, "timestamp"))
}

pub fn to_array(value: &Value) -> Result<SqlArray, CursorError> {
    match value {
        Value::Array(items) => Ok(SqlArray::new(items.clone())),
        other => Err(CursorError::coercion(other, "list")),
    }
}

/// Generic accessor: behavior follows the declared tag, not the value shape.
pub fn to_object(value: &Value, declared: TypeTag) -> Option<Value> {
    match declared {
        TypeTag::Numeric | TypeTag::Boolean | TypeTag::Array | TypeTag::Object => {
            Some(value.clone())
        }
        TypeTag::String => match value {
            Value::Timestamp(ts) => Some(Value::Date(ts.date())),
            other => Some(other.clone()),
        },
        TypeTag::Null => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn byte_wraps_numbers() {
        assert_eq!(to_i8(&v(json!(1))).unwrap(), 1);
        assert_eq!(to_i8(&v(json!(255))).unwrap(), -1);
        assert_eq!(to_i8(&v(json!(300))).unwrap(), 44);
        assert_eq!(to_i8(&v(json!(-129))).unwrap(), 127);
    }

    #[test]
    fn byte_parses_strings_at_full_width() {
        assert_eq!(to_i8(&v(json!("-12"))).unwrap(), -12);
        assert!(to_i8(&v(json!("255"))).is_err());
    }

    #[test]
    fn floats_truncate_toward_zero() {
        assert_eq!(to_i32(&v(json!(2.9))).unwrap(), 2);
        assert_eq!(to_i32(&v(json!(-2.9))).unwrap(), -2);
        assert_eq!(to_i16(&v(json!(1e10))).unwrap(), i32::MAX as i16);
    }

    #[test]
    fn long_keeps_the_int_intermediate() {
        assert_eq!(to_i64(&v(json!(42))).unwrap(), 42);
        assert_eq!(to_i64(&v(json!(4_294_967_297_i64))).unwrap(), 1);
        assert_eq!(to_i64(&v(json!("4294967297"))).unwrap(), 4_294_967_297);
    }

    #[test]
    fn integral_rejects_garbage() {
        let err = to_i32(&v(json!("abc"))).unwrap_err();
        assert_eq!(err, CursorError::coercion("abc", "int"));
        assert!(to_i32(&v(json!(true))).is_err());
        assert!(to_i64(&v(json!([1]))).is_err());
        assert!(to_i16(&v(json!(" 1"))).is_err());
    }

    #[test]
    fn boolean_is_never_coerced() {
        assert!(to_bool(&v(json!(true))).unwrap());
        assert!(to_bool(&v(json!("true"))).is_err());
        assert!(to_bool(&v(json!(1))).is_err());
    }

    #[test]
    fn floating_targets() {
        assert_eq!(to_f64(&v(json!(1))).unwrap(), 1.0);
        assert_eq!(to_f64(&v(json!("2.5"))).unwrap(), 2.5);
        assert_eq!(to_f32(&v(json!(0.1))).unwrap(), 0.1_f32);
        assert!(to_f64(&v(json!("2,5"))).is_err());
        assert!(to_f64(&v(json!({"a": 1}))).is_err());
    }

    #[test]
    fn decimal_from_numbers() {
        assert_eq!(to_decimal(&v(json!(7))).unwrap(), Decimal::from(7));
        assert_eq!(
            with_scale(to_decimal(&v(json!(2.5))).unwrap(), 0),
            Decimal::from(3)
        );
        assert!(to_decimal(&v(json!("2.5"))).is_err());

        let d = Decimal::new(31415, 4);
        assert_eq!(to_decimal(&Value::Decimal(d)).unwrap(), d);
    }

    #[test]
    fn scale_rounds_half_up_and_pads() {
        assert_eq!(with_scale(Decimal::new(1235, 3), 2).to_string(), "1.24");
        assert_eq!(with_scale(Decimal::new(-1235, 3), 2).to_string(), "-1.24");
        assert_eq!(with_scale(Decimal::new(15, 1), 3).to_string(), "1.500");
    }

    #[test]
    fn text_of_structures_is_json() {
        assert_eq!(to_text(&v(json!({"name": "Abama"}))), r#"{"name":"Abama"}"#);
        assert_eq!(to_text(&v(json!([1, "a"]))), r#"[1,"a"]"#);
        assert_eq!(to_text(&v(json!(false))), "false");
    }

    #[test]
    fn bytes_only_from_strings() {
        assert_eq!(to_bytes(&v(json!("Hello World")), Charset::Utf8).unwrap(), b"Hello World");
        assert_eq!(to_bytes(&v(json!("naïve")), Charset::Ascii).unwrap(), b"na?ve");
        assert!(to_bytes(&v(json!(12)), Charset::Utf8).is_err());
    }

    #[test]
    fn native_dates_are_not_reparsed() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let date = to_date(&Value::Date(day), Calendar::utc()).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 2, 29));

        let ts = to_timestamp(&Value::Date(day), Calendar::utc()).unwrap();
        assert_eq!(ts.to_string(), "2024-02-29 00:00:00");
    }

    #[test]
    fn temporal_rejects_other_shapes() {
        let err = to_date(&v(json!(20240101)), Calendar::utc()).unwrap_err();
        assert_eq!(err.kind(), rowset_api::ErrorKind::TypeCoercion);
        assert!(to_time(&v(json!(true)), Calendar::utc()).is_err());
    }

    #[test]
    fn array_wraps_without_conversion() {
        let array = to_array(&v(json!([1, "two", null]))).unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array.base_type(), TypeTag::Numeric);
        assert_eq!(array, SqlArray::new(vec![v(json!(1)), v(json!("two")), Value::Null]));

        let err = to_array(&v(json!("x"))).unwrap_err();
        assert_eq!(err, CursorError::coercion("x", "list"));
    }

    #[test]
    fn object_follows_declared_tag() {
        let n = v(json!(5));
        assert_eq!(to_object(&n, TypeTag::Numeric), Some(n.clone()));
        assert_eq!(to_object(&n, TypeTag::Null), None);

        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(
            to_object(&Value::Timestamp(ts), TypeTag::String),
            Some(Value::Date(ts.date()))
        );
    }
}
