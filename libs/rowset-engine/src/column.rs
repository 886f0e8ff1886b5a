use std::fmt;

use rowset_api::{CursorError, Value};
use rust_decimal::Decimal;

use crate::coerce::SqlArray;
use crate::cursor::{JsonColumn, RowCursor};
use crate::temporal::{SqlDate, SqlTime, SqlTimestamp};

/// Column address: 1-based index into the declared fields, or a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column<'a> {
    Index(usize),
    Label(&'a str),
}

impl From<usize> for Column<'_> {
    fn from(index: usize) -> Self {
        Column::Index(index)
    }
}

/// Negative indices map to 0, which no column has.
impl From<i32> for Column<'_> {
    fn from(index: i32) -> Self {
        Column::Index(usize::try_from(index).unwrap_or(0))
    }
}

impl<'a> From<&'a str> for Column<'a> {
    fn from(label: &'a str) -> Self {
        Column::Label(label)
    }
}

impl<'a> From<&'a String> for Column<'a> {
    fn from(label: &'a String) -> Self {
        Column::Label(label)
    }
}

impl fmt::Display for Column<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Index(i) => write!(f, "#{i}"),
            Column::Label(label) => write!(f, "'{label}'"),
        }
    }
}

/// Target type of the generic `RowCursor::get::<T>()` accessor.
///
/// Scalars read as their empty value (`0`, `false`) for null and missing
/// columns; everything else reads as `None`.
pub trait FromColumn: Sized {
    fn from_column(cursor: &mut RowCursor, column: Column<'_>) -> Result<Self, CursorError>;
}

macro_rules! from_column {
    ($($ty:ty => $getter:ident),* $(,)?) => {
        $(
            impl FromColumn for $ty {
                fn from_column(cursor: &mut RowCursor, column: Column<'_>) -> Result<Self, CursorError> {
                    cursor.$getter(column)
                }
            }
        )*
    };
}

from_column! {
    bool => get_boolean,
    i8 => get_byte,
    i16 => get_short,
    i32 => get_int,
    i64 => get_long,
    f32 => get_float,
    f64 => get_double,
    Option<Decimal> => get_decimal,
    Option<String> => get_string,
    Option<Vec<u8>> => get_bytes,
    Option<SqlDate> => get_date,
    Option<SqlTime> => get_time,
    Option<SqlTimestamp> => get_timestamp,
    Option<SqlArray> => get_array,
    Option<Value> => get_object,
    Option<JsonColumn> => get_json,
}
