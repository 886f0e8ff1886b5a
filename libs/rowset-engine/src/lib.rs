pub mod coerce;
pub mod column;
pub mod config;
pub mod cursor;
pub mod metadata;
pub mod response;
pub mod temporal;
pub mod unsupported;

pub use coerce::{Charset, SqlArray};
pub use column::{Column, FromColumn};
pub use config::{CursorConfig, CursorOptions};
pub use cursor::{
    CloseHandle, Concurrency, CursorType, FetchDirection, Holdability, JsonColumn, RowCursor,
    StatementSource, fields_from_pairs,
};
pub use metadata::{Nullability, ResultMetadata};
pub use response::{QueryResponse, ResultSetParts, Warning};
pub use temporal::{Calendar, SqlDate, SqlTime, SqlTimestamp};
pub use unsupported::{UNSUPPORTED_OPERATIONS, UnsupportedOps};

pub use rowset_api::{CursorError, ErrorKind, Field, FieldRegistry, Row, TypeTag, Value};
