pub mod error;
pub mod schema;
pub mod value;

pub use error::{CursorError, ErrorKind};
pub use schema::{Field, FieldRegistry, TypeTag};
pub use value::{Row, Value};
