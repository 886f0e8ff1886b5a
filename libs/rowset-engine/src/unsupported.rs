//! Operations a forward-only, read-only cursor does not offer.
//!
//! Every method fails with [`CursorError::Unsupported`] naming itself,
//! whether or not the cursor is open. `Infallible` in the success slot
//! keeps callers from pretending otherwise.

use std::convert::Infallible;

use rowset_api::{CursorError, Value};

use crate::column::Column;
use crate::cursor::RowCursor;

macro_rules! unsupported_ops {
    ($($(#[$meta:meta])* fn $name:ident(&mut self $(, $arg:ident: $ty:ty)*);)*) => {
        pub trait UnsupportedOps {
            $(
                $(#[$meta])*
                fn $name(&mut self $(, $arg: $ty)*) -> Result<Infallible, CursorError> {
                    $(let _ = $arg;)*
                    Err(CursorError::unsupported(stringify!($name)))
                }
            )*
        }

        /// Names of every operation on [`UnsupportedOps`].
        pub const UNSUPPORTED_OPERATIONS: &[&str] = &[$(stringify!($name)),*];
    };
}

unsupported_ops! {
    // ── Scrolling ──
    fn absolute(&mut self, row: i64);
    fn relative(&mut self, rows: i64);
    fn previous(&mut self);
    fn before_first(&mut self);
    /// The row count is known, but jumping to the last row is still refused.
    fn last(&mut self);

    // ── Mutation ──
    fn insert_row(&mut self);
    fn update_row(&mut self);
    fn delete_row(&mut self);
    fn refresh_row(&mut self);
    fn cancel_row_updates(&mut self);
    fn move_to_insert_row(&mut self);
    fn move_to_current_row(&mut self);
    fn update_value(&mut self, column: Column<'_>, value: Value);
    fn update_null(&mut self, column: Column<'_>);
    fn row_updated(&mut self);
    fn row_inserted(&mut self);
    fn row_deleted(&mut self);

    // ── Large objects & streams ──
    fn get_blob(&mut self, column: Column<'_>);
    fn get_clob(&mut self, column: Column<'_>);
    fn get_nclob(&mut self, column: Column<'_>);
    fn get_ascii_stream(&mut self, column: Column<'_>);
    fn get_binary_stream(&mut self, column: Column<'_>);
    fn get_character_stream(&mut self, column: Column<'_>);

    // ── Other column kinds ──
    fn get_ref(&mut self, column: Column<'_>);
    fn get_row_id(&mut self, column: Column<'_>);
    fn get_url(&mut self, column: Column<'_>);
    fn get_sql_xml(&mut self, column: Column<'_>);
    /// Custom type maps are not honored.
    fn get_object_with_map(&mut self, column: Column<'_>);
    fn cursor_name(&mut self);
}

impl UnsupportedOps for RowCursor {}

#[cfg(test)]
mod tests {
    use super::*;
    use rowset_api::{ErrorKind, FieldRegistry, Row};

    fn cursor() -> RowCursor {
        RowCursor::new(vec![Row::new()], FieldRegistry::default())
    }

    #[test]
    fn scrolling_is_refused() {
        let mut c = cursor();
        assert_eq!(
            c.absolute(1).unwrap_err(),
            CursorError::Unsupported { operation: "absolute" }
        );
        assert_eq!(c.previous().unwrap_err().kind(), ErrorKind::Unsupported);
        assert_eq!(c.last().unwrap_err().kind(), ErrorKind::Unsupported);

        // the cursor did not move
        assert_eq!(c.get_row().unwrap(), 0);
    }

    #[test]
    fn mutation_is_refused() {
        let mut c = cursor();
        assert_eq!(
            c.update_value(Column::Label("a"), Value::from(1_i64)).unwrap_err(),
            CursorError::Unsupported { operation: "update_value" }
        );
        assert_eq!(c.delete_row().unwrap_err().kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn fails_the_same_way_when_closed() {
        let mut c = cursor();
        c.close();
        assert_eq!(
            c.get_blob(Column::Index(1)).unwrap_err(),
            CursorError::Unsupported { operation: "get_blob" }
        );
    }

    #[test]
    fn operation_list_is_complete() {
        assert_eq!(UNSUPPORTED_OPERATIONS.len(), 29);
        assert!(UNSUPPORTED_OPERATIONS.contains(&"get_object_with_map"));
    }
}
