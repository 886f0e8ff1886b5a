pub mod columns;
pub mod dump;

use std::io::Read;

use rowset_engine::{QueryResponse, RowCursor};

use crate::error::CatError;

/// Decode a response file (`-` for stdin) into a cursor.
fn open(path: &str) -> Result<RowCursor, CatError> {
    let bytes = if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|source| CatError::Read {
                path: path.to_string(),
                source,
            })?;
        buf
    } else {
        std::fs::read(path).map_err(|source| CatError::Read {
            path: path.to_string(),
            source,
        })?
    };

    let response = QueryResponse::from_slice(&bytes).map_err(|e| e.with_context(path))?;
    if let Some(id) = &response.request_id {
        tracing::debug!(request_id = %id, "decoded response");
    }
    Ok(RowCursor::from_response(response)?)
}
