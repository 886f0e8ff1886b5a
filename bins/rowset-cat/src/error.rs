#[derive(Debug, thiserror::Error)]
pub enum CatError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Cursor(#[from] rowset_engine::CursorError),

    #[error("write: {0}")]
    Write(std::io::Error),
}
