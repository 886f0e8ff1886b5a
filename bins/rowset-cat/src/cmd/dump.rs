use std::io::Write;

use rowset_engine::{CursorConfig, CursorError, CursorOptions, RowCursor};

use crate::config::{DumpArgs, ReadAs};
use crate::error::CatError;

pub fn run(args: DumpArgs) -> Result<(), CatError> {
    let options = options(&args)?;
    let mut cursor = super::open(&args.response)?.with_options(options);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dump(&mut cursor, &args, &mut out)?;

    tracing::info!(rows = cursor.row_count(), "dump complete");
    cursor.close();
    Ok(())
}

fn options(args: &DumpArgs) -> Result<CursorOptions, CatError> {
    let mut config = match &args.config {
        Some(path) => {
            let config = CursorConfig::load(path)?;
            tracing::info!(config = %path, "loaded config");
            config
        }
        None => CursorConfig::default(),
    };
    if let Some(offset) = &args.offset {
        config.default_offset = offset.clone();
    }
    Ok(config.options()?)
}

fn dump(cursor: &mut RowCursor, args: &DumpArgs, out: &mut impl Write) -> Result<(), CatError> {
    let metadata = cursor.metadata();
    let count = metadata.column_count();

    let mut header = Vec::with_capacity(count);
    for index in 1..=count {
        header.push(metadata.column_label(index)?);
    }
    writeln!(out, "{}", header.join("\t")).map_err(CatError::Write)?;

    while cursor.next()? {
        let mut cells = Vec::with_capacity(count);
        for index in 1..=count {
            let text = read(cursor, index, args.read_as)?;
            let cell = if cursor.was_missing() {
                args.missing_text.clone()
            } else if cursor.was_null() {
                args.null_text.clone()
            } else {
                text.unwrap_or_default()
            };
            cells.push(cell);
        }
        writeln!(out, "{}", cells.join("\t")).map_err(CatError::Write)?;
    }
    Ok(())
}

fn read(cursor: &mut RowCursor, index: usize, read_as: ReadAs) -> Result<Option<String>, CursorError> {
    Ok(match read_as {
        ReadAs::Text => cursor.get_string(index)?,
        ReadAs::Json => cursor.get_json(index)?.map(|json| json.to_json_string()),
        ReadAs::Object => cursor.get_object(index)?.map(|value| value.to_string()),
        ReadAs::Timestamp => cursor.get_timestamp(index)?.map(|ts| ts.to_string()),
    })
}
