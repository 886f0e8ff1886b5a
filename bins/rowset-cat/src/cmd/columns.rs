use crate::config::ColumnsArgs;
use crate::error::CatError;

pub fn run(args: ColumnsArgs) -> Result<(), CatError> {
    let cursor = super::open(&args.response)?;
    let metadata = cursor.metadata();

    for index in 1..=metadata.column_count() {
        println!(
            "{index}\t{}\t{}\t{}",
            metadata.column_name(index)?,
            metadata.column_type(index)?,
            metadata.column_type_name(index)?,
        );
    }
    tracing::info!(columns = metadata.column_count(), rows = cursor.row_count(), "listed columns");
    Ok(())
}
