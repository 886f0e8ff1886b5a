use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "rowset-cat", about = "Print a query response through a row cursor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every row, one tab-separated line per row
    Dump(DumpArgs),
    /// Print the declared columns
    Columns(ColumnsArgs),
}

#[derive(Args, Clone, Debug)]
pub struct DumpArgs {
    /// Query response JSON file, `-` for stdin
    pub response: String,

    /// Path to a TOML cursor config file
    #[arg(long, env = "ROWSET_CONFIG")]
    pub config: Option<String>,

    /// Overrides the config's default_offset, e.g. `+03:00`
    #[arg(long)]
    pub offset: Option<String>,

    /// How each column is read
    #[arg(long = "as", value_enum, default_value_t = ReadAs::Text)]
    pub read_as: ReadAs,

    /// Printed for null columns
    #[arg(long, default_value = "NULL")]
    pub null_text: String,

    /// Printed for declared columns absent from a row
    #[arg(long, default_value = "")]
    pub missing_text: String,
}

#[derive(Args, Clone, Debug)]
pub struct ColumnsArgs {
    /// Query response JSON file, `-` for stdin
    pub response: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadAs {
    /// String form of each value
    Text,
    /// Compact JSON of each value
    Json,
    /// Value shaped by the column's declared type
    Object,
    /// Timestamp strings in the cursor's calendar
    Timestamp,
}
