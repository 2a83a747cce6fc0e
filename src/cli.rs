//! CLI surface: `-g/--generate`, `-m/--merge`, `-f/--filter`,
//! `-p/--positions`, `-s/--sql`. Flags compose in the order
//! generate -> build -> merge -> filter -> positions-join -> sql-persist.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "secmaster", about = "Bitemporal security master demo CLI")]
pub struct Cli {
    /// Generate a synthetic fact log at this path instead of reading one.
    #[arg(short = 'g', long = "generate", value_name = "PATH")]
    pub generate: Option<PathBuf>,

    /// Path to the fact log to build the master from.
    #[arg(value_name = "FACT_LOG")]
    pub fact_log: Option<PathBuf>,

    /// Merge an additional fact log into the freshly built master.
    #[arg(short = 'm', long = "merge", value_name = "FACT_LOG")]
    pub merge: Option<PathBuf>,

    /// Keep only rows where `asset_class` equals this value; the literal
    /// (case-insensitive) "none" selects `asset_class IS NULL`.
    #[arg(short = 'f', long = "filter", value_name = "CLASS")]
    pub filter: Option<String>,

    /// Join a CSV of `subject_id,quantity,as_of_date` positions against
    /// the master and print the enriched rows.
    #[arg(short = 'p', long = "positions", value_name = "PATH")]
    pub positions: Option<PathBuf>,

    /// Persist the resulting master into this SQLite file.
    #[arg(short = 's', long = "sql", value_name = "PATH")]
    pub sql: Option<PathBuf>,
}
