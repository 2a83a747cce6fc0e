//! External collaborators: fact log I/O, the columnar bridge, the
//! relational persistence contract, and the pretty printer. All reads and
//! writes live here; the core (`crate::builder`, `crate::merge`, ...) never
//! touches the filesystem or a connection directly.

pub mod columnar;
pub mod csv;
pub mod pretty;
pub mod sql;

pub use self::csv::{generate_fact_log, read_fact_log, write_fact_log};
pub use columnar::{from_record_batch, to_record_batch};
pub use pretty::format_table;
pub use sql::{create_table_sql, read_sqlite, write_sqlite};
