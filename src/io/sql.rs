//! Relational persistence contract: a table whose columns match the
//! header, with `(subject_id, effective_start_date)` as the composite
//! primary key and every other column nullable.

use rusqlite::{params_from_iter, types::Value as SqlValue, Connection};

use crate::error::Error;
use crate::types::{build_col_index, Header, Row, SecurityMaster, Value};
use crate::util::qi;

/// Render the `CREATE TABLE` statement for `header`.
pub fn create_table_sql(table_name: &str, header: &Header) -> String {
    let mut columns = Vec::with_capacity(header.len());
    for name in header {
        let sql_type = if name == "subject_id" {
            "INTEGER"
        } else if name == "effective_start_date" || name == "effective_end_date" {
            "TEXT"
        } else {
            "BLOB"
        };
        columns.push(format!("{} {}", qi(name), sql_type));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({}, PRIMARY KEY ({}, {}))",
        qi(table_name),
        columns.join(", "),
        qi("subject_id"),
        qi("effective_start_date"),
    )
}

fn to_sql_value(v: &Value) -> SqlValue {
    match v {
        Value::Int(n) => SqlValue::Integer(*n),
        Value::Float(n) => SqlValue::Real(*n),
        Value::Str(s) => SqlValue::Text(s.clone()),
        Value::Date(d) => SqlValue::Text(d.format("%m/%d/%y").to_string()),
        Value::Null => SqlValue::Null,
    }
}

fn from_sql_value(v: SqlValue, column_name: &str) -> Result<Value, Error> {
    Ok(match v {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(n) => Value::Int(n),
        SqlValue::Real(n) => Value::Float(n),
        SqlValue::Text(s) => {
            if column_name == "effective_start_date" || column_name == "effective_end_date" {
                Value::Date(
                    chrono::NaiveDate::parse_from_str(&s, "%m/%d/%y")
                        .map_err(|_| Error::UnknownColumnType(column_name.to_string()))?,
                )
            } else {
                Value::Str(s)
            }
        }
        SqlValue::Blob(_) => return Err(Error::UnknownColumnType(column_name.to_string())),
    })
}

/// Create the table (if absent) and insert every row of `master`.
pub fn write_sqlite(conn: &Connection, table_name: &str, master: &SecurityMaster) -> Result<(), Error> {
    conn.execute(&create_table_sql(table_name, &master.header), [])?;

    let placeholders: Vec<String> = (0..master.header.len()).map(|_| "?".to_string()).collect();
    let insert_sql = format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        qi(table_name),
        master.header.iter().map(|c| qi(c)).collect::<Vec<_>>().join(", "),
        placeholders.join(", "),
    );
    let mut stmt = conn.prepare(&insert_sql)?;
    for row in &master.rows {
        let values: Vec<SqlValue> = row.iter().map(to_sql_value).collect();
        stmt.execute(params_from_iter(values))?;
    }
    Ok(())
}

/// Read every row of `table_name` back into a bundle, trusting the column
/// order SQLite reports for the table.
pub fn read_sqlite(conn: &Connection, table_name: &str) -> Result<SecurityMaster, Error> {
    let select_sql = format!("SELECT * FROM {}", qi(table_name));
    let mut stmt = conn.prepare(&select_sql)?;
    let header: Header = stmt.column_names().into_iter().map(|s| s.to_string()).collect();
    let col_index = build_col_index(&header);

    let width = header.len();
    let rows: Vec<Row> = stmt
        .query_map([], |sql_row| {
            (0..width)
                .map(|i| sql_row.get::<_, SqlValue>(i))
                .collect::<Result<Vec<_>, _>>()
        })?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|raw_row| {
            raw_row
                .into_iter()
                .zip(&header)
                .map(|(v, name)| from_sql_value(v, name))
                .collect::<Result<Row, Error>>()
        })
        .collect::<Result<Vec<Row>, Error>>()?;

    Ok(SecurityMaster { header, col_index, rows })
}
