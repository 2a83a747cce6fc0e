//! Projections: attribute filtering and empty-column pruning.

use crate::error::Error;
use crate::types::{build_col_index, SecurityMaster, Value};

/// Retain rows where `column == value` (including an explicit null match).
pub fn filter_by_attribute(master: &SecurityMaster, column: &str, value: &Value) -> Result<SecurityMaster, Error> {
    let col = master.col(column)?;
    let rows = master
        .rows
        .iter()
        .filter(|r| &r[col] == value)
        .cloned()
        .collect();

    Ok(SecurityMaster {
        header: master.header.clone(),
        col_index: master.col_index.clone(),
        rows,
    })
}

/// Drop every non-key column whose every surviving value is null, rewriting
/// header and column index; row order and non-null contents are preserved.
pub fn remove_empty_columns(master: &SecurityMaster) -> SecurityMaster {
    let keep: Vec<bool> = master
        .header
        .iter()
        .enumerate()
        .map(|(i, _)| i < 3 || master.rows.iter().any(|r| !r[i].is_null()))
        .collect();

    let new_header: Vec<String> = master
        .header
        .iter()
        .zip(&keep)
        .filter(|(_, &k)| k)
        .map(|(name, _)| name.clone())
        .collect();

    let new_rows = master
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&keep)
                .filter(|(_, &k)| k)
                .map(|(v, _)| v.clone())
                .collect()
        })
        .collect();

    let col_index = build_col_index(&new_header);
    SecurityMaster {
        header: new_header,
        col_index,
        rows: new_rows,
    }
}
