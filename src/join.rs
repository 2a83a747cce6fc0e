//! Positions join: point-in-time lookup against a master bundle.

use crate::types::{JoinedPositions, Position, SecurityMaster, Value};

/// For each position, find the unique row covering `as_of_date` for its
/// subject and emit `(subject_id, quantity, as_of_date, *non-key attrs)`.
/// Positions with no covering interval are silently dropped.
pub fn join_positions(master: &SecurityMaster, positions: &[Position]) -> JoinedPositions {
    let sid_col = master.col_index["subject_id"];
    let start_col = master.col_index["effective_start_date"];
    let end_col = master.col_index["effective_end_date"];

    let mut header = vec![
        "subject_id".to_string(),
        "quantity".to_string(),
        "as_of_date".to_string(),
    ];
    header.extend(master.non_key_columns().map(|s| s.to_string()));

    let mut rows = Vec::new();
    for pos in positions {
        let hit = master.rows.iter().find(|r| {
            let sid_matches = matches!(&r[sid_col], Value::Int(v) if *v == pos.subject_id);
            if !sid_matches {
                return false;
            }
            let start = match &r[start_col] {
                Value::Date(d) => *d,
                _ => return false,
            };
            let covers_start = start <= pos.as_of_date;
            let covers_end = match &r[end_col] {
                Value::Date(d) => pos.as_of_date < *d,
                Value::Null => true,
                _ => false,
            };
            covers_start && covers_end
        });

        if let Some(r) = hit {
            let mut row = vec![
                Value::Int(pos.subject_id),
                Value::Int(pos.quantity),
                Value::Date(pos.as_of_date),
            ];
            row.extend(r.iter().skip(3).cloned());
            rows.push(row);
        }
    }

    JoinedPositions { header, rows }
}
