//! Merge engine: incrementally applies an update batch of flat-facts into
//! an existing master table via the five-way case analysis.

use chrono::NaiveDate;

use crate::header::expand_header;
use crate::types::{ColumnIndex, Fact, FlatFact, Header, Row, SecurityMaster, Value, PriorityMap};

/// Apply a full update batch: expand the attribute set once, then merge
/// each flat-fact (sorted by `(subject_id, effective_date)`) in order.
pub fn merge_batch(master: &mut SecurityMaster, update_facts: &[Fact], priority: &PriorityMap) {
    let new_header = expand_header(&master.header, update_facts, priority);
    if new_header != master.header {
        widen(master, new_header);
    }

    let mut flat = crate::bucket::bucket_facts(update_facts);
    flat.sort_by(|a, b| (a.subject_id, a.effective_date).cmp(&(b.subject_id, b.effective_date)));

    for ff in &flat {
        merge_one(master, ff);
    }
}

/// Pad every existing row with `Value::Null` for columns introduced by
/// `new_header`, then adopt the new header/column-index in place.
fn widen(master: &mut SecurityMaster, new_header: Header) {
    let new_col_index = crate::types::build_col_index(&new_header);
    let mut remapped = Vec::with_capacity(master.rows.len());
    for row in master.rows.drain(..) {
        let mut new_row = vec![Value::Null; new_header.len()];
        for (name, &old_pos) in &master.col_index {
            new_row[new_col_index[name]] = row[old_pos].clone();
        }
        remapped.push(new_row);
    }
    master.rows = remapped;
    master.header = new_header;
    master.col_index = new_col_index;
}

/// Apply a single subject-date flat-fact to the master table via the
/// five-case dispatch.
fn merge_one(master: &mut SecurityMaster, ff: &FlatFact) {
    let col = &master.col_index;
    let sid_col = col["subject_id"];
    let start_col = col["effective_start_date"];
    let end_col = col["effective_end_date"];

    let subject_range = subject_row_range(&master.rows, sid_col, ff.subject_id);

    match subject_range {
        None => {
            // Case 1: Empty. Insert at the position preserving ascending subject_id.
            let row = blank_row(master.header.len(), sid_col, start_col, ff.subject_id, ff.effective_date, &ff.pairs, col);
            let insert_at = master
                .rows
                .iter()
                .position(|r| match &r[sid_col] {
                    Value::Int(v) => *v > ff.subject_id,
                    _ => false,
                })
                .unwrap_or(master.rows.len());
            master.rows.insert(insert_at, row);
        }
        Some((lo, hi)) => {
            let first_start = date_at(&master.rows[lo], start_col);
            let last_start = date_at(&master.rows[hi - 1], start_col);

            if ff.effective_date < first_start {
                // Case 2: Before-head. Pair attributes start null (the row's
                // true "prior" state) so `cascade` captures null as the
                // original and applies the new values itself.
                let mut row = vec![Value::Null; master.header.len()];
                row[sid_col] = Value::Int(ff.subject_id);
                row[start_col] = Value::Date(ff.effective_date);
                row[end_col] = Value::Date(first_start);
                master.rows.insert(lo, row);
                cascade(&mut master.rows, col, ff.subject_id, lo, &ff.pairs);
            } else if ff.effective_date > last_start {
                // Case 3: After-tail. No cascade: the new row IS the tail.
                let mut row = master.rows[hi - 1].clone();
                row[start_col] = Value::Date(ff.effective_date);
                row[end_col] = Value::Null;
                for (a, v) in &ff.pairs {
                    if let Some(&c) = col.get(a) {
                        row[c] = v.clone();
                    }
                }
                master.rows[hi - 1][end_col] = Value::Date(ff.effective_date);
                master.rows.insert(hi, row);
            } else if let Some(exact) = (lo..hi).find(|&k| date_at(&master.rows[k], start_col) == ff.effective_date) {
                // Case 4: Exact-hit.
                cascade(&mut master.rows, col, ff.subject_id, exact, &ff.pairs);
            } else {
                // Case 5: Mid-interval split.
                let split_at = (lo..hi)
                    .find(|&k| {
                        let start = date_at(&master.rows[k], start_col);
                        let end = end_date_at(&master.rows[k], end_col);
                        start < ff.effective_date && end.map(|e| ff.effective_date < e).unwrap_or(true)
                    })
                    .expect("mid-interval split requires a covering row; I3/I4 guarantee one exists");

                // `split_row` keeps r's pre-split values (including the
                // pair attributes) so `cascade` can capture them as the
                // original before overwriting starting at this row.
                let mut split_row = master.rows[split_at].clone();
                master.rows[split_at][end_col] = Value::Date(ff.effective_date);
                split_row[start_col] = Value::Date(ff.effective_date);
                master.rows.insert(split_at + 1, split_row);
                cascade(&mut master.rows, col, ff.subject_id, split_at + 1, &ff.pairs);
            }
        }
    }
}

fn blank_row(
    width: usize,
    sid_col: usize,
    start_col: usize,
    sid: i64,
    date: NaiveDate,
    pairs: &[(String, Value)],
    col: &ColumnIndex,
) -> Row {
    let mut row = vec![Value::Null; width];
    row[sid_col] = Value::Int(sid);
    row[start_col] = Value::Date(date);
    for (a, v) in pairs {
        if let Some(&c) = col.get(a) {
            row[c] = v.clone();
        }
    }
    row
}

fn subject_row_range(rows: &[Row], sid_col: usize, sid: i64) -> Option<(usize, usize)> {
    let lo = rows.iter().position(|r| matches!(&r[sid_col], Value::Int(v) if *v == sid))?;
    let hi = rows[lo..]
        .iter()
        .position(|r| !matches!(&r[sid_col], Value::Int(v) if *v == sid))
        .map(|off| lo + off)
        .unwrap_or(rows.len());
    Some((lo, hi))
}

fn date_at(row: &Row, col: usize) -> NaiveDate {
    match &row[col] {
        Value::Date(d) => *d,
        other => panic!("expected date in key column, found {other:?}"),
    }
}

fn end_date_at(row: &Row, col: usize) -> Option<NaiveDate> {
    match &row[col] {
        Value::Date(d) => Some(*d),
        Value::Null => None,
        other => panic!("expected date or null in end-date column, found {other:?}"),
    }
}

/// Propagate `pairs` forward from `start_row_index` while subject matches,
/// stopping per attribute at the first row whose original value differs
/// from the value captured at the start row before the walk began.
fn cascade(rows: &mut [Row], col: &ColumnIndex, sid: i64, start_row_index: usize, pairs: &[(String, Value)]) {
    let sid_col = col["subject_id"];
    let captured: Vec<(usize, Value)> = pairs
        .iter()
        .filter_map(|(a, _)| col.get(a).map(|&c| (c, rows[start_row_index][c].clone())))
        .collect();

    let mut still_propagating = vec![true; captured.len()];
    for row in rows[start_row_index..].iter_mut() {
        if !matches!(&row[sid_col], Value::Int(v) if *v == sid) {
            break;
        }
        for (i, (col_pos, original)) in captured.iter().enumerate() {
            if !still_propagating[i] {
                continue;
            }
            if row[*col_pos] == *original || row[*col_pos].is_null() {
                row[*col_pos] = pairs
                    .iter()
                    .find(|(a, _)| col.get(a) == Some(col_pos))
                    .map(|(_, v)| v.clone())
                    .unwrap();
            } else {
                still_propagating[i] = false;
            }
        }
    }
}
