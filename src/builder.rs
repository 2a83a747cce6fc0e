//! Master builder: folds sorted flat-facts into a gap-free, per-subject
//! interval table (invariants I1-I6 in the data model).

use rayon::prelude::*;

use crate::types::{FlatFact, Header, Row, SecurityMaster, Value};

/// Above this many distinct subjects the per-subject folds are run in
/// parallel and concatenated in ascending subject order; below it the
/// sequential fold already dominates the overhead of splitting the work.
const PARALLEL_SUBJECT_THRESHOLD: usize = 64;

/// Build a security-master table from flat-facts already sorted by
/// `(subject_id, effective_date)` (see `crate::bucket::bucket_facts`).
pub fn build(header: Header, flat_facts: &[FlatFact]) -> SecurityMaster {
    let mut master = SecurityMaster::new(header);
    if flat_facts.is_empty() {
        return master;
    }

    let distinct_subjects = count_distinct_subjects(flat_facts);
    master.rows = if distinct_subjects >= PARALLEL_SUBJECT_THRESHOLD {
        build_rows_parallel(&master.col_index, flat_facts)
    } else {
        build_rows_sequential(&master.col_index, flat_facts)
    };
    master
}

fn count_distinct_subjects(flat_facts: &[FlatFact]) -> usize {
    let mut count = 0;
    let mut last = None;
    for ff in flat_facts {
        if last != Some(ff.subject_id) {
            count += 1;
            last = Some(ff.subject_id);
        }
    }
    count
}

/// Fold one subject's already-contiguous flat-facts into its row run.
/// `flat_facts` must all share the same `subject_id` and be sorted by date.
fn fold_subject(col_index: &crate::types::ColumnIndex, flat_facts: &[FlatFact]) -> Vec<Row> {
    let width = col_index.len();
    let sid_col = col_index["subject_id"];
    let start_col = col_index["effective_start_date"];
    let end_col = col_index["effective_end_date"];

    let mut rows: Vec<Row> = Vec::with_capacity(flat_facts.len());
    for ff in flat_facts {
        let mut new_row: Row = match rows.last() {
            Some(prior) => prior.clone(),
            None => vec![Value::Null; width],
        };
        new_row[sid_col] = Value::Int(ff.subject_id);
        new_row[start_col] = Value::Date(ff.effective_date);
        new_row[end_col] = Value::Null;
        for (attr, value) in &ff.pairs {
            if let Some(&col) = col_index.get(attr) {
                new_row[col] = value.clone();
            }
        }

        if let Some(prior) = rows.last_mut() {
            prior[end_col] = Value::Date(ff.effective_date);
        }
        rows.push(new_row);
    }
    rows
}

fn build_rows_sequential(col_index: &crate::types::ColumnIndex, flat_facts: &[FlatFact]) -> Vec<Row> {
    let mut rows = Vec::with_capacity(flat_facts.len());
    let mut start = 0;
    while start < flat_facts.len() {
        let sid = flat_facts[start].subject_id;
        let mut end = start + 1;
        while end < flat_facts.len() && flat_facts[end].subject_id == sid {
            end += 1;
        }
        rows.extend(fold_subject(col_index, &flat_facts[start..end]));
        start = end;
    }
    rows
}

fn build_rows_parallel(col_index: &crate::types::ColumnIndex, flat_facts: &[FlatFact]) -> Vec<Row> {
    let mut groups: Vec<&[FlatFact]> = Vec::new();
    let mut start = 0;
    while start < flat_facts.len() {
        let sid = flat_facts[start].subject_id;
        let mut end = start + 1;
        while end < flat_facts.len() && flat_facts[end].subject_id == sid {
            end += 1;
        }
        groups.push(&flat_facts[start..end]);
        start = end;
    }

    groups
        .par_iter()
        .map(|group| fold_subject(col_index, group))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
