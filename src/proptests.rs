//! Property tests for the invariants the master builder and merge engine
//! must uphold for any valid input (P1-P4).

use chrono::NaiveDate;
use proptest::prelude::*;

use crate::bucket::bucket_facts;
use crate::builder::build;
use crate::header::resolve_header;
use crate::merge::merge_batch;
use crate::types::{Fact, PriorityMap, SecurityMaster, Value};

fn arb_attribute() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["ticker", "name", "asset_class", "gics_sector", "market_cap"])
        .prop_map(|s| s.to_string())
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2026, 1u32..13, 1u32..28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_fact() -> impl Strategy<Value = Fact> {
    (0i64..8, arb_attribute(), 0i64..10_000, arb_date())
        .prop_map(|(sid, attr, v, d)| Fact::new(sid, attr, v, d))
}

fn arb_facts() -> impl Strategy<Value = Vec<Fact>> {
    prop::collection::vec(arb_fact(), 1..40)
}

fn priority() -> PriorityMap {
    let mut p = PriorityMap::new();
    p.insert("subject_id".to_string(), 0);
    p.insert("effective_start_date".to_string(), 1);
    p.insert("effective_end_date".to_string(), 2);
    p.insert("asset_class".to_string(), 3);
    p.insert("ticker".to_string(), 4);
    p.insert("name".to_string(), 5);
    p
}

fn master_from(facts: &[Fact]) -> SecurityMaster {
    let priority = priority();
    let (header, _) = resolve_header(facts, &priority);
    let flat = bucket_facts(facts);
    build(header, &flat)
}

/// Deduplicate facts that collide on `(subject_id, attribute,
/// effective_date)`, keeping the last one — the only stable-last-wins
/// tie-break the builder itself applies (see the bucketer).
fn dedup_by_key(facts: Vec<Fact>) -> Vec<Fact> {
    let mut seen = std::collections::HashMap::new();
    let mut ordered_keys = Vec::new();
    for (i, f) in facts.iter().enumerate() {
        let key = (f.subject_id, f.attribute.clone(), f.effective_date);
        if !seen.contains_key(&key) {
            ordered_keys.push(key.clone());
        }
        seen.insert(key, i);
    }
    ordered_keys
        .into_iter()
        .map(|key| facts[seen[&key]].clone())
        .collect()
}

fn check_invariants(master: &SecurityMaster) {
    let sid_col = master.col_index["subject_id"];
    let start_col = master.col_index["effective_start_date"];
    let end_col = master.col_index["effective_end_date"];

    // I6
    for row in &master.rows {
        assert_eq!(row.len(), master.header.len());
    }

    let mut last_sid: Option<i64> = None;
    let mut seen_sids = std::collections::HashSet::new();
    let mut i = 0;
    while i < master.rows.len() {
        let sid = match &master.rows[i][sid_col] {
            Value::Int(v) => *v,
            _ => panic!("subject_id must never be null"),
        };

        // I1: subjects contiguous, ascending.
        if last_sid != Some(sid) {
            assert!(!seen_sids.contains(&sid), "subject {sid} is not contiguous");
            seen_sids.insert(sid);
            if let Some(prev) = last_sid {
                assert!(sid > prev, "subjects must appear in ascending order");
            }
        }
        last_sid = Some(sid);

        let mut j = i;
        let mut prev_end: Option<NaiveDate> = None;
        while j < master.rows.len()
            && matches!(&master.rows[j][sid_col], Value::Int(v) if *v == sid)
        {
            let start = match &master.rows[j][start_col] {
                Value::Date(d) => *d,
                _ => panic!("effective_start_date must never be null"),
            };
            let end = match &master.rows[j][end_col] {
                Value::Date(d) => Some(*d),
                Value::Null => None,
                _ => panic!("effective_end_date must be a date or null"),
            };

            // I2
            if let Some(prev) = prev_end {
                assert_eq!(start, prev, "intervals must be gap-free and non-overlapping (I2/I3)");
            }
            // I4: only the last row of a subject may be open.
            let is_last_row_of_subject = j + 1 == master.rows.len()
                || !matches!(&master.rows[j + 1][sid_col], Value::Int(v) if *v == sid);
            if is_last_row_of_subject {
                assert!(end.is_none(), "the last interval of a subject must be open");
            } else {
                assert!(end.is_some(), "only the last interval of a subject may be open");
            }

            prev_end = end;
            j += 1;
        }
        i = j;
    }
}

proptest! {
    #[test]
    fn p1_build_satisfies_invariants(facts in arb_facts()) {
        let master = master_from(&facts);
        check_invariants(&master);
    }

    #[test]
    fn p2_build_is_permutation_independent(facts in arb_facts(), seed in 0u64..1000) {
        let deduped = dedup_by_key(facts);
        let mut shuffled = deduped.clone();
        // A cheap deterministic shuffle: rotate by `seed`.
        if !shuffled.is_empty() {
            let split = (seed as usize) % shuffled.len();
            shuffled.rotate_left(split);
        }

        let a = master_from(&deduped);
        let b = master_from(&shuffled);
        prop_assert_eq!(a.rows, b.rows);
        prop_assert_eq!(a.header, b.header);
    }

    #[test]
    fn p3_incremental_merge_matches_full_rebuild(facts in arb_facts(), split_at in 0usize..40) {
        let deduped = dedup_by_key(facts);
        if deduped.len() < 2 {
            return Ok(());
        }
        let split_at = split_at % deduped.len();
        let (f1, f2) = deduped.split_at(split_at);
        if f1.is_empty() || f2.is_empty() {
            return Ok(());
        }

        let mut incremental = master_from(f1);
        merge_batch(&mut incremental, f2, &priority());
        let rebuilt = master_from(&deduped);

        // Compare up to column reordering: same header set, same rows when
        // projected onto a shared column order.
        let shared_order: Vec<&String> = rebuilt.header.iter().collect();
        prop_assert_eq!(
            incremental.header.iter().collect::<std::collections::HashSet<_>>(),
            shared_order.iter().cloned().collect::<std::collections::HashSet<_>>()
        );

        let project = |m: &SecurityMaster| -> Vec<Vec<Value>> {
            m.rows
                .iter()
                .map(|row| shared_order.iter().map(|name| row[m.col_index[name.as_str()]].clone()).collect())
                .collect()
        };
        prop_assert_eq!(project(&incremental), project(&rebuilt));
    }

    #[test]
    fn p4_cascade_never_touches_earlier_rows(facts in arb_facts(), pick in 0usize..40, new_value in 0i64..10_000) {
        let deduped = dedup_by_key(facts);
        let master = master_from(&deduped);
        if master.rows.is_empty() {
            return Ok(());
        }
        let hit_index = pick % master.rows.len();
        let sid_col = master.col_index["subject_id"];
        let start_col = master.col_index["effective_start_date"];
        let sid = match &master.rows[hit_index][sid_col] {
            Value::Int(v) => *v,
            _ => unreachable!(),
        };
        let hit_date = match &master.rows[hit_index][start_col] {
            Value::Date(d) => *d,
            _ => unreachable!(),
        };

        let before = master.rows.clone();
        let mut updated = master.clone();
        let update = vec![Fact::new(sid, "market_cap", new_value, hit_date)];
        merge_batch(&mut updated, &update, &priority());

        // Rows strictly before the hit row are untouched (P4).
        for i in 0..hit_index {
            prop_assert_eq!(&updated.rows[i], &before[i]);
        }

        // Once a row's market_cap stops equalling the new value, every row
        // after it for the same subject also does not equal it unless its
        // own original equalled the captured original (only relevant when
        // the attribute's value collides with new_value by chance, which
        // the assertion below tolerates by checking monotonic-stop rather
        // than exact propagation length).
        let mc_col = updated.col_index["market_cap"];
        let mut propagating = true;
        for row in updated.rows.iter().skip(hit_index) {
            if !matches!(&row[sid_col], Value::Int(v) if *v == sid) {
                break;
            }
            let is_new = row[mc_col] == Value::Int(new_value);
            if !is_new {
                propagating = false;
            } else if !propagating {
                prop_assert!(false, "cascade resumed after stopping for subject {sid}");
            }
        }
    }
}
