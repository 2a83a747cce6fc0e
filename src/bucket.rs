//! Fact bucketer: groups an unordered raw fact stream by subject and
//! effective date into a sorted sequence of flat-facts.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{Fact, FlatFact, Value};

/// Partition `facts` by `(subject_id, effective_date)`, preserving
/// insertion order of `(attribute, value)` pairs within a bucket (last
/// occurrence of a given attribute in the bucket wins), then emit the
/// buckets sorted stably by `(subject_id, effective_date)`.
pub fn bucket_facts(facts: &[Fact]) -> Vec<FlatFact> {
    let mut buckets: BTreeMap<(i64, NaiveDate), Vec<(String, Value)>> = BTreeMap::new();

    for fact in facts {
        let pairs = buckets
            .entry((fact.subject_id, fact.effective_date))
            .or_default();
        if let Some(existing) = pairs.iter_mut().find(|(a, _)| *a == fact.attribute) {
            existing.1 = fact.value.clone();
        } else {
            pairs.push((fact.attribute.clone(), fact.value.clone()));
        }
    }

    buckets
        .into_iter()
        .map(|((subject_id, effective_date), pairs)| FlatFact {
            subject_id,
            effective_date,
            pairs,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%m/%d/%y").unwrap()
    }

    #[test]
    fn groups_and_sorts_by_subject_then_date() {
        let facts = vec![
            Fact::new(2, "ticker", "V", d("01/01/23")),
            Fact::new(1, "ticker", "GRPH", d("01/01/24")),
            Fact::new(1, "name", "Graphite bio", d("01/01/24")),
            Fact::new(1, "ticker", "LENZ", d("03/22/24")),
        ];
        let flat = bucket_facts(&facts);
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0].subject_id, 1);
        assert_eq!(flat[0].effective_date, d("01/01/24"));
        assert_eq!(flat[0].pairs.len(), 2);
        assert_eq!(flat[1].subject_id, 1);
        assert_eq!(flat[1].effective_date, d("03/22/24"));
        assert_eq!(flat[2].subject_id, 2);
    }

    #[test]
    fn last_write_in_bucket_wins() {
        let facts = vec![
            Fact::new(1, "ticker", "A", d("01/01/24")),
            Fact::new(1, "ticker", "B", d("01/01/24")),
        ];
        let flat = bucket_facts(&facts);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].pairs, vec![("ticker".to_string(), Value::Str("B".to_string()))]);
    }
}
