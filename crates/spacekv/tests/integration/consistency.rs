//! Index consistency under random mutation sequences.

use std::collections::BTreeMap;

use proptest::prelude::*;
use spacekv::{AttributeCheck, Predicate};

use super::doc_space;

#[derive(Debug, Clone)]
enum Op {
    /// Put key `k` with `a.b` set to the value, or without `a.b`.
    Put(u8, Option<i8>),
    Delete(u8),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..6, proptest::option::of(-3i8..4)).prop_map(|(k, v)| Op::Put(k, v)),
        1 => (0u8..6).prop_map(Op::Delete),
    ]
}

fn key(k: u8) -> Vec<u8> {
    format!("key{k}").into_bytes()
}

fn document(value: Option<i8>) -> String {
    match value {
        Some(v) => format!(r#"{{"a":{{"b":{v}}}}}"#),
        None => r#"{"a":{"c":0}}"#.to_owned(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn index_matches_stored_documents(ops in prop::collection::vec(arb_op(), 1..24)) {
        let space = doc_space();
        let mut model: BTreeMap<u8, Option<i8>> = BTreeMap::new();

        for op in &ops {
            match *op {
                Op::Put(k, v) => {
                    space.put(&key(k), &[document(v)]).expect("failed to put");
                    model.insert(k, v);
                }
                Op::Delete(k) => {
                    let existed = space.delete(&key(k)).expect("failed to delete");
                    prop_assert_eq!(existed, model.remove(&k).is_some());
                }
            }
        }

        // Exactly one entry per record whose document carries the path.
        for v in -3i8..4 {
            let check = AttributeCheck::new(1, Predicate::Eq, f64::from(v));
            let found = space.search("by_ab", &check).expect("failed to search");
            let expected: Vec<Vec<u8>> =
                model.iter().filter(|(_, m)| **m == Some(v)).map(|(k, _)| key(*k)).collect();
            prop_assert_eq!(found, expected);
        }

        let everything = AttributeCheck::new(1, Predicate::Ge, -100.0);
        let indexed = space.search("by_ab", &everything).expect("failed to search").len();
        prop_assert_eq!(indexed, model.values().filter(|m| m.is_some()).count());
        prop_assert_eq!(space.len().expect("failed to count"), model.len());
    }

    #[test]
    fn ordered_checks_agree_with_numeric_order(
        scores in prop::collection::btree_map(0u8..20, -1000i32..1000, 0..16),
        pivot in -1000i32..1000,
    ) {
        let space = doc_space();
        for (k, score) in &scores {
            space.put(&key(*k), &[format!(r#"{{"a":{{"b":{score}}}}}"#)]).expect("failed to put");
        }

        let check = AttributeCheck::new(1, Predicate::Lt, f64::from(pivot));
        let mut found = space.search("by_ab", &check).expect("failed to search");
        found.sort();

        let mut expected: Vec<Vec<u8>> =
            scores.iter().filter(|(_, s)| **s < pivot).map(|(k, _)| key(*k)).collect();
        expected.sort();
        prop_assert_eq!(found, expected);
    }
}
