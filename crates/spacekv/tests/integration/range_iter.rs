//! Index range scan tests.

use spacekv::{
    AttributeCheck, AttributeDef, Config, Datatype, DocumentIndex, Error, HashKind, IndexError,
    IndexKind, IndexSpec, Predicate, Space, SpaceSchema,
};
use spacekv_core::encoding::keys::index_entry_key;
use spacekv_core::encoding::sortable::encode_f64;
use spacekv_core::{IndexDef, IndexId, Int64Encoding, RegionId, TypeTag};
use spacekv_storage::backends::RedbEngine;
use spacekv_storage::engine::names;
use spacekv_storage::{StorageEngine, WriteBatch};

use super::doc_space;

fn int_key(n: i64) -> [u8; 8] {
    n.to_le_bytes()
}

/// A space keyed by `i64` whose documents are indexed at `score`.
fn scores() -> Space<RedbEngine> {
    let schema =
        SpaceSchema::new("scores", AttributeDef::new("id", Datatype::Int64, HashKind::Range))
            .with_attribute(AttributeDef::new("doc", Datatype::Document, HashKind::None))
            .with_index(IndexSpec::new("by_score", "doc", "score"));
    let space = Space::open(schema, &Config::in_memory().region(9u64)).expect("failed to open space");

    for (id, score) in [(10, "1"), (20, "5"), (30, "9"), (40, "-2.5"), (50, "\"high\"")] {
        let doc = format!(r#"{{"score": {score}}}"#);
        space.put(&int_key(id), &[doc]).expect("failed to put");
    }
    space.put(&int_key(60), &[r#"{"no_score": true}"#]).expect("failed to put");
    space
}

fn search(space: &Space<RedbEngine>, predicate: Predicate, operand: f64) -> Vec<i64> {
    let check = AttributeCheck::new(1, predicate, operand);
    space
        .search("by_score", &check)
        .expect("failed to search")
        .into_iter()
        .map(|key| i64::from_le_bytes(key.try_into().expect("8-byte key")))
        .collect()
}

fn search_range(
    space: &Space<RedbEngine>,
    checks: &[(Predicate, f64)],
    limit: Option<usize>,
) -> Vec<i64> {
    let checks: Vec<_> =
        checks.iter().map(|&(predicate, operand)| AttributeCheck::new(1, predicate, operand)).collect();
    space
        .search_range("by_score", &checks, limit)
        .expect("failed to search")
        .into_iter()
        .map(|key| i64::from_le_bytes(key.try_into().expect("8-byte key")))
        .collect()
}

#[test]
fn greater_than_yields_in_value_order() {
    let space = scores();
    assert_eq!(search(&space, Predicate::Gt, 3.0), vec![20, 30]);
}

#[test]
fn every_predicate() {
    let space = scores();
    assert_eq!(search(&space, Predicate::Eq, 5.0), vec![20]);
    assert_eq!(search(&space, Predicate::Eq, 4.0), Vec::<i64>::new());
    assert_eq!(search(&space, Predicate::Lt, 5.0), vec![40, 10]);
    assert_eq!(search(&space, Predicate::Le, 5.0), vec![40, 10, 20]);
    assert_eq!(search(&space, Predicate::Gt, 5.0), vec![30]);
    assert_eq!(search(&space, Predicate::Ge, 5.0), vec![20, 30]);
    assert_eq!(search(&space, Predicate::Ge, -100.0), vec![40, 10, 20, 30]);
    assert_eq!(search(&space, Predicate::Gt, 9.0), Vec::<i64>::new());
}

#[test]
fn string_and_number_values_never_mix() {
    let space = scores();
    let strings = |predicate, operand: &str| {
        space
            .search("by_score", &AttributeCheck::new(1, predicate, operand))
            .expect("failed to search")
    };

    assert_eq!(strings(Predicate::Eq, "high"), vec![int_key(50).to_vec()]);
    assert_eq!(strings(Predicate::Ge, ""), vec![int_key(50).to_vec()]);
    assert!(strings(Predicate::Lt, "high").is_empty());
    assert!(strings(Predicate::Eq, "5").is_empty());
}

#[test]
fn string_prefixes_do_not_match_equality() {
    let space = doc_space();
    space.put(b"k1", &[r#"{"a":{"b":"ab"}}"#]).expect("failed to put");
    space.put(b"k2", &[r#"{"a":{"b":"abc"}}"#]).expect("failed to put");
    space.put(b"k3", &[r#"{"a":{"b":"a"}}"#]).expect("failed to put");

    let find = |predicate, operand: &str| {
        space
            .search("by_ab", &AttributeCheck::new(1, predicate, operand))
            .expect("failed to search")
    };
    assert_eq!(find(Predicate::Eq, "ab"), vec![b"k1".to_vec()]);
    assert_eq!(find(Predicate::Gt, "ab"), vec![b"k2".to_vec()]);
    assert_eq!(find(Predicate::Le, "ab"), vec![b"k3".to_vec(), b"k1".to_vec()]);
}

#[test]
fn scan_is_a_snapshot() {
    let space = scores();
    let tx = space.engine().begin_read().expect("failed to begin read");
    let check = AttributeCheck::new(1, Predicate::Ge, 0.0);
    let iter = space.scan(&tx, "by_score", &check).expect("failed to open scan");

    space.put(&int_key(70), &[r#"{"score": 7}"#]).expect("failed to put");
    assert!(space.delete(&int_key(30)).expect("failed to delete"));

    let seen: Vec<_> = iter.collect::<Result<_, _>>().expect("scan failed");
    assert_eq!(seen, vec![int_key(10).to_vec(), int_key(20).to_vec(), int_key(30).to_vec()]);

    assert_eq!(search(&space, Predicate::Ge, 0.0), vec![10, 20, 70]);
}

#[test]
fn undecodable_entry_stops_the_scan() {
    let engine = RedbEngine::in_memory().expect("failed to create engine");
    let region = RegionId::new(1);
    let mut def = IndexDef::builder("by_score", 1).path("score").build().expect("valid def");
    def.id = IndexId::new(4);

    let mut batch = WriteBatch::new();
    for (score, id) in [(1.0, 1i64), (9.0, 9)] {
        DocumentIndex
            .index_changes(
                &def,
                region,
                &Int64Encoding,
                &int_key(id),
                None,
                Some(format!(r#"{{"score": {score}}}"#).as_bytes()),
                &mut batch,
            )
            .expect("failed to stage");
    }
    // A primary key that is not a valid Int64 encoding.
    let corrupt = index_entry_key(region, def.id, TypeTag::Number, &encode_f64(5.0), b"xyz")
        .expect("failed to encode");
    batch.put(names::INDEX_ENTRIES, corrupt, Vec::new());
    engine.apply(&batch).expect("failed to apply");

    let tx = engine.begin_read().expect("failed to begin read");
    let check = AttributeCheck::new(1, Predicate::Gt, 0.0);
    let mut iter = DocumentIndex
        .iterator_from_check(&tx, region, def.id, &check, &Int64Encoding)
        .expect("failed to open scan");

    assert_eq!(iter.next().expect("first entry").expect("decodes"), int_key(1));
    match iter.next() {
        Some(Err(IndexError::Decode { key, .. })) => assert!(key.ends_with(b"xyz")),
        other => panic!("expected a decode error, got {other:?}"),
    }
    assert!(iter.next().is_none());
    assert!(iter.is_exhausted());
}

#[test]
fn scans_are_restartable() {
    let space = scores();
    let tx = space.engine().begin_read().expect("failed to begin read");
    let check = AttributeCheck::new(1, Predicate::Lt, 100.0);

    let first: Vec<_> = space.scan(&tx, "by_score", &check).expect("scan").take(2).collect();
    let again: Vec<_> = space.scan(&tx, "by_score", &check).expect("scan").take(2).collect();
    assert_eq!(first.len(), 2);
    assert_eq!(
        first.into_iter().map(Result::ok).collect::<Vec<_>>(),
        again.into_iter().map(Result::ok).collect::<Vec<_>>()
    );
}

#[test]
fn negative_zero_equals_zero() {
    let space = doc_space();
    space.put(b"neg", &[r#"{"a":{"b":-0}}"#]).expect("failed to put");
    space.put(b"pos", &[r#"{"a":{"b":0}}"#]).expect("failed to put");
    space.put(b"low", &[r#"{"a":{"b":-1}}"#]).expect("failed to put");

    let find = |predicate, operand: f64| {
        space
            .search("by_ab", &AttributeCheck::new(1, predicate, operand))
            .expect("failed to search")
    };
    assert_eq!(find(Predicate::Eq, 0.0), vec![b"neg".to_vec(), b"pos".to_vec()]);
    assert_eq!(find(Predicate::Eq, -0.0), vec![b"neg".to_vec(), b"pos".to_vec()]);
    assert_eq!(find(Predicate::Lt, 0.0), vec![b"low".to_vec()]);
    assert_eq!(find(Predicate::Gt, -0.0), Vec::<Vec<u8>>::new());
}

#[test]
fn out_of_range_numbers_are_indexed_as_infinities() {
    let space = doc_space();
    space.put(b"big", &[r#"{"a":{"b":1e400}}"#]).expect("failed to put");
    space.put(b"small", &[r#"{"a":{"b":-1e400}}"#]).expect("failed to put");
    space.put(b"one", &[r#"{"a":{"b":1}}"#]).expect("failed to put");

    let find = |predicate, operand: f64| {
        space
            .search("by_ab", &AttributeCheck::new(1, predicate, operand))
            .expect("failed to search")
    };
    assert_eq!(find(Predicate::Gt, 1e300), vec![b"big".to_vec()]);
    assert_eq!(find(Predicate::Lt, -1e300), vec![b"small".to_vec()]);
    assert_eq!(
        find(Predicate::Ge, f64::NEG_INFINITY),
        vec![b"small".to_vec(), b"one".to_vec(), b"big".to_vec()]
    );
}

#[test]
fn bounded_range_intersects_checks() {
    let space = scores();
    assert_eq!(search_range(&space, &[(Predicate::Gt, 3.0), (Predicate::Lt, 9.0)], None), vec![20]);
    assert_eq!(
        search_range(&space, &[(Predicate::Ge, 1.0), (Predicate::Le, 9.0)], None),
        vec![10, 20, 30]
    );
    assert_eq!(
        search_range(&space, &[(Predicate::Lt, 9.0), (Predicate::Gt, -3.0), (Predicate::Lt, 5.0)], None),
        vec![40, 10]
    );
    assert_eq!(search_range(&space, &[(Predicate::Eq, 5.0), (Predicate::Le, 5.0)], None), vec![20]);
    assert_eq!(search_range(&space, &[(Predicate::Gt, 9.0), (Predicate::Lt, 1.0)], None), Vec::<i64>::new());
    assert_eq!(search_range(&space, &[(Predicate::Ge, 5.0)], None), vec![20, 30]);
}

#[test]
fn bounded_range_limit() {
    let space = scores();
    assert_eq!(search_range(&space, &[(Predicate::Ge, -100.0)], Some(2)), vec![40, 10]);
    assert_eq!(search_range(&space, &[(Predicate::Ge, -100.0)], Some(0)), Vec::<i64>::new());
    assert_eq!(
        search_range(&space, &[(Predicate::Gt, 0.0), (Predicate::Lt, 100.0)], Some(10)),
        vec![10, 20, 30]
    );
}

#[test]
fn bounded_range_rejects_bad_checks() {
    let space = scores();
    assert!(matches!(space.search_range("by_score", &[], None), Err(Error::InvalidCheck(_))));

    let mixed = [AttributeCheck::new(1, Predicate::Gt, 0.0), AttributeCheck::new(1, Predicate::Eq, "high")];
    assert!(space.search_range("by_score", &mixed, None).expect("failed to search").is_empty());

    let wrong = [AttributeCheck::new(1, Predicate::Gt, 0.0), AttributeCheck::new(0, Predicate::Lt, 9.0)];
    assert!(matches!(space.search_range("by_score", &wrong, None), Err(Error::InvalidCheck(_))));
    assert!(matches!(space.search_range("nope", &wrong[..1], None), Err(Error::IndexNotFound(_))));
}
