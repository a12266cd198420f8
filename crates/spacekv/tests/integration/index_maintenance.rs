//! Index maintenance tests.
//!
//! Tests that index entries track document values through inserts, updates
//! and deletes.

use std::ops::Bound;

use spacekv::{DocumentIndex, IndexError, IndexKind};
use spacekv_core::encoding::keys::{decode_index_entry_key, increment_prefix, index_prefix};
use spacekv_core::{IndexDef, IndexId, RegionId, StringEncoding, TypeTag};
use spacekv_storage::backends::RedbEngine;
use spacekv_storage::engine::names;
use spacekv_storage::{BatchOp, Cursor, StorageEngine, Transaction, WriteBatch};

use super::doc_space;

const REGION: RegionId = RegionId::new(1);

fn def() -> IndexDef {
    let mut def = IndexDef::builder("by_ab", 1).path("a.b").build().expect("failed to build def");
    def.id = IndexId::new(1);
    def
}

fn stage(old: Option<&str>, new: Option<&str>) -> WriteBatch {
    let mut batch = WriteBatch::new();
    DocumentIndex
        .index_changes(
            &def(),
            REGION,
            &StringEncoding,
            b"k1",
            old.map(str::as_bytes),
            new.map(str::as_bytes),
            &mut batch,
        )
        .expect("failed to stage index changes");
    batch
}

/// Every `(value, primary key)` in the index, in key order.
fn entries<E: StorageEngine>(engine: &E, region: RegionId, index: IndexId) -> Vec<(Vec<u8>, Vec<u8>)> {
    let tx = engine.begin_read().expect("failed to begin read");
    let prefix = index_prefix(region, index);
    let upper = increment_prefix(&prefix).expect("prefix has a successor");
    let mut cursor = tx
        .range(
            names::INDEX_ENTRIES,
            Bound::Included(prefix.as_slice()),
            Bound::Excluded(upper.as_slice()),
        )
        .expect("failed to open range");

    let mut found = Vec::new();
    while let Some((key, _)) = cursor.next().expect("failed to next") {
        let entry = decode_index_entry_key(&key).expect("failed to decode entry");
        found.push((entry.value, entry.encoded_key.to_vec()));
    }
    found
}

#[test]
fn update_stages_one_delete_and_one_insert() {
    let batch = stage(Some(r#"{"a":{"b":"x"}}"#), Some(r#"{"a":{"b":"y"}}"#));

    let ops: Vec<_> = batch
        .ops()
        .iter()
        .map(|op| {
            let entry = decode_index_entry_key(op.key()).expect("failed to decode entry");
            assert_eq!(entry.type_tag, TypeTag::String);
            let kind = match op {
                BatchOp::Put { .. } => "put",
                BatchOp::Delete { .. } => "delete",
            };
            (kind, entry.value, entry.encoded_key.to_vec())
        })
        .collect();

    assert_eq!(
        ops,
        vec![("delete", b"x".to_vec(), b"k1".to_vec()), ("put", b"y".to_vec(), b"k1".to_vec())]
    );
}

#[test]
fn staged_changes_apply_atomically() {
    let engine = RedbEngine::in_memory().expect("failed to create engine");

    engine.apply(&stage(None, Some(r#"{"a":{"b":"x"}}"#))).expect("failed to apply insert");
    assert_eq!(entries(&engine, REGION, IndexId::new(1)), vec![(b"x".to_vec(), b"k1".to_vec())]);

    engine
        .apply(&stage(Some(r#"{"a":{"b":"x"}}"#), Some(r#"{"a":{"b":"y"}}"#)))
        .expect("failed to apply update");
    assert_eq!(entries(&engine, REGION, IndexId::new(1)), vec![(b"y".to_vec(), b"k1".to_vec())]);

    engine.apply(&stage(Some(r#"{"a":{"b":"y"}}"#), None)).expect("failed to apply delete");
    assert!(entries(&engine, REGION, IndexId::new(1)).is_empty());
}

#[test]
fn malformed_new_document_is_an_error() {
    let mut batch = WriteBatch::new();
    let result = DocumentIndex.index_changes(
        &def(),
        REGION,
        &StringEncoding,
        b"k1",
        None,
        Some(b"{\"a\": [1, 2"),
        &mut batch,
    );
    assert!(matches!(result, Err(IndexError::MalformedDocument(_))));
    assert!(batch.is_empty());
}

#[test]
fn space_keeps_one_entry_per_record() {
    let space = doc_space();
    let index = space.catalog().get_index("by_ab").expect("index exists").id;

    space.put(b"k1", &[r#"{"a":{"b":"x"}}"#]).expect("failed to put");
    space.put(b"k2", &[r#"{"a":{"b":"x"}}"#]).expect("failed to put");
    assert_eq!(
        entries(space.engine(), space.region(), index),
        vec![(b"x".to_vec(), b"k1".to_vec()), (b"x".to_vec(), b"k2".to_vec())]
    );

    space.put(b"k1", &[r#"{"a":{"b":"y"}}"#]).expect("failed to put");
    assert_eq!(
        entries(space.engine(), space.region(), index),
        vec![(b"x".to_vec(), b"k2".to_vec()), (b"y".to_vec(), b"k1".to_vec())]
    );

    // Moving the value out of the path removes the entry.
    space.put(b"k2", &[r#"{"a":{"c":"x"}}"#]).expect("failed to put");
    assert_eq!(entries(space.engine(), space.region(), index), vec![(b"y".to_vec(), b"k1".to_vec())]);

    assert!(space.delete(b"k1").expect("failed to delete"));
    assert!(entries(space.engine(), space.region(), index).is_empty());
}

#[test]
fn rewriting_the_same_value_keeps_the_entry() {
    let space = doc_space();
    let index = space.catalog().get_index("by_ab").expect("index exists").id;

    space.put(b"k1", &[r#"{"a":{"b":"x"}}"#]).expect("failed to put");
    space.put(b"k1", &[r#"{"a":{"b":"x"},"other":1}"#]).expect("failed to put");
    assert_eq!(entries(space.engine(), space.region(), index), vec![(b"x".to_vec(), b"k1".to_vec())]);
}

#[test]
fn failed_put_leaves_index_untouched() {
    let space = doc_space();
    let index = space.catalog().get_index("by_ab").expect("index exists").id;

    space.put(b"k1", &[r#"{"a":{"b":"x"}}"#]).expect("failed to put");
    assert!(space.put(b"k1", &[r#"{"a":{"b":"#]).is_err());

    assert_eq!(entries(space.engine(), space.region(), index), vec![(b"x".to_vec(), b"k1".to_vec())]);
    let record = space.get(b"k1").expect("failed to get").expect("record exists");
    assert_eq!(record.value(1), Some(br#"{"a":{"b":"x"}}"#.as_slice()));
}
