//! Reopening spaces on disk.

use spacekv::{AttributeCheck, Config, Predicate, Space};

use super::doc_schema;

#[test]
fn records_and_indexes_survive_reopen() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = Config::new(dir.path().join("space.redb")).region(3u64);

    {
        let space = Space::open(doc_schema(), &config).expect("failed to open space");
        space.put(b"k1", &[r#"{"a":{"b":"x"}}"#]).expect("failed to put");
        space.put(b"k2", &[r#"{"a":{"b":"y"}}"#]).expect("failed to put");
        space.delete(b"k2").expect("failed to delete");
    }

    let space = Space::open(doc_schema(), &config).expect("failed to reopen space");
    assert_eq!(space.len().expect("failed to count"), 1);
    assert!(space.get(b"k1").expect("failed to get").is_some());

    let check = AttributeCheck::new(1, Predicate::Ge, "");
    assert_eq!(space.search("by_ab", &check).expect("failed to search"), vec![b"k1".to_vec()]);
}

#[test]
fn invalid_schema_is_rejected() {
    let mut schema = doc_schema();
    schema.indices[0].attribute = "k".to_owned();
    assert!(Space::open(schema, &Config::in_memory()).is_err());
}
