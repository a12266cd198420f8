//! Contract tests for storage engine implementations.
//!
//! [`run_test_suite`] checks the trait contracts against any engine a
//! [`TestHarness`] can create.

use std::ops::Bound;

use spacekv_storage::{Cursor, StorageEngine, StorageError, StorageResult, Transaction, WriteBatch};

/// Creates and cleans up engines under test.
pub trait TestHarness {
    /// The storage engine type being tested.
    type Engine: StorageEngine;

    /// Create a new, empty storage engine.
    fn create_engine() -> StorageResult<Self::Engine>;

    /// Clean up after a test.
    fn cleanup(_engine: Self::Engine) {}
}

/// Run the standard test suite against a storage engine.
pub fn run_test_suite<H: TestHarness>() {
    test_basic_operations::<H>();
    test_snapshot_isolation::<H>();
    test_cursor_operations::<H>();
    test_range_scan::<H>();
    test_read_only_enforcement::<H>();
    test_batch_apply::<H>();
    test_rollback_discards::<H>();
}

fn collect_keys<C: Cursor>(cursor: &mut C) -> Vec<Vec<u8>> {
    let mut keys = Vec::new();
    while let Some((k, _)) = cursor.next().expect("failed to next") {
        keys.push(k);
    }
    keys
}

/// Get/put/delete round trips.
fn test_basic_operations<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let tx = engine.begin_read().expect("failed to begin read");
        assert_eq!(tx.get("test_table", b"key1").expect("failed to get"), None);
    }

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("test_table", b"key1", b"value1").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        assert_eq!(tx.get("test_table", b"key1").expect("failed to get"), Some(b"value1".to_vec()));
        assert_eq!(tx.get("other_table", b"key1").expect("failed to get"), None);
    }

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("test_table", b"key1", b"value1_updated").expect("failed to put");
        // Writes are visible inside their own transaction.
        assert_eq!(
            tx.get("test_table", b"key1").expect("failed to get"),
            Some(b"value1_updated".to_vec())
        );
        tx.commit().expect("failed to commit");
    }

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        assert!(tx.delete("test_table", b"key1").expect("failed to delete"));
        assert!(!tx.delete("test_table", b"nonexistent").expect("failed to delete"));
        tx.commit().expect("failed to commit");
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        assert_eq!(tx.get("test_table", b"key1").expect("failed to get"), None);
    }

    H::cleanup(engine);
}

/// A read transaction does not observe writes committed after it began.
fn test_snapshot_isolation<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("test_table", b"key1", b"initial").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    let snapshot = engine.begin_read().expect("failed to begin read");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("test_table", b"key1", b"updated").expect("failed to put");
        tx.put("test_table", b"key2", b"new").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    assert_eq!(snapshot.get("test_table", b"key1").expect("failed to get"), Some(b"initial".to_vec()));
    assert_eq!(snapshot.get("test_table", b"key2").expect("failed to get"), None);
    let mut cursor = snapshot.cursor("test_table").expect("failed to create cursor");
    assert_eq!(collect_keys(&mut cursor), vec![b"key1".to_vec()]);
    drop(cursor);
    drop(snapshot);

    {
        let tx = engine.begin_read().expect("failed to begin read");
        assert_eq!(tx.get("test_table", b"key1").expect("failed to get"), Some(b"updated".to_vec()));
    }

    H::cleanup(engine);
}

/// Cursor positioning and forward iteration.
fn test_cursor_operations<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        for (k, v) in [(b"a", b"1"), (b"b", b"2"), (b"c", b"3"), (b"d", b"4"), (b"e", b"5")] {
            tx.put("test_table", k, v).expect("failed to put");
        }
        tx.put("neighbour", b"a", b"x").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        let mut cursor = tx.cursor("test_table").expect("failed to create cursor");
        assert_eq!(cursor.current(), None);

        let first = cursor.seek_first().expect("failed to seek_first");
        assert_eq!(first, Some((b"a".to_vec(), b"1".to_vec())));

        let second = cursor.next().expect("failed to next");
        assert_eq!(second, Some((b"b".to_vec(), b"2".to_vec())));
        assert_eq!(cursor.current(), Some((b"b".as_slice(), b"2".as_slice())));

        let c = cursor.seek(b"c").expect("failed to seek");
        assert_eq!(c, Some((b"c".to_vec(), b"3".to_vec())));

        let between = cursor.seek(b"bb").expect("failed to seek");
        assert_eq!(between, Some((b"c".to_vec(), b"3".to_vec())));

        cursor.seek(b"e").expect("failed to seek");
        assert_eq!(cursor.next().expect("failed to next"), None);
        assert_eq!(cursor.current(), None);
        // Exhaustion is sticky.
        assert_eq!(cursor.next().expect("failed to next"), None);

        assert_eq!(cursor.seek(b"z").expect("failed to seek"), None);
        assert_eq!(cursor.seek_first().expect("failed to seek_first").map(|(k, _)| k), Some(b"a".to_vec()));
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        let mut cursor = tx.cursor("test_table").expect("failed to create cursor");
        // next() on an unpositioned cursor starts at the first entry.
        assert_eq!(
            collect_keys(&mut cursor),
            vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"d".to_vec(), b"e".to_vec()]
        );
    }

    {
        let tx = engine.begin_read().expect("failed to begin read");
        let mut cursor = tx.cursor("empty_table").expect("failed to create cursor");
        assert_eq!(cursor.seek_first().expect("failed to seek_first"), None);
        assert_eq!(cursor.next().expect("failed to next"), None);
    }

    H::cleanup(engine);
}

/// Range cursors honour all bound kinds.
fn test_range_scan<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        for i in 0..10u8 {
            tx.put("test_table", &[i], &[i * 10]).expect("failed to put");
        }
        tx.commit().expect("failed to commit");
    }

    let tx = engine.begin_read().expect("failed to begin read");
    let scan = |start: Bound<&[u8]>, end: Bound<&[u8]>| -> Vec<u8> {
        let mut cursor = tx.range("test_table", start, end).expect("failed to create range cursor");
        collect_keys(&mut cursor).into_iter().map(|k| k[0]).collect()
    };

    assert_eq!(scan(Bound::Included(&[3]), Bound::Excluded(&[7])), vec![3, 4, 5, 6]);
    assert_eq!(scan(Bound::Excluded(&[3]), Bound::Included(&[7])), vec![4, 5, 6, 7]);
    assert_eq!(scan(Bound::Unbounded, Bound::Excluded(&[3])), vec![0, 1, 2]);
    assert_eq!(scan(Bound::Included(&[8]), Bound::Unbounded), vec![8, 9]);
    assert_eq!(scan(Bound::Included(&[5]), Bound::Excluded(&[5])), Vec::<u8>::new());

    // Both bounds inclusive on the last key.
    {
        let mut cursor = tx
            .range("test_table", Bound::Included(&[9]), Bound::Included(&[9]))
            .expect("failed to create range cursor");
        assert_eq!(collect_keys(&mut cursor), vec![vec![9]]);
    }

    // Seeking below the range start clamps to the range.
    {
        let mut cursor = tx
            .range("test_table", Bound::Included(&[4]), Bound::Excluded(&[6]))
            .expect("failed to create range cursor");
        assert_eq!(cursor.seek(&[1]).expect("failed to seek").map(|(k, _)| k), Some(vec![4]));
        assert_eq!(cursor.seek(&[6]).expect("failed to seek"), None);
    }

    drop(tx);
    H::cleanup(engine);
}

/// Read-only transactions reject writes.
fn test_read_only_enforcement<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_read().expect("failed to begin read");
        assert!(tx.is_read_only());
        assert!(matches!(tx.put("t", b"k", b"v"), Err(StorageError::ReadOnly)));
        assert!(matches!(tx.delete("t", b"k"), Err(StorageError::ReadOnly)));
    }

    {
        let tx = engine.begin_write().expect("failed to begin write");
        assert!(!tx.is_read_only());
        tx.rollback().expect("failed to rollback");
    }

    H::cleanup(engine);
}

/// Batches apply in order and atomically.
fn test_batch_apply<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    let mut batch = WriteBatch::new();
    batch.put("t", b"a".to_vec(), b"1".to_vec());
    batch.put("t", b"b".to_vec(), b"2".to_vec());
    batch.delete("t", b"a".to_vec());
    batch.put("u", b"a".to_vec(), b"3".to_vec());
    engine.apply(&batch).expect("failed to apply batch");

    let tx = engine.begin_read().expect("failed to begin read");
    assert_eq!(tx.get("t", b"a").expect("failed to get"), None);
    assert_eq!(tx.get("t", b"b").expect("failed to get"), Some(b"2".to_vec()));
    assert_eq!(tx.get("u", b"a").expect("failed to get"), Some(b"3".to_vec()));
    drop(tx);

    engine.apply(&WriteBatch::new()).expect("empty batches apply");

    H::cleanup(engine);
}

/// Dropped or rolled back write transactions leave no trace.
fn test_rollback_discards<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("t", b"rolled_back", b"x").expect("failed to put");
        tx.rollback().expect("failed to rollback");
    }
    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("t", b"dropped", b"x").expect("failed to put");
    }

    let tx = engine.begin_read().expect("failed to begin read");
    assert_eq!(tx.get("t", b"rolled_back").expect("failed to get"), None);
    assert_eq!(tx.get("t", b"dropped").expect("failed to get"), None);
    drop(tx);

    H::cleanup(engine);
}

/// Error types implement `std::error::Error` and render their context.
#[test]
fn error_types() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
    assert_error::<StorageError>();

    assert!(StorageError::Open("test".to_string()).to_string().contains("test"));
    assert!(StorageError::ReadOnly.to_string().contains("read-only"));

    let io: StorageError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
    assert!(matches!(io, StorageError::Io(_)));
}

/// `Cursor` can be used as a trait object.
#[test]
fn cursor_object_safety() {
    fn _takes_cursor(_: &dyn Cursor) {}
}
