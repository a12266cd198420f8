//! Spaces: keyed records with partition coordinates and document indexes.

use std::ops::Bound;

use spacekv_core::encoding::keys::increment_prefix;
use spacekv_core::encoding::{encoding_for, Decoder, Encoder};
use spacekv_core::{
    AttributeCheck, Coordinate, CoreError, Hasher, IndexCatalog, IndexDef, IndexEncoding, Record,
    RegionId, SpaceSchema,
};
use spacekv_storage::backends::RedbEngine;
use spacekv_storage::engine::names;
use spacekv_storage::{Cursor, StorageEngine, Transaction, WriteBatch};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::{IndexInfo, IndexKind, IndexRangeIter};

/// A space: the records of one schema within one region.
///
/// Every mutation runs in a single write transaction that reads the previous
/// record, stages the object write and the index changes of every index into
/// one [`WriteBatch`], and commits them together. Readers therefore never see
/// an object and its index entries disagree.
///
/// Objects are stored in the `objects` table under `region | key`.
pub struct Space<E: StorageEngine> {
    engine: E,
    schema: SpaceSchema,
    hasher: Hasher,
    catalog: IndexCatalog,
    region: RegionId,
    key_encoding: &'static dyn IndexEncoding,
}

impl Space<RedbEngine> {
    /// Open a space on a redb database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is invalid or the database cannot be
    /// opened.
    pub fn open(schema: SpaceSchema, config: &Config) -> Result<Self> {
        let engine = match &config.path {
            Some(path) => RedbEngine::open_with_config(path, config.redb())?,
            None => RedbEngine::in_memory_with_config(config.redb())?,
        };
        Self::new(schema, engine, config.region)
    }
}

impl<E: StorageEngine> Space<E> {
    /// Create a space over an existing engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is invalid.
    pub fn new(schema: SpaceSchema, engine: E, region: RegionId) -> Result<Self> {
        schema.validate()?;
        let hasher = Hasher::new(schema.hash_kinds())?;
        let catalog = IndexCatalog::from_schema(&schema)?;
        let key_encoding = encoding_for(schema.key.datatype)?;

        info!(space = %schema.name, %region, indexes = catalog.len(), "opened space");
        Ok(Self { engine, schema, hasher, catalog, region, key_encoding })
    }

    /// The space's schema.
    #[must_use]
    pub fn schema(&self) -> &SpaceSchema {
        &self.schema
    }

    /// The index definitions of this space.
    #[must_use]
    pub fn catalog(&self) -> &IndexCatalog {
        &self.catalog
    }

    /// The region this space writes to.
    #[must_use]
    pub const fn region(&self) -> RegionId {
        self.region
    }

    /// The underlying storage engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The coordinate of a record with this key and these values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ArityMismatch`] if `values` does not have one
    /// entry per value attribute.
    pub fn coordinate<V: AsRef<[u8]>>(&self, key: &[u8], values: &[V]) -> Result<Coordinate> {
        Ok(self.hasher.hash(key, values)?)
    }

    /// The key-space half of a coordinate, for lookups by key alone.
    #[must_use]
    pub fn key_coordinate(&self, key: &[u8]) -> Coordinate {
        self.hasher.hash_key(key)
    }

    /// Insert or replace the record stored under `key`.
    ///
    /// Returns the record's coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or values do not match the schema, a
    /// document cannot be parsed, or storage fails. Nothing is written on
    /// error.
    pub fn put<V: AsRef<[u8]>>(&self, key: &[u8], values: &[V]) -> Result<Coordinate> {
        self.schema.key.datatype.check(key)?;
        self.schema.check_values(values)?;
        let coordinate = self.hasher.hash(key, values)?;

        let record = Record::new(key, values.iter().map(|v| v.as_ref().to_vec()).collect());
        let object_key = self.object_key(key);

        let mut tx = self.engine.begin_write()?;
        let old = load(&tx, &object_key)?;

        let mut batch = WriteBatch::new();
        self.stage_index_changes(key, old.as_ref(), Some(&record), &mut batch)?;
        batch.put(names::OBJECTS, object_key, record.encode()?);
        batch.apply_to(&mut tx)?;
        tx.commit()?;

        debug!(
            space = %self.schema.name,
            replaced = old.is_some(),
            ops = batch.len(),
            %coordinate,
            "put record"
        );
        Ok(coordinate)
    }

    /// Get the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails or the stored object is corrupt.
    pub fn get(&self, key: &[u8]) -> Result<Option<Record>> {
        let tx = self.engine.begin_read()?;
        let record = load(&tx, &self.object_key(key))?;
        Ok(record)
    }

    /// Delete the record stored under `key` together with its index entries.
    ///
    /// Returns `false` if there was no such record.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails or the stored object is corrupt.
    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        let object_key = self.object_key(key);
        let mut tx = self.engine.begin_write()?;
        let Some(old) = load(&tx, &object_key)? else {
            tx.rollback()?;
            return Ok(false);
        };

        let mut batch = WriteBatch::new();
        self.stage_index_changes(key, Some(&old), None, &mut batch)?;
        batch.delete(names::OBJECTS, object_key);
        batch.apply_to(&mut tx)?;
        tx.commit()?;

        debug!(space = %self.schema.name, ops = batch.len(), "deleted record");
        Ok(true)
    }

    /// Keys of the records whose indexed value satisfies `check`, in index order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexNotFound`] for an unknown index,
    /// [`Error::InvalidCheck`] if the check is on another attribute, and
    /// [`Error::Index`] if the scan fails.
    pub fn search(&self, index: &str, check: &AttributeCheck) -> Result<Vec<Vec<u8>>> {
        let tx = self.engine.begin_read()?;
        let keys = self.scan(&tx, index, check)?.collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(space = %self.schema.name, index, %check, found = keys.len(), "searched index");
        Ok(keys)
    }

    /// Keys of the records whose indexed value satisfies every check, in
    /// index order, stopping after `limit` keys when one is given.
    ///
    /// All checks must be on the indexed attribute; together they bound a
    /// range such as `3 < value <= 9`.
    ///
    /// # Errors
    ///
    /// As for [`search`](Self::search); [`Error::InvalidCheck`] is also
    /// returned when `checks` is empty.
    pub fn search_range(
        &self,
        index: &str,
        checks: &[AttributeCheck],
        limit: Option<usize>,
    ) -> Result<Vec<Vec<u8>>> {
        let tx = self.engine.begin_read()?;
        let keys = self
            .scan_range(&tx, index, checks)?
            .take(limit.unwrap_or(usize::MAX))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(
            space = %self.schema.name,
            index,
            checks = checks.len(),
            ?limit,
            found = keys.len(),
            "searched index range"
        );
        Ok(keys)
    }

    /// Open a lazy index scan within an existing transaction.
    ///
    /// # Errors
    ///
    /// As for [`search`](Self::search); scan failures surface from the iterator.
    pub fn scan<'t, T>(
        &self,
        tx: &'t T,
        index: &str,
        check: &AttributeCheck,
    ) -> Result<IndexRangeIter<'t, T>>
    where
        T: Transaction + 't,
    {
        let (def, kind) = self.resolve(index, std::slice::from_ref(check))?;
        Ok(kind.iterator_from_check(tx, self.region, def.id, check, self.key_encoding)?)
    }

    /// Open a lazy scan of the intersection of `checks` within an existing
    /// transaction.
    ///
    /// # Errors
    ///
    /// As for [`search_range`](Self::search_range).
    pub fn scan_range<'t, T>(
        &self,
        tx: &'t T,
        index: &str,
        checks: &[AttributeCheck],
    ) -> Result<IndexRangeIter<'t, T>>
    where
        T: Transaction + 't,
    {
        if checks.is_empty() {
            return Err(Error::InvalidCheck(format!("no checks given for index '{index}'")));
        }
        let (def, kind) = self.resolve(index, checks)?;
        Ok(kind.iterator_from_checks(tx, self.region, def.id, checks, self.key_encoding)?)
    }

    /// Number of records stored in this space's region.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub fn len(&self) -> Result<usize> {
        let tx = self.engine.begin_read()?;
        let prefix = self.region.to_be_bytes();
        let upper = increment_prefix(&prefix);
        let upper = upper.as_deref().map_or(Bound::Unbounded, Bound::Excluded);
        let mut cursor = tx.range(names::OBJECTS, Bound::Included(prefix.as_slice()), upper)?;

        let mut count = 0;
        while cursor.next()?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    /// Whether this space's region holds no records.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|n| n == 0)
    }

    fn object_key(&self, key: &[u8]) -> Vec<u8> {
        let mut object_key = Vec::with_capacity(8 + key.len());
        object_key.extend_from_slice(&self.region.to_be_bytes());
        object_key.extend_from_slice(key);
        object_key
    }

    fn resolve(&self, index: &str, checks: &[AttributeCheck]) -> Result<(&IndexDef, IndexInfo)> {
        let def =
            self.catalog.get_index(index).ok_or_else(|| Error::IndexNotFound(index.to_owned()))?;
        if let Some(check) = checks.iter().find(|c| c.attribute != def.attribute) {
            return Err(Error::InvalidCheck(format!(
                "{check} does not apply to index '{}' on attribute {}",
                def.name, def.attribute
            )));
        }
        Ok((def, self.index_kind(def)?))
    }

    fn index_kind(&self, def: &IndexDef) -> Result<IndexInfo> {
        def.attribute
            .checked_sub(1)
            .and_then(|i| self.schema.attributes.get(i))
            .and_then(|attr| IndexInfo::for_datatype(attr.datatype))
            .ok_or_else(|| {
                Error::Core(CoreError::Validation(format!(
                    "index '{}' is not on an indexable attribute",
                    def.name
                )))
            })
    }

    fn stage_index_changes(
        &self,
        key: &[u8],
        old: Option<&Record>,
        new: Option<&Record>,
        batch: &mut WriteBatch,
    ) -> Result<()> {
        for def in self.catalog.all_indexes() {
            let kind = self.index_kind(def)?;
            let old_doc = old.and_then(|r| r.value(def.attribute));
            let new_doc = new.and_then(|r| r.value(def.attribute));
            kind.index_changes(def, self.region, self.key_encoding, key, old_doc, new_doc, batch)?;
        }
        Ok(())
    }
}

fn load<T: Transaction>(tx: &T, object_key: &[u8]) -> Result<Option<Record>> {
    tx.get(names::OBJECTS, object_key)?
        .map(|bytes| Record::decode(&bytes))
        .transpose()
        .map_err(|e| Error::Corrupt(e.to_string()))
}
