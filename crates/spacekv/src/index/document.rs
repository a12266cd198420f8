//! The document index kind.

use std::ops::Bound;

use spacekv_core::document::extract;
use spacekv_core::encoding::keys::{
    increment_prefix, index_entry_key, index_type_prefix, index_value_prefix,
};
use spacekv_core::{
    AttributeCheck, Datatype, ExtractedValue, IndexDef, IndexEncoding, IndexId, Predicate,
    RegionId, TypeTag,
};
use spacekv_storage::engine::names;
use spacekv_storage::{Transaction, WriteBatch};
use tracing::{debug, trace};

use super::{IndexError, IndexKind, IndexRangeIter};

/// Indexes one scalar selected by path inside JSON document attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentIndex;

impl IndexKind for DocumentIndex {
    fn datatype(&self) -> Datatype {
        Datatype::Document
    }

    fn index_changes(
        &self,
        def: &IndexDef,
        region: RegionId,
        key_encoding: &dyn IndexEncoding,
        key: &[u8],
        old: Option<&[u8]>,
        new: Option<&[u8]>,
        batch: &mut WriteBatch,
    ) -> Result<(), IndexError> {
        // Both sides are parsed before anything is staged.
        let old_value = old.map(|doc| extract(doc, &def.path)).transpose()?.flatten();
        let new_value = new.map(|doc| extract(doc, &def.path)).transpose()?.flatten();
        if old_value.is_none() && new_value.is_none() {
            return Ok(());
        }

        let encoded_key = key_encoding.encode(key)?;
        let entry = |value: &ExtractedValue<'_>| {
            index_entry_key(region, def.id, value.type_tag, value.as_bytes(), &encoded_key)
        };

        let removal = old_value.as_ref().map(entry).transpose()?;
        let insertion = new_value.as_ref().map(entry).transpose()?;

        if let Some(entry_key) = removal {
            trace!(index = %def.name, "staging index entry removal");
            batch.delete(names::INDEX_ENTRIES, entry_key);
        }
        if let Some(entry_key) = insertion {
            trace!(index = %def.name, "staging index entry insertion");
            batch.put(names::INDEX_ENTRIES, entry_key, Vec::new());
        }
        Ok(())
    }

    fn iterator_from_check<'t, T>(
        &self,
        tx: &'t T,
        region: RegionId,
        index: IndexId,
        check: &AttributeCheck,
        key_encoding: &'t dyn IndexEncoding,
    ) -> Result<IndexRangeIter<'t, T>, IndexError>
    where
        T: Transaction + 't,
    {
        let CheckRange { type_prefix, lower, upper } = check_range(region, index, check)?;
        debug!(%index, %check, lower = ?lower, upper = ?upper, "opening index scan");

        Ok(IndexRangeIter::new(tx, lower, upper, type_prefix, key_encoding))
    }

    fn iterator_from_checks<'t, T>(
        &self,
        tx: &'t T,
        region: RegionId,
        index: IndexId,
        checks: &[AttributeCheck],
        key_encoding: &'t dyn IndexEncoding,
    ) -> Result<IndexRangeIter<'t, T>, IndexError>
    where
        T: Transaction + 't,
    {
        let ranges = checks
            .iter()
            .map(|check| check_range(region, index, check))
            .collect::<Result<Vec<_>, _>>()?;
        let CheckRange { type_prefix, lower, upper } = match intersect(ranges) {
            Some(range) => range,
            None => CheckRange::empty(index_type_prefix(region, index, TypeTag::Number)),
        };
        debug!(%index, checks = checks.len(), lower = ?lower, upper = ?upper, "opening index scan");

        Ok(IndexRangeIter::new(tx, lower, upper, type_prefix, key_encoding))
    }
}

/// The slice of an index one check covers.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CheckRange {
    type_prefix: Vec<u8>,
    lower: Vec<u8>,
    upper: Bound<Vec<u8>>,
}

impl CheckRange {
    fn empty(type_prefix: Vec<u8>) -> Self {
        let lower = type_prefix.clone();
        Self { upper: Bound::Excluded(lower.clone()), lower, type_prefix }
    }
}

fn check_range(
    region: RegionId,
    index: IndexId,
    check: &AttributeCheck,
) -> Result<CheckRange, IndexError> {
    let operand = ExtractedValue::from_operand(&check.operand);
    let type_prefix = index_type_prefix(region, index, operand.type_tag);
    let value_prefix = index_value_prefix(region, index, operand.type_tag, operand.as_bytes())?;
    let (lower, upper) = scan_bounds(check.predicate, &type_prefix, value_prefix);
    Ok(CheckRange { type_prefix, lower, upper })
}

/// The range satisfying every check, or `None` when there are no checks.
///
/// Checks on different types cannot all hold, so they intersect to nothing.
fn intersect(ranges: Vec<CheckRange>) -> Option<CheckRange> {
    let mut ranges = ranges.into_iter();
    let mut acc = ranges.next()?;
    for range in ranges {
        if range.type_prefix != acc.type_prefix {
            return Some(CheckRange::empty(acc.type_prefix));
        }
        acc.lower = acc.lower.max(range.lower);
        acc.upper = tighter_upper(acc.upper, range.upper);
    }
    Some(acc)
}

fn tighter_upper(a: Bound<Vec<u8>>, b: Bound<Vec<u8>>) -> Bound<Vec<u8>> {
    match (a, b) {
        (Bound::Unbounded, other) | (other, Bound::Unbounded) => other,
        (Bound::Excluded(a), Bound::Excluded(b)) => Bound::Excluded(a.min(b)),
        (Bound::Included(a), Bound::Included(b)) => Bound::Included(a.min(b)),
        (Bound::Included(i), Bound::Excluded(e)) | (Bound::Excluded(e), Bound::Included(i)) => {
            if i < e {
                Bound::Included(i)
            } else {
                Bound::Excluded(e)
            }
        }
    }
}

/// Inclusive lower and exclusive upper bound of the scan for `predicate`.
///
/// Every bound lies within the type prefix's range, so a scan never crosses
/// into entries of another type.
fn scan_bounds(
    predicate: Predicate,
    type_prefix: &[u8],
    value_prefix: Vec<u8>,
) -> (Vec<u8>, Bound<Vec<u8>>) {
    let after_type = || increment_prefix(type_prefix).map_or(Bound::Unbounded, Bound::Excluded);
    let after_value = |prefix: &[u8]| increment_prefix(prefix);

    match predicate {
        Predicate::Eq => {
            let upper = after_value(&value_prefix).map_or_else(after_type, Bound::Excluded);
            (value_prefix, upper)
        }
        Predicate::Lt => (type_prefix.to_vec(), Bound::Excluded(value_prefix)),
        Predicate::Le => {
            let upper = after_value(&value_prefix).map_or_else(after_type, Bound::Excluded);
            (type_prefix.to_vec(), upper)
        }
        Predicate::Gt => match after_value(&value_prefix) {
            Some(lower) => (lower, after_type()),
            // Nothing sorts after the value.
            None => (value_prefix.clone(), Bound::Excluded(value_prefix)),
        },
        Predicate::Ge => (value_prefix, after_type()),
    }
}
