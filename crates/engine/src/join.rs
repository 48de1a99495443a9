//! Identifier-keyed record indexes.
//!
//! Auxiliary record collections (addresses, profiles) are joined against the
//! work items by a shared identifier. Building a hash index once per
//! collection replaces the O(n·m) linear scan per item with an O(1) lookup,
//! at the cost of one O(n) pass per collection.

use std::collections::HashMap;

use herald_common::error::DispatchError;

/// Read-only mapping from identifier to record, built once before dispatch.
#[derive(Debug, Clone)]
pub struct RecordIndex<T> {
    /// Human-readable record kind, carried into lookup-miss errors.
    record: &'static str,
    by_id: HashMap<String, T>,
}

impl<T> RecordIndex<T> {
    /// Build an index over `rows`, keying each row by `key`.
    ///
    /// A duplicate identifier is rejected as a configuration error rather
    /// than silently keeping either row; ambiguous joins are a data problem
    /// the caller has to fix.
    pub fn build<I, F>(record: &'static str, rows: I, key: F) -> Result<Self, DispatchError>
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> &str,
    {
        let mut by_id = HashMap::new();
        for row in rows {
            let id = key(&row).to_string();
            if by_id.insert(id.clone(), row).is_some() {
                return Err(DispatchError::Config(format!(
                    "duplicate {record} record for identifier {id}"
                )));
            }
        }
        Ok(Self { record, by_id })
    }

    /// Look up the record for `emp_id`, failing with a per-item
    /// `LookupMiss` when absent.
    pub fn lookup(&self, emp_id: &str) -> Result<&T, DispatchError> {
        self.by_id.get(emp_id).ok_or_else(|| DispatchError::LookupMiss {
            record: self.record,
            emp_id: emp_id.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
