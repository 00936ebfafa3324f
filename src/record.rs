//! Record abstraction used by query callers.
//!
//! The compilers never touch records. Callers read field names and values from
//! a [`Record`] and lift them into expression nodes with the builders.

use serde::{Deserialize, Serialize};

use crate::ast::Value;
use crate::error::{CqlError, CqlResult};
use crate::query::Query;

/// How a column changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Added,
    Changed,
    Removed,
}

/// One recorded column mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationEvent {
    pub kind: MutationKind,
    pub column: String,
    pub value: Value,
}

/// Dynamic field access with mutation tracking.
pub trait Record {
    /// Look up a column value by name.
    fn get(&self, name: &str) -> CqlResult<&Value>;

    /// Set a column value, returning the recorded mutation.
    fn set(&mut self, name: &str, value: Value) -> MutationEvent;

    /// Remove a column, returning the recorded mutation with its last value.
    fn remove(&mut self, name: &str) -> CqlResult<MutationEvent>;

    /// Every mutation recorded so far, oldest first.
    fn mutations(&self) -> &[MutationEvent];
}

/// A named column and its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub value: Value,
}

/// An in-memory row of a standard column family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFamilyRecord {
    pub key: Value,
    pub family: String,
    columns: Vec<Column>,
    #[serde(default)]
    mutations: Vec<MutationEvent>,
}

impl ColumnFamilyRecord {
    pub fn new(key: impl Into<Value>, family: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            family: family.into(),
            columns: Vec::new(),
            mutations: Vec::new(),
        }
    }

    /// Build a row from columns already stored in the family.
    ///
    /// Stored columns are not mutations; only later `set`/`remove` calls are
    /// tracked.
    pub fn with_columns(
        key: impl Into<Value>,
        family: impl Into<String>,
        columns: impl IntoIterator<Item = Column>,
    ) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            ..Self::new(key, family)
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Start a query over this row's column family.
    pub fn query(&self) -> Query {
        Query::from(self.family.as_str())
    }
}

impl Record for ColumnFamilyRecord {
    fn get(&self, name: &str) -> CqlResult<&Value> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.value)
            .ok_or_else(|| CqlError::ColumnNotFound {
                family: self.family.clone(),
                column: name.to_string(),
            })
    }

    fn set(&mut self, name: &str, value: Value) -> MutationEvent {
        let kind = match self.columns.iter_mut().find(|c| c.name == name) {
            Some(col) => {
                col.value = value.clone();
                MutationKind::Changed
            }
            None => {
                self.columns.push(Column {
                    name: name.to_string(),
                    value: value.clone(),
                });
                MutationKind::Added
            }
        };

        let event = MutationEvent {
            kind,
            column: name.to_string(),
            value,
        };
        self.mutations.push(event.clone());
        event
    }

    fn remove(&mut self, name: &str) -> CqlResult<MutationEvent> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| CqlError::ColumnNotFound {
                family: self.family.clone(),
                column: name.to_string(),
            })?;
        let removed = self.columns.remove(idx);

        let event = MutationEvent {
            kind: MutationKind::Removed,
            column: removed.name,
            value: removed.value,
        };
        self.mutations.push(event.clone());
        Ok(event)
    }

    fn mutations(&self) -> &[MutationEvent] {
        &self.mutations
    }
}
