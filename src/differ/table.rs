//! Per-table structural comparison, grounded in the teacher's
//! `sql_schema_differ/table.rs` `TableDiffer`: a handful of pairwise
//! iterators over matched/unmatched columns, constraints and indexes
//! rather than one monolithic comparison function (§F of `SPEC_FULL.md`).

use std::collections::BTreeMap;

use crate::differ::CompareOptions;
use crate::ir::{Column, ColumnChangeKind, ColumnChanges, Constraint};
use crate::schema::ObservedTable;

pub struct TableDiffer<'a> {
    pub options: &'a CompareOptions,
    pub previous: &'a ObservedTable,
    pub next_columns: &'a [Column],
    pub next_constraints: &'a [Constraint],
}

impl<'a> TableDiffer<'a> {
    pub fn column_pairs(&self) -> impl Iterator<Item = (&'a crate::schema::ObservedColumn, &'a Column)> {
        self.previous.columns.iter().filter_map(move |previous| {
            self.next_columns
                .iter()
                .find(|next| next.name == previous.name)
                .map(|next| (previous, next))
        })
    }

    pub fn dropped_columns(&self) -> impl Iterator<Item = &'a crate::schema::ObservedColumn> {
        self.previous
            .columns
            .iter()
            .filter(move |previous| !self.next_columns.iter().any(|next| next.name == previous.name))
    }

    pub fn added_columns(&self) -> impl Iterator<Item = &'a Column> {
        self.next_columns
            .iter()
            .filter(move |next| !self.previous.columns.iter().any(|previous| previous.name == next.name))
    }

    pub fn created_constraints(&self) -> impl Iterator<Item = &'a Constraint> {
        self.next_constraints
            .iter()
            .filter(move |next| !self.previous.constraints.iter().any(|previous| constraints_match(previous, next)))
    }

    pub fn dropped_constraints(&self) -> impl Iterator<Item = &'a Constraint> {
        self.previous
            .constraints
            .iter()
            .filter(move |previous| !self.next_constraints.iter().any(|next| constraints_match(previous, next)))
    }
}

fn constraints_match(a: &Constraint, b: &Constraint) -> bool {
    a == b
}

/// The change-kind vocabulary a column pair differs on, if any (§3.4,
/// §F "Column change-kind vocabulary"). Returns `None` when the columns
/// are identical under comparison (after default normalization).
pub fn column_changes(previous: &crate::schema::ObservedColumn, next: &Column) -> Option<ColumnChanges> {
    let mut changes: ColumnChanges = BTreeMap::new();

    if previous.sql_type != next.sql_type {
        changes.insert(ColumnChangeKind::Type, next.sql_type.clone());
    }
    if previous.nullable != next.nullable {
        changes.insert(ColumnChangeKind::Nullable, next.nullable.to_string());
    }
    let previous_default = previous.default.as_ref().map(super::normalize::normalize_default);
    let next_default = next.default.as_ref().map(super::normalize::normalize_default);
    if previous_default != next_default {
        changes.insert(ColumnChangeKind::Default, next_default.unwrap_or_default());
    }
    if previous.primary != next.primary {
        changes.insert(ColumnChangeKind::PrimaryKey, next.primary.to_string());
    }
    if previous.auto_increment != next.auto_increment {
        changes.insert(ColumnChangeKind::AutoIncrement, next.auto_increment.to_string());
    }
    if previous.unique != next.unique {
        changes.insert(ColumnChangeKind::Unique, next.unique.to_string());
    }
    if previous.foreign_key != next.foreign_key {
        let value = next
            .foreign_key
            .as_ref()
            .map(|fk| format!("{}({})", fk.table, fk.column))
            .unwrap_or_default();
        changes.insert(ColumnChangeKind::ForeignKey, value);
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes)
    }
}
