//! Lowers a [`SchemaDiff`] plus the target [`Database`] into an ordered IR
//! program (§4.5). One planner per dialect; [`plan`]/[`plan_with_diagnostics`]
//! dispatch by [`Dialect`] the way [`crate::render::renderer_for`] dispatches
//! the renderer.
//!
//! Plan errors never abort the plan (§7): a failed target-field lookup
//! during column lowering degrades to an inline `-- ERROR: ...` comment,
//! and the offending statement is skipped. Callers that want to inspect
//! what got skipped use [`plan_with_diagnostics`]; [`plan`] discards the
//! diagnostics the way a caller uninterested in
//! `DestructiveChangeDiagnostics` can ignore it in the teacher's connector.

pub mod mysql_like;
pub mod postgres;

use crate::dialect::Dialect;
use crate::differ::SchemaDiff;
use crate::ir::{Comment, Node};
use crate::schema::Database;

/// A target-field lookup failure during column lowering (§7). Not part of
/// [`crate::error::PtahError`]: it degrades the plan rather than aborting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanError {
    pub table: String,
    pub message: String,
}

impl PlanError {
    pub fn new(table: impl Into<String>, message: impl Into<String>) -> Self {
        PlanError {
            table: table.into(),
            message: message.into(),
        }
    }

    /// The ERROR comment this degrades to in the emitted program.
    pub fn as_comment(&self) -> Node {
        Node::Comment(Comment::new(format!("ERROR: {}", self.message)))
    }
}

/// Plans the migration for `dialect`, discarding plan diagnostics.
pub fn plan(target: &Database, diff: &SchemaDiff, dialect: Dialect) -> Vec<Node> {
    plan_with_diagnostics(target, diff, dialect).0
}

/// Plans the migration for `dialect`, returning both the program and the
/// out-of-band list of skipped statements.
pub fn plan_with_diagnostics(target: &Database, diff: &SchemaDiff, dialect: Dialect) -> (Vec<Node>, Vec<PlanError>) {
    tracing::debug!(
        tables_added = diff.tables_added.len(),
        tables_modified = diff.tables_modified.len(),
        %dialect,
        "starting migration plan"
    );
    let program = if dialect.is_mysql_like() {
        mysql_like::plan(target, diff, dialect)
    } else {
        postgres::plan(target, diff)
    };
    tracing::debug!(statements = program.0.len(), errors = program.1.len(), "migration plan complete");
    program
}

/// Step 7's per-table modify block: one `AlterTable` per added column, one
/// per modified column (plus a change-kind comment), one per removed
/// column (plus a hazard comment) — shared verbatim by both dialect
/// families, only the column-lowering that feeds it differs.
pub(crate) fn plan_table_modifications(
    target: &Database,
    table_diff: &crate::differ::TableDiff,
    lower_one: impl Fn(&str, &Database, &str) -> Result<crate::ir::Column, PlanError>,
) -> (Vec<Node>, Vec<PlanError>) {
    use crate::ir::{AlterTable, AlterTableOperation};

    let mut nodes = Vec::new();
    let mut errors = Vec::new();
    nodes.push(Node::Comment(Comment::new(format!("modifying table {}", table_diff.table))));

    for column_name in &table_diff.columns_added {
        match lower_one(&table_diff.table, target, column_name) {
            Ok(col) => nodes.push(Node::AlterTable(AlterTable::new(
                &table_diff.table,
                vec![AlterTableOperation::AddColumn(col)],
            ))),
            Err(e) => {
                nodes.push(e.as_comment());
                errors.push(e);
            }
        }
    }

    for (column_name, changes) in &table_diff.columns_modified {
        match lower_one(&table_diff.table, target, column_name) {
            Ok(col) => {
                let kinds: Vec<String> = changes.keys().map(|k| format!("{:?}", k)).collect();
                nodes.push(Node::Comment(Comment::new(format!(
                    "column {} changed: {}",
                    column_name,
                    kinds.join(", ")
                ))));
                nodes.push(Node::AlterTable(AlterTable::new(
                    &table_diff.table,
                    vec![AlterTableOperation::ModifyColumn(col)],
                )));
            }
            Err(e) => {
                nodes.push(e.as_comment());
                errors.push(e);
            }
        }
    }

    for column_name in &table_diff.columns_removed {
        nodes.push(Node::Comment(Comment::new(format!(
            "dropping column {}.{} — data loss",
            table_diff.table, column_name
        ))));
        nodes.push(Node::AlterTable(AlterTable::new(
            &table_diff.table,
            vec![AlterTableOperation::DropColumn(column_name.clone())],
        )));
    }

    (nodes, errors)
}

/// Splits a `table.name` diff key back into its parts (see
/// `differ::policy_key`/`differ::index_key`): policies and MySQL/MariaDB
/// index drops are both table-scoped, so the diff carries the qualified
/// key rather than a bare name the planner would have no table to recover.
pub(crate) fn split_table_key(key: &str) -> (&str, &str) {
    key.split_once('.').unwrap_or(("", key))
}

/// Locates the target field (by column name) backing a table's column,
/// resolved through the table's struct-name key (§4.5 "Column-lowering,
/// target-driven" — looked up by struct name, not table name, so several
/// tables can share an embedded struct).
pub(crate) fn lower_one_column(table: &str, target: &Database, column_name: &str) -> Result<crate::ir::Column, PlanError> {
    let fields = target
        .fields_for_table(table)
        .ok_or_else(|| PlanError::new(table, format!("no target fields found for table {}", table)))?;
    let columns = crate::lowering::lower_fields(fields);
    columns
        .into_iter()
        .find(|c| c.name == column_name)
        .ok_or_else(|| PlanError::new(table, format!("no target field lowers to column {}.{}", table, column_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EmbedMode, TargetField};

    fn field(name: &str, sql_type: &str) -> TargetField {
        TargetField {
            struct_field_name: name.to_string(),
            column_name: name.to_string(),
            sql_type: sql_type.to_string(),
            nullable: true,
            primary: false,
            unique: false,
            auto_increment: false,
            default: None,
            check: None,
            comment: None,
            foreign_key: None,
            embed: EmbedMode::None,
        }
    }

    #[test]
    fn plan_error_for_missing_field_degrades_to_a_comment() {
        let target = Database::new();
        let table_diff = crate::differ::TableDiff {
            table: "ghosts".to_string(),
            columns_added: vec!["name".to_string()],
            ..Default::default()
        };
        let (nodes, errors) = plan_table_modifications(&target, &table_diff, lower_one_column);
        assert_eq!(errors.len(), 1);
        assert!(nodes.iter().any(|n| matches!(n, Node::Comment(c) if c.text.starts_with("ERROR"))));
    }

    #[test]
    fn split_table_key_recovers_table_and_name() {
        assert_eq!(split_table_key("documents.own_rows_only"), ("documents", "own_rows_only"));
    }

    #[test]
    fn lower_one_column_finds_the_field_by_table_struct_key() {
        let mut target = Database::new();
        target.tables.insert("User".to_string(), "users".to_string());
        target.fields.insert("User".to_string(), vec![field("email", "TEXT")]);
        let col = lower_one_column("users", &target, "email").unwrap();
        assert_eq!(col.sql_type, "TEXT");
    }
}
