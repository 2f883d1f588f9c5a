//! The shared MySQL/MariaDB planner core (§4.5): most PostgreSQL-only
//! steps (extensions, standalone enum types, functions, roles, RLS,
//! policies) collapse to nothing since the IR node simply has no
//! MySQL/MariaDB counterpart; what remains is prelude/epilogue warnings
//! about enum handling, table creation/modification, and index
//! add/drop.

use crate::differ::SchemaDiff;
use crate::dialect::Dialect;
use crate::ir::{Column, Comment, Constraint, CreateTable, DropTable, Index, Node};
use crate::lowering::lower_fields_with_constraints;
use crate::schema::{Database, TargetField};

use super::{lower_one_column, plan_table_modifications, split_table_key, PlanError};

pub(super) fn plan(target: &Database, diff: &SchemaDiff, dialect: Dialect) -> (Vec<Node>, Vec<PlanError>) {
    let mut nodes = Vec::new();
    let mut errors = Vec::new();

    // Step 1: prelude warnings — MySQL/MariaDB have no standalone enum
    // type; values are inlined into the owning column instead.
    for name in &diff.enums_added {
        nodes.push(Node::Comment(Comment::new(format!(
            "{} has no standalone enum type; {} values are inlined into the owning column",
            dialect, name
        ))));
    }
    for e in &diff.enums_modified {
        nodes.push(Node::Comment(Comment::new(format!(
            "{} has no standalone enum type; {} value set change must be applied via MODIFY COLUMN",
            dialect, e.name
        ))));
    }

    // Steps 2-5: extensions, standalone enum types, functions, roles —
    // none of these concepts exist in MySQL/MariaDB.

    // Step 6: create new tables, target-driven, with enum inlining.
    for table_name in &diff.tables_added {
        match target.fields_for_table(table_name) {
            Some(fields) => {
                let (columns, constraints) = lower_columns_inlining_enums(fields, target);
                nodes.push(Node::CreateTable(
                    CreateTable::new(table_name, columns).with_constraints(constraints),
                ));
            }
            None => {
                let e = PlanError::new(table_name, format!("no target fields found for table {}", table_name));
                nodes.push(e.as_comment());
                tracing::warn!(table = %table_name, "planner skipped CreateTable, no target fields");
                errors.push(e);
            }
        }
    }

    // Step 7: modify existing tables.
    for table_diff in &diff.tables_modified {
        let lower_one = |table: &str, target: &Database, column_name: &str| -> Result<Column, PlanError> {
            let mut col = lower_one_column(table, target, column_name)?;
            if let Some(enum_def) = target.enum_named(&col.sql_type) {
                col.sql_type = inline_enum_type(enum_def);
            }
            Ok(col)
        };
        let (mut table_nodes, mut table_errors) = plan_table_modifications(target, table_diff, lower_one);
        nodes.append(&mut table_nodes);
        errors.append(&mut table_errors);
    }

    // Step 8: RLS + policies — PostgreSQL only.

    // Step 9: add indexes.
    for name in &diff.indexes_added {
        if let Some(idx) = target.indexes.iter().find(|i| &i.name == name) {
            let mut node = Index::new(&idx.name, &idx.table, idx.columns.clone()).set_unique(idx.unique);
            if let Some(t) = &idx.index_type {
                node = node.with_type(t);
            }
            nodes.push(Node::Index(node));
        }
    }

    // Step 10: drop indexes. MySQL/MariaDB require `DROP INDEX ... ON
    // <table>`, so the table travels alongside the name in the diff key.
    for key in &diff.indexes_removed {
        let (table, name) = split_table_key(key);
        nodes.push(Node::DropIndex(crate::ir::DropIndex {
            name: name.to_string(),
            table: table.to_string(),
            if_exists: true,
            comment: None,
        }));
    }

    // Step 11: drop policies + disable RLS — PostgreSQL only.

    // Step 12: drop tables.
    for table in &diff.tables_removed {
        tracing::warn!(table = %table, "dropping table, data loss");
        nodes.push(Node::DropTable(DropTable {
            name: table.clone(),
            if_exists: true,
            cascade: false,
            comment: Some(format!("dropping {} — irreversible data loss", table)),
        }));
    }

    // Step 13: functions / roles / extensions — PostgreSQL only.

    // Step 14: epilogue warnings — enum removals.
    for name in &diff.enums_removed {
        nodes.push(Node::Comment(Comment::new(format!(
            "{} has no standalone enum type; removed enum {} had no type to drop",
            dialect, name
        ))));
    }

    (nodes, errors)
}

fn lower_columns_inlining_enums(fields: &[TargetField], target: &Database) -> (Vec<Column>, Vec<Constraint>) {
    let (mut columns, constraints) = lower_fields_with_constraints(fields);
    for col in &mut columns {
        if let Some(enum_def) = target.enum_named(&col.sql_type) {
            col.sql_type = inline_enum_type(enum_def);
        }
    }
    (columns, constraints)
}

fn inline_enum_type(enum_def: &crate::schema::TargetEnum) -> String {
    let values = enum_def
        .values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ");
    format!("ENUM({})", values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EmbedMode, TargetEnum};

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
    fn enum_addition_is_an_informational_comment_not_a_type() {
        let target = Database::new();
        let diff = SchemaDiff {
            enums_added: vec!["status".to_string()],
            ..Default::default()
        };
        let (nodes, _) = plan(&target, &diff, Dialect::Mysql);
        assert_eq!(nodes.len(), 1);
        assert!(matches!(&nodes[0], Node::Comment(c) if c.text.contains("no standalone enum type")));
    }

    #[test]
    fn new_table_inlines_enum_valued_columns() {
        let mut target = Database::new();
        target.enums.push(TargetEnum {
            name: "status".to_string(),
            values: vec!["active".to_string(), "inactive".to_string()],
        });
        target.tables.insert("User".to_string(), "users".to_string());
        target
            .fields
            .insert("User".to_string(), vec![field("status", "status")]);

        let diff = SchemaDiff {
            tables_added: vec!["users".to_string()],
            ..Default::default()
        };
        let (nodes, errors) = plan(&target, &diff, Dialect::Mysql);
        assert!(errors.is_empty());
        let Node::CreateTable(t) = &nodes[0] else { panic!("expected CreateTable") };
        assert_eq!(t.columns[0].sql_type, "ENUM('active', 'inactive')");
    }

    #[test]
    fn composite_primary_key_is_a_single_table_constraint_not_doubled_inline() {
        let mut target = Database::new();
        target.tables.insert("Membership".to_string(), "memberships".to_string());
        let mut user_id = field("user_id", "BIGINT");
        user_id.primary = true;
        let mut org_id = field("org_id", "BIGINT");
        org_id.primary = true;
        target.fields.insert("Membership".to_string(), vec![user_id, org_id]);

        let diff = SchemaDiff {
            tables_added: vec!["memberships".to_string()],
            ..Default::default()
        };
        let (nodes, _) = plan(&target, &diff, Dialect::Mysql);
        let Node::CreateTable(t) = &nodes[0] else { panic!("expected CreateTable") };
        assert_eq!(t.constraints.len(), 1);
        assert!(t.columns.iter().all(|c| !c.primary));
    }

    #[test]
    fn dropped_table_has_no_cascade_on_mysql() {
        let target = Database::new();
        let diff = SchemaDiff {
            tables_removed: vec!["legacy".to_string()],
            ..Default::default()
        };
        let (nodes, _) = plan(&target, &diff, Dialect::Mariadb);
        let Node::DropTable(d) = &nodes[0] else { panic!("expected DropTable") };
        assert!(!d.cascade);
    }

    #[test]
    fn enum_removal_emits_an_epilogue_comment_naming_the_dialect() {
        let target = Database::new();
        let diff = SchemaDiff {
            enums_removed: vec!["status".to_string()],
            ..Default::default()
        };
        let (nodes, _) = plan(&target, &diff, Dialect::Mariadb);
        assert!(matches!(&nodes[0], Node::Comment(c) if c.text.starts_with("mariadb")));
    }
}
