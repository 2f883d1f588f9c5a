//! The PostgreSQL planner: all fourteen emission steps of §4.5 apply,
//! since every entity kind in the IR has a PostgreSQL counterpart.

use crate::differ::SchemaDiff;
use crate::ir::{
    AlterTableDisableRls, AlterTableEnableRls, CreatePolicy, CreateRole, CreateTable, DropExtension, DropFunction,
    DropPolicy, DropRole, DropTable, Enum, Extension, Index, Node,
};
use crate::lowering::lower_fields_with_constraints;
use crate::schema::Database;

use super::{lower_one_column, plan_table_modifications, split_table_key, PlanError};

pub(super) fn plan(target: &Database, diff: &SchemaDiff) -> (Vec<Node>, Vec<PlanError>) {
    let mut nodes = Vec::new();
    let mut errors = Vec::new();

    // Step 1: PostgreSQL has standalone enum types, so there is nothing to
    // warn about here; the step is a no-op for this dialect.

    // Step 2: create new extensions.
    for name in &diff.extensions_added {
        if let Some(ext) = target.extensions.iter().find(|e| &e.name == name) {
            let mut node = Extension::new(&ext.name);
            node.version = ext.version.clone();
            nodes.push(Node::Extension(node));
        }
    }

    // Step 3: create new enum types.
    for name in &diff.enums_added {
        if let Some(e) = target.enum_named(name) {
            nodes.push(Node::Enum(Enum::new(&e.name, e.values.clone())));
        }
    }

    // Step 4: create new functions.
    for name in &diff.functions_added {
        if let Some(f) = target.functions.iter().find(|f| &f.name == name) {
            let mut node = crate::ir::CreateFunction::new(&f.name, &f.parameters, &f.returns, &f.language, &f.body);
            node.security = f.security;
            node.volatility = f.volatility;
            nodes.push(Node::CreateFunction(node));
        }
    }

    // Step 5: create new roles.
    for name in &diff.roles_added {
        if let Some(r) = target.roles.iter().find(|r| &r.name == name) {
            nodes.push(Node::CreateRole(CreateRole {
                name: r.name.clone(),
                login: r.login,
                superuser: r.superuser,
                createdb: r.createdb,
                createrole: r.createrole,
                inherit: r.inherit,
                replication: r.replication,
                password: r.password.clone(),
                comment: None,
            }));
        }
    }

    // Step 6: create new tables, target-driven.
    for table_name in &diff.tables_added {
        match target.fields_for_table(table_name) {
            Some(fields) => {
                let (columns, constraints) = lower_fields_with_constraints(fields);
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
        let (mut table_nodes, mut table_errors) = plan_table_modifications(target, table_diff, lower_one_column);
        nodes.append(&mut table_nodes);
        errors.append(&mut table_errors);
    }

    // Step 8: enable RLS + create policies.
    for table in &diff.rls_enabled {
        tracing::warn!(table = %table, "enabling row-level security");
        nodes.push(Node::EnableRls(AlterTableEnableRls {
            table: table.clone(),
            comment: None,
        }));
    }
    for key in &diff.policies_added {
        let (table, name) = split_table_key(key);
        if let Some(p) = target.policies.iter().find(|p| p.table == table && p.name == name) {
            nodes.push(Node::CreatePolicy(CreatePolicy {
                name: p.name.clone(),
                table: p.table.clone(),
                for_clause: p.for_clause.clone(),
                to_roles: p.to_roles.clone(),
                using_expr: p.using_expr.clone(),
                with_check_expr: p.with_check_expr.clone(),
                comment: None,
            }));
        }
    }

    // Step 9: add indexes, looked up in the target by name.
    for name in &diff.indexes_added {
        if let Some(idx) = target.indexes.iter().find(|i| &i.name == name) {
            let mut node = Index::new(&idx.name, &idx.table, idx.columns.clone()).set_unique(idx.unique);
            if let Some(t) = &idx.index_type {
                node = node.with_type(t);
            }
            if let Some(c) = &idx.condition {
                node = node.with_condition(c);
            }
            if let Some(o) = &idx.operator_class {
                node = node.with_operator_class(o);
            }
            nodes.push(Node::Index(node));
        }
    }

    // Step 10: drop indexes.
    for key in &diff.indexes_removed {
        let (table, name) = split_table_key(key);
        nodes.push(Node::DropIndex(crate::ir::DropIndex {
            name: name.to_string(),
            table: table.to_string(),
            if_exists: true,
            comment: None,
        }));
    }

    // Step 11: drop policies + disable RLS.
    for key in &diff.policies_removed {
        let (table, name) = split_table_key(key);
        nodes.push(Node::DropPolicy(DropPolicy {
            name: name.to_string(),
            table: table.to_string(),
            comment: None,
        }));
    }
    for table in &diff.rls_disabled {
        nodes.push(Node::DisableRls(AlterTableDisableRls {
            table: table.clone(),
            comment: None,
        }));
    }

    // Step 12: drop tables.
    for table in &diff.tables_removed {
        tracing::warn!(table = %table, "dropping table, data loss");
        nodes.push(Node::DropTable(DropTable {
            name: table.clone(),
            if_exists: true,
            cascade: true,
            comment: Some(format!("dropping {} — irreversible data loss", table)),
        }));
    }

    // Step 13: drop functions / roles / extensions.
    for name in &diff.functions_removed {
        nodes.push(Node::DropFunction(DropFunction {
            name: name.clone(),
            if_exists: true,
            comment: Some(format!("dropping function {}", name)),
        }));
    }
    for name in &diff.roles_removed {
        nodes.push(Node::DropRole(DropRole {
            name: name.clone(),
            if_exists: true,
            comment: Some(format!("dropping role {}", name)),
        }));
    }
    for name in &diff.extensions_removed {
        nodes.push(Node::DropExtension(DropExtension {
            name: name.clone(),
            if_exists: true,
            comment: Some(format!("dropping extension {}", name)),
        }));
    }

    // Step 14: PostgreSQL epilogue warnings — none beyond what step 1 covers.

    (nodes, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::TableDiff;
    use crate::render::SqlRenderer;
    use crate::schema::{EmbedMode, TargetEnum, TargetExtension, TargetField};

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
    fn creates_extension_then_table_in_emission_order() {
        let mut target = Database::new();
        target.extensions.push(TargetExtension {
            name: "citext".to_string(),
            version: None,
        });
        target.tables.insert("User".to_string(), "users".to_string());
        target.fields.insert("User".to_string(), vec![field("id", "BIGINT")]);

        let diff = SchemaDiff {
            extensions_added: vec!["citext".to_string()],
            tables_added: vec!["users".to_string()],
            ..Default::default()
        };

        let (nodes, errors) = plan(&target, &diff);
        assert!(errors.is_empty());
        assert!(matches!(nodes[0], Node::Extension(_)));
        assert!(matches!(nodes[1], Node::CreateTable(_)));
    }

    #[test]
    fn composite_primary_key_becomes_a_table_constraint() {
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
        let (nodes, _) = plan(&target, &diff);
        let Node::CreateTable(t) = &nodes[0] else { panic!("expected CreateTable") };
        assert_eq!(t.constraints.len(), 1);
        assert_eq!(t.constraints[0].columns, vec!["user_id".to_string(), "org_id".to_string()]);
        assert!(t.columns.iter().all(|c| !c.primary), "member columns must not also carry an inline PRIMARY KEY");

        let rendered = crate::render::PostgresRenderer.render_create_table(t).unwrap();
        assert_eq!(rendered.matches("PRIMARY KEY").count(), 1, "exactly one PRIMARY KEY declaration: {}", rendered);
    }

    #[test]
    fn missing_target_fields_degrades_to_an_error_comment_not_a_panic() {
        let mut target = Database::new();
        target.tables.insert("Orphan".to_string(), "orphans".to_string());
        let diff = SchemaDiff {
            tables_added: vec!["orphans".to_string()],
            ..Default::default()
        };
        let (nodes, errors) = plan(&target, &diff);
        assert_eq!(errors.len(), 1);
        assert!(matches!(&nodes[0], Node::Comment(c) if c.text.starts_with("ERROR")));
    }

    #[test]
    fn enum_addition_emits_before_table_creation() {
        let mut target = Database::new();
        target.enums.push(TargetEnum {
            name: "status".to_string(),
            values: vec!["active".to_string(), "inactive".to_string()],
        });
        let diff = SchemaDiff {
            enums_added: vec!["status".to_string()],
            ..Default::default()
        };
        let (nodes, _) = plan(&target, &diff);
        assert!(matches!(nodes[0], Node::Enum(_)));
    }

    #[test]
    fn table_drop_carries_cascade_and_a_hazard_comment() {
        let target = Database::new();
        let diff = SchemaDiff {
            tables_removed: vec!["legacy".to_string()],
            ..Default::default()
        };
        let (nodes, _) = plan(&target, &diff);
        let Node::DropTable(d) = &nodes[0] else { panic!("expected DropTable") };
        assert!(d.cascade);
        assert!(d.comment.as_ref().unwrap().contains("data loss"));
    }

    #[test]
    fn modified_table_emits_header_comment_then_alter_statements() {
        let mut target = Database::new();
        target.tables.insert("User".to_string(), "users".to_string());
        target.fields.insert("User".to_string(), vec![field("email", "TEXT")]);

        let table_diff = TableDiff {
            table: "users".to_string(),
            columns_added: vec!["email".to_string()],
            ..Default::default()
        };
        let diff = SchemaDiff {
            tables_modified: vec![table_diff],
            ..Default::default()
        };
        let (nodes, errors) = plan(&target, &diff);
        assert!(errors.is_empty());
        assert!(matches!(&nodes[0], Node::Comment(c) if c.text.contains("modifying table users")));
        assert!(matches!(nodes[1], Node::AlterTable(_)));
    }
}
