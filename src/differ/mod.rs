//! Computes a structural [`SchemaDiff`] between a target [`Database`] and
//! an observed [`DbSchema`] (§4.4). Pure and deterministic: every output
//! list is sorted by name, so repeated runs on the same inputs produce
//! identical diffs (§8 property 2).

pub mod compare_options;
pub mod normalize;
pub mod table;

pub use compare_options::CompareOptions;
pub use table::TableDiffer;

use std::collections::BTreeMap;

use crate::dialect::Dialect;
use crate::ir::{Constraint, ColumnChanges};
use crate::lowering::lower_fields_with_constraints;
use crate::schema::{Database, DbSchema, TargetIndex};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDiff {
    pub tables_added: Vec<String>,
    pub tables_removed: Vec<String>,
    pub tables_modified: Vec<TableDiff>,

    pub enums_added: Vec<String>,
    pub enums_removed: Vec<String>,
    pub enums_modified: Vec<EnumDiff>,

    pub indexes_added: Vec<String>,
    pub indexes_removed: Vec<String>,

    pub extensions_added: Vec<String>,
    pub extensions_removed: Vec<String>,

    pub functions_added: Vec<String>,
    pub functions_removed: Vec<String>,
    pub functions_modified: Vec<String>,

    pub policies_added: Vec<String>,
    pub policies_removed: Vec<String>,
    pub policies_modified: Vec<String>,

    pub rls_enabled: Vec<String>,
    pub rls_disabled: Vec<String>,

    pub roles_added: Vec<String>,
    pub roles_removed: Vec<String>,
    pub roles_modified: Vec<String>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self == &SchemaDiff::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDiff {
    pub table: String,
    pub columns_added: Vec<String>,
    pub columns_removed: Vec<String>,
    pub columns_modified: Vec<(String, ColumnChanges)>,
    pub constraints_added: Vec<Constraint>,
    pub constraints_removed: Vec<Constraint>,
}

impl TableDiff {
    fn is_empty(&self) -> bool {
        self.columns_added.is_empty()
            && self.columns_removed.is_empty()
            && self.columns_modified.is_empty()
            && self.constraints_added.is_empty()
            && self.constraints_removed.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumDiff {
    pub name: String,
    pub values_added: Vec<String>,
    pub values_removed: Vec<String>,
}

/// Computes the delta that would move `observed` to `target`, for
/// rendering/planning under `dialect`. Name-keyed identity throughout
/// (§4.4): renaming is never detected, only reported as a drop+add.
pub fn diff(target: &Database, observed: &DbSchema, dialect: Dialect, options: &CompareOptions) -> SchemaDiff {
    tracing::debug!(tables = target.tables.len(), enums = target.enums.len(), "starting schema diff");

    let mut result = SchemaDiff::default();

    let target_table_names: BTreeMap<String, String> = target.tables.values().map(|t| (t.clone(), t.clone())).collect();
    let observed_table_names: BTreeMap<String, String> =
        observed.tables.iter().map(|t| (t.name.clone(), t.name.clone())).collect();

    for name in target_table_names.keys() {
        if !observed_table_names.contains_key(name) {
            result.tables_added.push(name.clone());
        }
    }
    for name in observed_table_names.keys() {
        if !target_table_names.contains_key(name) {
            result.tables_removed.push(name.clone());
        }
    }
    result.tables_added.sort();
    result.tables_removed.sort();

    for name in target_table_names.keys() {
        let Some(observed_table) = observed.table(name) else { continue };
        let (next_columns, next_constraints) = target
            .fields_for_table(name)
            .map(lower_fields_with_constraints)
            .unwrap_or_default();

        let differ = TableDiffer {
            options,
            previous: observed_table,
            next_columns: &next_columns,
            next_constraints: &next_constraints,
        };

        let mut columns_added: Vec<String> = differ.added_columns().map(|c| c.name.clone()).collect();
        let mut columns_removed: Vec<String> = differ.dropped_columns().map(|c| c.name.clone()).collect();
        let mut columns_modified: Vec<(String, ColumnChanges)> = differ
            .column_pairs()
            .filter_map(|(previous, next)| table::column_changes(previous, next).map(|changes| (next.name.clone(), changes)))
            .collect();
        let mut constraints_added: Vec<Constraint> = differ.created_constraints().cloned().collect();
        let mut constraints_removed: Vec<Constraint> = differ.dropped_constraints().cloned().collect();

        columns_added.sort();
        columns_removed.sort();
        columns_modified.sort_by(|a, b| a.0.cmp(&b.0));
        constraints_added.sort_by(|a, b| constraint_sort_key(a).cmp(&constraint_sort_key(b)));
        constraints_removed.sort_by(|a, b| constraint_sort_key(a).cmp(&constraint_sort_key(b)));

        let table_diff = TableDiff {
            table: name.clone(),
            columns_added,
            columns_removed,
            columns_modified,
            constraints_added,
            constraints_removed,
        };
        if !table_diff.is_empty() {
            result.tables_modified.push(table_diff);
        }
    }
    result.tables_modified.sort_by(|a, b| a.table.cmp(&b.table));

    diff_enums(target, observed, &mut result);
    diff_indexes(target, observed, &mut result);
    diff_extensions(target, observed, options, &mut result);

    if dialect == Dialect::Postgres {
        diff_functions(target, observed, &mut result);
        diff_policies(target, observed, &mut result);
        diff_rls(target, observed, &mut result);
        diff_roles(target, observed, &mut result);
    }

    tracing::debug!(
        tables_added = result.tables_added.len(),
        tables_removed = result.tables_removed.len(),
        tables_modified = result.tables_modified.len(),
        "schema diff complete"
    );

    result
}

fn constraint_sort_key(c: &Constraint) -> String {
    c.name.clone().unwrap_or_else(|| c.columns.join(","))
}

fn diff_enums(target: &Database, observed: &DbSchema, result: &mut SchemaDiff) {
    for e in &target.enums {
        if !observed.enums.iter().any(|o| o.name == e.name) {
            result.enums_added.push(e.name.clone());
        }
    }
    for e in &observed.enums {
        if !target.enums.iter().any(|t| t.name == e.name) {
            result.enums_removed.push(e.name.clone());
        }
    }
    result.enums_added.sort();
    result.enums_removed.sort();

    for t in &target.enums {
        let Some(o) = observed.enums.iter().find(|o| o.name == t.name) else { continue };
        let values_added: Vec<String> = t.values.iter().filter(|v| !o.values.contains(v)).cloned().collect();
        let values_removed: Vec<String> = o.values.iter().filter(|v| !t.values.contains(v)).cloned().collect();
        if !values_added.is_empty() || !values_removed.is_empty() {
            result.enums_modified.push(EnumDiff {
                name: t.name.clone(),
                values_added,
                values_removed,
            });
        }
    }
    result.enums_modified.sort_by(|a, b| a.name.cmp(&b.name));
}

fn flatten_indexes(schema: &DbSchema) -> Vec<TargetIndex> {
    schema.tables.iter().flat_map(|t| t.indexes.clone()).collect()
}

fn index_content_matches(a: &TargetIndex, b: &TargetIndex) -> bool {
    a.name == b.name && a.columns == b.columns && a.unique == b.unique
}

/// `DROP INDEX ... ON <table>` is mandatory on MySQL/MariaDB, so a removed
/// index's diff entry carries its table alongside the name (mirrors
/// `policy_key`) rather than a bare name the planner would have no table
/// to recover.
fn index_key(table: &str, name: &str) -> String {
    format!("{}.{}", table, name)
}

fn diff_indexes(target: &Database, observed: &DbSchema, result: &mut SchemaDiff) {
    let observed_indexes = flatten_indexes(observed);

    for t in &target.indexes {
        if !observed_indexes.iter().any(|o| index_content_matches(o, t)) {
            result.indexes_added.push(t.name.clone());
        }
    }
    for o in &observed_indexes {
        if !target.indexes.iter().any(|t| index_content_matches(o, t)) {
            result.indexes_removed.push(index_key(&o.table, &o.name));
        }
    }
    result.indexes_added.sort();
    result.indexes_removed.sort();
}

fn diff_extensions(target: &Database, observed: &DbSchema, options: &CompareOptions, result: &mut SchemaDiff) {
    let target_names: Vec<String> = target.extensions.iter().map(|e| e.name.clone()).collect();
    let observed_names: Vec<String> = observed.extensions.iter().map(|e| e.name.clone()).collect();
    let target_names = options.filter_ignored_extensions(&target_names);
    let observed_names = options.filter_ignored_extensions(&observed_names);

    let mut added: Vec<String> = target_names.iter().filter(|n| !observed_names.contains(n)).cloned().collect();
    let mut removed: Vec<String> = observed_names.iter().filter(|n| !target_names.contains(n)).cloned().collect();
    added.sort();
    removed.sort();
    result.extensions_added = added;
    result.extensions_removed = removed;
}

fn diff_functions(target: &Database, observed: &DbSchema, result: &mut SchemaDiff) {
    for f in &target.functions {
        match observed.functions.iter().find(|o| o.name == f.name) {
            None => result.functions_added.push(f.name.clone()),
            Some(o) if o != f => result.functions_modified.push(f.name.clone()),
            Some(_) => {}
        }
    }
    for f in &observed.functions {
        if !target.functions.iter().any(|t| t.name == f.name) {
            result.functions_removed.push(f.name.clone());
        }
    }
    result.functions_added.sort();
    result.functions_removed.sort();
    result.functions_modified.sort();
}

/// Policies are scoped to a table, so `table.name` (not the bare policy
/// name) is the key carried in the diff — two tables may each have a
/// policy named the same way, and `DROP POLICY` needs the table regardless.
fn policy_key(table: &str, name: &str) -> String {
    format!("{}.{}", table, name)
}

fn diff_policies(target: &Database, observed: &DbSchema, result: &mut SchemaDiff) {
    for p in &target.policies {
        match observed.policies.iter().find(|o| o.name == p.name && o.table == p.table) {
            None => result.policies_added.push(policy_key(&p.table, &p.name)),
            Some(o) if o != p => result.policies_modified.push(policy_key(&p.table, &p.name)),
            Some(_) => {}
        }
    }
    for p in &observed.policies {
        if !target.policies.iter().any(|t| t.name == p.name && t.table == p.table) {
            result.policies_removed.push(policy_key(&p.table, &p.name));
        }
    }
    result.policies_added.sort();
    result.policies_removed.sort();
    result.policies_modified.sort();
}

fn diff_rls(target: &Database, observed: &DbSchema, result: &mut SchemaDiff) {
    let observed_rls: Vec<String> = observed
        .tables
        .iter()
        .filter(|t| t.rls_enabled)
        .map(|t| t.name.clone())
        .collect();

    result.rls_enabled = target
        .rls_tables
        .iter()
        .filter(|t| !observed_rls.contains(t))
        .cloned()
        .collect();
    result.rls_disabled = observed_rls.iter().filter(|t| !target.rls_tables.contains(t)).cloned().collect();
    result.rls_enabled.sort();
    result.rls_disabled.sort();
}

fn diff_roles(target: &Database, observed: &DbSchema, result: &mut SchemaDiff) {
    for r in &target.roles {
        match observed.roles.iter().find(|o| o.name == r.name) {
            None => result.roles_added.push(r.name.clone()),
            Some(o) if o != r => result.roles_modified.push(r.name.clone()),
            Some(_) => {}
        }
    }
    for r in &observed.roles {
        if !target.roles.iter().any(|t| t.name == r.name) {
            result.roles_removed.push(r.name.clone());
        }
    }
    result.roles_added.sort();
    result.roles_removed.sort();
    result.roles_modified.sort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ForeignKeyRef;
    use crate::schema::{EmbedMode, ObservedColumn, ObservedTable, TargetEnum, TargetField};

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
    fn renaming_a_table_is_drop_plus_add_never_a_modification() {
        let mut target = Database::new();
        target.tables.insert("User".to_string(), "accounts".to_string());
        target.fields.insert("User".to_string(), vec![field("id", "INT")]);

        let observed = DbSchema {
            tables: vec![ObservedTable {
                name: "users".to_string(),
                columns: vec![ObservedColumn {
                    name: "id".to_string(),
                    sql_type: "INT".to_string(),
                    nullable: true,
                    default: None,
                    primary: false,
                    auto_increment: false,
                    unique: false,
                    foreign_key: None,
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        let result = diff(&target, &observed, Dialect::Postgres, &CompareOptions::default());
        assert_eq!(result.tables_added, vec!["accounts".to_string()]);
        assert_eq!(result.tables_removed, vec!["users".to_string()]);
        assert!(result.tables_modified.is_empty());
    }

    #[test]
    fn ignored_extensions_never_appear_in_either_direction() {
        let mut target = Database::new();
        target.extensions.push(crate::schema::TargetExtension {
            name: "plpgsql".to_string(),
            version: None,
        });
        let observed = DbSchema::default();
        let result = diff(&target, &observed, Dialect::Postgres, &CompareOptions::default());
        assert!(result.extensions_added.is_empty());
        assert!(result.extensions_removed.is_empty());
    }

    #[test]
    fn enum_value_reorder_without_set_change_is_not_a_diff() {
        let mut target = Database::new();
        target.enums.push(TargetEnum {
            name: "status".to_string(),
            values: vec!["b".to_string(), "a".to_string()],
        });
        let observed = DbSchema {
            enums: vec![TargetEnum {
                name: "status".to_string(),
                values: vec!["a".to_string(), "b".to_string()],
            }],
            ..Default::default()
        };
        let result = diff(&target, &observed, Dialect::Postgres, &CompareOptions::default());
        assert!(result.enums_modified.is_empty());
    }

    #[test]
    fn mysql_dialect_never_diffs_postgres_only_entities() {
        let mut target = Database::new();
        target.roles.push(crate::schema::TargetRole {
            name: "app".to_string(),
            login: true,
            superuser: false,
            createdb: false,
            createrole: false,
            inherit: true,
            replication: false,
            password: None,
        });
        let result = diff(&target, &DbSchema::default(), Dialect::Mysql, &CompareOptions::default());
        assert!(result.roles_added.is_empty());
    }

    #[test]
    fn a_converged_composite_primary_key_table_diffs_to_nothing() {
        let mut target = Database::new();
        target.tables.insert("Membership".to_string(), "memberships".to_string());
        let mut user_id = field("user_id", "BIGINT");
        user_id.primary = true;
        let mut org_id = field("org_id", "BIGINT");
        org_id.primary = true;
        target.fields.insert("Membership".to_string(), vec![user_id, org_id]);

        let observed = DbSchema {
            tables: vec![ObservedTable {
                name: "memberships".to_string(),
                columns: vec![
                    ObservedColumn {
                        name: "user_id".to_string(),
                        sql_type: "BIGINT".to_string(),
                        nullable: true,
                        default: None,
                        primary: false,
                        auto_increment: false,
                        unique: false,
                        foreign_key: None,
                    },
                    ObservedColumn {
                        name: "org_id".to_string(),
                        sql_type: "BIGINT".to_string(),
                        nullable: true,
                        default: None,
                        primary: false,
                        auto_increment: false,
                        unique: false,
                        foreign_key: None,
                    },
                ],
                constraints: vec![crate::ir::Constraint::primary_key(vec![
                    "user_id".to_string(),
                    "org_id".to_string(),
                ])],
                ..Default::default()
            }],
            ..Default::default()
        };

        let result = diff(&target, &observed, Dialect::Postgres, &CompareOptions::default());
        assert!(result.tables_modified.is_empty());
    }

    #[test]
    fn foreign_key_change_is_reported_under_its_own_kind() {
        let mut target = Database::new();
        target.tables.insert("Post".to_string(), "posts".to_string());
        let mut f = field("author_id", "BIGINT");
        f.foreign_key = Some(ForeignKeyRef::new("users", "id"));
        target.fields.insert("Post".to_string(), vec![f]);

        let observed = DbSchema {
            tables: vec![ObservedTable {
                name: "posts".to_string(),
                columns: vec![ObservedColumn {
                    name: "author_id".to_string(),
                    sql_type: "BIGINT".to_string(),
                    nullable: true,
                    default: None,
                    primary: false,
                    auto_increment: false,
                    unique: false,
                    foreign_key: None,
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        let result = diff(&target, &observed, Dialect::Postgres, &CompareOptions::default());
        assert_eq!(result.tables_modified.len(), 1);
        let (_, changes) = &result.tables_modified[0].columns_modified[0];
        assert!(changes.contains_key(&crate::ir::ColumnChangeKind::ForeignKey));
    }
}
