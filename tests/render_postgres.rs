//! PostgreSQL-specific rendering behavior exercised through the public
//! `SqlRenderer` surface: banners, policies, roles, RLS.

use pretty_assertions::assert_eq;

use ptah::dialect::Dialect;
use ptah::ir::{AlterTableEnableRls, Column, CreatePolicy, CreateRole, CreateTable};
use ptah::render::renderer_for;

#[test]
fn create_table_carries_the_postgres_banner() {
    let table = CreateTable::new("users", vec![Column::new("id", "SERIAL").set_primary()]);
    let renderer = renderer_for(Dialect::Postgres);
    let rendered = renderer.render_create_table(&table).unwrap();
    assert!(rendered.starts_with("-- POSTGRES TABLE: users --\n"));
}

#[test]
fn role_flags_render_in_a_fixed_order_regardless_of_which_are_set() {
    let role = CreateRole {
        name: "app".to_string(),
        login: true,
        superuser: false,
        createdb: true,
        createrole: false,
        inherit: true,
        replication: false,
        password: None,
        comment: None,
    };
    let renderer = renderer_for(Dialect::Postgres);
    let rendered = renderer.render_create_role(&role);
    let login_pos = rendered.find("LOGIN").unwrap();
    let createdb_pos = rendered.find("CREATEDB").unwrap();
    let inherit_pos = rendered.find("INHERIT").unwrap();
    assert!(login_pos < createdb_pos);
    assert!(createdb_pos < inherit_pos);
}

#[test]
fn policy_renders_using_and_with_check_clauses() {
    let mut policy = CreatePolicy::new("own_rows_only", "documents", "SELECT");
    policy.to_roles = vec!["app".to_string()];
    policy.using_expr = Some("owner_id = current_user_id()".to_string());
    let renderer = renderer_for(Dialect::Postgres);
    let rendered = renderer.render_create_policy(&policy);
    assert!(rendered.contains("CREATE POLICY own_rows_only ON documents"));
    assert!(rendered.contains("FOR SELECT"));
    assert!(rendered.contains("USING (owner_id = current_user_id())"));
}

#[test]
fn enable_rls_emits_alter_table_enable_row_level_security() {
    let renderer = renderer_for(Dialect::Postgres);
    let rendered = renderer.render_enable_rls(&AlterTableEnableRls {
        table: "documents".to_string(),
        comment: None,
    });
    assert_eq!(rendered, "ALTER TABLE documents ENABLE ROW LEVEL SECURITY;\n");
}
