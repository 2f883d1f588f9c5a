//! The literal end-to-end scenarios of spec §8, run through the public
//! parse/render/plan surface rather than against internal helpers,
//! matching the teacher's `migration-engine-tests/tests/migrations/*.rs`
//! style of one file per concern with descriptive `#[test]` names.

use pretty_assertions::assert_eq;

use ptah::dialect::Dialect;
use ptah::ir::{Constraint, ExcludeConstraint, Index};
use ptah::render::renderer_for;

#[test]
fn scenario_a_parse_render_round_trip_on_postgres() {
    let ddl = "CREATE TABLE users (id SERIAL PRIMARY KEY, email VARCHAR(255) NOT NULL UNIQUE);";
    let parsed = ptah::parse(ddl).expect("scenario A input must parse");
    let Some(ptah::Node::CreateTable(table)) = parsed.iter().next() else {
        panic!("expected a single CreateTable");
    };
    assert_eq!(table.columns[0].name, "id");
    assert!(table.columns[0].primary);
    assert!(!table.columns[0].nullable);
    assert_eq!(table.columns[1].name, "email");
    assert!(!table.columns[1].nullable);
    assert!(table.columns[1].unique);

    let renderer = renderer_for(Dialect::Postgres);
    let rendered = renderer.render_create_table(table).unwrap();
    assert!(rendered.contains("id SERIAL PRIMARY KEY NOT NULL"));
    assert!(rendered.contains("email VARCHAR(255) NOT NULL UNIQUE"));
}

#[test]
fn scenario_b_partial_index_renders_a_where_clause() {
    let idx = Index::new("idx_active_users", "users", vec!["status".to_string()]).with_condition("deleted_at IS NULL");
    let renderer = renderer_for(Dialect::Postgres);
    let rendered = renderer.render_index(&idx).unwrap();
    assert_eq!(rendered, "CREATE INDEX idx_active_users ON users (status) WHERE deleted_at IS NULL;\n");
}

#[test]
fn scenario_c_trigram_gin_index() {
    let idx = Index::new("idx_users_name_trgm", "users", vec!["name".to_string()])
        .with_type("GIN")
        .with_operator_class("gin_trgm_ops");
    let renderer = renderer_for(Dialect::Postgres);
    let rendered = renderer.render_index(&idx).unwrap();
    assert_eq!(rendered, "CREATE INDEX idx_users_name_trgm ON users USING GIN (name gin_trgm_ops);\n");
}

#[test]
fn scenario_d_mysql_planner_warns_about_inline_enums() {
    use ptah::differ::SchemaDiff;
    use ptah::planner::plan;
    use ptah::schema::Database;

    let mut target = Database::new();
    target.enums.push(ptah::schema::TargetEnum {
        name: "user_status".to_string(),
        values: vec!["active".to_string(), "inactive".to_string()],
    });
    let diff = SchemaDiff {
        enums_added: vec!["user_status".to_string()],
        ..Default::default()
    };
    let nodes = plan(&target, &diff, Dialect::Mysql);
    assert_eq!(nodes.len(), 1);
    let ptah::Node::Comment(c) = &nodes[0] else { panic!("expected a Comment node") };
    assert!(c.text.contains("inline"));
}

#[test]
fn scenario_e_connection_string_strips_pool_params() {
    let input = "postgres://u:p@h:5432/db?sslmode=disable&pool_max_conns=20&timeout=30&pool_min_conns=5&application_name=myapp";
    let expected = "postgres://u:p@h:5432/db?application_name=myapp&sslmode=disable&timeout=30";
    assert_eq!(ptah::url::strip_pool_params(input), expected);
}

#[test]
fn scenario_f_exclude_constraint_renders_exactly() {
    use ptah::ir::{Column, CreateTable};

    let table = CreateTable::new(
        "user_sessions",
        vec![
            Column::new("user_id", "BIGINT").set_nullable(false),
            Column::new("is_active", "BOOLEAN").set_nullable(false),
        ],
    )
    .with_constraints(vec![Constraint::exclude(
        Some("one_active_session_per_user".to_string()),
        ExcludeConstraint {
            using_method: "gist".to_string(),
            elements: "user_id WITH =".to_string(),
            where_clause: Some("is_active = true".to_string()),
        },
    )]);

    let renderer = renderer_for(Dialect::Postgres);
    let rendered = renderer.render_create_table(&table).unwrap();
    assert!(rendered
        .lines()
        .any(|l| l.trim() == "CONSTRAINT one_active_session_per_user EXCLUDE USING gist (user_id WITH =) WHERE (is_active = true)"));
}
