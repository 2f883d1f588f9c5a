use itertools::Itertools;

use super::{identifier_needs_quoting, render_column_common, render_foreign_key_ref, SqlRenderer};
use crate::dialect::Dialect;
use crate::error::{PtahError, RenderError};
use crate::ir::{
    AlterTable, AlterTableDisableRls, AlterTableEnableRls, AlterTableOperation, AlterType, AlterTypeOperation, Column,
    ColumnDefault, Constraint, ConstraintKind, CreateFunction, CreatePolicy, CreateRole, CreateTable, CreateType,
    DropExtension, DropFunction, DropPolicy, DropRole, Enum, Extension, FunctionSecurity, FunctionVolatility, Index,
    TypeDefinition,
};

/// The PostgreSQL renderer. Stateless; every method is a pure function of
/// its argument node.
pub struct PostgresRenderer;

impl PostgresRenderer {
    fn render_constraint(&self, c: &Constraint) -> Result<String, PtahError> {
        if !c.is_well_formed() {
            return Err(RenderError::new("Constraint", format!("{:?}", c.kind), "missing required fields for this constraint kind").into());
        }
        let name_prefix = c
            .name
            .as_ref()
            .map(|n| format!("CONSTRAINT {} ", self.quote(n)))
            .unwrap_or_default();
        let body = match c.kind {
            ConstraintKind::PrimaryKey => format!("PRIMARY KEY ({})", self.column_list(&c.columns)),
            ConstraintKind::Unique => format!("UNIQUE ({})", self.column_list(&c.columns)),
            ConstraintKind::ForeignKey => {
                let fk = c.foreign_key.as_ref().expect("checked by is_well_formed");
                format!(
                    "FOREIGN KEY ({}) {}",
                    self.column_list(&c.columns),
                    render_foreign_key_ref(|n| self.quote(n), fk)
                )
            }
            ConstraintKind::Check => format!("CHECK ({})", c.check.as_ref().expect("checked by is_well_formed")),
            ConstraintKind::Exclude => {
                let ex = c.exclude.as_ref().expect("checked by is_well_formed");
                let mut s = format!("EXCLUDE USING {} ({})", ex.using_method, ex.elements);
                if let Some(w) = &ex.where_clause {
                    s.push_str(&format!(" WHERE ({})", w));
                }
                s
            }
        };
        Ok(format!("{}{}", name_prefix, body))
    }

    fn column_list(&self, columns: &[String]) -> String {
        columns.iter().map(|c| self.quote(c)).join(", ")
    }
}

impl SqlRenderer for PostgresRenderer {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn quote(&self, name: &str) -> String {
        if identifier_needs_quoting(name) {
            format!("\"{}\"", name.replace('"', "\"\""))
        } else {
            name.to_string()
        }
    }

    fn render_create_table(&self, t: &CreateTable) -> Result<String, PtahError> {
        let mut out = format!("-- POSTGRES TABLE: {} --\n", t.name);
        out.push_str(&self.comment_line(&t.comment));
        out.push_str(&format!("CREATE TABLE {} (\n", self.quote(&t.name)));

        let mut elements = Vec::new();
        for c in &t.columns {
            elements.push(format!("    {}", self.render_column(c)?));
        }
        for constraint in &t.constraints {
            elements.push(format!("    {}", self.render_constraint(constraint)?));
        }
        out.push_str(&elements.join(",\n"));
        out.push_str("\n)");

        if !t.options.is_empty() {
            let kvs = t.options.iter().map(|(k, v)| format!("{} = {}", k, v)).join(", ");
            out.push_str(&format!(" WITH ({})", kvs));
        }
        out.push_str(";\n\n");
        Ok(out)
    }

    fn render_column(&self, c: &Column) -> Result<String, PtahError> {
        if c.sql_type.is_empty() {
            return Err(RenderError::new("Column", "sql_type", "column type must not be empty").into());
        }
        Ok(render_column_common(|n| self.quote(n), c))
    }

    fn render_alter_table(&self, t: &AlterTable) -> Result<String, PtahError> {
        let mut lines = Vec::new();
        for op in &t.operations {
            match op {
                AlterTableOperation::AddColumn(c) => lines.push(format!("ADD COLUMN {}", self.render_column(c)?)),
                AlterTableOperation::DropColumn(name) => lines.push(format!("DROP COLUMN {}", self.quote(name))),
                AlterTableOperation::ModifyColumn(c) => {
                    lines.push(format!("ALTER COLUMN {} TYPE {}", self.quote(&c.name), c.sql_type));
                    lines.push(format!(
                        "ALTER COLUMN {} {}",
                        self.quote(&c.name),
                        if c.nullable { "DROP NOT NULL" } else { "SET NOT NULL" }
                    ));
                    match &c.default {
                        Some(ColumnDefault::Literal(v)) | Some(ColumnDefault::Expression(v)) => {
                            lines.push(format!("ALTER COLUMN {} SET DEFAULT {}", self.quote(&c.name), v))
                        }
                        None => lines.push(format!("ALTER COLUMN {} DROP DEFAULT", self.quote(&c.name))),
                    }
                }
            }
        }
        if lines.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(
            "ALTER TABLE {}\n    {};\n",
            self.quote(&t.table),
            lines.join(",\n    ")
        ))
    }

    fn render_index(&self, i: &Index) -> Result<String, PtahError> {
        let mut out = self.comment_line(&i.comment);
        out.push_str("CREATE ");
        if i.unique {
            out.push_str("UNIQUE ");
        }
        out.push_str("INDEX ");
        if i.if_not_exists {
            out.push_str("IF NOT EXISTS ");
        }
        out.push_str(&format!("{} ON {} ", i.name, i.table));
        if let Some(t) = &i.index_type {
            if !t.eq_ignore_ascii_case("btree") {
                out.push_str(&format!("USING {} ", t));
            }
        }
        let cols = i
            .columns
            .iter()
            .map(|c| match &i.operator_class {
                Some(opclass) => format!("{} {}", c, opclass),
                None => c.clone(),
            })
            .join(", ");
        out.push_str(&format!("({})", cols));
        if let Some(cond) = &i.condition {
            out.push_str(&format!(" WHERE {}", cond));
        }
        out.push_str(";\n");
        Ok(out)
    }

    fn render_enum(&self, e: &Enum) -> String {
        format!("CREATE TYPE {} AS ENUM ({});\n", self.quote(&e.name), quoted_values(&e.values))
    }

    fn render_create_type(&self, t: &CreateType) -> Result<String, PtahError> {
        let body = match &t.definition {
            TypeDefinition::Enum(values) => format!("AS ENUM ({})", quoted_values(values)),
            TypeDefinition::Composite(fields) => {
                let fs = fields.iter().map(|(n, ty)| format!("{} {}", n, ty)).join(", ");
                format!("AS ({})", fs)
            }
            TypeDefinition::Domain { base_type, checks } => {
                let mut s = format!("AS {}", base_type);
                for c in checks {
                    s.push_str(&format!(" CHECK ({})", c));
                }
                s
            }
            TypeDefinition::Range { subtype } => format!("AS RANGE (SUBTYPE = {})", subtype),
        };
        Ok(format!("CREATE TYPE {} {};\n", self.quote(&t.name), body))
    }

    fn render_alter_type(&self, t: &AlterType) -> String {
        let mut out = String::new();
        for op in &t.operations {
            match op {
                AlterTypeOperation::AddValue(v) => out.push_str(&format!(
                    "ALTER TYPE {} ADD VALUE '{}';\n",
                    self.quote(&t.name),
                    v.replace('\'', "''")
                )),
                AlterTypeOperation::RenameValue { from, to } => out.push_str(&format!(
                    "ALTER TYPE {} RENAME VALUE '{}' TO '{}';\n",
                    self.quote(&t.name),
                    from.replace('\'', "''"),
                    to.replace('\'', "''")
                )),
            }
        }
        out
    }

    fn render_extension(&self, e: &Extension) -> String {
        let mut out = self.comment_line(&e.comment);
        out.push_str("CREATE EXTENSION ");
        if e.if_not_exists {
            out.push_str("IF NOT EXISTS ");
        }
        out.push_str(&self.quote(&e.name));
        if let Some(v) = &e.version {
            out.push_str(&format!(" VERSION '{}'", v));
        }
        out.push_str(";\n");
        out
    }

    fn render_drop_extension(&self, e: &DropExtension) -> String {
        let exists = if e.if_exists { "IF EXISTS " } else { "" };
        format!(
            "{}DROP EXTENSION {}{};\n",
            self.comment_line(&e.comment),
            exists,
            self.quote(&e.name)
        )
    }

    fn render_create_function(&self, f: &CreateFunction) -> String {
        let mut out = self.comment_line(&f.comment);
        out.push_str(&format!(
            "CREATE OR REPLACE FUNCTION {}({}) RETURNS {} AS $$ {} $$ LANGUAGE {}",
            self.quote(&f.name),
            f.parameters,
            f.returns,
            f.body,
            f.language
        ));
        if let Some(sec) = f.security {
            out.push_str(match sec {
                FunctionSecurity::Definer => " SECURITY DEFINER",
                FunctionSecurity::Invoker => " SECURITY INVOKER",
            });
        }
        if let Some(vol) = f.volatility {
            out.push_str(match vol {
                FunctionVolatility::Stable => " STABLE",
                FunctionVolatility::Immutable => " IMMUTABLE",
                FunctionVolatility::Volatile => " VOLATILE",
            });
        }
        out.push_str(";\n");
        out
    }

    fn render_drop_function(&self, f: &DropFunction) -> String {
        let exists = if f.if_exists { "IF EXISTS " } else { "" };
        format!(
            "{}DROP FUNCTION {}{};\n",
            self.comment_line(&f.comment),
            exists,
            self.quote(&f.name)
        )
    }

    fn render_create_policy(&self, p: &CreatePolicy) -> String {
        let mut out = self.comment_line(&p.comment);
        out.push_str(&format!("CREATE POLICY {} ON {}\n", self.quote(&p.name), self.quote(&p.table)));
        out.push_str(&format!("    FOR {}\n", p.for_clause));
        if !p.to_roles.is_empty() {
            out.push_str(&format!("    TO {}\n", p.to_roles.join(", ")));
        }
        if let Some(u) = &p.using_expr {
            out.push_str(&format!("    USING ({})\n", u));
        }
        if let Some(w) = &p.with_check_expr {
            out.push_str(&format!("    WITH CHECK ({})\n", w));
        }
        out.push_str(";\n");
        out
    }

    fn render_drop_policy(&self, p: &DropPolicy) -> String {
        format!(
            "{}DROP POLICY {} ON {};\n",
            self.comment_line(&p.comment),
            self.quote(&p.name),
            self.quote(&p.table)
        )
    }

    fn render_enable_rls(&self, r: &AlterTableEnableRls) -> String {
        format!(
            "{}ALTER TABLE {} ENABLE ROW LEVEL SECURITY;\n",
            self.comment_line(&r.comment),
            self.quote(&r.table)
        )
    }

    fn render_disable_rls(&self, r: &AlterTableDisableRls) -> String {
        format!(
            "{}ALTER TABLE {} DISABLE ROW LEVEL SECURITY;\n",
            self.comment_line(&r.comment),
            self.quote(&r.table)
        )
    }

    fn render_create_role(&self, r: &CreateRole) -> String {
        let flags = [
            if r.login { "LOGIN" } else { "NOLOGIN" },
            if r.superuser { "SUPERUSER" } else { "NOSUPERUSER" },
            if r.createdb { "CREATEDB" } else { "NOCREATEDB" },
            if r.createrole { "CREATEROLE" } else { "NOCREATEROLE" },
            if r.inherit { "INHERIT" } else { "NOINHERIT" },
            if r.replication { "REPLICATION" } else { "NOREPLICATION" },
        ];
        let mut out = self.comment_line(&r.comment);
        out.push_str(&format!("CREATE ROLE {} WITH {}", self.quote(&r.name), flags.join(" ")));
        if let Some(pw) = &r.password {
            out.push_str(&format!(" PASSWORD '{}'", pw.replace('\'', "''")));
        }
        out.push_str(";\n");
        out
    }

    fn render_drop_role(&self, r: &DropRole) -> String {
        let exists = if r.if_exists { "IF EXISTS " } else { "" };
        format!(
            "{}DROP ROLE {}{};\n",
            self.comment_line(&r.comment),
            exists,
            self.quote(&r.name)
        )
    }
}

fn quoted_values(values: &[String]) -> String {
    values.iter().map(|v| format!("'{}'", v.replace('\'', "''"))).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Column, ConstraintKind, ExcludeConstraint};

    #[test]
    fn scenario_a_create_table_renders_expected_columns() {
        let table = CreateTable::new(
            "users",
            vec![
                Column::new("id", "SERIAL").set_primary(),
                Column::new("email", "VARCHAR(255)").set_nullable(false).set_unique(true),
            ],
        );
        let rendered = PostgresRenderer.render_create_table(&table).unwrap();
        assert!(rendered.contains("id SERIAL PRIMARY KEY NOT NULL"));
        assert!(rendered.contains("email VARCHAR(255) NOT NULL UNIQUE"));
    }

    #[test]
    fn scenario_b_partial_index() {
        let idx = Index::new("idx_active_users", "users", vec!["status".to_string()])
            .with_condition("deleted_at IS NULL");
        let rendered = PostgresRenderer.render_index(&idx).unwrap();
        assert_eq!(rendered, "CREATE INDEX idx_active_users ON users (status) WHERE deleted_at IS NULL;\n");
    }

    #[test]
    fn scenario_c_trigram_gin_index() {
        let idx = Index::new("idx_users_name_trgm", "users", vec!["name".to_string()])
            .with_type("GIN")
            .with_operator_class("gin_trgm_ops");
        let rendered = PostgresRenderer.render_index(&idx).unwrap();
        assert_eq!(rendered, "CREATE INDEX idx_users_name_trgm ON users USING GIN (name gin_trgm_ops);\n");
    }

    #[test]
    fn scenario_f_exclude_constraint() {
        let constraint = Constraint::exclude(
            Some("one_active_session_per_user".to_string()),
            ExcludeConstraint {
                using_method: "gist".to_string(),
                elements: "user_id WITH =".to_string(),
                where_clause: Some("is_active = true".to_string()),
            },
        );
        let rendered = PostgresRenderer.render_constraint(&constraint).unwrap();
        assert_eq!(
            rendered,
            "CONSTRAINT one_active_session_per_user EXCLUDE USING gist (user_id WITH =) WHERE (is_active = true)"
        );
    }

    #[test]
    fn empty_column_type_is_a_render_error_regardless_of_default_or_check() {
        let column = Column::new("id", "");
        assert!(PostgresRenderer.render_column(&column).is_err());
    }

    #[test]
    fn malformed_constraint_is_a_render_error() {
        let constraint = Constraint {
            kind: ConstraintKind::Check,
            name: None,
            columns: Vec::new(),
            foreign_key: None,
            check: None,
            exclude: None,
        };
        assert!(PostgresRenderer.render_constraint(&constraint).is_err());
    }

    #[test]
    fn create_role_emits_flags_in_fixed_order() {
        let role = CreateRole::new("app_user");
        let rendered = PostgresRenderer.render_create_role(&role);
        assert_eq!(
            rendered,
            "CREATE ROLE app_user WITH NOLOGIN NOSUPERUSER NOCREATEDB NOCREATEROLE INHERIT NOREPLICATION;\n"
        );
    }

    #[test]
    fn create_policy_uses_multiline_layout() {
        let mut policy = CreatePolicy::new("tenant_isolation", "accounts", "ALL");
        policy.to_roles = vec!["app_role".to_string()];
        policy.using_expr = Some("tenant_id = current_tenant()".to_string());
        let rendered = PostgresRenderer.render_create_policy(&policy);
        assert!(rendered.ends_with(";\n"));
        assert!(rendered.contains("    USING (tenant_id = current_tenant())\n"));
    }
}
