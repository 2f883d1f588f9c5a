//! Renders IR nodes to dialect-specific DDL text. A renderer is a visitor
//! over [`Node`] (§4.3): every node kind has a `render_*` method, dispatched
//! by [`SqlRenderer::render`]. PostgreSQL and the shared MySQL/MariaDB core
//! live in separate submodules; this module holds the trait and the bits of
//! rendering that are identical across all three dialects.

pub mod mysql;
pub mod postgres;

pub use mysql::MySqlRenderer;
pub use postgres::PostgresRenderer;

use crate::dialect::Dialect;
use crate::error::PtahError;
use crate::ir::{
    AlterRole, AlterRoleOperation, AlterTable, AlterTableDisableRls, AlterTableEnableRls, AlterType, Column, Comment,
    CreateFunction, CreatePolicy, CreateRole, CreateTable, CreateType, DropExtension, DropFunction, DropIndex,
    DropPolicy, DropRole, DropTable, DropType, Enum, Extension, ForeignKeyRef, Index, Node,
};

/// True if `name` needs dialect quoting: anything other than a leading
/// letter/underscore followed by letters, digits or underscores.
pub(crate) fn identifier_needs_quoting(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return true,
    }
    !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn render_foreign_key_ref(quote: impl Fn(&str) -> String, fk: &ForeignKeyRef) -> String {
    let mut s = format!("REFERENCES {}({})", quote(&fk.table), quote(&fk.column));
    if let Some(action) = &fk.on_delete {
        s.push_str(&format!(" ON DELETE {}", action));
    }
    if let Some(action) = &fk.on_update {
        s.push_str(&format!(" ON UPDATE {}", action));
    }
    s
}

/// Assembles `name type [PRIMARY KEY] [NOT NULL] [DEFAULT ...] [UNIQUE]
/// [AUTO_INCREMENT] [CHECK (...)] [REFERENCES ...]` — the column-definition
/// shape shared by every dialect (§8 Scenario A fixes this exact order).
pub(crate) fn render_column_common(quote: impl Fn(&str) -> String, c: &Column) -> String {
    use crate::ir::ColumnDefault;

    let mut parts = vec![quote(&c.name), c.sql_type.clone()];
    if c.primary {
        parts.push("PRIMARY KEY".to_string());
    }
    if !c.nullable {
        parts.push("NOT NULL".to_string());
    }
    if let Some(default) = &c.default {
        let text = match default {
            ColumnDefault::Literal(v) => v.clone(),
            ColumnDefault::Expression(v) => v.clone(),
        };
        parts.push(format!("DEFAULT {}", text));
    }
    if c.unique {
        parts.push("UNIQUE".to_string());
    }
    if c.auto_increment {
        parts.push("AUTO_INCREMENT".to_string());
    }
    if let Some(check) = &c.check {
        parts.push(format!("CHECK ({})", check));
    }
    if let Some(fk) = &c.foreign_key {
        parts.push(render_foreign_key_ref(&quote, fk));
    }
    parts.join(" ")
}

/// A visitor over [`Node`]: `render` resets nothing and is a pure function
/// of the node (§9 Design Notes — the algebraic IR replaces the original
/// double-dispatch visitor with an exhaustive match here).
pub trait SqlRenderer {
    fn dialect(&self) -> Dialect;
    fn quote(&self, name: &str) -> String;

    fn render(&self, node: &Node) -> Result<String, PtahError> {
        match node {
            Node::CreateTable(t) => self.render_create_table(t),
            Node::AlterTable(t) => self.render_alter_table(t),
            Node::DropTable(t) => Ok(self.render_drop_table(t)),
            Node::Index(i) => self.render_index(i),
            Node::DropIndex(i) => Ok(self.render_drop_index(i)),
            Node::Extension(e) => Ok(self.render_extension(e)),
            Node::DropExtension(e) => Ok(self.render_drop_extension(e)),
            Node::Enum(e) => Ok(self.render_enum(e)),
            Node::CreateType(t) => self.render_create_type(t),
            Node::AlterType(t) => Ok(self.render_alter_type(t)),
            Node::DropType(t) => Ok(self.render_drop_type(t)),
            Node::CreateFunction(f) => Ok(self.render_create_function(f)),
            Node::DropFunction(f) => Ok(self.render_drop_function(f)),
            Node::CreatePolicy(p) => Ok(self.render_create_policy(p)),
            Node::DropPolicy(p) => Ok(self.render_drop_policy(p)),
            Node::EnableRls(r) => Ok(self.render_enable_rls(r)),
            Node::DisableRls(r) => Ok(self.render_disable_rls(r)),
            Node::CreateRole(r) => Ok(self.render_create_role(r)),
            Node::AlterRole(r) => Ok(self.render_alter_role(r)),
            Node::DropRole(r) => Ok(self.render_drop_role(r)),
            Node::Comment(c) => Ok(self.render_comment(c)),
        }
    }

    /// Renders a whole program in order, concatenating each statement's text.
    fn render_program(&self, nodes: &[Node]) -> Result<String, PtahError> {
        let mut out = String::new();
        for node in nodes {
            out.push_str(&self.render(node)?);
        }
        Ok(out)
    }

    fn comment_line(&self, comment: &Option<String>) -> String {
        comment.as_ref().map(|c| format!("-- {}\n", c)).unwrap_or_default()
    }

    fn render_comment(&self, c: &Comment) -> String {
        format!("-- {}\n", c.text)
    }

    fn render_drop_table(&self, t: &DropTable) -> String {
        let exists = if t.if_exists { "IF EXISTS " } else { "" };
        let cascade = if t.cascade { " CASCADE" } else { "" };
        format!(
            "{}DROP TABLE {}{}{};\n",
            self.comment_line(&t.comment),
            exists,
            self.quote(&t.name),
            cascade
        )
    }

    fn render_drop_index(&self, i: &DropIndex) -> String {
        let exists = if i.if_exists { "IF EXISTS " } else { "" };
        format!(
            "{}DROP INDEX {}{};\n",
            self.comment_line(&i.comment),
            exists,
            self.quote(&i.name)
        )
    }

    fn render_drop_type(&self, t: &DropType) -> String {
        let exists = if t.if_exists { "IF EXISTS " } else { "" };
        format!(
            "{}DROP TYPE {}{};\n",
            self.comment_line(&t.comment),
            exists,
            self.quote(&t.name)
        )
    }

    /// One `ALTER ROLE ... WITH <clause>;` statement per operation (§3.1).
    fn render_alter_role(&self, r: &AlterRole) -> String {
        let mut out = self.comment_line(&r.comment);
        for op in &r.operations {
            let clause = match op {
                AlterRoleOperation::SetLogin(v) => flag_clause(*v, "LOGIN", "NOLOGIN"),
                AlterRoleOperation::SetSuperuser(v) => flag_clause(*v, "SUPERUSER", "NOSUPERUSER"),
                AlterRoleOperation::SetCreatedb(v) => flag_clause(*v, "CREATEDB", "NOCREATEDB"),
                AlterRoleOperation::SetCreaterole(v) => flag_clause(*v, "CREATEROLE", "NOCREATEROLE"),
                AlterRoleOperation::SetInherit(v) => flag_clause(*v, "INHERIT", "NOINHERIT"),
                AlterRoleOperation::SetReplication(v) => flag_clause(*v, "REPLICATION", "NOREPLICATION"),
                AlterRoleOperation::SetPassword(p) => format!("PASSWORD '{}'", p.replace('\'', "''")),
            };
            out.push_str(&format!("ALTER ROLE {} WITH {};\n", self.quote(&r.name), clause));
        }
        out
    }

    fn render_create_table(&self, t: &CreateTable) -> Result<String, PtahError>;
    fn render_column(&self, c: &Column) -> Result<String, PtahError>;
    fn render_alter_table(&self, t: &AlterTable) -> Result<String, PtahError>;
    fn render_index(&self, i: &Index) -> Result<String, PtahError>;
    fn render_enum(&self, e: &Enum) -> String;
    fn render_create_type(&self, t: &CreateType) -> Result<String, PtahError>;
    fn render_alter_type(&self, t: &AlterType) -> String;
    fn render_extension(&self, e: &Extension) -> String;
    fn render_drop_extension(&self, e: &DropExtension) -> String;
    fn render_create_function(&self, f: &CreateFunction) -> String;
    fn render_drop_function(&self, f: &DropFunction) -> String;
    fn render_create_policy(&self, p: &CreatePolicy) -> String;
    fn render_drop_policy(&self, p: &DropPolicy) -> String;
    fn render_enable_rls(&self, r: &AlterTableEnableRls) -> String;
    fn render_disable_rls(&self, r: &AlterTableDisableRls) -> String;
    fn render_create_role(&self, r: &CreateRole) -> String;
    fn render_drop_role(&self, r: &DropRole) -> String;
}

fn flag_clause(set: bool, on: &str, off: &str) -> String {
    if set { on } else { off }.to_string()
}

/// Picks the renderer for a normalized dialect.
pub fn renderer_for(dialect: Dialect) -> Box<dyn SqlRenderer> {
    match dialect {
        Dialect::Postgres => Box::new(PostgresRenderer),
        Dialect::Mysql => Box::new(MySqlRenderer::new(Dialect::Mysql)),
        Dialect::Mariadb => Box::new(MySqlRenderer::new(Dialect::Mariadb)),
    }
}
