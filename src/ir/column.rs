use serde::{Deserialize, Serialize};

use super::table::ForeignKeyRef;

/// A column of a `CreateTable`/`AlterTable` statement.
///
/// A column is exactly one of (no default), (literal default), (expression
/// default); this is enforced by [`ColumnDefault`] being a single enum field
/// rather than two optional ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Raw SQL type, possibly parametrized (`VARCHAR(255)`, `NUMERIC(10,2)`).
    pub sql_type: String,
    pub nullable: bool,
    pub primary: bool,
    pub unique: bool,
    pub auto_increment: bool,
    pub default: Option<ColumnDefault>,
    pub check: Option<String>,
    pub comment: Option<String>,
    pub foreign_key: Option<ForeignKeyRef>,
}

/// A column default, mutually exclusive between a literal and an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnDefault {
    /// A literal value, already quoted/cast as needed (`'active'`, `0`, `'x'::text`).
    Literal(String),
    /// An expression, including niladic function calls (`now()`, `gen_random_uuid()`).
    Expression(String),
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: true,
            primary: false,
            unique: false,
            auto_increment: false,
            default: None,
            check: None,
            comment: None,
            foreign_key: None,
        }
    }

    /// Marks the column primary, forcing `nullable` to `false`.
    pub fn set_primary(mut self) -> Self {
        self.primary = true;
        self.nullable = false;
        self
    }

    pub fn set_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn set_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn set_auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    pub fn with_literal_default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(ColumnDefault::Literal(literal.into()));
        self
    }

    pub fn with_expression_default(mut self, expression: impl Into<String>) -> Self {
        self.default = Some(ColumnDefault::Expression(expression.into()));
        self
    }

    pub fn with_check(mut self, expr: impl Into<String>) -> Self {
        self.check = Some(expr.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_foreign_key(mut self, reference: ForeignKeyRef) -> Self {
        self.foreign_key = Some(reference);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_primary_forces_non_nullable() {
        let col = Column::new("id", "SERIAL").set_nullable(true).set_primary();
        assert!(col.primary);
        assert!(!col.nullable);
    }
}
