use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::column::Column;

/// `CREATE TABLE`. Options is a mapping from option key (`ENGINE`,
/// `CHARSET`, `COLLATE`, `TABLESPACE`, a `WITH` key, `AUTO_INCREMENT`,
/// `ROW_FORMAT`) to its string value; insertion order only matters for
/// PostgreSQL's `WITH (...)` list, so it is kept as a `Vec` of pairs rather
/// than a `BTreeMap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    pub options: Vec<(String, String)>,
    pub comment: Option<String>,
}

impl CreateTable {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        CreateTable {
            name: name.into(),
            columns,
            constraints: Vec::new(),
            options: Vec::new(),
            comment: None,
        }
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub foreign_key: Option<ForeignKeyRef>,
    pub check: Option<String>,
    pub exclude: Option<ExcludeConstraint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Check,
    Exclude,
}

/// `EXCLUDE USING method (elements) [WHERE (where)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludeConstraint {
    pub using_method: String,
    pub elements: String,
    pub where_clause: Option<String>,
}

impl Constraint {
    pub fn primary_key(columns: Vec<String>) -> Self {
        Constraint {
            kind: ConstraintKind::PrimaryKey,
            name: None,
            columns,
            foreign_key: None,
            check: None,
            exclude: None,
        }
    }

    pub fn unique(name: Option<String>, columns: Vec<String>) -> Self {
        Constraint {
            kind: ConstraintKind::Unique,
            name,
            columns,
            foreign_key: None,
            check: None,
            exclude: None,
        }
    }

    pub fn foreign_key(name: Option<String>, columns: Vec<String>, reference: ForeignKeyRef) -> Self {
        Constraint {
            kind: ConstraintKind::ForeignKey,
            name,
            columns,
            foreign_key: Some(reference),
            check: None,
            exclude: None,
        }
    }

    pub fn check(name: Option<String>, expr: impl Into<String>) -> Self {
        Constraint {
            kind: ConstraintKind::Check,
            name,
            columns: Vec::new(),
            foreign_key: None,
            check: Some(expr.into()),
            exclude: None,
        }
    }

    pub fn exclude(name: Option<String>, exclude: ExcludeConstraint) -> Self {
        Constraint {
            kind: ConstraintKind::Exclude,
            name,
            columns: Vec::new(),
            foreign_key: None,
            check: None,
            exclude: Some(exclude),
        }
    }

    /// True iff this constraint satisfies the invariant its kind requires:
    /// a foreign-key constraint has a reference, a check constraint has a
    /// non-empty expression, an exclude constraint has both a using-method
    /// and elements.
    pub fn is_well_formed(&self) -> bool {
        match self.kind {
            ConstraintKind::ForeignKey => self.foreign_key.is_some(),
            ConstraintKind::Check => self.check.as_deref().is_some_and(|s| !s.is_empty()),
            ConstraintKind::Exclude => self
                .exclude
                .as_ref()
                .is_some_and(|e| !e.using_method.is_empty() && !e.elements.is_empty()),
            ConstraintKind::PrimaryKey | ConstraintKind::Unique => true,
        }
    }
}

/// A foreign-key reference. References are by name, not by pointer to
/// another table node, which keeps the IR a tree; cross-table validation
/// (that the referenced table exists) is out of scope here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
    pub name: Option<String>,
}

impl ForeignKeyRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        ForeignKeyRef {
            table: table.into(),
            column: column.into(),
            on_delete: None,
            on_update: None,
            name: None,
        }
    }

    pub fn with_on_delete(mut self, action: impl Into<String>) -> Self {
        self.on_delete = Some(action.into());
        self
    }

    pub fn with_on_update(mut self, action: impl Into<String>) -> Self {
        self.on_update = Some(action.into());
        self
    }
}

/// `ALTER TABLE ...`, an ordered sequence of operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTable {
    pub table: String,
    pub operations: Vec<AlterTableOperation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlterTableOperation {
    AddColumn(Column),
    DropColumn(String),
    ModifyColumn(Column),
}

impl AlterTable {
    pub fn new(table: impl Into<String>, operations: Vec<AlterTableOperation>) -> Self {
        AlterTable {
            table: table.into(),
            operations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
    pub name: String,
    pub if_exists: bool,
    pub cascade: bool,
    pub comment: Option<String>,
}

impl DropTable {
    pub fn new(name: impl Into<String>) -> Self {
        DropTable {
            name: name.into(),
            if_exists: false,
            cascade: false,
            comment: None,
        }
    }
}

/// A closed vocabulary for the "what changed" key of a modified column, used
/// by the differ (§3.4) instead of a stringly typed map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnChangeKind {
    Type,
    Nullable,
    Default,
    PrimaryKey,
    AutoIncrement,
    Unique,
    ForeignKey,
}

pub type ColumnChanges = BTreeMap<ColumnChangeKind, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_constraint_requires_reference() {
        let c = Constraint {
            kind: ConstraintKind::ForeignKey,
            name: None,
            columns: vec!["user_id".into()],
            foreign_key: None,
            check: None,
            exclude: None,
        };
        assert!(!c.is_well_formed());
    }

    #[test]
    fn exclude_constraint_requires_method_and_elements() {
        let missing = Constraint::exclude(
            None,
            ExcludeConstraint {
                using_method: String::new(),
                elements: "user_id WITH =".into(),
                where_clause: None,
            },
        );
        assert!(!missing.is_well_formed());

        let complete = Constraint::exclude(
            Some("one_active_session_per_user".into()),
            ExcludeConstraint {
                using_method: "gist".into(),
                elements: "user_id WITH =".into(),
                where_clause: Some("is_active = true".into()),
            },
        );
        assert!(complete.is_well_formed());
    }
}
