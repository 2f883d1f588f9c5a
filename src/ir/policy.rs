use serde::{Deserialize, Serialize};

/// A PostgreSQL row-level-security policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePolicy {
    pub name: String,
    pub table: String,
    pub for_clause: String,
    pub to_roles: Vec<String>,
    pub using_expr: Option<String>,
    pub with_check_expr: Option<String>,
    pub comment: Option<String>,
}

impl CreatePolicy {
    pub fn new(name: impl Into<String>, table: impl Into<String>, for_clause: impl Into<String>) -> Self {
        CreatePolicy {
            name: name.into(),
            table: table.into(),
            for_clause: for_clause.into(),
            to_roles: Vec::new(),
            using_expr: None,
            with_check_expr: None,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropPolicy {
    pub name: String,
    pub table: String,
    pub comment: Option<String>,
}

impl DropPolicy {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        DropPolicy {
            name: name.into(),
            table: table.into(),
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTableEnableRls {
    pub table: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTableDisableRls {
    pub table: String,
    pub comment: Option<String>,
}
