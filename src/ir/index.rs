use serde::{Deserialize, Serialize};

/// `CREATE [UNIQUE] INDEX`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
    /// BTREE, HASH, GIN, GIST, ... `None` means the dialect default.
    pub index_type: Option<String>,
    /// Partial-index condition (`WHERE ...`), PostgreSQL only.
    pub condition: Option<String>,
    pub operator_class: Option<String>,
    pub if_not_exists: bool,
    pub comment: Option<String>,
}

impl Index {
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: Vec<String>) -> Self {
        assert!(!columns.is_empty(), "Index.columns must be non-empty");
        Index {
            name: name.into(),
            table: table.into(),
            columns,
            unique: false,
            index_type: None,
            condition: None,
            operator_class: None,
            if_not_exists: false,
            comment: None,
        }
    }

    pub fn set_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_type(mut self, index_type: impl Into<String>) -> Self {
        self.index_type = Some(index_type.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_operator_class(mut self, operator_class: impl Into<String>) -> Self {
        self.operator_class = Some(operator_class.into());
        self
    }

    pub fn with_if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropIndex {
    pub name: String,
    pub table: String,
    pub if_exists: bool,
    pub comment: Option<String>,
}

impl DropIndex {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        DropIndex {
            name: name.into(),
            table: table.into(),
            if_exists: false,
            comment: None,
        }
    }
}
