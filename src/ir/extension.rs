use serde::{Deserialize, Serialize};

/// `CREATE EXTENSION`, PostgreSQL only. Rendered as a commented no-op on
/// MySQL/MariaDB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    pub if_not_exists: bool,
    pub version: Option<String>,
    pub comment: Option<String>,
}

impl Extension {
    pub fn new(name: impl Into<String>) -> Self {
        Extension {
            name: name.into(),
            if_not_exists: false,
            version: None,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropExtension {
    pub name: String,
    pub if_exists: bool,
    pub comment: Option<String>,
}

impl DropExtension {
    pub fn new(name: impl Into<String>) -> Self {
        DropExtension {
            name: name.into(),
            if_exists: false,
            comment: None,
        }
    }
}
