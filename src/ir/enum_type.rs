use serde::{Deserialize, Serialize};

/// A SQL enum type (`CREATE TYPE ... AS ENUM (...)`). Values are unique and
/// position-significant: comparison uses positional equality, so reordering
/// without a set change is still a difference at the IR level (the differ
/// treats it differently, see `differ::table`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    pub values: Vec<String>,
}

impl Enum {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        assert!(!values.is_empty(), "Enum.values must be non-empty");
        Enum {
            name: name.into(),
            values,
        }
    }
}

/// `CREATE TYPE name AS <definition>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateType {
    pub name: String,
    pub definition: TypeDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDefinition {
    Enum(Vec<String>),
    Composite(Vec<(String, String)>),
    Domain { base_type: String, checks: Vec<String> },
    Range { subtype: String },
}

/// Operations on an existing enum type (`ALTER TYPE ... ADD VALUE`, rename).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterType {
    pub name: String,
    pub operations: Vec<AlterTypeOperation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlterTypeOperation {
    AddValue(String),
    RenameValue { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropType {
    pub name: String,
    pub if_exists: bool,
    pub comment: Option<String>,
}

impl DropType {
    pub fn new(name: impl Into<String>) -> Self {
        DropType {
            name: name.into(),
            if_exists: false,
            comment: None,
        }
    }
}
