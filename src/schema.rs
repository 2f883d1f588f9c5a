//! The two schema value types that sit on either side of the differ (§3.2,
//! §3.3): [`Database`], produced by the annotation-based extractor (out of
//! scope here, §1), and [`DbSchema`], produced by the live-schema reader
//! (also out of scope). The differ and planner only consume these; neither
//! type is ever built by this crate outside of tests.
//!
//! Modeled on `sql-schema-describer`'s `SqlSchema`/`Table`/`Column`/`Index`/
//! `ForeignKey` value types, generalized to carry the extra entities
//! (enums, extensions, functions, policies, roles) this spec's schemas need
//! and that the teacher's SQLite/MySQL/Postgres-only schema doesn't.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The target schema, derived upstream from annotated source-level type
/// declarations. Field ordering within a struct matches source declaration
/// order; `fields` and `tables` are both keyed by the struct name so the
/// planner can resolve a table's column set even when several tables share
/// an embedded struct (§4.5 "Column-lowering, target-driven").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// struct-name -> table-name.
    pub tables: BTreeMap<String, String>,
    /// struct-name -> ordered field declarations.
    pub fields: BTreeMap<String, Vec<TargetField>>,
    pub enums: Vec<TargetEnum>,
    pub indexes: Vec<TargetIndex>,
    pub extensions: Vec<TargetExtension>,
    pub rls_tables: Vec<String>,
    pub policies: Vec<TargetPolicy>,
    pub functions: Vec<TargetFunction>,
    pub roles: Vec<TargetRole>,
}

impl Database {
    pub fn new() -> Self {
        Database::default()
    }

    /// The struct name backing a table, by table name. Tables are keyed by
    /// struct name in `self.tables`, so this is a reverse lookup.
    pub fn struct_name_for_table(&self, table_name: &str) -> Option<&str> {
        self.tables
            .iter()
            .find(|(_, t)| t.as_str() == table_name)
            .map(|(s, _)| s.as_str())
    }

    pub fn fields_for_table(&self, table_name: &str) -> Option<&[TargetField]> {
        let struct_name = self.struct_name_for_table(table_name)?;
        self.fields.get(struct_name).map(|v| v.as_slice())
    }

    pub fn enum_named(&self, name: &str) -> Option<&TargetEnum> {
        self.enums.iter().find(|e| e.name == name)
    }
}

/// A single field of a target struct, already resolved for embedding
/// (`inline`, `inline prefix=`, `json`, `relation`, `skip` — §4.5). The
/// extractor performs this resolution; by the time the planner sees a
/// `TargetField` it is already a plain column candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetField {
    pub struct_field_name: String,
    pub column_name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub primary: bool,
    pub unique: bool,
    pub auto_increment: bool,
    pub default: Option<crate::ir::ColumnDefault>,
    pub check: Option<String>,
    pub comment: Option<String>,
    pub foreign_key: Option<crate::ir::ForeignKeyRef>,
    pub embed: EmbedMode,
}

/// How an embedded struct field was expanded by the extractor; the planner
/// never performs the expansion itself, it only respects its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedMode {
    /// Not an embedded field: render as an ordinary column.
    None,
    Inline,
    InlinePrefix(String),
    Json { column_name: String, sql_type: String },
    Relation { fk_column: String, ref_table: String, ref_column: String, on_delete: Option<String> },
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEnum {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetIndex {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub index_type: Option<String>,
    pub condition: Option<String>,
    pub operator_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetExtension {
    pub name: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPolicy {
    pub name: String,
    pub table: String,
    pub for_clause: String,
    pub to_roles: Vec<String>,
    pub using_expr: Option<String>,
    pub with_check_expr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetFunction {
    pub name: String,
    pub parameters: String,
    pub returns: String,
    pub language: String,
    pub body: String,
    pub security: Option<crate::ir::FunctionSecurity>,
    pub volatility: Option<crate::ir::FunctionVolatility>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRole {
    pub name: String,
    pub login: bool,
    pub superuser: bool,
    pub createdb: bool,
    pub createrole: bool,
    pub inherit: bool,
    pub replication: bool,
    pub password: Option<String>,
}

/// The observed schema, produced by the live-schema reader (out of scope
/// here, §1). Connection metadata (dialect, version) travels with it since
/// the differ's dialect-conditioned comparisons (§4.4) need to know which
/// entities even apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbSchema {
    pub dialect: String,
    pub version: String,
    pub tables: Vec<ObservedTable>,
    pub enums: Vec<TargetEnum>,
    pub extensions: Vec<TargetExtension>,
    pub functions: Vec<TargetFunction>,
    pub policies: Vec<TargetPolicy>,
    pub roles: Vec<TargetRole>,
}

impl DbSchema {
    pub fn table(&self, name: &str) -> Option<&ObservedTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Grounded on `sql-schema-describer::Table`'s inherent methods
/// (`is_column_unique`, `primary_key_columns`, `is_part_of_foreign_key`),
/// renamed to this crate's vocabulary (§F of `SPEC_FULL.md`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedTable {
    pub name: String,
    pub columns: Vec<ObservedColumn>,
    pub constraints: Vec<crate::ir::Constraint>,
    pub indexes: Vec<TargetIndex>,
    pub rls_enabled: bool,
}

impl ObservedTable {
    pub fn column(&self, name: &str) -> Option<&ObservedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_column_unique(&self, name: &str) -> bool {
        self.indexes
            .iter()
            .any(|i| i.unique && i.columns.len() == 1 && i.columns[0] == name)
    }

    pub fn primary_key_columns(&self) -> Vec<String> {
        self.columns.iter().filter(|c| c.primary).map(|c| c.name.clone()).collect()
    }

    pub fn is_part_of_foreign_key(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name && c.foreign_key.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedColumn {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub default: Option<crate::ir::ColumnDefault>,
    pub primary: bool,
    pub auto_increment: bool,
    pub unique: bool,
    pub foreign_key: Option<crate::ir::ForeignKeyRef>,
}
