//! Ptah: a dialect-neutral SQL DDL intermediate representation, with a
//! lexer/parser that reads it back out of PostgreSQL/MySQL/MariaDB DDL
//! text, per-dialect renderers, a structural schema differ, and a
//! migration planner that lowers a diff plus a target schema into an
//! ordered IR program.
//!
//! The pipeline: `parser::parse` (text -> IR) and `render::renderer_for`
//! (IR -> text) are each other's inverse modulo normalization; `differ::diff`
//! (target, observed -> `SchemaDiff`) and `planner::plan` (target, diff ->
//! IR) compose into a full migration: `plan(target, diff(target, observed,
//! dialect, options), dialect)`.
//!
//! Producing a `Database`/`DbSchema` from source annotations or a live
//! connection, and executing rendered DDL, are both out of scope — this
//! crate is the pure, I/O-free core between them.

#![deny(rust_2018_idioms)]

pub mod dialect;
pub mod differ;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod lowering;
pub mod parser;
pub mod planner;
pub mod render;
pub mod schema;
pub mod url;

pub use dialect::{normalize_dialect, Dialect};
pub use differ::{diff, CompareOptions, SchemaDiff};
pub use error::{PtahError, PtahResult};
pub use ir::{Node, StatementList};
pub use parser::{parse, parse_with_timeout};
pub use planner::{plan, plan_with_diagnostics, PlanError};
pub use render::{renderer_for, SqlRenderer};
pub use schema::{Database, DbSchema};
