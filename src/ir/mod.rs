//! The DDL intermediate representation: a dialect-neutral tree of statement
//! nodes, acyclic and owned top-down. This is the shared vocabulary between
//! the parser, renderer, differ and planner.
//!
//! In a language with sum types the original visitor-over-class-hierarchy
//! design collapses to a single algebraic type ([`Node`]) and an exhaustive
//! `match` in the renderer; that's what this module is.

pub mod alter;
pub mod column;
pub mod enum_type;
pub mod extension;
pub mod function;
pub mod index;
pub mod policy;
pub mod role;
pub mod table;

use serde::{Deserialize, Serialize};

pub use alter::Comment;
pub use column::{Column, ColumnDefault};
pub use enum_type::{AlterType, AlterTypeOperation, CreateType, DropType, Enum, TypeDefinition};
pub use extension::{DropExtension, Extension};
pub use function::{CreateFunction, DropFunction, FunctionSecurity, FunctionVolatility};
pub use index::{DropIndex, Index};
pub use policy::{AlterTableDisableRls, AlterTableEnableRls, CreatePolicy, DropPolicy};
pub use role::{AlterRole, AlterRoleOperation, CreateRole, DropRole};
pub use table::{
    AlterTable, AlterTableOperation, ColumnChangeKind, ColumnChanges, Constraint, ConstraintKind, CreateTable,
    DropTable, ExcludeConstraint, ForeignKeyRef,
};

/// A single DDL statement, dialect-independent at the node level. Fields
/// that only make sense for one dialect (function bodies, RLS policies,
/// roles) simply never get built by planners for the other dialects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    CreateTable(CreateTable),
    AlterTable(AlterTable),
    DropTable(DropTable),
    Index(Index),
    DropIndex(DropIndex),
    Extension(Extension),
    DropExtension(DropExtension),
    Enum(Enum),
    CreateType(CreateType),
    AlterType(AlterType),
    DropType(DropType),
    CreateFunction(CreateFunction),
    DropFunction(DropFunction),
    CreatePolicy(CreatePolicy),
    DropPolicy(DropPolicy),
    EnableRls(AlterTableEnableRls),
    DisableRls(AlterTableDisableRls),
    CreateRole(CreateRole),
    AlterRole(AlterRole),
    DropRole(DropRole),
    Comment(Comment),
}

impl Node {
    /// The node-kind name, used in render/plan error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::CreateTable(_) => "CreateTable",
            Node::AlterTable(_) => "AlterTable",
            Node::DropTable(_) => "DropTable",
            Node::Index(_) => "Index",
            Node::DropIndex(_) => "DropIndex",
            Node::Extension(_) => "Extension",
            Node::DropExtension(_) => "DropExtension",
            Node::Enum(_) => "Enum",
            Node::CreateType(_) => "CreateType",
            Node::AlterType(_) => "AlterType",
            Node::DropType(_) => "DropType",
            Node::CreateFunction(_) => "CreateFunction",
            Node::DropFunction(_) => "DropFunction",
            Node::CreatePolicy(_) => "CreatePolicy",
            Node::DropPolicy(_) => "DropPolicy",
            Node::EnableRls(_) => "EnableRls",
            Node::DisableRls(_) => "DisableRls",
            Node::CreateRole(_) => "CreateRole",
            Node::AlterRole(_) => "AlterRole",
            Node::DropRole(_) => "DropRole",
            Node::Comment(_) => "Comment",
        }
    }
}

/// An ordered sequence of statements: the parser's output and the planner's
/// program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementList(pub Vec<Node>);

impl StatementList {
    pub fn new() -> Self {
        StatementList(Vec::new())
    }

    pub fn push(&mut self, node: Node) {
        self.0.push(node);
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.0.extend(nodes);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl IntoIterator for StatementList {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Node> for StatementList {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        StatementList(iter.into_iter().collect())
    }
}
