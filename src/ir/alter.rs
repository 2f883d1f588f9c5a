use serde::{Deserialize, Serialize};

/// A standalone SQL comment, rendered as a `-- ` line. Used for `COMMENT ON`
/// clauses (kept verbatim), `CREATE DOMAIN` (lowered lossily, see
/// `DESIGN.md`), and inline warnings the planner emits for dialects that
/// lack a feature (e.g. enum changes on MySQL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Comment { text: text.into() }
    }
}
