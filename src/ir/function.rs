use serde::{Deserialize, Serialize};

/// `CREATE OR REPLACE FUNCTION`, PostgreSQL only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFunction {
    pub name: String,
    pub parameters: String,
    pub returns: String,
    pub language: String,
    pub body: String,
    pub security: Option<FunctionSecurity>,
    pub volatility: Option<FunctionVolatility>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionSecurity {
    Definer,
    Invoker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionVolatility {
    Stable,
    Immutable,
    Volatile,
}

impl CreateFunction {
    pub fn new(
        name: impl Into<String>,
        parameters: impl Into<String>,
        returns: impl Into<String>,
        language: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        CreateFunction {
            name: name.into(),
            parameters: parameters.into(),
            returns: returns.into(),
            language: language.into(),
            body: body.into(),
            security: None,
            volatility: None,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropFunction {
    pub name: String,
    pub if_exists: bool,
    pub comment: Option<String>,
}

impl DropFunction {
    pub fn new(name: impl Into<String>) -> Self {
        DropFunction {
            name: name.into(),
            if_exists: false,
            comment: None,
        }
    }
}
