use serde::{Deserialize, Serialize};

/// A PostgreSQL role. Flags render in a fixed order regardless of which ones
/// are set: LOGIN/NOLOGIN, SUPERUSER/NOSUPERUSER, CREATEDB/NOCREATEDB,
/// CREATEROLE/NOCREATEROLE, INHERIT/NOINHERIT, REPLICATION/NOREPLICATION.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub login: bool,
    pub superuser: bool,
    pub createdb: bool,
    pub createrole: bool,
    pub inherit: bool,
    pub replication: bool,
    pub password: Option<String>,
    pub comment: Option<String>,
}

impl CreateRole {
    pub fn new(name: impl Into<String>) -> Self {
        CreateRole {
            name: name.into(),
            login: false,
            superuser: false,
            createdb: false,
            createrole: false,
            inherit: true,
            replication: false,
            password: None,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterRole {
    pub name: String,
    pub operations: Vec<AlterRoleOperation>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlterRoleOperation {
    SetLogin(bool),
    SetSuperuser(bool),
    SetCreatedb(bool),
    SetCreaterole(bool),
    SetInherit(bool),
    SetReplication(bool),
    SetPassword(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRole {
    pub name: String,
    pub if_exists: bool,
    pub comment: Option<String>,
}

impl DropRole {
    pub fn new(name: impl Into<String>) -> Self {
        DropRole {
            name: name.into(),
            if_exists: false,
            comment: None,
        }
    }
}
