//! Dialect identification shared by the renderer, differ and planner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three SQL dialects this crate knows how to render and plan for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    Postgres,
    Mysql,
    Mariadb,
}

impl Dialect {
    /// MySQL and MariaDB share a renderer/planner core; this is the switch
    /// between the PostgreSQL-specific path and the shared MySQL-like one.
    pub fn is_mysql_like(self) -> bool {
        matches!(self, Dialect::Mysql | Dialect::Mariadb)
    }

    pub fn label(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Mariadb => "mariadb",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Maps `pgx|postgresql|postgres` to [`Dialect::Postgres`], `mysql` to
/// [`Dialect::Mysql`], `mariadb` to [`Dialect::Mariadb`]; anything else
/// (including the empty string) is unsupported.
pub fn normalize_dialect(name: &str) -> Option<Dialect> {
    match name.to_ascii_lowercase().as_str() {
        "pgx" | "postgresql" | "postgres" => Some(Dialect::Postgres),
        "mysql" => Some(Dialect::Mysql),
        "mariadb" => Some(Dialect::Mariadb),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_known_aliases() {
        assert_eq!(normalize_dialect("pgx"), Some(Dialect::Postgres));
        assert_eq!(normalize_dialect("postgresql"), Some(Dialect::Postgres));
        assert_eq!(normalize_dialect("postgres"), Some(Dialect::Postgres));
        assert_eq!(normalize_dialect("MySQL"), Some(Dialect::Mysql));
        assert_eq!(normalize_dialect("mariadb"), Some(Dialect::Mariadb));
    }

    #[test]
    fn rejects_unknown_dialects() {
        assert_eq!(normalize_dialect(""), None);
        assert_eq!(normalize_dialect("oracle"), None);
    }

    #[test]
    fn mysql_like_covers_mysql_and_mariadb() {
        assert!(Dialect::Mysql.is_mysql_like());
        assert!(Dialect::Mariadb.is_mysql_like());
        assert!(!Dialect::Postgres.is_mysql_like());
    }
}
