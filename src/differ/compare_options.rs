//! Differ configuration (§6.3). The only recognized option today is the
//! ignored-extensions set; modeled as a plain struct the way the teacher's
//! own `DiffingOptions` is a small plain struct rather than a builder-heavy
//! configuration object.

use std::collections::BTreeSet;

/// Extensions pre-installed or user-managed, excluded from both "added" and
/// "removed" in every [`crate::differ::SchemaDiff`] (§8 property 5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    ignored_extensions: BTreeSet<String>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions::with_default_and_additional(std::iter::empty::<String>())
    }
}

impl CompareOptions {
    /// The built-in default (`{plpgsql}`) plus any additional names.
    pub fn with_default_and_additional(additional: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut ignored_extensions: BTreeSet<String> = ["plpgsql".to_string()].into_iter().collect();
        ignored_extensions.extend(additional.into_iter().map(Into::into));
        CompareOptions { ignored_extensions }
    }

    /// Replaces the default set entirely with an explicit list.
    pub fn with_explicit_list(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        CompareOptions {
            ignored_extensions: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_extension_ignored(&self, name: &str) -> bool {
        self.ignored_extensions.contains(name)
    }

    /// A copy of `list` with ignored names removed, input order preserved.
    pub fn filter_ignored_extensions(&self, list: &[String]) -> Vec<String> {
        list.iter().filter(|n| !self.is_extension_ignored(n)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ignores_plpgsql() {
        let opts = CompareOptions::default();
        assert!(opts.is_extension_ignored("plpgsql"));
        assert!(!opts.is_extension_ignored("pg_trgm"));
    }

    #[test]
    fn additional_names_extend_the_default() {
        let opts = CompareOptions::with_default_and_additional(["pg_trgm".to_string()]);
        assert!(opts.is_extension_ignored("plpgsql"));
        assert!(opts.is_extension_ignored("pg_trgm"));
    }

    #[test]
    fn explicit_list_replaces_the_default() {
        let opts = CompareOptions::with_explicit_list(["citext".to_string()]);
        assert!(!opts.is_extension_ignored("plpgsql"));
        assert!(opts.is_extension_ignored("citext"));
    }

    #[test]
    fn filter_preserves_input_order() {
        let opts = CompareOptions::default();
        let list = vec!["pg_trgm".to_string(), "plpgsql".to_string(), "citext".to_string()];
        assert_eq!(opts.filter_ignored_extensions(&list), vec!["pg_trgm".to_string(), "citext".to_string()]);
    }
}
