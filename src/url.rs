//! PostgreSQL connection-string query-parameter handling (§6.2), built on
//! the `url` crate already in the teacher's dependency table
//! (`sql-migration-connector` depends on `url = "2.2.0"`).

use url::Url;

/// Strips `pool_max_conns`/`pool_min_conns` query parameters (meant for a
/// connection pool, not a single non–pool-aware driver connection) from a
/// PostgreSQL connection string, and sorts the remaining parameters
/// lexicographically. Returns the input unchanged if it has no query
/// parameters at all (§8 property 7), and is idempotent: stripping an
/// already-stripped URL is a no-op.
pub fn strip_pool_params(connection_string: &str) -> String {
    let Ok(mut url) = Url::parse(connection_string) else {
        return connection_string.to_string();
    };

    if url.query().is_none() {
        return connection_string.to_string();
    }

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "pool_max_conns" && k != "pool_min_conns")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&pairs);
    }
    url.to_string()
}
