//! Default-value normalization (§4.4): quote style unified, trailing
//! parens added to recognized niladic functions, PostgreSQL casts
//! preserved verbatim. Used before comparing a target default against an
//! observed one so that `now` and `now()` (or `'x'` and `"x"`) are not
//! reported as a spurious diff.

use crate::ir::ColumnDefault;

const NILADIC_FUNCTIONS: &[&str] = &["now", "current_timestamp", "current_date", "current_time", "gen_random_uuid"];

/// Normalizes a default to a single comparable string, regardless of
/// whether it is stored as a literal or an expression.
pub fn normalize_default(default: &ColumnDefault) -> String {
    match default {
        ColumnDefault::Literal(v) => normalize_literal(v),
        ColumnDefault::Expression(v) => normalize_expression(v),
    }
}

fn normalize_literal(value: &str) -> String {
    let (body, cast) = split_cast(value);
    let unified = unify_quotes(body);
    match cast {
        Some(c) => format!("{}::{}", unified, c),
        None => unified,
    }
}

fn normalize_expression(value: &str) -> String {
    let (body, cast) = split_cast(value);
    let lower = body.to_ascii_lowercase();
    let with_parens = if NILADIC_FUNCTIONS.contains(&lower.as_str()) {
        format!("{}()", lower)
    } else {
        lower
    };
    match cast {
        Some(c) => format!("{}::{}", with_parens, c),
        None => with_parens,
    }
}

/// Splits a `value::cast` suffix off, preserving the cast verbatim
/// (PostgreSQL casts are never normalized, per §4.4).
fn split_cast(value: &str) -> (&str, Option<&str>) {
    match value.find("::") {
        Some(idx) => (&value[..idx], Some(&value[idx + 2..])),
        None => (value, None),
    }
}

fn unify_quotes(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() >= 2 {
        let bytes = trimmed.as_bytes();
        if (bytes[0] == b'\'' || bytes[0] == b'"') && bytes[bytes.len() - 1] == bytes[0] {
            let inner = &trimmed[1..trimmed.len() - 1];
            return format!("'{}'", inner);
        }
    }
    trimmed.to_string()
}
