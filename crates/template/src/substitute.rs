//! Placeholder substitution
//!
//! Templates reference row columns as `{column}` and the 1-based row counter
//! as `{index}` or `{index:03d}` (zero-padded to at least three digits).
//! Substituted values are inserted literally and never scanned again.

use crate::schema::Row;
use serde_json::Value;

/// What to do with a `{column}` the row does not have
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingKey {
    /// The whole template is unresolved and the field is not drawn
    #[default]
    Unresolved,
    /// The placeholder becomes an empty string
    Empty,
}

/// Resolve `template` against `row`, treating missing columns as unresolved
///
/// Returns `None` when any placeholder cannot be filled.
pub fn resolve(template: &str, row: &Row, index: usize) -> Option<String> {
    resolve_with(template, row, index, MissingKey::Unresolved)
}

/// Resolve `template` against `row` with an explicit missing-column policy
pub fn resolve_with(template: &str, row: &Row, index: usize, missing: MissingKey) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            // No closing brace: the remainder is literal text
            out.push_str(&rest[open..]);
            return Some(out);
        };

        let key = &after[..close];
        if key.is_empty() {
            out.push_str("{}");
        } else if let Some(index_text) = format_index(key, index) {
            out.push_str(&index_text);
        } else if let Some(value) = row.get(key) {
            out.push_str(&value_to_string(value));
        } else if missing == MissingKey::Unresolved {
            return None;
        }

        rest = &after[close + 1..];
    }

    out.push_str(rest);
    Some(out)
}

/// Widest padding `{index:Nd}` accepts; wider forms are not index placeholders
pub const MAX_INDEX_WIDTH: usize = 64;

/// Expand `index`, `index:Nd` and `index:0Nd`
fn format_index(key: &str, index: usize) -> Option<String> {
    if key == "index" {
        return Some(index.to_string());
    }

    let width = key.strip_prefix("index:")?.strip_suffix('d')?;
    if width.is_empty() || !width.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let width: usize = width.parse().ok().filter(|w| *w <= MAX_INDEX_WIDTH)?;
    Some(format!("{index:0width$}"))
}

/// Convert a JSON value to string for rendering
///
/// Whole numbers print without a fractional part (`3`, not `3.0`).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Column names a template refers to, in first-use order
///
/// `{index}` forms are not columns and are left out.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };

        let key = &after[..close];
        if !key.is_empty() && format_index(key, 0).is_none() && !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
        rest = &after[close + 1..];
    }

    keys
}

/// Column names of a row source: the keys of the first row, in order
pub fn column_names(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}
