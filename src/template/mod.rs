//! Resolution of `{{$nodes.<id>.output.<path>}}` and `{{$output}}`
//! placeholders in node configurations.
//!
//! Resolution is a pure function over an immutable snapshot of prior node
//! results. If any path segment does not resolve, the entire original
//! placeholder is left verbatim — no partial substitution, no error.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\$[A-Za-z0-9_.\-$]+)\s*\}\}").unwrap());

/// Snapshot of accumulated outputs a template resolves against.
pub struct ResolveContext<'a> {
    /// Results of nodes executed so far in this run, keyed by node id.
    pub node_results: &'a HashMap<String, Value>,
    /// The immediately preceding node's result, for `{{$output}}`.
    pub last_output: Option<&'a Value>,
}

/// Resolve every placeholder in a node configuration, recursing through
/// objects and arrays. Non-string leaves pass through untouched.
pub fn resolve_config(config: &Value, ctx: &ResolveContext) -> Value {
    match config {
        Value::String(text) => resolve_text(text, ctx),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_config(v, ctx)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| resolve_config(v, ctx)).collect())
        }
        other => other.clone(),
    }
}

/// Resolve placeholders in one string.
///
/// A string that is exactly one placeholder keeps the resolved value's JSON
/// type; placeholders embedded in longer text are stringified in place.
pub fn resolve_text(text: &str, ctx: &ResolveContext) -> Value {
    if let Some(caps) = PLACEHOLDER_RE.captures(text.trim()) {
        if caps.get(0).map(|m| m.as_str()) == Some(text.trim()) {
            return match lookup(&caps[1], ctx) {
                Some(value) => value,
                None => Value::String(text.to_string()),
            };
        }
    }

    let replaced = PLACEHOLDER_RE.replace_all(text, |caps: &regex::Captures| {
        match lookup(&caps[1], ctx) {
            Some(Value::String(s)) => s,
            Some(value) => value.to_string(),
            // Unresolved: keep the original placeholder text.
            None => caps[0].to_string(),
        }
    });

    Value::String(replaced.into_owned())
}

/// Resolve one `$...` expression to a value, or `None` if any segment of
/// the path is missing.
fn lookup(expr: &str, ctx: &ResolveContext) -> Option<Value> {
    if expr == "$output" {
        return ctx.last_output.cloned();
    }

    let mut segments = expr.split('.');
    if segments.next() != Some("$nodes") {
        return None;
    }
    let node_id = segments.next()?;
    if segments.next() != Some("output") {
        return None;
    }

    let mut current = ctx.node_results.get(node_id)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current.clone())
}
