//! Document model: parsing, serialization, JSON Pointer access and JSONPath selection
//!
//! Documents are plain [`serde_json::Value`] trees. Reads go through
//! [`Value::pointer`]; writes go through [`set_pointer`], which only ever
//! creates the final token and never invents intermediate containers.
//! JSONPath expressions are evaluated by `jsonpath-rust` and the matches are
//! converted back into JSON Pointers so callers can mutate them.

use crate::error::{Error, Result};
use crate::report::Reporter;
use jsonpath_rust::JsonPath;
use serde_json::{Map, Value};

/// Why a pointer could not be written
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointerError {
    #[error("pointer must start with '/'")]
    Malformed,

    #[error("invalid escape sequence in token '{0}'")]
    BadEscape(String),

    #[error("no node at '{0}'")]
    MissingParent(String),

    #[error("cannot descend into a {0} value")]
    NotAContainer(&'static str),

    #[error("'{0}' is not a usable array index")]
    BadIndex(String),
}

/// Parse the original document; failures carry the caller-supplied identity
pub fn parse_document(content: &str, identity: &str) -> Result<Value> {
    serde_json::from_str(content).map_err(|source| Error::InvalidDocument {
        identity: identity.to_string(),
        source,
    })
}

/// Parse a translated payload; failures propagate as raw JSON errors
pub fn parse_payload(content: &str) -> Result<Value> {
    Ok(serde_json::from_str(content)?)
}

/// Serialize a document with two-space indentation
pub fn to_pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Split a JSON Pointer into unescaped reference tokens
pub fn parse_pointer(pointer: &str) -> std::result::Result<Vec<String>, PointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let rest = pointer.strip_prefix('/').ok_or(PointerError::Malformed)?;
    rest.split('/').map(unescape_token).collect()
}

fn unescape_token(raw: &str) -> std::result::Result<String, PointerError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(PointerError::BadEscape(raw.to_string())),
        }
    }
    Ok(out)
}

/// Escape a single reference token for use in a JSON Pointer
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Write `value` at `pointer`.
///
/// The parent of the final token must already exist. Objects gain or
/// overwrite the final key; arrays accept an existing index, the index one
/// past the end, or `-` (both append).
pub fn set_pointer(
    root: &mut Value,
    pointer: &str,
    value: Value,
) -> std::result::Result<(), PointerError> {
    let mut tokens = parse_pointer(pointer)?;
    let last = tokens.pop().ok_or(PointerError::Malformed)?;

    let mut node = root;
    for (depth, token) in tokens.iter().enumerate() {
        node = match node {
            Value::Object(map) => map.get_mut(token),
            Value::Array(items) => array_index(token, items.len())
                .ok()
                .and_then(|i| items.get_mut(i)),
            _ => None,
        }
        .ok_or_else(|| PointerError::MissingParent(join_tokens(&tokens[..=depth])))?;
    }

    match node {
        Value::Object(map) => {
            map.insert(last, value);
            Ok(())
        }
        Value::Array(items) => {
            if last == "-" {
                items.push(value);
                return Ok(());
            }
            let index = array_index(&last, items.len() + 1)?;
            if index == items.len() {
                items.push(value);
            } else {
                items[index] = value;
            }
            Ok(())
        }
        other => Err(PointerError::NotAContainer(kind_name(other))),
    }
}

/// Parse an array token, rejecting leading zeros and indices at or past `bound`
fn array_index(token: &str, bound: usize) -> std::result::Result<usize, PointerError> {
    let valid = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    token
        .parse::<usize>()
        .ok()
        .filter(|i| valid && *i < bound)
        .ok_or_else(|| PointerError::BadIndex(token.to_string()))
}

fn join_tokens(tokens: &[String]) -> String {
    tokens.iter().map(|t| format!("/{}", escape_token(t))).collect()
}

/// Human-readable name of a value's type
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Apply a flat pointer→value patch, skipping pointers that cannot be written
pub fn apply_fields(target: &mut Value, fields: &Map<String, Value>, reporter: &dyn Reporter) {
    for (pointer, value) in fields {
        if let Err(err) = set_pointer(target, pointer, value.clone()) {
            tracing::debug!(%pointer, reason = %err, "skipping patch pointer");
            reporter.skipped(pointer, &err.to_string());
        }
    }
}

/// Evaluate a JSONPath against `value` and return the matches as JSON Pointers
pub fn select_pointers(value: &Value, path: &str) -> Result<Vec<String>> {
    let matches = value
        .query_only_path(path)
        .map_err(|e| Error::InvalidPath {
            path: path.to_string(),
            message: e.to_string(),
        })?;

    Ok(matches
        .into_iter()
        .filter_map(|normalized| {
            let pointer = definite_pointer(&normalized);
            if pointer.is_none() {
                tracing::trace!(%normalized, "unrecognized normalized path");
            }
            pointer
        })
        .collect())
}

/// First node matched by a JSONPath, if any
pub fn select_first<'a>(value: &'a Value, path: &str) -> Result<Option<&'a Value>> {
    let hits = value.query(path).map_err(|e| Error::InvalidPath {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    Ok(hits.into_iter().next())
}

/// Convert a JSONPath made only of member and index selectors into a pointer.
///
/// Accepts `$`, `.name`, `['name']`, `["name"]` and `[0]`. Returns `None`
/// for wildcards, recursive descent, filters, slices and unions, which can
/// address more than one node.
pub fn definite_pointer(path: &str) -> Option<String> {
    let rest = path.trim().strip_prefix('$')?;
    let chars: Vec<char> = rest.chars().collect();
    let mut pointer = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                match chars.get(i) {
                    None | Some('.') | Some('*') => return None,
                    Some('[') => continue,
                    Some(_) => {
                        let start = i;
                        while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                            i += 1;
                        }
                        let name: String = chars[start..i].iter().collect();
                        pointer.push('/');
                        pointer.push_str(&escape_token(&name));
                    }
                }
            }
            '[' => {
                i += 1;
                match chars.get(i) {
                    Some(&quote) if quote == '\'' || quote == '"' => {
                        i += 1;
                        let mut name = String::new();
                        loop {
                            match chars.get(i) {
                                None => return None,
                                Some('\\') => {
                                    name.push(*chars.get(i + 1)?);
                                    i += 2;
                                }
                                Some(&c) if c == quote => {
                                    i += 1;
                                    break;
                                }
                                Some(&c) => {
                                    name.push(c);
                                    i += 1;
                                }
                            }
                        }
                        if chars.get(i) != Some(&']') {
                            return None;
                        }
                        i += 1;
                        pointer.push('/');
                        pointer.push_str(&escape_token(&name));
                    }
                    Some(c) if c.is_ascii_digit() => {
                        let start = i;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                        if chars.get(i) != Some(&']') {
                            return None;
                        }
                        let index: String = chars[start..i].iter().collect();
                        i += 1;
                        pointer.push('/');
                        pointer.push_str(&index);
                    }
                    _ => return None,
                }
            }
            _ => return None,
        }
    }

    Some(pointer)
}
