//! Checks for literal tokens spliced into generated code.
//!
//! Free-form fragments (`helping_code`, function bodies, `apply_if`, values)
//! are opaque and copied verbatim. Everything else that lands in the output
//! unquoted must be an identifier or a dotted path of identifiers, so a
//! wrapper specification cannot smuggle statements through a name field.
//! Property names are never spliced raw: they go through [`quote`].

use crate::error::{Result, WrapError};

/// Words that cannot name a binding, in sloppy or strict code.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Whether `value` has identifier syntax. Reserved words are allowed, as
/// they are after a `.`.
pub fn is_identifier_name(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c == '_' || c == '$' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}

/// Whether `value` can name a binding: identifier syntax, not reserved.
pub fn is_identifier(value: &str) -> bool {
    is_identifier_name(value) && !RESERVED_WORDS.contains(&value)
}

/// Whether `value` is a dotted path such as `window.HTMLCanvasElement.prototype`.
/// Only the head has to be a binding name; members may be reserved words.
pub fn is_object_path(value: &str) -> bool {
    let mut segments = value.split('.');
    match segments.next() {
        Some(head) if is_identifier(head) => segments.all(is_identifier_name),
        _ => false,
    }
}

pub fn check_identifier<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    if is_identifier(value) {
        Ok(value)
    } else {
        Err(WrapError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
    }
}

pub fn check_object_path<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    if is_object_path(value) {
        Ok(value)
    } else {
        Err(WrapError::InvalidObjectPath {
            field,
            value: value.to_string(),
        })
    }
}

/// Check a parameter list such as `a, b, ...rest`. An empty list is valid.
/// A rest parameter may only come last.
pub fn check_params<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Ok(value);
    }
    let params: Vec<&str> = value.split(',').map(str::trim).collect();
    let last = params.len() - 1;
    let valid = params.iter().enumerate().all(|(i, param)| match param.strip_prefix("...") {
        Some(rest) => i == last && is_identifier(rest),
        None => is_identifier(param),
    });
    if valid {
        Ok(value)
    } else {
        Err(WrapError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
    }
}

/// Reject fragments that would leave an expression slot empty, such as
/// `target[prop] = ;`.
pub fn check_expression<'a>(wrapper: &str, field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(WrapError::MissingField {
            wrapper: wrapper.to_string(),
            field,
        })
    } else {
        Ok(value)
    }
}

/// Split `a.b.c` into (`a.b`, `c`).
pub fn split_path<'a>(field: &'static str, value: &'a str) -> Result<(&'a str, &'a str)> {
    check_object_path(field, value)?;
    value
        .rsplit_once('.')
        .ok_or_else(|| WrapError::InvalidObjectPath {
            field,
            value: value.to_string(),
        })
}

/// Encode `value` as a double-quoted string literal.
///
/// JSON string syntax is a subset of JavaScript string syntax, so the result
/// can be spliced anywhere an expression is expected.
pub fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}
