//! Helpers for turning loosely-typed request payloads into model fields.

use std::sync::LazyLock;

use crate::error::FieldError;

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex")
});

static USERNAME_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[A-Za-z0-9_]+$").expect("Invalid username regex"));

pub fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

pub fn is_username(value: &str) -> bool {
    USERNAME_REGEX.is_match(value)
}

/// Trims the value and records a field error when it ends up empty.
pub fn required(errors: &mut Vec<FieldError>, field: &str, value: Option<String>) -> String {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => v,
        _ => {
            errors.push(FieldError::new(field, format!("El campo {field} es requerido")));
            String::new()
        }
    }
}

pub fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Absent leaves the target untouched; an empty string is rejected.
pub fn patch_required(errors: &mut Vec<FieldError>, field: &str, target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        let v = v.trim();
        if v.is_empty() {
            errors.push(FieldError::new(field, format!("El campo {field} no puede estar vacío")));
        } else {
            *target = v.to_string();
        }
    }
}

/// Absent leaves the target untouched; an empty string clears it.
pub fn patch_optional(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        *target = optional(Some(v));
    }
}

pub fn max_len(errors: &mut Vec<FieldError>, field: &str, value: Option<&str>, max: usize) {
    if let Some(v) = value
        && v.chars().count() > max
    {
        errors.push(FieldError::new(field, format!("El campo {field} no puede exceder {max} caracteres")));
    }
}

/// `max_len` over `(field, value, column width)` triples.
pub fn max_lens(errors: &mut Vec<FieldError>, limits: &[(&str, Option<&str>, usize)]) {
    for (field, value, max) in limits {
        max_len(errors, field, *value, *max);
    }
}

/// Lowercased searchable text of a record, kept in its `busqueda` column.
/// Columns are joined by a newline so a term never spans two of them.
pub fn search_key<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> String {
    values.into_iter().flatten().map(str::to_lowercase).collect::<Vec<_>>().join("\n")
}

/// `%term%` against a search key. `%`, `_` and `\` in the term match
/// literally under `ESCAPE '\'`.
pub fn search_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
