use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static NON_IDENT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

static MULTI_UNDERSCORE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());

const EMPTY_FALLBACK: &str = "col";

/// A lowercase schema name matching `^[a-z_][a-z0-9_]*$`.
///
/// Only [`sanitize`] and [`unique_identifiers`] build these, so any value of
/// this type is safe to splice into DDL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for SQL statements, so keyword names like `order` still work.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Turns arbitrary text into an [`Identifier`]. Total and deterministic.
pub fn sanitize(text: &str) -> Identifier {
    let normalized: String = text.nfc().collect();
    let lowered = normalized.trim().to_lowercase();

    let replaced = NON_IDENT_PATTERN.replace_all(&lowered, "_");
    let collapsed = MULTI_UNDERSCORE_PATTERN.replace_all(&replaced, "_");
    let stripped = collapsed.trim_matches('_');

    let base = if stripped.is_empty() {
        EMPTY_FALLBACK.to_string()
    } else {
        stripped.to_string()
    };

    if starts_with_digit(&base) {
        Identifier(format!("_{}", base))
    } else {
        Identifier(base)
    }
}

/// Same as [`sanitize`] but treats an absent value as empty text.
pub fn sanitize_opt(text: Option<&str>) -> Identifier {
    sanitize(text.unwrap_or(""))
}

/// Sanitizes every name and suffixes repeats with `_2`, `_3`, ... so the
/// output has no duplicates. Output position `i` belongs to input position `i`.
pub fn unique_identifiers<I, S>(names: I) -> Vec<Identifier>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut used = HashSet::new();
    names
        .into_iter()
        .map(|name| unique_name(sanitize(name.as_ref()), &mut used))
        .collect()
}

fn unique_name(base: Identifier, used: &mut HashSet<String>) -> Identifier {
    if used.insert(base.0.clone()) {
        return base;
    }
    let mut idx = 2;
    loop {
        let candidate = format!("{}_{}", base.0, idx);
        if used.insert(candidate.clone()) {
            return Identifier(candidate);
        }
        idx += 1;
    }
}

fn starts_with_digit(input: &str) -> bool {
    input
        .chars()
        .next()
        .map(|ch| ch.is_ascii_digit())
        .unwrap_or(false)
}
