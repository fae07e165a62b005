//! Table name derivation.
//!
//! Rule file stems such as `geolocation-!cn` or `category-ads-all@cn` are
//! not valid SQL identifiers. They are rewritten with a fixed substitution
//! table and then checked by [`is_valid_identifier`].

use std::path::Path;

/// Substitutions applied in order by [`sanitize_table_name`].
pub const SUBSTITUTIONS: [(char, &str); 4] = [('-', "_"), ('@', "_"), ('!', "_not_"), ('.', "_")];

/// Rewrite a raw name into a table name.
///
/// Applies [`SUBSTITUTIONS`] in order, then collapses every run of
/// underscores into a single one.
pub fn sanitize_table_name(raw: &str) -> String {
    let mut name = raw.to_string();
    for (from, to) in SUBSTITUTIONS {
        name = name.replace(from, to);
    }

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;
    for c in name.chars() {
        if c == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        out.push(c);
    }
    out
}

/// Check that a name is a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote any name as an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// File name without its last extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Table name for a rule file: `prefix` + file stem, sanitized.
pub fn table_name(prefix: &str, path: &Path) -> String {
    sanitize_table_name(&format!("{}{}", prefix, file_stem(path)))
}
