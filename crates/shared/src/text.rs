//! Text helpers shared by the encoders and the HTTP layer.

/// Maximum length Excel accepts for a worksheet name.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters Excel rejects in worksheet names.
const SHEET_NAME_FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Escape a value for CSV output.
///
/// Fields containing the delimiter, a quote or a line break are wrapped in
/// quotes with internal quotes doubled. Everything else passes through.
pub fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Reduce a free-form name to something safe inside a download filename.
///
/// ASCII alphanumerics, `-` and `_` are kept; runs of anything else become a
/// single `_`. Returns `"report"` when nothing usable remains.
pub fn sanitize_filename_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_sep = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "report".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Turn a report name into a valid worksheet name.
///
/// Forbidden characters are replaced with `_` and the result is cut to 31
/// characters. Excel rejects names that start or end with an apostrophe, so
/// apostrophes and whitespace are stripped from both ends after the cut.
/// Returns `None` if the name is empty after cleaning.
pub fn sanitize_sheet_name(name: &str) -> Option<String> {
    let replaced: String = name
        .chars()
        .map(|c| if SHEET_NAME_FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();

    let cut: String = trim_sheet_name(&replaced)
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = trim_sheet_name(&cut);

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn trim_sheet_name(name: &str) -> &str {
    name.trim_matches(|c: char| c.is_whitespace() || c == '\'')
}
