use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Parse a numeric cell. Accepts a leading `$` and `,` thousands
/// separators; rejects NaN and infinities.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = clean_str(raw);
    let cleaned = cleaned.strip_prefix('$').unwrap_or(cleaned);
    if cleaned.is_empty() {
        return None;
    }
    let v: f64 = if cleaned.contains(',') {
        cleaned.replace(',', "").parse().ok()?
    } else {
        cleaned.parse().ok()?
    };
    v.is_finite().then_some(v)
}

/// Amounts never fail: anything unparsable counts as zero.
pub fn parse_amount(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}

/// Collapse whitespace runs to a single space and trim.
pub fn normalize_org(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw.trim(), " ").into_owned()
}

/// Trimmed, uppercased code (institute, activity).
pub fn normalize_code(raw: &str) -> String {
    clean_str(raw).to_uppercase()
}

/// Join identifiers compare after trimming; numeric ids written as
/// floats by some exports ("123.0") are folded to their integer form.
pub fn normalize_identifier(raw: &str) -> String {
    let id = clean_str(raw);
    match id.strip_suffix(".0") {
        Some(head) if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) => {
            head.to_string()
        }
        _ => id.to_string(),
    }
}
