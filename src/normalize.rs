//! Row normalization: one raw delimited row in, one validated record or a skip out.

use csv::StringRecord;

use crate::models::{Choice, QuestionRecord};
use crate::naming::{placeholder_identifier, sanitize_identifier};

/// The only question kind the pipeline supports.
const SUPPORTED_KIND: &str = "MC";

/// Score weight applied when the points column cannot be read as a number.
const DEFAULT_POINTS: f64 = 1.0;

/// Prompt substituted when the prompt column is absent or cleans down to nothing.
const MISSING_PROMPT: &str = "<p>Question text not found.</p>";

/// Column positions of the fixed input layout.
mod column {
    pub const KIND: usize = 0;
    pub const IDENTIFIER: usize = 1;
    pub const POINTS: usize = 2;
    pub const PROMPT: usize = 3;
    pub const CORRECT: usize = 4;
    pub const TITLE: usize = 9;
}

/// Normalize one row into a [`QuestionRecord`].
///
/// Returns `None` when the type column names an unsupported question kind;
/// that is the documented way to mix kinds in one input and keep only the
/// supported ones, so it is a skip rather than an error. Every other field is
/// defaulted rather than rejected. `ordinal` is the 1-based position of the
/// row in the input and feeds the synthesized placeholder identifier.
///
/// Pure: no I/O, and identifiers are not yet de-duplicated across rows; the
/// assembler owns that.
pub fn normalize(row: &StringRecord, ordinal: usize) -> Option<QuestionRecord> {
    let kind = cell(row, column::KIND);
    if !kind.is_empty() && !kind.eq_ignore_ascii_case(SUPPORTED_KIND) {
        tracing::debug!(kind, ordinal, "skipping row with unsupported question kind");
        return None;
    }

    let identifier = match sanitize_identifier(cell(row, column::IDENTIFIER)) {
        sanitized if sanitized.is_empty() => placeholder_identifier(ordinal),
        sanitized => sanitized,
    };

    let title = match cell(row, column::TITLE).trim() {
        "" => identifier.clone(),
        title => title.to_string(),
    };

    Some(QuestionRecord {
        title,
        identifier,
        points: parse_points(cell(row, column::POINTS)),
        prompt_html: clean_prompt_html(cell(row, column::PROMPT)),
        correct_choice: Choice::parse(cell(row, column::CORRECT)),
    })
}

fn cell(row: &StringRecord, index: usize) -> &str {
    row.get(index).map(str::trim).unwrap_or("")
}

/// Coerce the points cell, falling back to a leading-prefix float parse and
/// finally to the default. Non-finite values (`NaN`, `inf`) are rejected so
/// the record invariant holds.
fn parse_points(raw: &str) -> f64 {
    if raw.is_empty() {
        return DEFAULT_POINTS;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => leading_float(raw).unwrap_or(DEFAULT_POINTS),
    }
}

/// Parse the longest numeric prefix of `raw`, e.g. `"7,5"` → `7.0`.
fn leading_float(raw: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;
    for (index, c) in raw.char_indices() {
        match c {
            '+' | '-' if index == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            c if c.is_ascii_digit() => {}
            _ => break,
        }
        end = index + c.len_utf8();
    }
    raw[..end].parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Clean the prompt cell: trim, collapse doubled double-quotes left over from
/// source quoting, then strip one leading/trailing run of quote characters.
///
/// The collapsing targets a specific upstream export quirk and is deliberately
/// not extended to nested or mixed quoting styles.
fn clean_prompt_html(raw: &str) -> String {
    let cleaned = raw
        .trim()
        .replace("\"\"", "\"")
        .trim_matches('"')
        .to_string();
    if cleaned.is_empty() {
        MISSING_PROMPT.to_string()
    } else {
        cleaned
    }
}
