//! Identifier sanitization and collision-safe name allocation.

use std::collections::BTreeSet;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Strip characters that are unsafe in filenames or XML attribute values.
///
/// Keeps ASCII alphanumerics, `-`, `_` and interior dots; leading and trailing
/// dots are removed so the result can never name a relative path segment.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

/// Synthesize the positional placeholder identifier for a row, 1-indexed.
pub fn placeholder_identifier(ordinal: usize) -> String {
    format!("Q{ordinal:04}")
}

/// Random alphanumeric suffix used for auto-generated test and manifest ids.
///
/// Uniqueness is best-effort per run; repeated invocations writing to the same
/// destination may collide.
pub fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Run-scoped registry handing out names that are unique within one conversion.
///
/// Collisions are resolved by appending `_<n>` to the stem, retried with an
/// incrementing counter until the candidate is free. Comparison is
/// case-sensitive. One registry instance is created per run and threaded
/// through explicitly, so concurrent runs in one process cannot interfere.
#[derive(Debug, Default)]
pub struct NameRegistry {
    used: BTreeSet<String>,
}

impl NameRegistry {
    /// Reserve a unique name built from `stem` + `extension`.
    ///
    /// The suffix is inserted between the stem and the extension, so a second
    /// `("Q1", ".png")` reservation yields `Q1_1.png`. Pass an empty extension
    /// to reserve bare identifiers.
    pub fn reserve(&mut self, stem: &str, extension: &str) -> String {
        let mut candidate = format!("{stem}{extension}");
        let mut counter = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{stem}_{counter}{extension}");
            counter += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}
