//! Data structures produced while converting rows into a package.

use std::fmt;

/// One of the four fixed answer labels a question can declare correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Choice {
    /// Label `A`, also the fallback for absent or unrecognized values.
    #[default]
    A,
    /// Label `B`.
    B,
    /// Label `C`.
    C,
    /// Label `D`.
    D,
}

impl Choice {
    /// All labels in presentation order.
    pub const LABELS: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    /// Parse a raw cell value, falling back to `A` for anything unrecognized.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "B" => Choice::B,
            "C" => Choice::C,
            "D" => Choice::D,
            _ => Choice::A,
        }
    }

    /// The label as it appears in generated documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::A => "A",
            Choice::B => "B",
            Choice::C => "C",
            Choice::D => "D",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized, validated representation of one accepted input row.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    /// Filesystem-and-XML-safe identifier, unique within the run.
    pub identifier: String,
    /// Display title; falls back to the identifier when the title column is empty.
    pub title: String,
    /// Score weight declared as the outcome default.
    pub points: f64,
    /// HTML fragment rendered as the question prompt.
    pub prompt_html: String,
    /// Label of the correct answer.
    pub correct_choice: Choice,
}

/// Binary payload destined for the package, keyed by its archive path.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    /// Package-relative path, e.g. `media/Q0001.png`.
    pub path: String,
    /// Raw fetched content.
    pub bytes: Vec<u8>,
}

/// Reference from the test document to one item document.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRef {
    /// Reference identifier, `REF-<identifier>`.
    pub ref_id: String,
    /// Item document path within the package.
    pub href: String,
}

/// One resource entry of the manifest document.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    /// Manifest-unique resource identifier, `RES-<id>`.
    pub identifier: String,
    /// Path of the file backing the resource.
    pub href: String,
}
