//! Conversion options and their JSON file loader.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::ConvertError;

/// Navigation mode advertised by the generated test document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// Items must be visited in order.
    Linear,
    /// Items may be visited in any order.
    #[default]
    Nonlinear,
}

impl NavigationMode {
    /// The enumeration token emitted into the test document.
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationMode::Linear => "linear",
            NavigationMode::Nonlinear => "nonlinear",
        }
    }
}

/// Submission mode advertised by the generated test document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionMode {
    /// Each response is submitted as it is answered.
    #[default]
    Individual,
    /// All responses are submitted together.
    Simultaneous,
}

impl SubmissionMode {
    /// The enumeration token emitted into the test document.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionMode::Individual => "individual",
            SubmissionMode::Simultaneous => "simultaneous",
        }
    }
}

/// Options recognized by a conversion run.
///
/// Deserializes from camelCase JSON so a single options file can be shared
/// with other tooling; every field falls back to its default when omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Field separator for the delimited input; only the first byte is used.
    pub delimiter: String,
    /// Display title of the generated test.
    pub title: String,
    /// Fetch embedded remote images into the package and rewrite their sources.
    pub download_images: bool,
    /// Directory inside the package that receives fetched media.
    pub media_dir: String,
    /// Test identifier; auto-generated with a random suffix when absent.
    pub test_id: Option<String>,
    /// Navigation mode passed through to the test document.
    pub navigation_mode: NavigationMode,
    /// Submission mode passed through to the test document.
    pub submission_mode: SubmissionMode,
    /// Whether delivery engines should shuffle the choice order.
    pub shuffle: bool,
    /// Maximum number of selectable choices per item.
    pub max_choices: u32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            delimiter: ";".into(),
            title: "Imported question pool".into(),
            download_images: false,
            media_dir: "media".into(),
            test_id: None,
            navigation_mode: NavigationMode::default(),
            submission_mode: SubmissionMode::default(),
            shuffle: false,
            max_choices: 1,
        }
    }
}

impl ConvertOptions {
    /// Read options from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
        let content = fs::read_to_string(path).map_err(|source| ConvertError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConvertError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The delimiter as a single byte, falling back to `;` when unset.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.bytes().next().unwrap_or(b';')
    }
}
