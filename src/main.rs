//! Command-line front end for the converter library.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use csv2qti::{convert_csv_file, ConvertOptions, NavigationMode, SubmissionMode};

/// Convert a delimited question bank into a QTI 2.1 assessment package.
#[derive(Debug, Parser)]
#[command(name = "csv2qti", version, about)]
struct Cli {
    /// Input CSV file.
    input: PathBuf,
    /// Output zip file.
    output: PathBuf,
    /// JSON options file; individual flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Field separator.
    #[arg(long)]
    delimiter: Option<String>,
    /// Test display title.
    #[arg(long)]
    title: Option<String>,
    /// Download embedded images into the package and localize their sources.
    #[arg(long)]
    download_images: bool,
    /// Media directory inside the package.
    #[arg(long)]
    media_dir: Option<String>,
    /// Test identifier (default: auto-generated).
    #[arg(long)]
    test_id: Option<String>,
    /// Navigation mode of the generated test.
    #[arg(long, value_enum)]
    navigation_mode: Option<NavigationMode>,
    /// Submission mode of the generated test.
    #[arg(long, value_enum)]
    submission_mode: Option<SubmissionMode>,
    /// Ask delivery engines to shuffle the choices.
    #[arg(long)]
    shuffle: bool,
    /// Maximum number of selectable choices.
    #[arg(long)]
    max_choices: Option<u32>,
}

impl Cli {
    fn into_options(self) -> anyhow::Result<(PathBuf, PathBuf, ConvertOptions)> {
        let mut options = match &self.config {
            Some(path) => ConvertOptions::from_path(path)?,
            None => ConvertOptions::default(),
        };

        if let Some(delimiter) = self.delimiter {
            options.delimiter = delimiter;
        }
        if let Some(title) = self.title {
            options.title = title;
        }
        if let Some(media_dir) = self.media_dir {
            options.media_dir = media_dir;
        }
        if self.test_id.is_some() {
            options.test_id = self.test_id;
        }
        if let Some(navigation_mode) = self.navigation_mode {
            options.navigation_mode = navigation_mode;
        }
        if let Some(submission_mode) = self.submission_mode {
            options.submission_mode = submission_mode;
        }
        if let Some(max_choices) = self.max_choices {
            options.max_choices = max_choices;
        }
        options.download_images |= self.download_images;
        options.shuffle |= self.shuffle;

        Ok((self.input, self.output, options))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (input, output, options) = Cli::parse().into_options()?;

    let bytes = convert_csv_file(&input, &options)
        .with_context(|| format!("failed to convert {}", input.display()))?;
    fs::write(&output, &bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(package = %output.display(), "assessment package written");
    Ok(())
}
