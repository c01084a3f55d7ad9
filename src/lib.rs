#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod naming;
pub mod normalize;
pub mod package;
pub mod qti;

pub use config::{ConvertOptions, NavigationMode, SubmissionMode};
pub use error::ConvertError;
pub use package::{assemble, convert_csv_file, convert_csv_str};
