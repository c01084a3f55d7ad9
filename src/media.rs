//! Localization of remote images referenced by prompt markup.
//!
//! Only the first `<img>` source of a prompt is considered, and only when it
//! points at an http(s) URL; relative paths and data URIs cannot be fetched
//! and are left untouched. A failed fetch is a per-row warning, never a
//! run-aborting error.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;

use crate::error::ConvertError;
use crate::models::MediaAsset;
use crate::naming::NameRegistry;

/// Upper bound on one media download. Fetches are not retried.
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Extension assumed when the URL path carries none.
const DEFAULT_EXTENSION: &str = ".png";

fn image_src_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(<img[^>]+src=["'])([^"']+)(["'])"#).expect("invalid img src regex")
    })
}

fn remote_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^https?://").expect("invalid http(s) regex"))
}

/// First image source attribute found in the markup, if any.
pub fn extract_first_image_url(markup: &str) -> Option<&str> {
    image_src_pattern()
        .captures(markup)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Rewrite the first image source attribute to `new_src`, leaving any further
/// image tags alone.
pub fn replace_first_image_src(markup: &str, new_src: &str) -> String {
    image_src_pattern()
        .replace(markup, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", &caps[1], new_src, &caps[3])
        })
        .into_owned()
}

/// Whether a reference can be fetched over the network at all.
pub fn is_remote_url(value: &str) -> bool {
    remote_url_pattern().is_match(value)
}

/// File extension taken from the path component of `url`, dot included.
///
/// Query strings and fragments are ignored, a bare host or extension-less
/// path falls back to `.png`, and the result is filtered down to
/// filename-safe characters.
pub fn extension_from_url(url: &str) -> String {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = after_scheme.split_once('/').map_or("", |(_, path)| path);
    let path = path.split(['?', '#']).next().unwrap_or("");
    let name = path.rsplit('/').next().unwrap_or("");

    match name.rfind('.') {
        Some(index) if index > 0 && index + 1 < name.len() => {
            let extension: String = name[index..]
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
                .collect();
            if extension.len() > 1 {
                extension
            } else {
                DEFAULT_EXTENSION.to_string()
            }
        }
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// Outcome of one media download.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The full binary body.
    Fetched(Vec<u8>),
    /// Human-readable reason the download was abandoned.
    Failed(String),
}

/// Blocking HTTP fetcher shared by every localization of one run.
#[derive(Debug)]
pub struct MediaFetcher {
    client: Client,
}

impl MediaFetcher {
    /// Build a fetcher with the fixed per-request timeout.
    pub fn new() -> Result<Self, ConvertError> {
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self { client })
    }

    /// Download the binary content at `url`, converting every failure mode
    /// (connect error, timeout, non-success status, truncated body) into
    /// [`FetchOutcome::Failed`].
    pub fn fetch(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(err) => return FetchOutcome::Failed(err.to_string()),
        };
        if !response.status().is_success() {
            return FetchOutcome::Failed(format!("server responded with {}", response.status()));
        }
        match response.bytes() {
            Ok(bytes) => FetchOutcome::Fetched(bytes.to_vec()),
            Err(err) => FetchOutcome::Failed(err.to_string()),
        }
    }
}

/// Result of localizing one prompt.
#[derive(Debug)]
pub struct LocalizedPrompt {
    /// Markup with the first image source rewritten when the fetch succeeded.
    pub markup: String,
    /// Fetched payload, absent when there was nothing to fetch or it failed.
    pub asset: Option<MediaAsset>,
}

impl LocalizedPrompt {
    fn passthrough(markup: &str) -> Self {
        Self {
            markup: markup.to_string(),
            asset: None,
        }
    }
}

/// Localize the first remote image of `markup` into `media_dir`.
///
/// The local filename is reserved in `registry` before the download starts,
/// so a failed fetch still consumes the name; this keeps naming deterministic
/// regardless of which downloads succeed.
pub fn localize_prompt(
    markup: &str,
    identifier: &str,
    registry: &mut NameRegistry,
    media_dir: &str,
    fetcher: &MediaFetcher,
) -> LocalizedPrompt {
    let Some(url) = extract_first_image_url(markup) else {
        return LocalizedPrompt::passthrough(markup);
    };
    if !is_remote_url(url) {
        tracing::debug!(identifier, url, "image source is not remote; leaving as-is");
        return LocalizedPrompt::passthrough(markup);
    }

    let extension = extension_from_url(url);
    let file_name = registry.reserve(identifier, &extension);
    let local_path = format!("{media_dir}/{file_name}");

    match fetcher.fetch(url) {
        FetchOutcome::Fetched(bytes) => LocalizedPrompt {
            markup: replace_first_image_src(markup, &local_path),
            asset: Some(MediaAsset {
                path: local_path,
                bytes,
            }),
        },
        FetchOutcome::Failed(reason) => {
            tracing::warn!(identifier, url, %reason, "image download failed; keeping remote URL");
            LocalizedPrompt::passthrough(markup)
        }
    }
}
