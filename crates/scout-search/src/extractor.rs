// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Page fetching and readable-text extraction.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use scout_config::model::ExtractionConfig;
use scout_core::{PageFetcher, ScoutError, with_timeout};

/// Elements whose text never counts as page content.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "iframe", "form", "svg",
    "template", "button",
];

/// Class or id fragments that mark overlays and chrome.
const NOISE_FRAGMENTS: &[&str] = &[
    "popup",
    "banner",
    "cookie",
    "modal",
    "sidebar",
    "newsletter",
    "advert",
    "sponsor",
];

/// Common main-content containers, in order of preference.
const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=main]",
    "#content",
    ".content",
    ".post-content",
    ".entry-content",
    ".article-body",
];

const MAX_REDIRECTS: usize = 5;

/// Fetches pages over HTTP and cleans them with [`clean_html`].
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    client: reqwest::Client,
}

impl ContentExtractor {
    pub fn new(user_agent: &str) -> Result<Self, ScoutError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ScoutError::Upstream {
                service: "web".into(),
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client })
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ScoutError> {
        Self::new(&config.user_agent)
    }

    /// Returns the HTML body, or `None` for non-success or non-HTML responses.
    async fn fetch_html(&self, url: &str) -> Result<Option<String>, ScoutError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            ScoutError::Upstream {
                service: "web".into(),
                message: e.to_string(),
                source: Some(Box::new(e)),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = %status, "page fetch returned non-success status");
            return Ok(None);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !is_html(&content_type) {
            debug!(url, content_type, "skipping non-HTML page");
            return Ok(None);
        }

        let body = response.text().await.map_err(|e| ScoutError::Upstream {
            service: "web".into(),
            message: format!("failed to read body: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(Some(body))
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.starts_with("text/html") || content_type.starts_with("application/xhtml+xml")
}

#[async_trait]
impl PageFetcher for ContentExtractor {
    async fn fetch_and_clean(&self, url: &str, timeout: Duration, max_chars: usize) -> String {
        match url::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                debug!(url, "refusing to fetch non-http URL");
                return String::new();
            }
        }

        match with_timeout("page fetch", timeout, self.fetch_html(url)).await {
            Ok(Some(html)) => clean_html(&html, max_chars),
            Ok(None) => String::new(),
            Err(e) => {
                debug!(url, error = %e, "page fetch failed");
                String::new()
            }
        }
    }
}

fn is_noise_token(token: &str) -> bool {
    let token = token.to_ascii_lowercase();
    token == "ad"
        || token == "ads"
        || token.starts_with("ad-")
        || token.starts_with("ad_")
        || NOISE_FRAGMENTS.iter().any(|f| token.contains(f))
}

fn is_noise(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    if NOISE_TAGS.contains(&value.name()) {
        return true;
    }
    if value.attr("aria-hidden") == Some("true") {
        return true;
    }
    value.classes().any(is_noise_token) || value.id().is_some_and(is_noise_token)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if !is_noise(&child) {
                        collect_text(child, out);
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

fn cleaned_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn main_region(document: &Html) -> Option<String> {
    MAIN_SELECTORS.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .filter(|el| !is_noise(el))
            .map(cleaned_text)
            .find(|text| !text.is_empty())
    })
}

fn body_text(document: &Html) -> String {
    let Ok(selector) = Selector::parse("body") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(cleaned_text)
        .unwrap_or_default()
}

/// Reduces an HTML document to readable text of at most `max_chars` characters.
///
/// Non-content elements and ad or overlay containers are dropped. The first
/// non-empty main-content container wins; otherwise the whole body is used.
pub fn clean_html(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let text = main_region(&document).unwrap_or_else(|| body_text(&document));
    text.chars().take(max_chars).collect()
}
