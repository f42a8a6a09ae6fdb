// Text normalization: strip links before tokenization.
//
// Posts are full of shortened links and bare "www." hosts. They carry no
// topical signal and would otherwise leak fragments like "t.co/abc" into the
// vocabulary. Everything else is left exactly as it was.

use anyhow::{Context, Result};
use regex_lite::Regex;

/// Removes HTTP(S) URLs and "www."-prefixed hosts from raw post text.
pub struct TextNormalizer {
    http_url: Regex,
    www_host: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http_url: Regex::new(r"https?://\S+").context("Invalid URL pattern")?,
            www_host: Regex::new(r"www\.\S+").context("Invalid www pattern")?,
        })
    }

    /// Return `text` with every URL substring replaced by the empty string.
    pub fn normalize(&self, text: &str) -> String {
        let without_urls = self.http_url.replace_all(text, "");
        self.www_host.replace_all(&without_urls, "").into_owned()
    }
}
