//! Content normalization.
//!
//! Pages are compared as link-stripped plain text so that rotating link
//! targets, tracking parameters and markup churn do not register as changes.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use html2text::render::TextDecorator;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Rendering width. Wide enough that paragraphs are never rewrapped.
const WRAP_WIDTH: usize = 4096;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("unsupported charset {0:?}")]
    UnknownCharset(String),

    #[error("could not render markup: {0}")]
    Render(#[from] html2text::Error),
}

/// Convert a raw response body into comparable plain text.
///
/// `charset` is the label from the response's `Content-Type`. Without one
/// the body is read as UTF-8, falling back to windows-1252 when it does not
/// validate.
pub fn normalize(raw: &[u8], charset: Option<&str>) -> Result<String, NormalizeError> {
    let html = decode(raw, charset)?;
    html_to_text(&html)
}

fn decode<'a>(raw: &'a [u8], charset: Option<&str>) -> Result<Cow<'a, str>, NormalizeError> {
    if let Some(label) = charset {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| NormalizeError::UnknownCharset(label.to_string()))?;
        let (text, _, _) = encoding.decode(raw);
        return Ok(text);
    }

    let (text, malformed) = UTF_8.decode_with_bom_removal(raw);
    if malformed {
        return Ok(WINDOWS_1252.decode_with_bom_removal(raw).0);
    }
    Ok(text)
}

/// Render an HTML document as plain text without link targets.
///
/// Each block ends up on its own trimmed line and blank lines are dropped.
/// Headings keep a `#` marker per level and list items a bullet.
pub fn html_to_text(html: &str) -> Result<String, NormalizeError> {
    let rendered = html2text::config::with_decorator(TextOnly)
        .link_footnotes(false)
        .no_table_borders()
        .string_from_read(html.as_bytes(), WRAP_WIDTH)?;

    Ok(rendered
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// SHA-256 of the text, lowercase hex.
pub fn digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Plain text with structural markers but no trace of link targets
#[derive(Clone, Copy, Debug)]
struct TextOnly;

impl TextDecorator for TextOnly {
    type Annotation = ();

    fn decorate_link_start(&mut self, _url: &str) -> (String, ()) {
        (String::new(), ())
    }

    fn decorate_link_end(&mut self) -> String {
        String::new()
    }

    fn decorate_em_start(&self) -> (String, ()) {
        (String::new(), ())
    }

    fn decorate_em_end(&self) -> String {
        String::new()
    }

    fn decorate_strong_start(&self) -> (String, ()) {
        (String::new(), ())
    }

    fn decorate_strong_end(&self) -> String {
        String::new()
    }

    fn decorate_strikeout_start(&self) -> (String, ()) {
        (String::new(), ())
    }

    fn decorate_strikeout_end(&self) -> String {
        String::new()
    }

    fn decorate_code_start(&self) -> (String, ()) {
        (String::new(), ())
    }

    fn decorate_code_end(&self) -> String {
        String::new()
    }

    fn decorate_preformat_first(&self) {}

    fn decorate_preformat_cont(&self) {}

    fn decorate_image(&mut self, _src: &str, title: &str) -> (String, ()) {
        (title.to_string(), ())
    }

    fn header_prefix(&self, level: usize) -> String {
        format!("{} ", "#".repeat(level))
    }

    fn quote_prefix(&self) -> String {
        "> ".to_string()
    }

    fn unordered_item_prefix(&self) -> String {
        "* ".to_string()
    }

    fn ordered_item_prefix(&self, i: i64) -> String {
        format!("{i}. ")
    }

    fn make_subblock_decorator(&self) -> Self {
        TextOnly
    }

    fn decorate_superscript_start(&self) -> (String, ()) {
        (String::new(), ())
    }

    fn decorate_superscript_end(&self) -> String {
        String::new()
    }

    // Link urls are never written out
    fn finalise(&mut self, _urls: Vec<String>) -> Vec<html2text::render::TaggedLine<()>> {
        Vec::new()
    }
}
