//! Bulk import file format.
//!
//! One check per line:
//!
//! ```text
//! # comment
//! hash|https://example.com
//! md5|https://example.com|86400|3600|30
//! string|Sold out|https://example.com/item
//! diff|https://example.com/changelog|600|300|10
//! ```
//!
//! Anything after `#` is ignored, as is trailing whitespace. The three
//! settings are max down time, check frequency and timeout in seconds; they
//! are all given or all omitted.

use thiserror::Error;

use crate::database::{CheckKind, CheckSettings, CheckSpec};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Import failed: {line} is not formatted correctly")]
    Malformed { line_number: usize, line: String },

    #[error("Import failed on line {line_number} ({line}): {reason}")]
    InvalidSettings { line_number: usize, line: String, reason: String },
}

impl ImportError {
    pub fn line_number(&self) -> usize {
        match self {
            ImportError::Malformed { line_number, .. }
            | ImportError::InvalidSettings { line_number, .. } => *line_number,
        }
    }
}

/// One parsed import line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// 1-based line number in the import file
    pub line_number: usize,
    pub url: String,
    pub spec: CheckSpec,
    pub settings: CheckSettings,
}

/// Parse one line. Blank and comment-only lines give `Ok(None)`.
pub fn parse_line(
    line_number: usize,
    raw: &str,
    defaults: &CheckSettings,
) -> Result<Option<ImportEntry>, ImportError> {
    let line = raw.split('#').next().unwrap_or_default().trim_end();
    if line.is_empty() {
        return Ok(None);
    }

    let malformed = || ImportError::Malformed { line_number, line: line.to_string() };

    let (kind, data) = line.split_once('|').ok_or_else(malformed)?;
    let kind: CheckKind = kind.parse().map_err(|_| malformed())?;

    let (spec, data) = match kind {
        CheckKind::Hash => (CheckSpec::Hash, data),
        CheckKind::Diff => (CheckSpec::Diff, data),
        CheckKind::Presence => {
            let (target, rest) = data.split_once('|').ok_or_else(malformed)?;
            (CheckSpec::Presence { target: target.to_string() }, rest)
        }
    };

    let fields: Vec<&str> = data.split('|').collect();
    let (url, settings) = match fields.as_slice() {
        [url] => (*url, *defaults),
        [url, max_down_time, check_frequency, check_timeout] => {
            let settings = CheckSettings::parse(max_down_time, check_frequency, check_timeout)
                .map_err(|e| ImportError::InvalidSettings {
                    line_number,
                    line: line.to_string(),
                    reason: e.to_string(),
                })?;
            (*url, settings)
        }
        _ => return Err(malformed()),
    };

    Ok(Some(ImportEntry { line_number, url: url.to_string(), spec, settings }))
}
