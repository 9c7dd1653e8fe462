use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffTag, capture_diff_slices, group_diff_ops};

use super::DetectionStrategy;

/// Lines of unchanged context around each hunk
const CONTEXT_LINES: usize = 3;

/// Full normalized text of the last fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffState {
    pub content: String,
}

impl DiffState {
    pub fn seed(text: &str) -> Self {
        Self { content: text.to_string() }
    }
}

impl DetectionStrategy for DiffState {
    fn evaluate(&mut self, url: &str, text: &str) -> Option<String> {
        if text == self.content {
            return None;
        }

        let lines = context_diff(
            &self.content,
            text,
            &format!("Old content for {url}"),
            &format!("New content for {url}"),
            CONTEXT_LINES,
        );
        self.content = text.to_string();
        Some(lines.join("\n"))
    }
}

/// Render a line-oriented context diff.
///
/// Unchanged lines are prefixed with two spaces, replaced lines with `! `,
/// removed lines with `- ` and added lines with `+ `. Each hunk shows the old
/// range followed by the new range. Returns no lines for equal input.
pub fn context_diff(
    old: &str,
    new: &str,
    from_file: &str,
    to_file: &str,
    context: usize,
) -> Vec<String> {
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();
    let groups = group_diff_ops(capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines), context);
    if groups.is_empty() {
        return Vec::new();
    }

    let mut out = vec![format!("*** {from_file}"), format!("--- {to_file}")];
    for group in &groups {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        out.push("***************".to_string());

        out.push(format!(
            "*** {} ****",
            format_range(first.old_range().start, last.old_range().end)
        ));
        if group.iter().any(|op| matches!(op.tag(), DiffTag::Replace | DiffTag::Delete)) {
            for op in group {
                let (tag, old_range, _) = op.as_tag_tuple();
                if tag == DiffTag::Insert {
                    continue;
                }
                for line in &old_lines[old_range] {
                    out.push(format!("{}{line}", marker(tag)));
                }
            }
        }

        out.push(format!(
            "--- {} ----",
            format_range(first.new_range().start, last.new_range().end)
        ));
        if group.iter().any(|op| matches!(op.tag(), DiffTag::Replace | DiffTag::Insert)) {
            for op in group {
                let (tag, _, new_range) = op.as_tag_tuple();
                if tag == DiffTag::Delete {
                    continue;
                }
                for line in &new_lines[new_range] {
                    out.push(format!("{}{line}", marker(tag)));
                }
            }
        }
    }
    out
}

fn marker(tag: DiffTag) -> &'static str {
    match tag {
        DiffTag::Equal => "  ",
        DiffTag::Delete => "- ",
        DiffTag::Insert => "+ ",
        DiffTag::Replace => "! ",
    }
}

/// 1-based `start,end` range, or a single line number for short ranges
fn format_range(start: usize, stop: usize) -> String {
    let length = stop - start;
    let beginning = if length == 0 { start } else { start + 1 };
    if length <= 1 {
        beginning.to_string()
    } else {
        format!("{},{}", beginning, beginning + length - 1)
    }
}
