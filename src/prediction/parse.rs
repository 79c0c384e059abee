//! Extraction of twist candidates from free-form model output.

use std::collections::HashSet;

/// Candidates shorter than this (in characters) are discarded.
pub const MIN_CANDIDATE_CHARS: usize = 10;

/// Returns the text after a list marker (`1.`, `2)`, `-`, `*`, `•`), or `None` when
/// the line does not start with one.
fn strip_marker(line: &str) -> Option<&str> {
    let line = line.trim_start();

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        let after = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
        return (after.is_empty() || after.starts_with(char::is_whitespace)).then_some(after);
    }

    for bullet in ['-', '*', '•'] {
        if let Some(after) = line.strip_prefix(bullet)
            && (after.is_empty() || after.starts_with(char::is_whitespace))
        {
            return Some(after);
        }
    }
    None
}

fn clean(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '*' || c == '_')
        .trim()
        .to_string()
}

/// Parses ranked candidates from raw output.
///
/// A marked line starts a candidate and the unmarked lines directly below it are
/// appended; a blank line ends it. Text before the first marker is ignored. With no
/// markers at all the first paragraph is the only candidate. Short candidates and
/// case-insensitive duplicates are dropped, order is preserved.
pub fn parse_candidates(raw: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    let mut saw_marker = false;

    for line in raw.lines() {
        if let Some(rest) = strip_marker(line) {
            saw_marker = true;
            if let Some(done) = current.take() {
                blocks.push(done);
            }
            current = Some(rest.trim().to_string());
        } else if line.trim().is_empty() {
            if let Some(done) = current.take() {
                blocks.push(done);
            }
        } else if let Some(block) = current.as_mut() {
            block.push(' ');
            block.push_str(line.trim());
        }
    }
    if let Some(done) = current.take() {
        blocks.push(done);
    }

    if !saw_marker {
        blocks = first_paragraph(raw).into_iter().collect();
    }

    let mut seen = HashSet::new();
    blocks
        .into_iter()
        .map(|b| clean(&b))
        .filter(|c| c.chars().count() >= MIN_CANDIDATE_CHARS)
        .filter(|c| seen.insert(c.to_lowercase()))
        .collect()
}

fn first_paragraph(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw
        .lines()
        .skip_while(|l| l.trim().is_empty())
        .take_while(|l| !l.trim().is_empty())
        .map(str::trim)
        .collect();
    (!lines.is_empty()).then(|| lines.join(" "))
}
