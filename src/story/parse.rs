//! `SETUP:` / `TWIST:` section splitting.

const EMPHASIS: [char; 4] = ['*', '_', '#', ' '];

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Setup,
    Twist,
}

/// Returns the text after a `name:` header at the start of `line`, ignoring case and
/// markdown emphasis (`**SETUP:**`, `## Twist:`, `__Setup__:`).
fn header<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let line = line.trim().trim_start_matches(EMPHASIS);
    let head = line.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    let rest = line[name.len()..].trim_start_matches(EMPHASIS);
    let rest = rest.strip_prefix(':')?;
    Some(rest.trim_start_matches(EMPHASIS))
}

fn finish(parts: &[&str]) -> String {
    parts
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '*' || c == '_')
        .trim()
        .to_string()
}

/// Splits model output into `(setup, twist)`.
///
/// The setup runs from the SETUP header to the TWIST header and the twist runs to
/// the end. Returns `None` unless both headers appear in that order. Sections may
/// still be empty; callers validate them.
pub fn split_sections(raw: &str) -> Option<(String, String)> {
    let mut section = Section::Preamble;
    let mut setup: Vec<&str> = Vec::new();
    let mut twist: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if section != Section::Twist
            && let Some(rest) = header(line, "twist").or_else(|| header(line, "hidden twist"))
        {
            if section == Section::Preamble {
                return None;
            }
            section = Section::Twist;
            twist.push(rest);
            continue;
        }
        if section == Section::Preamble
            && let Some(rest) = header(line, "setup").or_else(|| header(line, "story setup"))
        {
            section = Section::Setup;
            setup.push(rest);
            continue;
        }
        match section {
            Section::Preamble => {}
            Section::Setup => setup.push(line),
            Section::Twist => twist.push(line),
        }
    }

    (section == Section::Twist).then(|| (finish(&setup), finish(&twist)))
}
