//! Section splitting — line scanner over the raw configuration text.
//!
//! A section begins at a line matching `^\w+:` and extends until a line
//! consisting of `#` (optionally trailed by whitespace) or end of input.
//! Sections never nest: header-like lines seen inside an open section are
//! ordinary body text, and only a terminator (or EOF) closes a section.

/// One contiguous section of the source text.
///
/// Created once per parse, immutable, consumed by the record stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    /// Header name — the token before the `:` on the opening line.
    pub name: String,
    /// The complete opening line, e.g. `EIO:CFG_1.0:6:1::`.
    ///
    /// The root section carries its version fields here.
    pub header_line: String,
    /// Body lines between the header and the terminator, joined with `\n`.
    pub body: String,
}

/// Scanner state: outside any section, or collecting one.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    Idle,
    InSection {
        name: String,
        header_line: String,
        body: Vec<String>,
    },
}

/// Split raw configuration text into an ordered sequence of sections.
///
/// Empty or unmatched input yields an empty sequence — whether that is a
/// problem is decided by the caller, not here. An open section at end of
/// input is closed as if terminated.
pub fn split_sections(text: &str) -> Vec<RawSection> {
    let mut sections = Vec::new();
    let mut state = ScanState::Idle;

    for line in text.lines() {
        state = match state {
            ScanState::Idle => match header_name(line) {
                Some(name) => ScanState::InSection {
                    name: name.to_string(),
                    header_line: line.to_string(),
                    body: Vec::new(),
                },
                // Noise between sections is skipped.
                None => ScanState::Idle,
            },
            ScanState::InSection {
                name,
                header_line,
                mut body,
            } => {
                if is_terminator(line) {
                    sections.push(RawSection {
                        name,
                        header_line,
                        body: body.join("\n"),
                    });
                    ScanState::Idle
                } else {
                    body.push(line.to_string());
                    ScanState::InSection {
                        name,
                        header_line,
                        body,
                    }
                }
            }
        };
    }

    // EOF closes an open section.
    if let ScanState::InSection {
        name,
        header_line,
        body,
    } = state
    {
        sections.push(RawSection {
            name,
            header_line,
            body: body.join("\n"),
        });
    }

    sections
}

/// Extract the header name if `line` opens a section (`^\w+:`).
fn header_name(line: &str) -> Option<&str> {
    let colon = line.find(':')?;
    if colon == 0 {
        return None;
    }
    let name = &line[..colon];
    if name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Some(name)
    } else {
        None
    }
}

/// A terminator is a line consisting of `#`, optionally trailed by whitespace.
fn is_terminator(line: &str) -> bool {
    line.trim_end() == "#"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_sections() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("\n\n").is_empty());
    }

    #[test]
    fn unmatched_input_yields_no_sections() {
        assert!(split_sections("no header here\njust text\n").is_empty());
    }

    #[test]
    fn single_section_with_terminator() {
        let text = "EIO_SIGNAL:\n  -Name \"di1\"\n#\n";
        let sections = split_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "EIO_SIGNAL");
        assert_eq!(sections[0].header_line, "EIO_SIGNAL:");
        assert_eq!(sections[0].body, "  -Name \"di1\"");
    }

    #[test]
    fn section_closed_by_eof() {
        let sections = split_sections("EIO_UNIT:\n  -Name \"d1\"");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "EIO_UNIT");
    }

    #[test]
    fn multiple_sections_in_order() {
        let text = "EIO:CFG_1.0:6:1::\n#\nEIO_SIGNAL:\n  -Name \"a\"\n#\nEIO_CROSS:\n#\n";
        let sections = split_sections(text);
        let names: Vec<_> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["EIO", "EIO_SIGNAL", "EIO_CROSS"]);
    }

    #[test]
    fn header_like_line_inside_section_is_body() {
        // `SUB_HEADER:` appears before any terminator — it belongs to
        // the open section, it does not start a new one.
        let text = "TOP:\nSUB_HEADER:\n  -Name \"x\"\n#\n";
        let sections = split_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "TOP");
        assert!(sections[0].body.contains("SUB_HEADER:"));
    }

    #[test]
    fn terminator_with_trailing_whitespace() {
        let sections = split_sections("A:\n#   \nB:\n#\n");
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn indented_header_is_not_a_header() {
        // Headers are anchored at the line start.
        let sections = split_sections("  A:\n");
        assert!(sections.is_empty());
    }

    #[test]
    fn noise_between_sections_is_skipped() {
        let text = "A:\n#\nsome stray text\nB:\n#\n";
        let sections = split_sections(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].name, "B");
    }
}
