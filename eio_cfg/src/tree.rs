//! Generic attributed tree built from the parsed sections.
//!
//! Two-phase pipeline: the untyped tree built here isolates format quirks
//! from domain logic; typed device/signal projections live downstream.
//! The first section must carry the root header `NAME:ANYTHING:MAJOR:MINOR::`
//! (e.g. `EIO:CFG_1.0:6:1::`); every following section becomes a child
//! collection of item records named after its own header.

use std::fs;
use std::path::{Path, PathBuf};

use crate::record::{CfgRecord, parse_records};
use crate::report::{ParseIssue, ParseReport};
use crate::section::{RawSection, split_sections};

/// File name searched for by [`find_cfg_file`].
pub const CFG_FILE_NAME: &str = "EIO.cfg";

/// Tree root: format name, version and source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgRoot {
    /// Root element name (`EIO`).
    pub name: String,
    /// `MAJOR.MINOR`, e.g. `6.1`.
    pub version: String,
    /// Originating file path (empty when parsed from a string).
    pub file_name: String,
}

/// One named child collection — a section's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgSection {
    pub name: String,
    pub items: Vec<CfgRecord>,
}

/// Generic attributed tree.
///
/// Downstream consumers must tolerate an empty tree (`root == None`):
/// that is the contract for malformed input, not a panic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfgTree {
    pub root: Option<CfgRoot>,
    pub sections: Vec<CfgSection>,
}

impl CfgTree {
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// All sections with the given name, in document order.
    pub fn sections_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CfgSection> {
        self.sections.iter().filter(move |s| s.name == name)
    }

    /// All items of all sections with the given name, in document order.
    pub fn items_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CfgRecord> {
        self.sections_named(name).flat_map(|s| s.items.iter())
    }
}

/// Parse configuration text into a tree.
///
/// `source` labels the origin (file path, or empty) in the root and in
/// report messages.
pub fn parse_str(text: &str, source: &str) -> (CfgTree, ParseReport) {
    let mut report = ParseReport::new();
    let tree = build_tree(split_sections(text), source, &mut report);
    (tree, report)
}

/// Read and parse a configuration file.
///
/// Input errors yield an empty tree plus a report entry, never an `Err`.
pub fn parse_file(path: &Path) -> (CfgTree, ParseReport) {
    let mut report = ParseReport::new();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            report.push(ParseIssue::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            });
            return (CfgTree::default(), report);
        }
    };
    // Absolute path when resolvable, as-given otherwise.
    let source = fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string();
    let tree = build_tree(split_sections(&text), &source, &mut report);
    (tree, report)
}

/// Recursively locate the first `EIO.cfg` under `directory`.
pub fn find_cfg_file(directory: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(directory).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.eq_ignore_ascii_case(CFG_FILE_NAME))
        {
            return Some(path);
        }
    }
    subdirs.into_iter().find_map(|d| find_cfg_file(&d))
}

/// Locate and parse the `EIO.cfg` under `directory`.
pub fn find_and_parse(directory: &Path) -> (CfgTree, ParseReport) {
    let mut report = ParseReport::new();
    if !directory.is_dir() {
        report.push(ParseIssue::DirectoryNotFound(
            directory.display().to_string(),
        ));
        return (CfgTree::default(), report);
    }
    match find_cfg_file(directory) {
        Some(file) => parse_file(&file),
        None => {
            report.push(ParseIssue::CfgFileNotFound {
                file: CFG_FILE_NAME.to_string(),
                dir: directory.display().to_string(),
            });
            (CfgTree::default(), report)
        }
    }
}

/// Build the tree from split sections.
fn build_tree(sections: Vec<RawSection>, source: &str, report: &mut ParseReport) -> CfgTree {
    let mut iter = sections.into_iter();

    let first = match iter.next() {
        Some(first) => first,
        None => {
            report.push(ParseIssue::NoSections {
                path: source.to_string(),
            });
            return CfgTree::default();
        }
    };

    let root = match parse_root_header(&first.header_line) {
        Some((name, version)) => CfgRoot {
            name,
            version,
            file_name: source.to_string(),
        },
        None => {
            report.push(ParseIssue::RootHeaderMismatch {
                header: first.header_line.clone(),
            });
            return CfgTree::default();
        }
    };

    let sections = iter
        .map(|section| CfgSection {
            items: parse_records(&section),
            name: section.name,
        })
        .collect();

    CfgTree {
        root: Some(root),
        sections,
    }
}

/// Match `NAME:ANYTHING:MAJOR:MINOR::` and return `(name, "MAJOR.MINOR")`.
///
/// Over the colon-split fields, the first all-digit pair followed by an
/// empty field and at least one more separator binds MAJOR/MINOR. At
/// least one field sits between NAME and MAJOR.
fn parse_root_header(header_line: &str) -> Option<(String, String)> {
    let fields: Vec<&str> = header_line.split(':').collect();
    let name = *fields.first()?;
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }

    for w in 2..fields.len() {
        if is_digits(fields[w])
            && fields.get(w + 1).is_some_and(|f| is_digits(f))
            && fields.get(w + 2).is_some_and(|f| f.is_empty())
            && fields.len() > w + 3
        {
            return Some((
                name.to_string(),
                format!("{}.{}", fields[w], fields[w + 1]),
            ));
        }
    }
    None
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
