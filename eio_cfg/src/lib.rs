//! EIO Configuration Parser
//!
//! This crate parses robot controller `EIO.cfg` I/O configuration files
//! into a generic attributed tree. The format is a concatenation of
//! sections, each beginning with a `HEADER:` line and ending at a line
//! containing only `#` (or end of file). Data lines begin with `-` and
//! carry `-AttrName value` pairs; a trailing `\` continues the logical
//! line. The first section carries the format name and version:
//!
//! ```text
//! EIO:CFG_1.0:6:1::
//! #
//! EIO_SIGNAL:
//!
//!       -Name "diStart" -SignalType "DI" -Device "d652_1" -DeviceMap "0"
//! #
//! ```
//!
//! # Module Structure
//!
//! - [`section`] - Line scanner splitting raw text into sections
//! - [`record`] - Dataset assembly and `-Name value` tokenizer
//! - [`tree`] - Generic attributed tree builder and file discovery
//! - [`report`] - Side-channel parse issue reporting
//!
//! Parsing is best-effort: malformed input produces an empty or partial
//! tree plus a [`report::ParseReport`], never an `Err` past the parser
//! boundary.

pub mod record;
pub mod report;
pub mod section;
pub mod tree;

pub use record::CfgRecord;
pub use report::{ParseIssue, ParseReport, Severity};
pub use section::{RawSection, split_sections};
pub use tree::{CfgRoot, CfgSection, CfgTree, find_and_parse, find_cfg_file, parse_file, parse_str};
