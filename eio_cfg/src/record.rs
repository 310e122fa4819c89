//! Record parsing — datasets and the `-Name value` tokenizer.
//!
//! A section body is first grouped into datasets: logical lines where a
//! trailing `\` continues onto the next physical line. Each dataset is
//! then tokenized into attribute name/value pairs. Values are kept as the
//! literal source text — `2.5E+3` stays `2.5E+3` — because downstream
//! consumers parse them with context.

use crate::section::RawSection;

/// One configuration item: an ordered set of named attributes.
///
/// Attribute names are unique within a record; insertion order is
/// preserved. Lookup is a linear scan — records carry a handful of
/// attributes at most.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfgRecord {
    attrs: Vec<(String, String)>,
}

impl CfgRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute. A duplicate name is ignored (first wins).
    pub fn push(&mut self, name: &str, value: String) {
        if self.get(name).is_none() {
            self.attrs.push((name.to_string(), value));
        }
    }

    /// Attribute value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// Parse all datasets of a section into records, preserving order.
pub fn parse_records(section: &RawSection) -> Vec<CfgRecord> {
    datasets(&section.body)
        .iter()
        .map(|ds| parse_dataset(ds))
        .collect()
}

/// Group body lines into datasets.
///
/// A line ending with `\` is stripped, trimmed and joined (with a single
/// space) to the following line. A completed line not starting with `-`
/// is comment/noise and is discarded.
pub fn datasets(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pending = String::new();

    for raw in body.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.ends_with('\\') {
            pending.push_str(line.trim_end_matches('\\').trim_end());
            pending.push(' ');
            continue;
        }
        if !line.starts_with('-') {
            continue;
        }
        if pending.is_empty() {
            out.push(line.to_string());
        } else {
            pending.push_str(line);
            out.push(std::mem::take(&mut pending));
        }
    }

    out
}

/// Tokenize one dataset into a record.
///
/// An attribute is `-Name` followed by one of:
/// - nothing (end of dataset, or the next `-Name`) — empty value,
/// - a bare numeric literal `-?\d+([.,]\d+(E[+-]\d+)?)?` — captured verbatim,
/// - a double-quoted string — quotes stripped.
///
/// A `-` followed by a digit is a negative number, not an attribute name.
pub fn parse_dataset(dataset: &str) -> CfgRecord {
    let bytes = dataset.as_bytes();
    let mut record = CfgRecord::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'-'
            && i + 1 < bytes.len()
            && is_word_byte(bytes[i + 1])
            && !bytes[i + 1].is_ascii_digit()
            && (i == 0 || bytes[i - 1].is_ascii_whitespace())
        {
            let name_start = i + 1;
            let mut j = name_start;
            while j < bytes.len() && is_word_byte(bytes[j]) {
                j += 1;
            }
            let name = &dataset[name_start..j];

            // Skip whitespace between name and value.
            let mut k = j;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }

            let (value, next) = scan_value(dataset, k);
            record.push(name, value);
            i = next.max(j);
        } else {
            i += 1;
        }
    }

    record
}

/// Scan a value starting at byte `k`. Returns the value and the position
/// after it; an empty value does not consume input.
fn scan_value(s: &str, k: usize) -> (String, usize) {
    let bytes = s.as_bytes();
    if k >= bytes.len() {
        return (String::new(), k);
    }
    match bytes[k] {
        b'"' => match s[k + 1..].find('"') {
            Some(rel) => (s[k + 1..k + 1 + rel].to_string(), k + rel + 2),
            // Unterminated quote: no value.
            None => (String::new(), k + 1),
        },
        b'-' if k + 1 < bytes.len() && bytes[k + 1].is_ascii_digit() => scan_numeric(s, k),
        d if d.is_ascii_digit() => scan_numeric(s, k),
        // Next attribute, or a stray bare token: no value.
        _ => (String::new(), k),
    }
}

/// Scan `-?\d+([.,]\d+(E[+-]\d+)?)?` verbatim.
fn scan_numeric(s: &str, k: usize) -> (String, usize) {
    let bytes = s.as_bytes();
    let mut j = k;
    if bytes[j] == b'-' {
        j += 1;
    }
    while j < bytes.len() && bytes[j].is_ascii_digit() {
        j += 1;
    }
    // Optional fraction with `.` or `,` as the decimal separator.
    if j + 1 < bytes.len() && (bytes[j] == b'.' || bytes[j] == b',') && bytes[j + 1].is_ascii_digit()
    {
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        // Exponent only follows a fraction: `E` with a mandatory sign.
        if j + 2 < bytes.len()
            && bytes[j] == b'E'
            && (bytes[j + 1] == b'+' || bytes[j + 1] == b'-')
            && bytes[j + 2].is_ascii_digit()
        {
            j += 2;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
        }
    }
    (s[k..j].to_string(), j)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_values() {
        let rec = parse_dataset(r#"-Name "diCollTorqueSup" -SignalType "DI""#);
        assert_eq!(rec.get("Name"), Some("diCollTorqueSup"));
        assert_eq!(rec.get("SignalType"), Some("DI"));
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn numeric_values_kept_verbatim() {
        let rec = parse_dataset("-SlotIndex 2 -Offset -7 -Index 2.5E+3 -Scale 0,25");
        assert_eq!(rec.get("SlotIndex"), Some("2"));
        assert_eq!(rec.get("Offset"), Some("-7"));
        assert_eq!(rec.get("Index"), Some("2.5E+3"));
        assert_eq!(rec.get("Scale"), Some("0,25"));
    }

    #[test]
    fn name_without_value() {
        let rec = parse_dataset("-Simulated -Name \"d1\"");
        assert_eq!(rec.get("Simulated"), Some(""));
        assert_eq!(rec.get("Name"), Some("d1"));
    }

    #[test]
    fn trailing_name_without_value() {
        let rec = parse_dataset("-Name \"x\" -Unit");
        assert_eq!(rec.get("Unit"), Some(""));
    }

    #[test]
    fn negative_number_is_a_value_not_a_name() {
        let rec = parse_dataset("-MinLog -100 -MaxLog 100");
        assert_eq!(rec.get("MinLog"), Some("-100"));
        assert_eq!(rec.get("MaxLog"), Some("100"));
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn quoted_value_with_spaces() {
        let rec = parse_dataset(r#"-Label "collision torque ROB_R""#);
        assert_eq!(rec.get("Label"), Some("collision torque ROB_R"));
    }

    #[test]
    fn continuation_joined_like_single_line() {
        let joined = datasets("-Name \"A\" \\\n-Value 1");
        let flat = datasets("-Name \"A\" -Value 1");
        assert_eq!(joined.len(), 1);
        assert_eq!(parse_dataset(&joined[0]), parse_dataset(&flat[0]));
    }

    #[test]
    fn multi_continuation() {
        let ds = datasets("  -Name \"d1\"\\\n   -VendorName \"v\"\\\n   -SlotIndex 2");
        assert_eq!(ds.len(), 1);
        let rec = parse_dataset(&ds[0]);
        assert_eq!(rec.get("Name"), Some("d1"));
        assert_eq!(rec.get("VendorName"), Some("v"));
        assert_eq!(rec.get("SlotIndex"), Some("2"));
    }

    #[test]
    fn noise_lines_discarded() {
        let ds = datasets("comment line\n  -Name \"a\"\nanother comment\n  -Name \"b\"");
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn exponent_requires_fraction_and_sign() {
        // `2E+3` has no fraction part — only `2` is the numeric literal.
        let rec = parse_dataset("-Index 2E+3");
        assert_eq!(rec.get("Index"), Some("2"));
    }

    #[test]
    fn duplicate_attribute_first_wins() {
        let rec = parse_dataset("-Name \"a\" -Name \"b\"");
        assert_eq!(rec.get("Name"), Some("a"));
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn records_preserve_dataset_order() {
        let section = RawSection {
            name: "EIO_SIGNAL".to_string(),
            header_line: "EIO_SIGNAL:".to_string(),
            body: "  -Name \"s1\"\n  -Name \"s2\"\n  -Name \"s3\"".to_string(),
        };
        let records = parse_records(&section);
        let names: Vec<_> = records.iter().filter_map(|r| r.get("Name")).collect();
        assert_eq!(names, ["s1", "s2", "s3"]);
    }
}
