//! Source POS tag to Universal Dependencies tag table.
//!
//! The table file has one line per UD tag, followed by every source tag that
//! maps to it:
//!
//! ```text
//! NOUN N NPROP
//! VERB V
//! PART NEG
//! ```
//!
//! Both sides are matched case-insensitively and stored upper-cased.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::errors::{ConvertError, ConvertResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UdTagTable {
    tags: HashMap<String, String>,
}

impl UdTagTable {
    /// Load a table from a file.
    pub fn load(path: &Path) -> ConvertResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConvertError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse table text. Blank lines are skipped; a later line wins when a
    /// source tag is listed twice.
    pub fn parse(input: &str) -> ConvertResult<Self> {
        let mut tags = HashMap::new();

        for (idx, line) in input.lines().enumerate() {
            let mut columns = line.split_whitespace();
            let ud_tag = match columns.next() {
                Some(tag) => tag.to_uppercase(),
                None => continue,
            };

            let mut mapped = 0;
            for pos in columns {
                tags.insert(pos.to_uppercase(), ud_tag.clone());
                mapped += 1;
            }
            if mapped == 0 {
                return Err(ConvertError::UdTable {
                    line: idx + 1,
                    message: format!("UD tag {} lists no source tags", ud_tag),
                });
            }
        }

        Ok(Self { tags })
    }

    /// UD tag for a source POS tag.
    pub fn get(&self, pos: &str) -> Option<&str> {
        self.tags.get(pos).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UdTagTable {
    /// Build from `(source tag, UD tag)` pairs.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            tags: iter
                .into_iter()
                .map(|(pos, ud)| (pos.into().to_uppercase(), ud.into().to_uppercase()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_maps_every_source_tag() {
        let table = UdTagTable::parse("NOUN N NPROP\nVERB V\n").unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("N"), Some("NOUN"));
        assert_eq!(table.get("NPROP"), Some("NOUN"));
        assert_eq!(table.get("V"), Some("VERB"));
        assert_eq!(table.get("ADJ"), None);
    }

    #[test]
    fn test_parse_uppercases_both_sides() {
        let table = UdTagTable::parse("part neg\n").unwrap();
        assert_eq!(table.get("NEG"), Some("PART"));
        assert_eq!(table.get("neg"), None);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let table = UdTagTable::parse("\nADP PREP\n   \nDET DET\n").unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_tag_without_sources_is_rejected() {
        let err = UdTagTable::parse("NOUN N\nX\n").unwrap_err();
        assert!(matches!(err, ConvertError::UdTable { line: 2, .. }));
    }

    #[test]
    fn test_later_line_wins() {
        let table = UdTagTable::parse("NOUN N\nPROPN N\n").unwrap();
        assert_eq!(table.get("N"), Some("PROPN"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "VERB V VREL").unwrap();

        let table = UdTagTable::load(file.path()).unwrap();
        assert_eq!(table.get("VREL"), Some("VERB"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = UdTagTable::load(Path::new("/nonexistent/ud_pos.txt")).unwrap_err();
        assert!(matches!(err, ConvertError::Load { .. }));
    }

    #[test]
    fn test_from_iter() {
        let table: UdTagTable = vec![("neg", "part")].into_iter().collect();
        assert_eq!(table.get("NEG"), Some("PART"));
    }
}
