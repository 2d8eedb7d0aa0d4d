//! Batch conversion over a directory tree.
//!
//! Every `<name>.txt` under the root is paired with `<name>.ann` and written
//! to `<name>.conllu` next to it. A document that fails is reported and the
//! batch carries on with the next one.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::ConvertConfig;
use crate::convert::Converter;
use crate::errors::{ConvertError, ConvertResult};

/// The three files of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFiles {
    pub text: PathBuf,
    pub ann: PathBuf,
    pub conllu: PathBuf,
}

impl DocumentFiles {
    /// Derive the sibling `.ann` and `.conllu` paths of a text file.
    pub fn from_text(text: PathBuf) -> Self {
        Self {
            ann: text.with_extension("ann"),
            conllu: text.with_extension("conllu"),
            text,
        }
    }
}

/// Find all text files under `root`, in path order.
pub fn discover(root: &Path) -> ConvertResult<Vec<DocumentFiles>> {
    if !root.is_dir() {
        return Err(ConvertError::Load {
            path: root.display().to_string(),
            message: "not a directory".to_string(),
        });
    }

    let mut found = Vec::new();
    discover_recursive(root, &mut found)?;
    found.sort();
    Ok(found.into_iter().map(DocumentFiles::from_text).collect())
}

fn discover_recursive(dir: &Path, found: &mut Vec<PathBuf>) -> ConvertResult<()> {
    let to_error = |e: std::io::Error| ConvertError::Load {
        path: dir.display().to_string(),
        message: e.to_string(),
    };

    for entry in fs::read_dir(dir).map_err(to_error)? {
        let path = entry.map_err(to_error)?.path();

        if path.is_dir() {
            discover_recursive(&path, found)?;
        } else if path.extension().map_or(false, |e| e == "txt") {
            found.push(path);
        }
    }

    Ok(())
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, ConvertError)>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.converted.len() + self.skipped.len() + self.failed.len()
    }

    /// True when no document failed.
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Process exit code (0 = all converted or skipped, 1 = failures).
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }
}

/// Convert every document under `config.root_dir`.
pub fn run_batch(converter: &Converter, config: &ConvertConfig) -> ConvertResult<BatchReport> {
    let mut report = BatchReport::new();

    for files in discover(&config.root_dir)? {
        if config.is_excluded(&files.text) {
            info!(input = %files.text.display(), "excluded");
            report.skipped.push(files.text);
            continue;
        }

        match converter.convert_files(&files.text, &files.ann, &files.conllu) {
            Ok(()) => report.converted.push(files.text),
            Err(err) => {
                error!(input = %files.text.display(), "conversion failed: {}", err);
                report.failed.push((files.text, err));
            }
        }
    }

    info!(
        converted = report.converted.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "batch finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ud_tags::UdTagTable;
    use tempfile::TempDir;

    fn write_doc(dir: &Path, name: &str, text: &str, ann: &str) {
        fs::write(dir.join(format!("{}.txt", name)), text).unwrap();
        fs::write(dir.join(format!("{}.ann", name)), ann).unwrap();
    }

    fn corpus() -> TempDir {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("am");
        fs::create_dir(&nested).unwrap();

        write_doc(root.path(), "a", "ab cd\n", "T1\tN 0 2\tab\nT2\tV 3 5\tcd\n");
        // ADJ has no UD mapping.
        write_doc(&nested, "b", "ab\n", "T1\tADJ 0 2\tab\n");
        write_doc(&nested, "c", "cd\n", "T1\tV 0 2\tcd\n");
        fs::write(root.path().join("notes.md"), "not a document").unwrap();
        root
    }

    fn converter() -> Converter {
        Converter::new(UdTagTable::parse("NOUN N\nVERB V\n").unwrap())
    }

    #[test]
    fn test_document_files_from_text() {
        let files = DocumentFiles::from_text(PathBuf::from("data/am/x.txt"));
        assert_eq!(files.ann, PathBuf::from("data/am/x.ann"));
        assert_eq!(files.conllu, PathBuf::from("data/am/x.conllu"));
    }

    #[test]
    fn test_discover_is_recursive_and_sorted() {
        let root = corpus();
        let found = discover(root.path()).unwrap();

        let names: Vec<PathBuf> = found
            .iter()
            .map(|f| f.text.strip_prefix(root.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("am/b.txt"),
                PathBuf::from("am/c.txt"),
            ]
        );
    }

    #[test]
    fn test_discover_missing_root() {
        let err = discover(Path::new("/nonexistent/corpus")).unwrap_err();
        assert!(matches!(err, ConvertError::Load { .. }));
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let root = corpus();
        let config = ConvertConfig {
            root_dir: root.path().to_path_buf(),
            ..ConvertConfig::default()
        };

        let report = run_batch(&converter(), &config).unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.converted.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].0.ends_with("am/b.txt"));
        assert!(matches!(report.failed[0].1, ConvertError::UnknownPosTag { .. }));
        assert_eq!(report.exit_code(), 1);

        assert!(root.path().join("a.conllu").exists());
        assert!(root.path().join("am/c.conllu").exists());
        assert!(!root.path().join("am/b.conllu").exists());
    }

    #[test]
    fn test_batch_skips_excluded() {
        let root = corpus();
        let config = ConvertConfig {
            root_dir: root.path().to_path_buf(),
            exclude: vec!["b".to_string()],
            ..ConvertConfig::default()
        };

        let report = run_batch(&converter(), &config).unwrap();

        assert!(report.success());
        assert_eq!(report.converted.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(!root.path().join("am/b.conllu").exists());
    }
}
