//! Single-document conversion entry point.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::annotation::parse_annotations;
use crate::config::UnresolvedPolicy;
use crate::conllu;
use crate::document::AnnotatedDocument;
use crate::errors::{ConvertError, ConvertResult};
use crate::ud_tags::UdTagTable;

/// Converts brat document pairs using one UD tag table.
#[derive(Debug, Clone)]
pub struct Converter {
    table: UdTagTable,
    policy: UnresolvedPolicy,
    verbose: bool,
}

impl Converter {
    pub fn new(table: UdTagTable) -> Self {
        Self {
            table,
            policy: UnresolvedPolicy::default(),
            verbose: false,
        }
    }

    pub fn with_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Echo converted documents to stdout as they are written.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn table(&self) -> &UdTagTable {
        &self.table
    }

    pub fn policy(&self) -> UnresolvedPolicy {
        self.policy
    }

    /// Merge a text and its annotations without serializing.
    pub fn merge_str(&self, text: &str, ann: &str, document_id: &str) -> ConvertResult<AnnotatedDocument> {
        let annotations = parse_annotations(ann)?;
        AnnotatedDocument::from_parts(document_id, text, &annotations, self.policy)
    }

    /// Convert in memory and return the CoNLL-U text.
    pub fn convert_str(&self, text: &str, ann: &str, document_id: &str) -> ConvertResult<String> {
        let document = self.merge_str(text, ann, document_id)?;
        conllu::render(&document, &self.table)
    }

    /// Convert `text_path` and `ann_path` into `out_path`.
    ///
    /// The output file is only created once the document rendered cleanly.
    pub fn convert_files(&self, text_path: &Path, ann_path: &Path, out_path: &Path) -> ConvertResult<()> {
        let text = read(text_path)?;
        let ann = read(ann_path)?;
        let rendered = self.convert_str(&text, &ann, &document_id(text_path))?;

        write(out_path, &rendered)?;
        if self.verbose {
            print!("{}", rendered);
        }

        info!(input = %text_path.display(), output = %out_path.display(), "converted");
        Ok(())
    }
}

fn read(path: &Path) -> ConvertResult<String> {
    fs::read_to_string(path).map_err(|e| ConvertError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn write(path: &Path, content: &str) -> ConvertResult<()> {
    let to_error = |e: std::io::Error| ConvertError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut writer = BufWriter::new(File::create(path).map_err(to_error)?);
    writer.write_all(content.as_bytes()).map_err(to_error)?;
    writer.flush().map_err(to_error)
}

/// Document id used in `# sent_id`: the text path without extension, with
/// path separators turned into `-`.
///
/// `data_UD/am/news1.txt` becomes `data_UD-am-news1`. An absolute path keeps
/// its root separator, so `/corpus/a.txt` becomes `-corpus-a`.
pub fn document_id(text_path: &Path) -> String {
    let bare = text_path.with_extension("");
    bare.to_string_lossy()
        .trim_start_matches("./")
        .replace(|c: char| c == '/' || c == '\\', "-")
}
