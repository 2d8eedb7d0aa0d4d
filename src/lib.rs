//! Converts brat stand-off annotations into CoNLL-U treebanks.
//!
//! A brat document is a plain-text file with one sentence per line and an
//! `.ann` file of records that point into that text by character offset.
//! Conversion runs in three steps:
//!
//! - [`text_index`] rebuilds sentence and token boundaries of the text,
//!   including clitic groups (`bet_u_n`) and their bracketed hosts (`[ቤቱ]`)
//! - [`document`] resolves `T` spans to `(sentence, token)` positions and
//!   folds `A` attributes and `R` relations into per-token records
//! - [`conllu`] writes the records as CoNLL-U
//!
//! ## Example
//!
//! ```
//! use brat_conllu::{Converter, UdTagTable};
//!
//! let table = UdTagTable::parse("NOUN N\nVERB V\n").unwrap();
//! let converter = Converter::new(table);
//!
//! let text = "ልጅ ሄደ\n";
//! let ann = "T1\tN 0 2\tልጅ\nT2\tV 3 5\tሄደ\nR1\tnsubj Arg1:T1 Arg2:T2\n";
//! let conllu = converter.convert_str(text, ann, "doc").unwrap();
//!
//! assert!(conllu.starts_with("# sent_id = doc-s1\n# text = ልጅ ሄደ\n"));
//! assert!(conllu.contains("2\tሄደ\tሄደ\tVERB\tV\t_\t1\tnsubj\t_\t_\n"));
//! ```

pub mod annotation;
pub mod batch;
pub mod config;
pub mod conllu;
pub mod convert;
pub mod document;
pub mod errors;
pub mod text_index;
pub mod ud_tags;

pub use annotation::{parse_annotations, AnnotationSet};
pub use batch::{discover, run_batch, BatchReport, DocumentFiles};
pub use config::{ConvertConfig, UnresolvedPolicy, DEFAULT_CONFIG_FILE};
pub use convert::{document_id, Converter};
pub use document::{AnnotatedDocument, TokenRecord};
pub use errors::{ConvertError, ConvertResult};
pub use text_index::{CliticHost, SpanMiss, TextIndex, TokenPosition};
pub use ud_tags::UdTagTable;
