//! CoNLL-U serialization of a merged document.
//!
//! ```text
//! # sent_id = doc-s2
//! # text = ቤቱ ወደቀ
//! 1-3  ቤቱ   _    _     _    _         _  _     _  _
//! 1    bet  bet  NOUN  N    _         0  root  _  _
//! 2    u    u    DET   DET  Poss=Yes  0  root  _  _
//! ```
//!
//! Columns are tab-separated; spaces are used above for readability.

use std::fmt;

use crate::document::{AnnotatedDocument, TokenRecord};
use crate::errors::{ConvertError, ConvertResult};
use crate::text_index::{CliticHost, TokenPosition};
use crate::ud_tags::UdTagTable;

const EMPTY: &str = "_";

/// One token line with its ten columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRow<'a> {
    pub id: usize,
    pub form: &'a str,
    pub upos: &'a str,
    pub xpos: &'a str,
    pub feats: String,
    pub head: usize,
    pub deprel: &'a str,
}

impl<'a> TokenRow<'a> {
    /// Build the row for `record`, looking its UD tag up in `table`.
    pub fn new(record: &'a TokenRecord, table: &'a UdTagTable) -> ConvertResult<Self> {
        let upos = table
            .get(&record.pos)
            .ok_or_else(|| ConvertError::UnknownPosTag {
                id: record.id.clone(),
                pos: record.pos.clone(),
            })?;
        let deprel = record.relation.as_deref().unwrap_or("root");

        Ok(Self {
            id: record.position.token,
            form: &record.surface,
            upos,
            xpos: &record.pos,
            feats: features(record, upos, deprel),
            head: record.arg.unwrap_or(0),
            deprel,
        })
    }
}

impl<'a> fmt::Display for TokenRow<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // LEMMA repeats FORM.
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.id,
            self.form,
            self.form,
            self.upos,
            self.xpos,
            self.feats,
            self.head,
            self.deprel,
            EMPTY,
            EMPTY
        )
    }
}

/// Multi-word range line spanning a clitic group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRow<'a> {
    pub first: usize,
    pub host: &'a CliticHost,
}

impl<'a> fmt::Display for RangeRow<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}\t{}\t{}",
            self.first,
            self.first + self.host.splits,
            self.host.surface,
            [EMPTY; 8].join("\t")
        )
    }
}

fn features(record: &TokenRecord, upos: &str, deprel: &str) -> String {
    if deprel == "advmod" && upos == "PART" && record.pos == "NEG" {
        return "Polarity=Neg".to_string();
    }
    if record.morphology.is_empty() {
        return EMPTY.to_string();
    }

    let mut pairs: Vec<&(String, String)> = record.morphology.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
        .iter()
        .map(|(feature, value)| format!("{}={}", feature, value))
        .collect::<Vec<_>>()
        .join("|")
}

fn starts_sentence(previous: Option<TokenPosition>, current: TokenPosition) -> bool {
    match previous {
        None => true,
        Some(prev) => current.token < prev.token || current.sentence != prev.sentence,
    }
}

/// Render `document` as CoNLL-U text.
///
/// The whole document is rendered before anything is returned, so an unknown
/// POS tag leaves no partial output behind.
pub fn render(document: &AnnotatedDocument, table: &UdTagTable) -> ConvertResult<String> {
    let mut out = String::new();
    let mut previous: Option<TokenPosition> = None;

    for record in document.sorted_records() {
        let position = record.position;

        if starts_sentence(previous, position) {
            if previous.is_some() {
                out.push('\n');
            }
            let text = document.index().display_text(position.sentence).unwrap_or("");
            out.push_str(&format!(
                "# sent_id = {}-s{}\n# text = {}\n",
                document.id(),
                position.sentence,
                text
            ));
        }

        if let Some(host) = document.index().clitic_host(position) {
            let range = RangeRow {
                first: position.token,
                host,
            };
            out.push_str(&format!("{}\n", range));
        }

        let row = TokenRow::new(record, table)?;
        out.push_str(&format!("{}\n", row));
        previous = Some(position);
    }

    out.push('\n');
    Ok(out)
}
