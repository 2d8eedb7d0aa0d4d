//! Parser for brat stand-off `.ann` files.
//!
//! Only three record kinds are understood:
//!
//! ```text
//! T18	SUBJC 94 95	ይ
//! A2	Agreement T19 Subj
//! R4	nsubj Arg1:T18 Arg2:T20
//! ```
//!
//! Any other record (events, notes, ...) and blank lines are ignored.

use crate::errors::{ConvertError, ConvertResult};

/// A `T` record: a POS tag over a character span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAnnotation {
    pub line: usize,
    pub id: String,
    pub pos: String,
    pub start: usize,
    pub end: usize,
    pub surface: String,
}

/// An `A` record: one morphological feature of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeAnnotation {
    pub line: usize,
    pub id: String,
    pub feature: String,
    pub target: String,
    pub value: String,
}

/// An `R` record: a dependency between two tokens.
///
/// `dependent` is the first argument, `head` the second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationAnnotation {
    pub line: usize,
    pub id: String,
    pub relation: String,
    pub dependent: String,
    pub head: String,
}

/// All understood records of one `.ann` file, grouped by kind in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSet {
    pub tokens: Vec<TokenAnnotation>,
    pub attributes: Vec<AttributeAnnotation>,
    pub relations: Vec<RelationAnnotation>,
}

impl AnnotationSet {
    pub fn len(&self) -> usize {
        self.tokens.len() + self.attributes.len() + self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const FIELD_TRIM: &[char] = &[' ', '\n', '\t'];

/// Parse a full `.ann` file.
pub fn parse_annotations(input: &str) -> ConvertResult<AnnotationSet> {
    let mut set = AnnotationSet::default();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let fields: Vec<&str> = raw.split('\t').collect();
        let id = fields[0].trim_matches(FIELD_TRIM);

        match id.chars().next() {
            Some('T') => set.tokens.push(parse_token(line, id, &fields)?),
            Some('A') => set.attributes.push(parse_attribute(line, id, &fields)?),
            Some('R') => set.relations.push(parse_relation(line, id, &fields)?),
            _ => {}
        }
    }

    Ok(set)
}

fn format_error(line: usize, message: String) -> ConvertError {
    ConvertError::Format { line, message }
}

fn parse_offset(line: usize, id: &str, raw: &str) -> ConvertResult<usize> {
    raw.parse().map_err(|_| {
        format_error(
            line,
            format!("{}: offset '{}' is not a non-negative integer", id, raw),
        )
    })
}

fn parse_token(line: usize, id: &str, fields: &[&str]) -> ConvertResult<TokenAnnotation> {
    if fields.len() != 3 {
        return Err(format_error(
            line,
            format!("{}: expected 3 tab-separated fields, found {}", id, fields.len()),
        ));
    }

    let items: Vec<&str> = fields[1].trim_matches(FIELD_TRIM).split_whitespace().collect();
    let (pos, start, end) = match items.as_slice() {
        [pos, start, end] => (*pos, *start, *end),
        _ => {
            return Err(format_error(
                line,
                format!("{}: expected 'POS start end', found '{}'", id, fields[1]),
            ))
        }
    };

    let start = parse_offset(line, id, start)?;
    let end = parse_offset(line, id, end)?;
    if end < start {
        return Err(format_error(
            line,
            format!("{}: span end {} precedes start {}", id, end, start),
        ));
    }

    Ok(TokenAnnotation {
        line,
        id: id.to_string(),
        pos: pos.to_string(),
        start,
        end,
        surface: fields[2].to_string(),
    })
}

fn parse_attribute(
    line: usize,
    id: &str,
    fields: &[&str],
) -> ConvertResult<AttributeAnnotation> {
    if fields.len() != 2 {
        return Err(format_error(
            line,
            format!("{}: expected 2 tab-separated fields, found {}", id, fields.len()),
        ));
    }

    let mut items: Vec<&str> = fields[1].trim_matches(FIELD_TRIM).split_whitespace().collect();
    // Possession is a binary attribute in brat and carries no value.
    if items.first() == Some(&"Poss") {
        items.push("Yes");
    }

    match items.as_slice() {
        [feature, target, value] => Ok(AttributeAnnotation {
            line,
            id: id.to_string(),
            feature: feature.to_string(),
            target: target.to_string(),
            value: value.to_string(),
        }),
        _ => Err(format_error(
            line,
            format!("{}: expected 'Feature target value', found '{}'", id, fields[1]),
        )),
    }
}

fn relation_argument<'a>(line: usize, id: &str, raw: &'a str) -> ConvertResult<&'a str> {
    raw.split(':')
        .nth(1)
        .map(|arg| arg.trim_matches(FIELD_TRIM))
        .ok_or_else(|| {
            format_error(
                line,
                format!("{}: relation argument '{}' has no ':'", id, raw),
            )
        })
}

fn parse_relation(line: usize, id: &str, fields: &[&str]) -> ConvertResult<RelationAnnotation> {
    if fields.len() < 2 {
        return Err(format_error(
            line,
            format!("{}: expected at least 2 tab-separated fields", id),
        ));
    }

    let items: Vec<&str> = fields[1].trim_matches(FIELD_TRIM).split_whitespace().collect();
    let (relation, arg1, arg2) = match items.as_slice() {
        [relation, arg1, arg2] => (*relation, *arg1, *arg2),
        _ => {
            return Err(format_error(
                line,
                format!("{}: expected 'Relation Arg1:ID Arg2:ID', found '{}'", id, fields[1]),
            ))
        }
    };

    Ok(RelationAnnotation {
        line,
        id: id.to_string(),
        relation: relation.to_string(),
        dependent: relation_argument(line, id, arg1)?.to_string(),
        head: relation_argument(line, id, arg2)?.to_string(),
    })
}
