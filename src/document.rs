//! Merges brat records into per-token records.
//!
//! Token (`T`) records are placed first, so attributes and relations may
//! appear anywhere in the `.ann` file. Each record is keyed by its brat id.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::annotation::{AnnotationSet, AttributeAnnotation, RelationAnnotation, TokenAnnotation};
use crate::config::UnresolvedPolicy;
use crate::errors::{ConvertError, ConvertResult};
use crate::text_index::{TextIndex, TokenPosition};

/// Everything known about one annotated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// brat `T` id.
    pub id: String,
    pub position: TokenPosition,
    /// Source POS tag, also written as XPOS.
    pub pos: String,
    pub surface: String,
    /// `(feature, value)` pairs in file order.
    pub morphology: Vec<(String, String)>,
    /// Token number stored by a relation naming this token as its head.
    pub arg: Option<usize>,
    pub relation: Option<String>,
}

impl TokenRecord {
    fn new(annotation: &TokenAnnotation, position: TokenPosition) -> Self {
        Self {
            id: annotation.id.clone(),
            position,
            pos: annotation.pos.clone(),
            surface: annotation.surface.clone(),
            morphology: Vec::new(),
            arg: None,
            relation: None,
        }
    }
}

/// A text file and its annotations, merged and ready to serialize.
#[derive(Debug, Clone)]
pub struct AnnotatedDocument {
    id: String,
    index: TextIndex,
    records: HashMap<String, TokenRecord>,
    positions: HashMap<TokenPosition, String>,
    unresolved: HashSet<String>,
}

impl AnnotatedDocument {
    /// Merge `annotations` into the tokens of `index`.
    pub fn merge(
        id: &str,
        index: TextIndex,
        annotations: &AnnotationSet,
        policy: UnresolvedPolicy,
    ) -> ConvertResult<Self> {
        let mut doc = Self {
            id: id.to_string(),
            index,
            records: HashMap::new(),
            positions: HashMap::new(),
            unresolved: HashSet::new(),
        };

        for token in &annotations.tokens {
            doc.add_token(token, policy)?;
        }
        for attribute in &annotations.attributes {
            doc.add_attribute(attribute)?;
        }
        for relation in &annotations.relations {
            doc.add_relation(relation)?;
        }

        debug!(
            document = %doc.id,
            records = doc.records.len(),
            unresolved = doc.unresolved.len(),
            "merged annotations"
        );
        Ok(doc)
    }

    /// Index `text` and merge `annotations` into it.
    pub fn from_parts(
        id: &str,
        text: &str,
        annotations: &AnnotationSet,
        policy: UnresolvedPolicy,
    ) -> ConvertResult<Self> {
        Self::merge(id, TextIndex::from_text(text), annotations, policy)
    }

    /// Document id used in `# sent_id` headers.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> &TextIndex {
        &self.index
    }

    pub fn record(&self, id: &str) -> Option<&TokenRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids of `T` records whose span matched no token, sorted.
    pub fn unresolved(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.unresolved.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Records in `(sentence, token)` order.
    pub fn sorted_records(&self) -> Vec<&TokenRecord> {
        let mut records: Vec<&TokenRecord> = self.records.values().collect();
        records.sort_by_key(|r| r.position);
        records
    }

    fn add_token(
        &mut self,
        token: &TokenAnnotation,
        policy: UnresolvedPolicy,
    ) -> ConvertResult<()> {
        if self.records.contains_key(&token.id) || self.unresolved.contains(&token.id) {
            return Err(ConvertError::Format {
                line: token.line,
                message: format!("duplicate token id {}", token.id),
            });
        }

        let position = match self.index.resolve(token.start, token.end) {
            Ok(position) => position,
            Err(miss) => match policy {
                UnresolvedPolicy::Skip => {
                    warn!(
                        document = %self.id,
                        id = %token.id,
                        start = token.start,
                        end = token.end,
                        "token not found: {}",
                        miss
                    );
                    self.unresolved.insert(token.id.clone());
                    return Ok(());
                }
                UnresolvedPolicy::Abort => {
                    return Err(ConvertError::UnresolvedSpan {
                        line: token.line,
                        id: token.id.clone(),
                        start: token.start,
                        end: token.end,
                        context: miss.to_string(),
                    })
                }
            },
        };

        if token.pos != token.pos.to_uppercase() {
            return Err(ConvertError::LowercasePos {
                id: token.id.clone(),
                pos: token.pos.clone(),
            });
        }

        if let Some(other) = self.positions.get(&position) {
            return Err(ConvertError::DuplicateCoordinate {
                id: token.id.clone(),
                other: other.clone(),
                sentence: position.sentence,
                token: position.token,
            });
        }

        self.positions.insert(position, token.id.clone());
        self.records
            .insert(token.id.clone(), TokenRecord::new(token, position));
        Ok(())
    }

    fn add_attribute(&mut self, attribute: &AttributeAnnotation) -> ConvertResult<()> {
        if !self.check_target(attribute.line, &attribute.id, &attribute.target)? {
            return Ok(());
        }

        if let Some(record) = self.records.get_mut(&attribute.target) {
            record
                .morphology
                .push((attribute.feature.clone(), attribute.value.clone()));
        }
        Ok(())
    }

    /// The dependent's token number is stored on the head record.
    fn add_relation(&mut self, relation: &RelationAnnotation) -> ConvertResult<()> {
        if !self.check_target(relation.line, &relation.id, &relation.dependent)?
            || !self.check_target(relation.line, &relation.id, &relation.head)?
        {
            return Ok(());
        }

        let arg = match self.records.get(&relation.dependent) {
            Some(dependent) => dependent.position.token,
            None => return Ok(()),
        };
        if let Some(head) = self.records.get_mut(&relation.head) {
            head.arg = Some(arg);
            head.relation = Some(relation.relation.clone());
        }
        Ok(())
    }

    /// `Ok(true)` when `target` has a record, `Ok(false)` when its span was
    /// dropped as unresolved, and an error when it was never declared.
    fn check_target(&self, line: usize, id: &str, target: &str) -> ConvertResult<bool> {
        if self.records.contains_key(target) {
            return Ok(true);
        }
        if self.unresolved.contains(target) {
            warn!(document = %self.id, id, target, "skipping annotation on unresolved token");
            return Ok(false);
        }
        Err(ConvertError::MissingTarget {
            line,
            id: id.to_string(),
            target: target.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::parse_annotations;

    const TEXT: &str = "ይህ ልጅ ሄደ\n[ቤቱ] bet_u_n ወደቀ\n";

    fn merge(ann: &str, policy: UnresolvedPolicy) -> ConvertResult<AnnotatedDocument> {
        let annotations = parse_annotations(ann)?;
        AnnotatedDocument::from_parts("doc", TEXT, &annotations, policy)
    }

    #[test]
    fn test_token_records_get_positions() {
        let doc = merge("T1\tDET 0 2\tይህ\nT2\tN 14 17\tbet\n", UnresolvedPolicy::Skip).unwrap();

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.record("T1").unwrap().position, TokenPosition::new(1, 1));
        assert_eq!(doc.record("T2").unwrap().position, TokenPosition::new(2, 1));
        assert_eq!(doc.record("T2").unwrap().surface, "bet");
    }

    #[test]
    fn test_attributes_accumulate_in_file_order() {
        let ann = "A1\tNumber T1 Sing\nT1\tN 3 5\tልጅ\nA2\tGender T1 Masc\nA3\tPoss T1\n";
        let doc = merge(ann, UnresolvedPolicy::Skip).unwrap();

        assert_eq!(
            doc.record("T1").unwrap().morphology,
            vec![
                ("Number".to_string(), "Sing".to_string()),
                ("Gender".to_string(), "Masc".to_string()),
                ("Poss".to_string(), "Yes".to_string()),
            ]
        );
    }

    #[test]
    fn test_relation_is_stored_on_head() {
        let ann = "T1\tDET 0 2\tይህ\nT2\tN 3 5\tልጅ\nR1\tdet Arg1:T1 Arg2:T2\n";
        let doc = merge(ann, UnresolvedPolicy::Skip).unwrap();

        let head = doc.record("T2").unwrap();
        assert_eq!(head.arg, Some(1));
        assert_eq!(head.relation.as_deref(), Some("det"));

        let dependent = doc.record("T1").unwrap();
        assert_eq!(dependent.arg, None);
        assert_eq!(dependent.relation, None);
    }

    #[test]
    fn test_later_relation_overwrites_head() {
        let ann = "T1\tDET 0 2\tይህ\nT2\tN 3 5\tልጅ\nT3\tV 6 8\tሄደ\n\
                   R1\tdet Arg1:T1 Arg2:T3\nR2\tnsubj Arg1:T2 Arg2:T3\n";
        let doc = merge(ann, UnresolvedPolicy::Skip).unwrap();

        let head = doc.record("T3").unwrap();
        assert_eq!(head.arg, Some(2));
        assert_eq!(head.relation.as_deref(), Some("nsubj"));
    }

    #[test]
    fn test_unresolved_span_is_skipped() {
        // 9..13 covers the bracketed host, which is not a token.
        let ann = "T1\tN 9 13\tቤቱ\nT2\tV 22 25\tወደቀ\nA1\tNumber T1 Sing\nR1\tnsubj Arg1:T1 Arg2:T2\n";
        let doc = merge(ann, UnresolvedPolicy::Skip).unwrap();

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.unresolved(), vec!["T1"]);
        assert_eq!(doc.record("T2").unwrap().relation, None);
    }

    #[test]
    fn test_unresolved_span_aborts_when_asked() {
        let err = merge("T1\tN 9 13\tቤቱ\n", UnresolvedPolicy::Abort).unwrap_err();

        match err {
            ConvertError::UnresolvedSpan { id, start, end, .. } => {
                assert_eq!(id, "T1");
                assert_eq!((start, end), (9, 13));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_attribute_on_unknown_id_is_fatal() {
        let err = merge("T1\tN 3 5\tልጅ\nA1\tNumber T9 Sing\n", UnresolvedPolicy::Skip).unwrap_err();

        assert!(matches!(
            err,
            ConvertError::MissingTarget { line: 2, ref target, .. } if target == "T9"
        ));
    }

    #[test]
    fn test_relation_to_unknown_head_is_fatal() {
        let err = merge("T1\tN 3 5\tልጅ\nR1\tnsubj Arg1:T1 Arg2:T7\n", UnresolvedPolicy::Skip)
            .unwrap_err();

        assert!(matches!(err, ConvertError::MissingTarget { ref target, .. } if target == "T7"));
    }

    #[test]
    fn test_duplicate_position_is_fatal() {
        let err = merge("T1\tN 3 5\tልጅ\nT2\tN 3 5\tልጅ\n", UnresolvedPolicy::Skip).unwrap_err();

        assert!(matches!(
            err,
            ConvertError::DuplicateCoordinate { sentence: 1, token: 2, .. }
        ));
    }

    #[test]
    fn test_lowercase_pos_is_fatal() {
        let err = merge("T1\tn 3 5\tልጅ\n", UnresolvedPolicy::Skip).unwrap_err();
        assert!(matches!(err, ConvertError::LowercasePos { .. }));
    }

    #[test]
    fn test_sorted_records_follow_document_order() {
        let ann = "T3\tV 22 25\tወደቀ\nT1\tV 6 8\tሄደ\nT2\tDET 0 2\tይህ\nT4\tN 14 17\tbet\n";
        let doc = merge(ann, UnresolvedPolicy::Skip).unwrap();

        let ids: Vec<&str> = doc.sorted_records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["T2", "T1", "T4", "T3"]);
    }
}
