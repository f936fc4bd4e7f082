// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # In-document word completion
//!
//! The "hippie" post-step treats the buffer itself as a corpus: distinct
//! identifier-like words before the cursor that extend the typed prefix
//! are offered as literal proposals. It sits behind the same proposal
//! shape as the main path so the editor can toggle it uniformly.

use crate::analyzer::{has_proposal, CompletionAnalyzer};
use crate::document::Document;
use sql_completion_dialect::text::starts_with_ignore_case;
use sql_completion_dialect::KeywordKind;

impl CompletionAnalyzer {
    /// Merge in-document word proposals for the current prefix.
    pub(crate) fn make_proposals_from_hippie(&mut self) {
        let prefix = self.detector.word_part().to_string();
        let words = document_words(self.request.document.as_ref(), self.detector.start_offset());
        for word in words {
            if word.contains('.') {
                continue;
            }
            if !starts_with_ignore_case(&word, &prefix) {
                continue;
            }
            if word.eq_ignore_ascii_case(&prefix) {
                continue;
            }
            if has_proposal(&self.proposals, &word) {
                continue;
            }
            let proposal = self.raw_proposal(word.clone(), word, KeywordKind::Literal);
            self.proposals.push(proposal);
        }
    }
}

/// Distinct identifier-like words in the document before `end`, in
/// first-seen order.
fn document_words(document: &dyn Document, end: usize) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for offset in 0..end.min(document.len()) {
        let c = document.char_at(offset).unwrap_or(' ');
        if c.is_alphanumeric() || c == '_' {
            current.push(c);
        } else if !current.is_empty() {
            let word = std::mem::take(&mut current);
            if !word.chars().all(|ch| ch.is_ascii_digit()) && !words.contains(&word) {
                words.push(word);
            }
        }
    }
    if !current.is_empty() && !words.contains(&current) {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;

    #[test]
    fn test_document_words() {
        let doc = TextDocument::new("SELECT user_id, 42 FROM audit_log WHERE user_id > 0");
        let words = document_words(&doc, doc.len());
        assert_eq!(
            words,
            vec!["SELECT", "user_id", "FROM", "audit_log", "WHERE"]
        );
    }

    #[test]
    fn test_document_words_respects_bound() {
        let doc = TextDocument::new("alpha beta gamma");
        let words = document_words(&doc, 10);
        assert_eq!(words, vec!["alpha", "beta"]);
    }
}
