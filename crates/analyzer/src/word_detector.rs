// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Word detector
//!
//! Extracts the cursor's lexical neighborhood from the document: the
//! identifier fragment being typed (`word_part`), the nearest clause
//! keyword to the left (`prev_key_word`), the non-keyword tokens between
//! them (`prev_words`), the punctuation run separating the fragment from
//! those tokens (`prev_delimiter`), and the word to the right
//! (`next_word`).
//!
//! The detector is a pure function of (document, offset, syntax
//! manager); the only later mutation is [`WordDetector::shift_offset`],
//! used when the classifier rewrites the search prefix (the `*`
//! expansion cases).
//!
//! Word characters are letters, digits, `_`, `$`, the dialect's struct
//! separator and its identifier quote characters, so dotted and quoted
//! fragments stay in one piece. A `;` ends the leftward scan: tokens
//! behind it belong to the previous statement.

use crate::document::Document;
use sql_completion_dialect::SyntaxManager;

/// Upper bound on collected previous words.
pub const DEFAULT_PREV_WORDS: usize = 5;

/// Lexical neighborhood of the cursor.
#[derive(Debug, Clone)]
pub struct WordDetector {
    cursor_offset: usize,
    start_offset: usize,
    end_offset: usize,
    word_part: String,
    full_word: String,
    prev_key_word: String,
    prev_key_word_offset: Option<usize>,
    prev_words: Vec<String>,
    prev_delimiter: String,
    next_word: String,
    struct_separator: char,
    quote_chars: Vec<char>,
}

impl WordDetector {
    pub fn new(document: &dyn Document, syntax: &SyntaxManager, offset: usize) -> Self {
        Self::with_limit(document, syntax, offset, DEFAULT_PREV_WORDS)
    }

    /// Detector with an explicit previous-word limit. Used with a small
    /// limit when the analyzer scans around a position other than the
    /// cursor (e.g. the table left of `ON`).
    pub fn with_limit(
        document: &dyn Document,
        syntax: &SyntaxManager,
        offset: usize,
        prev_words_limit: usize,
    ) -> Self {
        let separator = syntax.struct_separator();
        let quote_chars: Vec<char> = syntax
            .dialect()
            .identifier_quote_strings()
            .iter()
            .flat_map(|(open, close)| {
                open.chars().chain(close.chars()).collect::<Vec<char>>()
            })
            .collect();

        let cursor = offset.min(document.len());
        let word = |c: char| is_word_char(c, separator, &quote_chars);

        // Word part: scan left to the nearest word boundary.
        let mut start = cursor;
        while start > 0 && document.char_at(start - 1).map(&word).unwrap_or(false) {
            start -= 1;
        }
        // Full word: extend right over the remainder of the identifier.
        let mut end = cursor;
        while end < document.len() && document.char_at(end).map(&word).unwrap_or(false) {
            end += 1;
        }
        let word_part = document.text_range(start, cursor);
        let full_word = document.text_range(start, end);

        // Leftward scan: delimiter run, then tokens until the first
        // clause keyword or the statement boundary.
        let mut prev_delimiter = String::new();
        let mut prev_words: Vec<String> = Vec::new();
        let mut prev_key_word = String::new();
        let mut prev_key_word_offset = None;
        let mut pos = start;
        let mut first_gap = true;
        'scan: loop {
            let gap_end = pos;
            let mut boundary = false;
            while pos > 0 {
                let c = document.char_at(pos - 1).unwrap_or(' ');
                if word(c) {
                    break;
                }
                if c == ';' {
                    boundary = true;
                    break;
                }
                pos -= 1;
            }
            if first_gap {
                prev_delimiter = document.text_range(pos, gap_end).trim().to_string();
                first_gap = false;
            }
            if boundary || pos == 0 {
                break 'scan;
            }
            let token_end = pos;
            while pos > 0 && document.char_at(pos - 1).map(&word).unwrap_or(false) {
                pos -= 1;
            }
            if pos == token_end {
                break 'scan;
            }
            let token = document.text_range(pos, token_end);
            let bare = remove_token_quotes(&token, &quote_chars).to_uppercase();
            if syntax.dialect().is_clause_keyword(&bare) {
                prev_key_word = bare;
                prev_key_word_offset = Some(pos);
                break 'scan;
            }
            if prev_words.len() < prev_words_limit {
                prev_words.push(token);
            }
        }

        // Rightward scan for the next word.
        let mut next_word = String::new();
        let mut npos = end;
        while npos < document.len() {
            let c = document.char_at(npos).unwrap_or(' ');
            if word(c) || c == ';' {
                break;
            }
            npos += 1;
        }
        if npos < document.len() && document.char_at(npos) != Some(';') {
            let nstart = npos;
            while npos < document.len() && document.char_at(npos).map(&word).unwrap_or(false) {
                npos += 1;
            }
            next_word = document.text_range(nstart, npos);
        }

        Self {
            cursor_offset: cursor,
            start_offset: start,
            end_offset: end,
            word_part,
            full_word,
            prev_key_word,
            prev_key_word_offset,
            prev_words,
            prev_delimiter,
            next_word,
            struct_separator: separator,
            quote_chars,
        }
    }

    /// Text between the nearest word boundary and the cursor.
    pub fn word_part(&self) -> &str {
        &self.word_part
    }

    /// Identifier around the cursor, including the part to the right.
    pub fn full_word(&self) -> &str {
        &self.full_word
    }

    /// Nearest clause keyword to the left, upper-cased; empty if none.
    pub fn prev_key_word(&self) -> &str {
        &self.prev_key_word
    }

    pub fn prev_key_word_offset(&self) -> Option<usize> {
        self.prev_key_word_offset
    }

    /// Non-keyword tokens between the word part and the keyword,
    /// nearest first.
    pub fn prev_words(&self) -> &[String] {
        &self.prev_words
    }

    /// Punctuation run between the word part and the first token,
    /// stripped of surrounding whitespace.
    pub fn prev_delimiter(&self) -> &str {
        &self.prev_delimiter
    }

    pub fn next_word(&self) -> &str {
        &self.next_word
    }

    pub fn cursor_offset(&self) -> usize {
        self.cursor_offset
    }

    /// Start of the replacement span.
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    /// `(offset, length)` of the text a proposal replaces.
    pub fn replacement_span(&self) -> (usize, usize) {
        (
            self.start_offset,
            self.cursor_offset.saturating_sub(self.start_offset),
        )
    }

    /// Move the replacement start when the classifier rewrites the
    /// prefix.
    pub fn shift_offset(&mut self, delta: isize) {
        let shifted = self.start_offset as isize + delta;
        self.start_offset = shifted.max(0) as usize;
    }

    pub fn struct_separator(&self) -> char {
        self.struct_separator
    }

    /// True if the token is wrapped in one of the dialect's quote pairs.
    pub fn is_quoted(&self, token: &str) -> bool {
        let mut chars = token.chars();
        match (chars.next(), token.chars().last()) {
            (Some(first), Some(last)) if token.chars().count() >= 2 => {
                self.quote_chars.contains(&first) && self.quote_chars.contains(&last)
            }
            _ => false,
        }
    }

    /// Strip one level of identifier quoting.
    pub fn remove_quotes(&self, token: &str) -> String {
        remove_token_quotes(token, &self.quote_chars)
    }

    /// Split a dotted identifier on the struct separator, respecting
    /// quoted segments. Empty segments (trailing separator) are kept.
    pub fn split_identifier(&self, token: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut quote: Option<char> = None;
        for c in token.chars() {
            match quote {
                Some(q) => {
                    current.push(c);
                    if c == q {
                        quote = None;
                    }
                }
                None if self.quote_chars.contains(&c) => {
                    current.push(c);
                    quote = Some(c);
                }
                None if c == self.struct_separator => {
                    parts.push(std::mem::take(&mut current));
                }
                None => current.push(c),
            }
        }
        parts.push(current);
        parts
    }

    /// Split the current word part on the struct separator.
    pub fn split_word_part(&self) -> Vec<String> {
        self.split_identifier(&self.word_part)
    }

    /// True if the token contains the struct separator.
    pub fn contains_separator(&self, token: &str) -> bool {
        token.contains(self.struct_separator)
    }
}

fn is_word_char(c: char, separator: char, quote_chars: &[char]) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == separator || quote_chars.contains(&c)
}

fn remove_token_quotes(token: &str, quote_chars: &[char]) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() >= 2
        && quote_chars.contains(&chars[0])
        && quote_chars.contains(&chars[chars.len() - 1])
    {
        chars[1..chars.len() - 1].iter().collect()
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;
    use sql_completion_dialect::GenericDialect;
    use std::sync::Arc;

    fn detect(text: &str) -> WordDetector {
        let cursor = text.find('|').expect("cursor marker");
        let text = text.replace('|', "");
        let document = TextDocument::new(&text);
        let syntax = SyntaxManager::new(Arc::new(GenericDialect::new()));
        WordDetector::new(&document, &syntax, cursor)
    }

    #[test]
    fn test_word_part_and_keyword() {
        let detector = detect("SELECT * FROM us|");
        assert_eq!(detector.word_part(), "us");
        assert_eq!(detector.prev_key_word(), "FROM");
        assert!(detector.prev_words().is_empty());
    }

    #[test]
    fn test_word_part_is_document_suffix_at_cursor() {
        let detector = detect("SELECT name, emai| FROM users");
        assert_eq!(detector.word_part(), "emai");
        assert_eq!(detector.full_word(), "emai");
        assert_eq!(detector.replacement_span(), (13, 4));
    }

    #[test]
    fn test_prev_words_between_word_and_keyword() {
        let detector = detect("INSERT INTO users (|");
        assert_eq!(detector.prev_key_word(), "INTO");
        assert_eq!(detector.prev_words(), ["users"]);
        assert_eq!(detector.prev_delimiter(), "(");
    }

    #[test]
    fn test_delimiter_keeps_punctuation_run() {
        let detector = detect("INSERT INTO users (*|");
        assert_eq!(detector.prev_delimiter(), "(*");
        assert_eq!(detector.word_part(), "");
    }

    #[test]
    fn test_dotted_fragment_stays_in_word_part() {
        let detector = detect("SELECT u.na| FROM users u");
        assert_eq!(detector.word_part(), "u.na");
        assert_eq!(detector.prev_key_word(), "SELECT");
        assert_eq!(detector.split_word_part(), ["u", "na"]);
    }

    #[test]
    fn test_value_position_context() {
        let detector = detect("SELECT * FROM users WHERE status = '|");
        assert_eq!(detector.prev_key_word(), "WHERE");
        assert_eq!(detector.prev_words(), ["status"]);
        assert_eq!(detector.prev_delimiter(), "= '");
    }

    #[test]
    fn test_like_is_a_previous_word() {
        let detector = detect("SELECT * FROM users WHERE name LIKE '|");
        assert_eq!(detector.prev_key_word(), "WHERE");
        assert_eq!(detector.prev_words()[0], "LIKE");
    }

    #[test]
    fn test_next_word() {
        let text = "SELECT | FROM users";
        let detector = detect(text);
        assert_eq!(detector.next_word(), "FROM");
        assert_eq!(detector.prev_key_word(), "SELECT");
    }

    #[test]
    fn test_semicolon_stops_scan() {
        let detector = detect("SELECT * FROM orders; |");
        assert_eq!(detector.prev_key_word(), "");
        assert!(detector.prev_words().is_empty());
    }

    #[test]
    fn test_quote_helpers() {
        let detector = detect("x|");
        assert!(detector.is_quoted("\"My Table\""));
        assert!(!detector.is_quoted("users"));
        assert_eq!(detector.remove_quotes("\"My Table\""), "My Table");
        assert_eq!(detector.remove_quotes("users"), "users");
        assert_eq!(
            detector.split_identifier("public.\"My.Table\".id"),
            vec!["public", "\"My.Table\"", "id"]
        );
        assert_eq!(detector.split_identifier("public."), vec!["public", ""]);
    }

    #[test]
    fn test_shift_offset_moves_replacement_start() {
        let mut detector = detect("INSERT INTO users (*|");
        let (start, _) = detector.replacement_span();
        detector.shift_offset(-1);
        assert_eq!(detector.replacement_span(), (start - 1, 1));
    }

    #[test]
    fn test_procedure_declaration_has_no_keyword() {
        let detector = detect("CREATE PROCEDURE my_|");
        assert_eq!(detector.prev_key_word(), "");
        assert_eq!(detector.prev_words(), ["PROCEDURE", "CREATE"]);
    }
}
