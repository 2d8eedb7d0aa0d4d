//! Character offset index over the raw sentence text.
//!
//! brat records token spans as character offsets into the whole `.txt` file.
//! [`TextIndex`] rebuilds the sentence and token boundaries of that file so a
//! span can be mapped back to a `(sentence, token)` position.
//!
//! Offsets count `char`s, not bytes, the same way brat counts them.
//!
//! ```text
//! [ቤቱ] bet_u_n ወደቀ
//! ╰──╯                 host, no token
//!      ╰─╯             1  bet
//!          ╰╯          2  u
//!            ╰╯        3  n
//!              ╰───╯   4  ወደቀ
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

/// Position of a token within a document (both parts 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenPosition {
    pub sentence: usize,
    pub token: usize,
}

impl TokenPosition {
    pub fn new(sentence: usize, token: usize) -> Self {
        Self { sentence, token }
    }
}

impl fmt::Display for TokenPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}.t{}", self.sentence, self.token)
    }
}

/// A token (or clitic sub-token) with its sentence-relative span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    pub number: usize,
    pub surface: String,
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    fn contains(&self, start: usize, end: usize) -> bool {
        start >= self.start && end <= self.end
    }
}

/// One line of the text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceSpan {
    /// Sentence number (1-based line number).
    pub number: usize,
    /// The line without its terminator.
    pub text: String,
    /// Words without clitic splits, brackets removed. Used for `# text`.
    pub display: String,
    /// Absolute start offset in the file.
    pub start: usize,
    /// Absolute end offset, padded by one past the line terminator.
    pub end: usize,
    pub tokens: Vec<TokenSpan>,
}

impl SentenceSpan {
    fn contains(&self, start: usize, end: usize) -> bool {
        start >= self.start && end <= self.end
    }
}

/// Host word of a clitic group, keyed by the position of the first sub-token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliticHost {
    /// Host surface with brackets stripped.
    pub surface: String,
    /// Number of `_` splits, so the group covers `splits + 1` tokens.
    pub splits: usize,
}

/// Why a span could not be mapped to a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanMiss {
    /// No sentence contains the span.
    NoSentence,
    /// The span fits in a sentence but in none of its tokens.
    NoToken {
        sentence: usize,
        start: usize,
        end: usize,
        text: String,
    },
}

impl fmt::Display for SpanMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanMiss::NoSentence => write!(f, "no sentence contains the span"),
            SpanMiss::NoToken {
                sentence,
                start,
                end,
                text,
            } => write!(
                f,
                "sentence {} ({}..{}) '{}' has no matching token",
                sentence, start, end, text
            ),
        }
    }
}

/// Sentence, token and clitic-host offsets of one text file.
#[derive(Debug, Clone, Default)]
pub struct TextIndex {
    sentences: Vec<SentenceSpan>,
    clitic_hosts: HashMap<TokenPosition, CliticHost>,
}

impl TextIndex {
    /// Index a raw text file, one sentence per line.
    pub fn from_text(text: &str) -> Self {
        let mut sentences = Vec::new();
        let mut clitic_hosts = HashMap::new();
        let mut file_offset = 0;

        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let number = idx + 1;
            let line_len = line.chars().count();
            let clean = line.trim_end_matches('\n');

            let tokens = index_tokens(number, clean, &mut clitic_hosts);
            sentences.push(SentenceSpan {
                number,
                text: clean.to_string(),
                display: display_form(clean),
                start: file_offset,
                end: file_offset + line_len + 1,
                tokens,
            });

            file_offset += line_len;
        }

        Self {
            sentences,
            clitic_hosts,
        }
    }

    pub fn sentences(&self) -> &[SentenceSpan] {
        &self.sentences
    }

    pub fn sentence(&self, number: usize) -> Option<&SentenceSpan> {
        number
            .checked_sub(1)
            .and_then(|idx| self.sentences.get(idx))
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// The `# text` form of a sentence.
    pub fn display_text(&self, sentence: usize) -> Option<&str> {
        self.sentence(sentence).map(|s| s.display.as_str())
    }

    pub fn token(&self, position: TokenPosition) -> Option<&TokenSpan> {
        self.sentence(position.sentence)?
            .tokens
            .iter()
            .find(|t| t.number == position.token)
    }

    /// The clitic host whose first sub-token sits at `position`.
    pub fn clitic_host(&self, position: TokenPosition) -> Option<&CliticHost> {
        self.clitic_hosts.get(&position)
    }

    /// Map an absolute `start..end` span to the token that contains it.
    ///
    /// Sentences and then tokens are scanned in ascending order and the first
    /// containing token wins. A sentence that contains the span but none of
    /// whose tokens do does not stop the scan: sentence spans overlap the next
    /// line by one character, so a one-character token at the start of a line
    /// also fits inside the previous sentence.
    pub fn resolve(&self, start: usize, end: usize) -> Result<TokenPosition, SpanMiss> {
        let mut miss = SpanMiss::NoSentence;

        for sentence in &self.sentences {
            if !sentence.contains(start, end) {
                continue;
            }

            let rel_start = start - sentence.start;
            let rel_end = end.saturating_sub(sentence.start);
            if let Some(token) = sentence
                .tokens
                .iter()
                .find(|t| t.contains(rel_start, rel_end))
            {
                return Ok(TokenPosition::new(sentence.number, token.number));
            }

            miss = SpanMiss::NoToken {
                sentence: sentence.number,
                start: sentence.start,
                end: sentence.end,
                text: sentence.text.clone(),
            };
        }

        Err(miss)
    }
}

fn strip_brackets(word: &str) -> &str {
    word.trim_matches(|c| c == '[' || c == ']')
}

fn is_bracketed(word: &str) -> bool {
    word.starts_with('[') && word.ends_with(']')
}

fn display_form(line: &str) -> String {
    line.split_whitespace()
        .filter(|word| !word.contains('_'))
        .map(strip_brackets)
        .collect::<Vec<_>>()
        .join(" ")
}

fn index_tokens(
    sentence: usize,
    line: &str,
    clitic_hosts: &mut HashMap<TokenPosition, CliticHost>,
) -> Vec<TokenSpan> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut pending_host: Option<String> = None;

    for word in line.split_whitespace() {
        let width = word.chars().count();

        if is_bracketed(word) {
            offset += width + 1;
            pending_host = Some(strip_brackets(word).to_string());
            continue;
        }

        if word.contains('_') {
            let parts: Vec<&str> = word.split('_').collect();
            let surface = pending_host.take().unwrap_or_else(|| {
                warn!(sentence, word, "clitic group without a bracketed host word");
                String::new()
            });
            clitic_hosts.insert(
                TokenPosition::new(sentence, tokens.len() + 1),
                CliticHost {
                    surface,
                    splits: parts.len() - 1,
                },
            );

            for part in parts {
                let part_width = part.chars().count();
                tokens.push(TokenSpan {
                    number: tokens.len() + 1,
                    surface: part.to_string(),
                    start: offset,
                    end: offset + part_width,
                });
                offset += part_width + 1;
            }
        } else {
            tokens.push(TokenSpan {
                number: tokens.len() + 1,
                surface: word.to_string(),
                start: offset,
                end: offset + width + 1,
            });
            offset += width + 1;
        }
    }

    tokens
}
