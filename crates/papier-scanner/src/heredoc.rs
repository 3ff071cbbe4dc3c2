//! Per-block state: the delimiter that closes the block and how its content
//! is read.

use bstr::{BStr, BString};

use crate::{error::WordMiss, lexer::Lexer, word::advance_word};

/// One open block.
///
/// Equality ignores the scratch buffer used while matching terminators.
#[derive(Debug, Clone, Default)]
pub struct Heredoc {
    pub(crate) delimiter: BString,
    pub(crate) is_raw: bool,
    pub(crate) allows_indent: bool,
    pub(crate) started: bool,
    // A terminator with trailing text closed a nested block; the rest of that
    // line belongs to this block and is not a line start.
    pub(crate) mid_line: bool,
    current_leading_word: BString,
}

impl PartialEq for Heredoc {
    fn eq(&self, other: &Self) -> bool {
        self.delimiter == other.delimiter
            && self.is_raw == other.is_raw
            && self.allows_indent == other.allows_indent
            && self.started == other.started
            && self.mid_line == other.mid_line
    }
}

impl Eq for Heredoc {}

impl Heredoc {
    pub(crate) fn from_parts(
        delimiter: BString,
        is_raw: bool,
        allows_indent: bool,
        started: bool,
    ) -> Self {
        Self {
            delimiter,
            is_raw,
            allows_indent,
            started,
            mid_line: false,
            current_leading_word: BString::default(),
        }
    }

    /// The word that closes this block.
    #[must_use]
    pub fn delimiter(&self) -> &BStr {
        self.delimiter.as_ref()
    }

    /// Whether content is taken verbatim (the delimiter was quoted or
    /// escaped).
    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.is_raw
    }

    /// Whether the terminator line may be indented.
    #[must_use]
    pub fn allows_indent(&self) -> bool {
        self.allows_indent
    }

    /// Whether a line of this block has been scanned.
    #[must_use]
    pub fn started(&self) -> bool {
        self.started
    }

    /// Length of the delimiter prefix matched by the last
    /// [`scan_end_identifier`](Self::scan_end_identifier).
    pub(crate) fn matched_len(&self) -> usize {
        self.current_leading_word.len()
    }

    pub(crate) fn reset(&mut self) {
        self.is_raw = false;
        self.started = false;
        self.allows_indent = false;
        self.mid_line = false;
        self.delimiter.clear();
        self.current_leading_word.clear();
    }

    /// Reads the delimiter after the opening brace.
    ///
    /// Blanks before the word are skipped; a line break is not, so `{` at
    /// the end of a line never takes its delimiter from the next line. On
    /// failure the record is cleared.
    pub(crate) fn scan_start<L: Lexer + ?Sized>(&mut self, lexer: &mut L) -> Result<(), WordMiss> {
        while matches!(lexer.lookahead(), Some(' ' | '\t')) {
            lexer.skip();
        }

        self.is_raw = matches!(lexer.lookahead(), Some('\'' | '"' | '\\'));

        if let Err(miss) = advance_word(lexer, &mut self.delimiter) {
            self.reset();
            return Err(miss);
        }
        Ok(())
    }

    /// Checks whether the input at the cursor starts with the whole
    /// delimiter.
    ///
    /// Matching characters are consumed; the cursor stops at the first
    /// mismatch, at a line feed or end of input, or once the delimiter's
    /// length is reached. What follows the delimiter is left to the caller.
    pub(crate) fn scan_end_identifier<L: Lexer + ?Sized>(&mut self, lexer: &mut L) -> bool {
        self.current_leading_word.clear();
        if self.delimiter.is_empty() {
            return false;
        }

        let mut utf8 = [0u8; 4];
        while let Some(ch) = lexer.lookahead() {
            let matched = self.current_leading_word.len();
            if ch == '\n' || matched >= self.delimiter.len() {
                break;
            }
            let encoded = ch.encode_utf8(&mut utf8).as_bytes();
            if !self.delimiter[matched..].starts_with(encoded) {
                break;
            }
            self.current_leading_word.extend_from_slice(encoded);
            lexer.advance();
        }

        self.current_leading_word == self.delimiter
    }
}
