//! Reference host loop.
//!
//! [`TokenStream`] plays the part of the parsing engine: it offers the
//! scanner the external tokens a Papier grammar accepts at each position,
//! commits what the scanner lexes, and falls back to a plain text lexeme
//! when the scanner declines. It exists so the scanner can be exercised
//! end to end, including resuming from a serialized checkpoint, without a
//! parser generator runtime.

use alloc::vec::Vec;
use core::ops::Range;

use crate::{
    codec::SERIALIZATION_BUFFER_SIZE,
    error::{DeserializeError, SerializeError},
    lexer::{Lexer, StrLexer},
    options::ScannerOptions,
    scanner::Scanner,
    token::{TokenKind, ValidSymbols},
};

/// What produced a [`Lexeme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LexemeKind {
    /// Committed by the scanner.
    External(TokenKind),
    /// Left to the grammar: a run of text up to the next `{` or through the
    /// next line feed.
    Text,
}

/// One token of the stream and the bytes it covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lexeme {
    /// Token kind.
    pub kind: LexemeKind,
    /// Byte range in the source.
    pub span: Range<usize>,
}

impl Lexeme {
    /// The covered text.
    #[must_use]
    pub fn text<'src>(&self, src: &'src str) -> &'src str {
        &src[self.span.clone()]
    }
}

/// Iterator of lexemes over a whole document.
#[derive(Debug, Clone)]
pub struct TokenStream<'src> {
    lexer: StrLexer<'src>,
    scanner: Scanner,
}

impl<'src> TokenStream<'src> {
    /// Starts at the beginning of `src` with a fresh scanner.
    #[must_use]
    pub fn new(src: &'src str, options: ScannerOptions) -> Self {
        Self {
            lexer: StrLexer::new(src, 0),
            scanner: Scanner::with_options(options),
        }
    }

    /// Starts at byte `offset` with the scanner restored from `state`, as the
    /// engine does when re-lexing after an edit.
    ///
    /// # Errors
    ///
    /// Propagates a rejected `state`; the caller should fall back to
    /// [`TokenStream::new`].
    pub fn resume(
        src: &'src str,
        offset: usize,
        state: &[u8],
        options: ScannerOptions,
    ) -> Result<Self, DeserializeError> {
        let mut scanner = Scanner::with_options(options);
        scanner.deserialize(state)?;
        Ok(Self {
            lexer: StrLexer::new(src, offset),
            scanner,
        })
    }

    /// The current offset and the serialized scanner state, enough to
    /// [`resume`](Self::resume) from here.
    ///
    /// # Errors
    ///
    /// Fails when the state does not fit [`SERIALIZATION_BUFFER_SIZE`].
    pub fn checkpoint(&self) -> Result<(usize, Vec<u8>), SerializeError> {
        let mut buf = [0u8; SERIALIZATION_BUFFER_SIZE];
        let len = self.scanner.serialize(&mut buf)?;
        Ok((self.lexer.position(), buf[..len].to_vec()))
    }

    /// Byte offset of the next lexeme.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.lexer.position()
    }

    /// The scanner driven by this stream.
    #[must_use]
    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    // Mirrors the grammar: blocks may open anywhere in text, and inside a
    // block every external token is acceptable.
    fn valid_symbols(&self) -> ValidSymbols {
        if self.scanner.level() == 0 {
            ValidSymbols::BLOCK_START
        } else {
            ValidSymbols::all()
        }
    }

    fn lex_text(&mut self) -> Range<usize> {
        // The first character is always taken so that a declined `{` still
        // makes progress. A bare line feed is a lexeme of its own.
        let first = self.lexer.lookahead();
        self.lexer.advance();
        if first != Some('\n') {
            while let Some(ch) = self.lexer.lookahead() {
                if ch == '{' {
                    break;
                }
                self.lexer.advance();
                if ch == '\n' {
                    break;
                }
            }
        }
        self.lexer.commit_token()
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Lexeme;

    fn next(&mut self) -> Option<Self::Item> {
        if self.lexer.is_eof() {
            return None;
        }

        let start = self.lexer.position();
        self.lexer.begin_token();
        let valid = self.valid_symbols();
        if let Some(kind) = self.scanner.scan(&mut self.lexer, valid) {
            return Some(Lexeme {
                kind: LexemeKind::External(kind),
                span: self.lexer.commit_token(),
            });
        }

        self.lexer.rewind(start);
        Some(Lexeme {
            kind: LexemeKind::Text,
            span: self.lex_text(),
        })
    }
}
