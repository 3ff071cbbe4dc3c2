//! Cursor facade the scanner reads through.
//!
//! The host engine owns the input, its decoding and its buffering; the
//! scanner only ever sees one character of lookahead and decides whether each
//! character belongs to the token being built. [`StrLexer`] is the in-memory
//! implementation used by [`TokenStream`](crate::TokenStream) and the tests.

use core::ops::Range;

/// The character cursor the host hands to [`Scanner::scan`](crate::Scanner::scan).
pub trait Lexer {
    /// The next unread character, or `None` at end of input.
    fn lookahead(&self) -> Option<char>;

    /// Consumes the lookahead and includes it in the current token.
    fn advance(&mut self);

    /// Consumes the lookahead as whitespace preceding the token.
    ///
    /// Only meaningful before the first [`advance`](Lexer::advance) of a
    /// token; afterwards it behaves like `advance`.
    fn skip(&mut self);

    /// Fixes the end of the current token at the cursor. Characters advanced
    /// over after the last mark are lookahead only and are not part of the
    /// committed token.
    fn mark_end(&mut self);

    /// Whether the cursor is at end of input.
    fn is_eof(&self) -> bool {
        self.lookahead().is_none()
    }
}

/// A [`Lexer`] over an in-memory string.
///
/// Tracks where the current token started and ended so that a driver can
/// either commit the token or rewind after the scanner declines.
#[derive(Debug, Clone)]
pub struct StrLexer<'src> {
    src: &'src str,
    pos: usize,
    token_start: usize,
    token_end: Option<usize>,
    // Set by the first `advance` of a token; later skips no longer move the start.
    in_token: bool,
}

impl<'src> StrLexer<'src> {
    /// Creates a lexer positioned at `offset`.
    ///
    /// `offset` is clamped to the input and rounded down to a character
    /// boundary.
    #[must_use]
    pub fn new(src: &'src str, offset: usize) -> Self {
        let offset = char_floor(src, offset);
        Self {
            src,
            pos: offset,
            token_start: offset,
            token_end: None,
            in_token: false,
        }
    }

    /// Current byte offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The source text.
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.src
    }

    /// Starts a fresh token at the current position.
    pub fn begin_token(&mut self) {
        self.token_start = self.pos;
        self.token_end = None;
        self.in_token = false;
    }

    /// Byte range of the current token: from the first non-skipped character
    /// to the last [`mark_end`](Lexer::mark_end), or to the cursor when no
    /// mark was set.
    #[must_use]
    pub fn token_span(&self) -> Range<usize> {
        self.token_start..self.token_end.unwrap_or(self.pos)
    }

    /// Moves the cursor to the end of the current token and starts a new one
    /// there.
    pub fn commit_token(&mut self) -> Range<usize> {
        let span = self.token_span();
        self.pos = span.end;
        self.begin_token();
        span
    }

    /// Moves the cursor back to `offset` and starts a new token there.
    ///
    /// `offset` is clamped and rounded down like in [`StrLexer::new`].
    pub fn rewind(&mut self, offset: usize) {
        self.pos = char_floor(self.src, offset);
        self.begin_token();
    }

    fn step(&mut self) {
        if let Some(ch) = self.lookahead() {
            self.pos += ch.len_utf8();
        }
    }
}

fn char_floor(src: &str, offset: usize) -> usize {
    let mut offset = offset.min(src.len());
    while !src.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

impl Lexer for StrLexer<'_> {
    #[inline]
    fn lookahead(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    #[inline]
    fn advance(&mut self) {
        self.in_token = true;
        self.step();
    }

    #[inline]
    fn skip(&mut self) {
        self.step();
        if !self.in_token {
            self.token_start = self.pos;
        }
    }

    #[inline]
    fn mark_end(&mut self) {
        self.token_end = Some(self.pos);
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_moves_token_start_only_before_advance() {
        let mut lx = StrLexer::new("  ab c", 0);
        lx.skip();
        lx.skip();
        lx.advance();
        lx.skip();
        assert_eq!(lx.token_span(), 2..4);
    }

    #[test]
    fn mark_end_limits_span() {
        let mut lx = StrLexer::new("abc\ndef", 0);
        lx.advance();
        lx.advance();
        lx.mark_end();
        lx.advance();
        lx.advance();
        assert_eq!(lx.token_span(), 0..2);
        assert_eq!(lx.commit_token(), 0..2);
        assert_eq!(lx.lookahead(), Some('c'));
    }

    #[test]
    fn multibyte_steps_by_char() {
        let mut lx = StrLexer::new("é}", 0);
        assert_eq!(lx.lookahead(), Some('é'));
        lx.advance();
        assert_eq!(lx.position(), 2);
        assert_eq!(lx.lookahead(), Some('}'));
        lx.advance();
        assert!(lx.is_eof());
        lx.advance();
        assert_eq!(lx.position(), 3);
    }

    #[test]
    fn new_rounds_down_to_char_boundary() {
        let lx = StrLexer::new("aé", 2);
        assert_eq!(lx.position(), 1);
        let lx = StrLexer::new("ab", 10);
        assert!(lx.is_eof());
    }

    #[test]
    fn rewind_rounds_down_to_char_boundary() {
        let mut lx = StrLexer::new("aé}", 0);
        lx.advance();
        lx.advance();
        lx.rewind(2);
        assert_eq!(lx.position(), 1);
        assert_eq!(lx.lookahead(), Some('é'));
        assert_eq!(lx.token_span(), 1..1);
        lx.rewind(usize::MAX);
        assert!(lx.is_eof());
    }
}
