//! Token classifier: the state machine the parsing engine calls once per
//! external token request.
//!
//! Overview
//! - Outside any block the scanner only recognises `{DELIM`, the opening of
//!   a block, and declines everything else so the grammar's own lexer runs.
//! - Inside a block every request starts at the beginning of a line. The
//!   line is first tested as a terminator (`DELIM}`) for the innermost block,
//!   then as the opening of a nested block, and otherwise becomes one
//!   `BLOCK_CONTENT` token.
//! - When trailing content is ignored, `DELIM}` may close a nested block in
//!   the middle of a line. The rest of that line is content of the enclosing
//!   block, never a terminator or an opening.
//!
//! Invariants
//! - `level == heredocs.len()` and `pending_blocks` counts the records whose
//!   `started` flag is clear.
//! - Only the innermost record may be mid-line.
//! - State changes only when a token is committed. A decline leaves the
//!   scanner exactly as it was, so the engine may retry the position with a
//!   different valid set.
//! - A committed token is always a member of the valid set offered.

use alloc::vec::Vec;

use tracing::trace;

use crate::{
    heredoc::Heredoc,
    lexer::Lexer,
    options::{ScannerOptions, TrailingContent},
    token::{TokenKind, ValidSymbols},
};

/// Scanner state for one parse session.
///
/// Created by the host when it starts parsing a document (`create`) and
/// dropped when parsing ends (`destroy`); dropping releases every open
/// block's buffers. Between edits the state travels through
/// [`serialize`](Scanner::serialize) and [`deserialize`](Scanner::deserialize).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scanner {
    pub(crate) level: u8,
    pub(crate) pending_blocks: u8,
    pub(crate) heredocs: Vec<Heredoc>,
    pub(crate) options: ScannerOptions,
}

impl Scanner {
    /// Creates a scanner with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scanner with the given options.
    #[must_use]
    pub fn with_options(options: ScannerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Session options.
    #[must_use]
    pub fn options(&self) -> ScannerOptions {
        self.options
    }

    /// Number of open blocks.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Number of open blocks that have not seen a line yet.
    #[must_use]
    pub fn pending_blocks(&self) -> u8 {
        self.pending_blocks
    }

    /// Open blocks, innermost last.
    #[must_use]
    pub fn heredocs(&self) -> &[Heredoc] {
        &self.heredocs
    }

    /// Closes every block and clears the counters. Options are kept.
    pub fn reset(&mut self) {
        self.level = 0;
        self.pending_blocks = 0;
        self.heredocs.clear();
    }

    /// Decides the next external token.
    ///
    /// Returns the committed token kind, with the lexer's token end marked
    /// after it, or `None` to decline and let the grammar tokenize the
    /// position. Only kinds contained in `valid` are ever returned.
    pub fn scan<L: Lexer + ?Sized>(
        &mut self,
        lexer: &mut L,
        valid: ValidSymbols,
    ) -> Option<TokenKind> {
        let token = self.classify(lexer, valid);
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(
            usize::from(self.level) == self.heredocs.len()
                && usize::from(self.pending_blocks)
                    == self.heredocs.iter().filter(|h| !h.started()).count()
                && self.heredocs.iter().rev().skip(1).all(|h| !h.mid_line),
            "Internal error: block state out of sync with the heredoc stack"
        );
        match token {
            Some(kind) => {
                debug_assert!(valid.allows(kind));
                trace!(%kind, level = self.level, pending = self.pending_blocks, "token committed");
            }
            None => trace!(?valid, level = self.level, "no token lexed"),
        }
        token
    }

    fn classify<L: Lexer + ?Sized>(
        &mut self,
        lexer: &mut L,
        valid: ValidSymbols,
    ) -> Option<TokenKind> {
        if valid.is_empty() {
            return None;
        }

        if !self.heredocs.is_empty()
            && valid.intersects(ValidSymbols::BLOCK_CONTENT | ValidSymbols::BLOCK_END)
        {
            return self.scan_line(lexer, valid);
        }

        if lexer.lookahead() == Some('{')
            && valid.allows(TokenKind::BlockStart)
            && !self.heredocs.last().is_some_and(|h| h.mid_line)
        {
            return self.scan_block_start(lexer);
        }

        None
    }

    /// One line inside the innermost block: terminator, nested opening, or
    /// content, in that order.
    fn scan_line<L: Lexer + ?Sized>(
        &mut self,
        lexer: &mut L,
        valid: ValidSymbols,
    ) -> Option<TokenKind> {
        let trailing = self.options.trailing_content;
        let top = self.heredocs.last_mut()?;
        let is_raw = top.is_raw;
        if top.mid_line {
            return self.scan_rest_of_line(lexer, valid, is_raw);
        }
        let mut consumed = false;

        if top.allows_indent {
            while matches!(lexer.lookahead(), Some(' ' | '\t')) {
                lexer.advance();
                consumed = true;
            }
        }

        let mut line_done = false;
        if top.scan_end_identifier(lexer) {
            consumed = true;
            if lexer.lookahead() == Some('}') {
                lexer.advance();
                lexer.mark_end();
                line_done = finish_blank_line(lexer);
                if valid.allows(TokenKind::BlockEnd)
                    && (line_done || trailing == TrailingContent::Ignore)
                {
                    self.close_block();
                    if !line_done {
                        if let Some(enclosing) = self.heredocs.last_mut() {
                            enclosing.mid_line = true;
                        }
                    }
                    return Some(TokenKind::BlockEnd);
                }
            }
        } else if top.matched_len() > 0 {
            consumed = true;
        }

        if !consumed && lexer.lookahead() == Some('{') && valid.allows(TokenKind::BlockStart) {
            if let Some(kind) = self.scan_block_start(lexer) {
                return Some(kind);
            }
            // The `{` is part of this content line whether or not the failed
            // attempt moved past it.
            consumed = true;
        }

        if !valid.allows(TokenKind::BlockContent) {
            return None;
        }
        if !line_done {
            consumed |= consume_line(lexer, is_raw);
        }
        if !consumed {
            return None;
        }
        lexer.mark_end();
        self.mark_started(self.heredocs.len() - 1);
        Some(TokenKind::BlockContent)
    }

    /// The remainder of a line whose start closed a nested block. It is never
    /// a terminator or an opening, only content.
    fn scan_rest_of_line<L: Lexer + ?Sized>(
        &mut self,
        lexer: &mut L,
        valid: ValidSymbols,
        is_raw: bool,
    ) -> Option<TokenKind> {
        if !valid.allows(TokenKind::BlockContent) || !consume_line(lexer, is_raw) {
            return None;
        }
        lexer.mark_end();
        if let Some(top) = self.heredocs.last_mut() {
            top.mid_line = false;
        }
        self.mark_started(self.heredocs.len() - 1);
        Some(TokenKind::BlockContent)
    }

    /// `{`, an optional `-`, the delimiter word, and the rest of the opening
    /// line, which must be blank.
    fn scan_block_start<L: Lexer + ?Sized>(&mut self, lexer: &mut L) -> Option<TokenKind> {
        if self.heredocs.len() >= usize::from(self.options.max_depth) {
            trace!(max_depth = self.options.max_depth, "block start refused at depth limit");
            return None;
        }

        lexer.advance();
        let allows_indent = lexer.lookahead() == Some('-');
        if allows_indent {
            lexer.advance();
        }

        let mut heredoc = Heredoc::default();
        if let Err(miss) = heredoc.scan_start(lexer) {
            trace!(%miss, "block start without delimiter");
            return None;
        }
        heredoc.allows_indent = allows_indent;

        if !finish_blank_line(lexer) {
            trace!(delimiter = %heredoc.delimiter(), "text after block delimiter");
            return None;
        }

        // Opening a nested block is a line of the enclosing one.
        if let Some(enclosing) = self.heredocs.len().checked_sub(1) {
            self.mark_started(enclosing);
        }
        self.heredocs.push(heredoc);
        self.level += 1;
        self.pending_blocks += 1;
        Some(TokenKind::BlockStart)
    }

    fn close_block(&mut self) {
        if let Some(heredoc) = self.heredocs.pop() {
            if !heredoc.started {
                self.pending_blocks -= 1;
            }
            self.level -= 1;
        }
    }

    fn mark_started(&mut self, idx: usize) {
        if let Some(heredoc) = self.heredocs.get_mut(idx) {
            if !heredoc.started {
                heredoc.started = true;
                self.pending_blocks -= 1;
            }
        }
    }
}

/// Consumes trailing blanks and the line break. Returns `false`, leaving the
/// cursor on the offending character, if anything else is on the line.
fn finish_blank_line<L: Lexer + ?Sized>(lexer: &mut L) -> bool {
    while matches!(lexer.lookahead(), Some(' ' | '\t' | '\r')) {
        lexer.advance();
    }
    match lexer.lookahead() {
        Some('\n') => {
            lexer.advance();
            lexer.mark_end();
            true
        }
        None => {
            lexer.mark_end();
            true
        }
        Some(_) => false,
    }
}

/// Consumes up to and including the next line feed. Outside raw blocks a
/// backslash takes the following character with it, so an escaped line feed
/// continues the token onto the next line.
fn consume_line<L: Lexer + ?Sized>(lexer: &mut L, is_raw: bool) -> bool {
    let mut consumed = false;
    while let Some(ch) = lexer.lookahead() {
        lexer.advance();
        consumed = true;
        match ch {
            '\n' => break,
            '\\' if !is_raw && !lexer.is_eof() => lexer.advance(),
            _ => {}
        }
    }
    consumed
}
