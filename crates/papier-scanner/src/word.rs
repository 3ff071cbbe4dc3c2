//! Delimiter word reading.
//!
//! This is an approximation of a POSIX shell word: it strips one layer of
//! quoting and backslash escapes and assumes the default `IFS`. No parameter
//! expansion or word splitting takes place.

use alloc::string::String;

use bstr::{BString, ByteVec};

use crate::{error::WordMiss, lexer::Lexer};

/// Consumes one word at the cursor and appends its unquoted bytes to `out`.
///
/// - A leading `'` or `"` opens a quote that runs to the matching quote
///   character. The quotes are consumed but not stored. A line break or end
///   of input before the closing quote fails with
///   [`WordMiss::UnterminatedQuote`].
/// - Otherwise the word runs until whitespace or a block brace (`{`, `}`).
/// - In both forms a backslash stores the next character literally. A
///   trailing backslash fails with [`WordMiss::UnterminatedEscape`].
///
/// Leading blanks are not skipped; the caller positions the cursor.
///
/// # Errors
///
/// Returns a [`WordMiss`] when no non-empty word can be read. `out` may hold
/// a partial word in that case and should be discarded.
pub fn advance_word<L: Lexer + ?Sized>(lexer: &mut L, out: &mut BString) -> Result<(), WordMiss> {
    let quote = match lexer.lookahead() {
        Some(q @ ('\'' | '"')) => {
            lexer.advance();
            Some(q)
        }
        _ => None,
    };

    let mut empty = true;
    while let Some(ch) = lexer.lookahead() {
        let at_boundary = match quote {
            Some(q) => ch == q || ch == '\r' || ch == '\n',
            None => ch.is_whitespace() || ch == '{' || ch == '}',
        };
        if at_boundary {
            break;
        }

        let ch = if ch == '\\' {
            lexer.advance();
            lexer.lookahead().ok_or(WordMiss::UnterminatedEscape)?
        } else {
            ch
        };
        out.push_char(ch);
        empty = false;
        lexer.advance();
    }

    if let Some(q) = quote {
        if lexer.lookahead() != Some(q) {
            return Err(WordMiss::UnterminatedQuote);
        }
        lexer.advance();
    }

    if empty { Err(WordMiss::Empty) } else { Ok(()) }
}

/// Renders `word` so that [`advance_word`] reads it back unchanged.
///
/// Whitespace, quotes, backslashes and braces are backslash-escaped.
#[must_use]
pub fn escape_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for ch in word.chars() {
        if ch.is_whitespace() || matches!(ch, '\\' | '\'' | '"' | '{' | '}') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
