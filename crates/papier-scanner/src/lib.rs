//! External block scanner for Papier documents.
//!
//! Papier blocks behave like shell here-documents: `{EOF` opens a block,
//! every following line is taken verbatim, and a line reading `EOF}` closes
//! it. The terminator is data chosen by the author, so the extent of a block
//! cannot be described by the context-free grammar. This crate implements
//! the stateful piece the parsing engine calls into for those tokens.
//!
//! ```rust
//! use papier_scanner::{LexemeKind, TokenKind, TokenStream, ScannerOptions};
//!
//! let kinds: Vec<_> = TokenStream::new("{EOF\nbody\nEOF}\n", ScannerOptions::default())
//!     .map(|lexeme| lexeme.kind)
//!     .collect();
//! assert_eq!(
//!     kinds,
//!     [
//!         LexemeKind::External(TokenKind::BlockStart),
//!         LexemeKind::External(TokenKind::BlockContent),
//!         LexemeKind::External(TokenKind::BlockEnd),
//!     ]
//! );
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod codec;
mod driver;
mod error;
mod heredoc;
mod lexer;
mod options;
mod scanner;
mod token;
mod word;

#[cfg(test)]
mod tests;

pub use codec::SERIALIZATION_BUFFER_SIZE;
pub use driver::{Lexeme, LexemeKind, TokenStream};
pub use error::{DeserializeError, SerializeError, WordMiss};
pub use heredoc::Heredoc;
pub use lexer::{Lexer, StrLexer};
pub use options::{ScannerOptions, TrailingContent};
pub use scanner::Scanner;
pub use token::{TokenKind, ValidSymbols};
pub use word::{advance_word, escape_word};
