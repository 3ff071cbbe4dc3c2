#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use papier_scanner::{
    Lexeme, Lexer, Scanner, ScannerOptions, StrLexer, TokenStream, TrailingContent, ValidSymbols,
};

// Fragments the scanner reacts to; raw bytes alone rarely form a block.
static PIECES: &[&str] = &[
    "{", "}", "{EOF\n", "EOF}", "EOF}\n", "{-EOF\n", "\tEOF}\n", "{'A B'\n", "A B}\n",
    "{\\X\n", "X}\n", "\n", "\r\n", " ", "\t", "\\", "\\\n", "'", "\"", "text", "* title ",
];

#[derive(Debug, Arbitrary)]
enum Piece {
    Known(u8),
    Char(char),
}

#[derive(Debug, Arbitrary)]
struct Input {
    ignore_trailing: bool,
    max_depth: u8,
    pieces: Vec<Piece>,
    masks: Vec<u8>,
}

impl Input {
    fn source(&self) -> String {
        let mut src = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Known(i) => src.push_str(PIECES[usize::from(*i) % PIECES.len()]),
                Piece::Char(c) => src.push(*c),
            }
        }
        src
    }

    fn options(&self) -> ScannerOptions {
        ScannerOptions {
            trailing_content: if self.ignore_trailing {
                TrailingContent::Ignore
            } else {
                TrailingContent::Reject
            },
            max_depth: self.max_depth % 40,
        }
    }
}

/// Restoring a checkpoint taken at any lexeme boundary reproduces the rest of
/// the one-pass stream.
fn check_resume(src: &str, options: ScannerOptions) {
    let full: Vec<Lexeme> = TokenStream::new(src, options).collect();
    let mut stream = TokenStream::new(src, options);
    for k in 0..=full.len() {
        // Deep stacks of long delimiters may not fit the host buffer.
        let Ok((offset, state)) = stream.checkpoint() else {
            return;
        };
        let resumed: Vec<Lexeme> = TokenStream::resume(src, offset, &state, options)
            .expect("a serialized state deserializes")
            .collect();
        assert_eq!(resumed, full[k..]);
        stream.next();
    }
}

/// Arbitrary valid sets: commits are offered and non-empty, declines leave
/// the state untouched.
fn check_valid_sets(src: &str, options: ScannerOptions, masks: &[u8]) {
    let mut scanner = Scanner::with_options(options);
    let mut lexer = StrLexer::new(src, 0);
    let mut masks = masks.iter().copied().cycle();
    while !lexer.is_eof() {
        let valid = ValidSymbols::from_bits_truncate(masks.next().unwrap_or(0xFF));
        let start = lexer.position();
        let before = scanner.clone();
        lexer.begin_token();
        match scanner.scan(&mut lexer, valid) {
            Some(kind) => {
                assert!(valid.allows(kind));
                let span = lexer.commit_token();
                assert!(!span.is_empty());
            }
            None => {
                assert_eq!(scanner, before);
                lexer.rewind(start);
                lexer.advance();
                lexer.commit_token();
            }
        }
        assert!(scanner.level() <= options.max_depth);
    }
}

fn scanner(input: &Input) {
    let src = input.source();
    let options = input.options();
    check_resume(&src, options);
    check_valid_sets(&src, options, &input.masks);
}

fuzz_target!(|input: Input| scanner(&input));
