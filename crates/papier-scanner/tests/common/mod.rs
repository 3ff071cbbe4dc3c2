#![allow(missing_docs, dead_code)]

use papier_scanner::{LexemeKind, ScannerOptions, TokenStream, TrailingContent};

pub fn render_with(src: &str, options: ScannerOptions) -> String {
    TokenStream::new(src, options)
        .map(|lexeme| {
            let kind = match lexeme.kind {
                LexemeKind::External(kind) => kind.name(),
                LexemeKind::Text => "text",
            };
            format!("{kind:<13} {:?}", lexeme.text(src))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render(src: &str) -> String {
    render_with(src, ScannerOptions::default())
}

pub fn ignoring_trailing() -> ScannerOptions {
    ScannerOptions {
        trailing_content: TrailingContent::Ignore,
        ..ScannerOptions::default()
    }
}
