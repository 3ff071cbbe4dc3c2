use core::fmt;

use bitflags::bitflags;

/// Tokens recognised by the scanner.
///
/// The discriminants are the positions of the tokens in the grammar's
/// `externals` list and must stay in sync with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum TokenKind {
    /// `{EOF` up to and including the line break.
    BlockStart = 0,
    /// One line of block content.
    BlockContent = 1,
    /// `EOF}`.
    BlockEnd = 2,
}

impl TokenKind {
    /// All external tokens in declaration order.
    pub const ALL: [TokenKind; 3] = [Self::BlockStart, Self::BlockContent, Self::BlockEnd];

    /// The single-member set for this token.
    #[must_use]
    pub const fn symbol(self) -> ValidSymbols {
        match self {
            Self::BlockStart => ValidSymbols::BLOCK_START,
            Self::BlockContent => ValidSymbols::BLOCK_CONTENT,
            Self::BlockEnd => ValidSymbols::BLOCK_END,
        }
    }

    /// Name used by the grammar for this token.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BlockStart => "block_start",
            Self::BlockContent => "block_content",
            Self::BlockEnd => "block_end",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// The set of external tokens the grammar accepts at the current position.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ValidSymbols: u8 {
        /// [`TokenKind::BlockStart`] is acceptable.
        const BLOCK_START = 1 << 0;
        /// [`TokenKind::BlockContent`] is acceptable.
        const BLOCK_CONTENT = 1 << 1;
        /// [`TokenKind::BlockEnd`] is acceptable.
        const BLOCK_END = 1 << 2;
    }
}

impl ValidSymbols {
    /// Builds the set from the engine's per-token boolean array, indexed by
    /// [`TokenKind`] discriminant. Missing trailing entries count as `false`.
    #[must_use]
    pub fn from_bools(valid: &[bool]) -> Self {
        TokenKind::ALL
            .iter()
            .zip(valid)
            .filter(|(_, ok)| **ok)
            .fold(Self::empty(), |acc, (kind, _)| acc | kind.symbol())
    }

    /// Whether `kind` may be committed.
    #[must_use]
    pub const fn allows(self, kind: TokenKind) -> bool {
        self.contains(kind.symbol())
    }
}
