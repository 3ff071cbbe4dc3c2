/// What may follow the closing `}` of a terminator line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrailingContent {
    /// Only blanks and the line break may follow `DELIM}`. A line such as
    /// `EOF} trailing` is block content.
    #[default]
    Reject,
    /// `DELIM}` closes the block regardless of what follows on the line. The
    /// remainder is left for the grammar (or for the enclosing block).
    Ignore,
}

/// Configuration options for the block scanner.
///
/// Options are fixed for a parse session; they are not part of the
/// serialized state, so the host must recreate the scanner with the same
/// options when resuming after an edit.
///
/// # Default
///
/// `TrailingContent::Reject` and a maximum depth of 32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScannerOptions {
    /// Policy for text after `DELIM}` on the terminator line.
    ///
    /// # Default
    ///
    /// [`TrailingContent::Reject`]
    pub trailing_content: TrailingContent,

    /// Maximum number of simultaneously open blocks. A block start at this
    /// depth is declined.
    ///
    /// The serialized form of a full stack must still fit the host buffer;
    /// deep stacks with long delimiters can fail to serialize before this
    /// limit is reached.
    ///
    /// # Default
    ///
    /// `32`
    pub max_depth: u8,
}

impl ScannerOptions {
    /// Default nesting limit.
    pub const DEFAULT_MAX_DEPTH: u8 = 32;
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            trailing_content: TrailingContent::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
