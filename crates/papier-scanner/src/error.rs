use thiserror::Error;

/// Why a delimiter word could not be read.
///
/// These are recognition misses: the scanner declines the token and lets the
/// grammar report the syntax error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WordMiss {
    /// Nothing but blanks or a line break at the cursor.
    #[error("no word at cursor")]
    Empty,
    /// A backslash was the last character of the input.
    #[error("backslash at end of input")]
    UnterminatedEscape,
    /// A quoted word ran into a line break or end of input.
    #[error("quote not closed before end of line")]
    UnterminatedQuote,
}

/// The scanner state cannot be written into the host's buffer.
///
/// The host must treat this as a hard reject of the edit and rescan the
/// document from the start.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SerializeError {
    /// The encoded state is larger than the buffer.
    #[error("state needs {needed} bytes but the buffer holds {capacity}")]
    Overflow {
        /// Bytes the full encoding requires.
        needed: usize,
        /// Bytes the host offered.
        capacity: usize,
    },
    /// A delimiter is too long for its one-byte length prefix.
    #[error("delimiter of {len} bytes exceeds the 255 byte limit")]
    DelimiterTooLong {
        /// Delimiter length in bytes.
        len: usize,
    },
}

/// A serialized state could not be restored.
///
/// The scanner is reset to its defaults whenever this is returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeserializeError {
    /// The buffer ends in the middle of a field.
    #[error("state truncated: needed {needed} bytes, got {len}")]
    Truncated {
        /// Minimum length for the fields read so far.
        needed: usize,
        /// Actual buffer length.
        len: usize,
    },
    /// Bytes remain after the last heredoc record.
    #[error("{extra} unexpected trailing bytes")]
    TrailingBytes {
        /// Number of unread bytes.
        extra: usize,
    },
    /// The nesting level disagrees with the number of records.
    #[error("level {level} does not match {depth} open blocks")]
    LevelMismatch {
        /// Decoded level.
        level: u8,
        /// Decoded stack size.
        depth: usize,
    },
    /// The pending counter disagrees with the unstarted records.
    #[error("{pending} pending blocks recorded but {unstarted} blocks are unstarted")]
    PendingMismatch {
        /// Decoded counter.
        pending: u8,
        /// Records without the `started` flag.
        unstarted: usize,
    },
    /// A record other than the innermost is marked as being mid-line.
    #[error("record {index} is marked mid-line but is not the innermost block")]
    MidLineNotInnermost {
        /// Position of the offending record, outermost first.
        index: usize,
    },
    /// The stack is deeper than the session allows.
    #[error("nesting depth {depth} exceeds the configured maximum of {max}")]
    DepthExceeded {
        /// Decoded stack size.
        depth: usize,
        /// Configured limit.
        max: u8,
    },
}
