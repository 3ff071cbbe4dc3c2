//! Scanner state serialization.
//!
//! The engine snapshots the scanner after every external token and restores
//! the snapshot when it re-lexes from that position after an edit. The whole
//! heredoc stack is written, so open and nested blocks survive the edit.
//!
//! Layout:
//!
//! ```text
//! [0]      level
//! [1]      pending_blocks
//! [2]      n, the number of heredoc records
//! n times: flags (bit 0 raw, bit 1 allows_indent, bit 2 started,
//!          bit 3 mid-line, innermost record only)
//!          delimiter length (one byte), delimiter bytes
//! ```

use alloc::vec::Vec;

use bstr::BString;
use tracing::debug;

use crate::{
    error::{DeserializeError, SerializeError},
    heredoc::Heredoc,
    scanner::Scanner,
};

/// Capacity of the buffer the host passes to [`Scanner::serialize`].
pub const SERIALIZATION_BUFFER_SIZE: usize = 1024;

const HEADER_LEN: usize = 3;
const RECORD_HEADER_LEN: usize = 2;

const FLAG_RAW: u8 = 1 << 0;
const FLAG_INDENT: u8 = 1 << 1;
const FLAG_STARTED: u8 = 1 << 2;
const FLAG_MID_LINE: u8 = 1 << 3;

impl Scanner {
    /// Writes the state into `buffer` and returns the number of bytes used.
    ///
    /// A zero-length result never occurs; an empty state still writes its
    /// header.
    ///
    /// # Errors
    ///
    /// Fails without writing anything when the encoded state does not fit
    /// `buffer` or a delimiter is longer than 255 bytes. The host must then
    /// discard the incremental state and rescan the document.
    pub fn serialize(&self, buffer: &mut [u8]) -> Result<usize, SerializeError> {
        let needed = self.serialized_len()?;
        if needed > buffer.len() {
            debug!(needed, capacity = buffer.len(), "scanner state overflows host buffer");
            return Err(SerializeError::Overflow {
                needed,
                capacity: buffer.len(),
            });
        }

        buffer[0] = self.level;
        buffer[1] = self.pending_blocks;
        // At most `max_depth` records, which is itself a `u8`.
        buffer[2] = self.heredocs.len() as u8;

        let mut at = HEADER_LEN;
        for heredoc in &self.heredocs {
            let delimiter = heredoc.delimiter.as_slice();
            buffer[at] = flags(heredoc);
            buffer[at + 1] = delimiter.len() as u8;
            at += RECORD_HEADER_LEN;
            buffer[at..at + delimiter.len()].copy_from_slice(delimiter);
            at += delimiter.len();
        }
        debug_assert_eq!(at, needed);
        Ok(at)
    }

    /// Bytes [`serialize`](Self::serialize) would write.
    ///
    /// # Errors
    ///
    /// [`SerializeError::DelimiterTooLong`] if a delimiter does not fit its
    /// length prefix.
    pub fn serialized_len(&self) -> Result<usize, SerializeError> {
        self.heredocs.iter().try_fold(HEADER_LEN, |acc, heredoc| {
            let len = heredoc.delimiter.len();
            if len > usize::from(u8::MAX) {
                return Err(SerializeError::DelimiterTooLong { len });
            }
            Ok(acc + RECORD_HEADER_LEN + len)
        })
    }

    /// Restores a state written by [`serialize`](Self::serialize).
    ///
    /// An empty buffer restores the initial state: no open blocks.
    ///
    /// # Errors
    ///
    /// A buffer that is truncated, has trailing bytes, or describes an
    /// inconsistent stack is rejected. The scanner is reset to its initial
    /// state in that case, never left half-restored.
    pub fn deserialize(&mut self, buffer: &[u8]) -> Result<(), DeserializeError> {
        self.reset();
        if buffer.is_empty() {
            return Ok(());
        }

        match decode(buffer, self.options.max_depth) {
            Ok((level, pending_blocks, heredocs)) => {
                self.level = level;
                self.pending_blocks = pending_blocks;
                self.heredocs = heredocs;
                Ok(())
            }
            Err(err) => {
                debug!(%err, len = buffer.len(), "rejected serialized scanner state");
                Err(err)
            }
        }
    }
}

fn flags(heredoc: &Heredoc) -> u8 {
    let mut flags = 0;
    if heredoc.is_raw {
        flags |= FLAG_RAW;
    }
    if heredoc.allows_indent {
        flags |= FLAG_INDENT;
    }
    if heredoc.started {
        flags |= FLAG_STARTED;
    }
    if heredoc.mid_line {
        flags |= FLAG_MID_LINE;
    }
    flags
}

fn decode(buffer: &[u8], max_depth: u8) -> Result<(u8, u8, Vec<Heredoc>), DeserializeError> {
    let truncated = |needed: usize| DeserializeError::Truncated {
        needed,
        len: buffer.len(),
    };

    let [level, pending_blocks, count, ..] = *buffer else {
        return Err(truncated(HEADER_LEN));
    };
    let count = usize::from(count);
    if count > usize::from(max_depth) {
        return Err(DeserializeError::DepthExceeded {
            depth: count,
            max: max_depth,
        });
    }

    let mut heredocs = Vec::with_capacity(count);
    let mut at = HEADER_LEN;
    for _ in 0..count {
        let header = buffer
            .get(at..at + RECORD_HEADER_LEN)
            .ok_or_else(|| truncated(at + RECORD_HEADER_LEN))?;
        let (flags, len) = (header[0], usize::from(header[1]));
        at += RECORD_HEADER_LEN;
        let delimiter = buffer
            .get(at..at + len)
            .ok_or_else(|| truncated(at + len))?;
        at += len;
        let mut heredoc = Heredoc::from_parts(
            BString::from(delimiter),
            flags & FLAG_RAW != 0,
            flags & FLAG_INDENT != 0,
            flags & FLAG_STARTED != 0,
        );
        heredoc.mid_line = flags & FLAG_MID_LINE != 0;
        heredocs.push(heredoc);
    }

    if at != buffer.len() {
        return Err(DeserializeError::TrailingBytes {
            extra: buffer.len() - at,
        });
    }
    if usize::from(level) != heredocs.len() {
        return Err(DeserializeError::LevelMismatch {
            level,
            depth: heredocs.len(),
        });
    }
    if let Some(index) = heredocs.iter().rev().skip(1).position(|h| h.mid_line) {
        return Err(DeserializeError::MidLineNotInnermost {
            index: heredocs.len() - 2 - index,
        });
    }
    let unstarted = heredocs.iter().filter(|h| !h.started).count();
    if usize::from(pending_blocks) != unstarted {
        return Err(DeserializeError::PendingMismatch {
            pending: pending_blocks,
            unstarted,
        });
    }

    Ok((level, pending_blocks, heredocs))
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use quickcheck::{Arbitrary, Gen, QuickCheck};
    use rstest::rstest;

    use super::*;
    use crate::options::ScannerOptions;

    fn scanner_with(heredocs: Vec<Heredoc>) -> Scanner {
        let mut s = Scanner::new();
        s.level = heredocs.len() as u8;
        s.pending_blocks = heredocs.iter().filter(|h| !h.started).count() as u8;
        s.heredocs = heredocs;
        s
    }

    fn roundtrip(s: &Scanner) -> Scanner {
        let mut buf = [0u8; SERIALIZATION_BUFFER_SIZE];
        let len = s.serialize(&mut buf).unwrap();
        let mut restored = Scanner::with_options(s.options);
        restored.deserialize(&buf[..len]).unwrap();
        restored
    }

    #[test]
    fn empty_state_is_three_bytes() {
        let mut buf = [0xAAu8; 8];
        assert_eq!(Scanner::new().serialize(&mut buf), Ok(3));
        assert_eq!(&buf[..3], &[0, 0, 0]);
    }

    #[test]
    fn layout_of_one_record() {
        let s = scanner_with(vec![Heredoc::from_parts("EOF".into(), true, false, true)]);
        let mut buf = [0u8; 16];
        let len = s.serialize(&mut buf).unwrap();
        assert_eq!(&buf[..len], &[1, 0, 1, FLAG_RAW | FLAG_STARTED, 3, b'E', b'O', b'F']);
    }

    #[test]
    fn nested_stack_roundtrips() {
        let s = scanner_with(vec![
            Heredoc::from_parts("OUTER".into(), false, true, true),
            Heredoc::from_parts("INNER".into(), true, false, false),
        ]);
        assert_eq!(roundtrip(&s), s);
    }

    #[test]
    fn mid_line_flag_roundtrips() {
        let mut inner = Heredoc::from_parts("INNER".into(), false, false, true);
        inner.mid_line = true;
        let s = scanner_with(vec![
            Heredoc::from_parts("OUTER".into(), false, false, true),
            inner,
        ]);
        let mut buf = [0u8; 32];
        let len = s.serialize(&mut buf).unwrap();
        assert_eq!(len, 3 + (2 + 5) * 2);
        assert_eq!(buf[3 + 2 + 5], FLAG_STARTED | FLAG_MID_LINE);
        assert_eq!(roundtrip(&s), s);
    }

    #[test]
    fn empty_buffer_restores_defaults() {
        let mut s = scanner_with(vec![Heredoc::from_parts("A".into(), false, false, true)]);
        s.deserialize(&[]).unwrap();
        assert_eq!(s, Scanner::new());
    }

    #[test]
    fn overflow_is_reported_and_buffer_untouched() {
        let s = scanner_with(vec![Heredoc::from_parts("LONGDELIM".into(), false, false, true)]);
        let mut buf = [0xAAu8; 6];
        assert_eq!(
            s.serialize(&mut buf),
            Err(SerializeError::Overflow {
                needed: 14,
                capacity: 6
            })
        );
        assert_eq!(buf, [0xAA; 6]);
    }

    #[test]
    fn long_delimiter_is_rejected() {
        let long = BString::from(vec![b'x'; 256]);
        let s = scanner_with(vec![Heredoc::from_parts(long, false, false, true)]);
        let mut buf = [0u8; SERIALIZATION_BUFFER_SIZE];
        assert_eq!(
            s.serialize(&mut buf),
            Err(SerializeError::DelimiterTooLong { len: 256 })
        );
    }

    #[rstest]
    #[case::short_header(&[1, 0], DeserializeError::Truncated { needed: 3, len: 2 })]
    #[case::short_record(&[1, 0, 1, 4], DeserializeError::Truncated { needed: 5, len: 4 })]
    #[case::short_delimiter(&[1, 0, 1, 4, 3, b'E'], DeserializeError::Truncated { needed: 8, len: 6 })]
    #[case::trailing(&[0, 0, 0, 9], DeserializeError::TrailingBytes { extra: 1 })]
    #[case::level(&[2, 0, 1, 4, 1, b'E'], DeserializeError::LevelMismatch { level: 2, depth: 1 })]
    #[case::pending(&[1, 0, 1, 0, 1, b'E'], DeserializeError::PendingMismatch { pending: 0, unstarted: 1 })]
    #[case::depth(&[40, 0, 40], DeserializeError::DepthExceeded { depth: 40, max: 32 })]
    #[case::mid_line_outer(
        &[2, 0, 2, 4 | 8, 1, b'A', 4, 1, b'B'],
        DeserializeError::MidLineNotInnermost { index: 0 }
    )]
    fn malformed_state_resets(#[case] buf: &[u8], #[case] err: DeserializeError) {
        let mut s = scanner_with(vec![Heredoc::from_parts("KEEP".into(), false, false, true)]);
        assert_eq!(s.deserialize(buf), Err(err));
        assert_eq!(s, Scanner::new());
    }

    #[derive(Debug, Clone)]
    struct ArbState(Scanner);

    impl Arbitrary for ArbState {
        fn arbitrary(g: &mut Gen) -> Self {
            let depth = usize::arbitrary(g) % usize::from(ScannerOptions::DEFAULT_MAX_DEPTH);
            let mut heredocs: Vec<Heredoc> = (0..depth)
                .map(|_| {
                    let mut delimiter: Vec<u8> = Vec::arbitrary(g);
                    delimiter.truncate(24);
                    if delimiter.is_empty() {
                        delimiter.push(b'X');
                    }
                    Heredoc::from_parts(
                        delimiter.into(),
                        bool::arbitrary(g),
                        bool::arbitrary(g),
                        bool::arbitrary(g),
                    )
                })
                .collect();
            if let Some(top) = heredocs.last_mut() {
                top.mid_line = bool::arbitrary(g);
            }
            ArbState(scanner_with(heredocs))
        }
    }

    #[test]
    fn roundtrip_quickcheck() {
        fn prop(state: ArbState) -> bool {
            roundtrip(&state.0) == state.0
        }

        let tests = if is_ci::cached() { 10_000 } else { 1_000 };
        QuickCheck::new()
            .tests(tests)
            .quickcheck(prop as fn(ArbState) -> bool);
    }
}
