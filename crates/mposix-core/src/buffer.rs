//! Fixed-capacity string outputs.
//!
//! The host preallocates every string output with a fixed capacity that
//! includes the NUL terminator. A result that does not fit is reported as
//! [`PosixError::Truncated`]; whatever fit stays in the buffer, terminated.

use crate::error::{PosixError, PosixResult};
use crate::options::LIST_DELIMITER;

/// Copy `src` into a C buffer of `dst.len()` bytes, always NUL-terminating.
///
/// Returns the number of bytes copied (excluding the terminator).
pub fn copy_bounded(dst: &mut [u8], src: &[u8]) -> PosixResult<usize> {
    let capacity = dst.len();
    if capacity == 0 {
        return Err(PosixError::Truncated { capacity });
    }
    let n = src.len().min(capacity - 1);
    dst[..n].copy_from_slice(&src[..n]);
    dst[n] = 0;
    if n < src.len() {
        return Err(PosixError::Truncated { capacity });
    }
    Ok(n)
}

/// Clip `src` to what a `capacity`-byte buffer can hold.
///
/// Returns the clipped bytes together with the truncation status, so the
/// caller can store the partial value and still report the failure. Host
/// strings are raw bytes, so the cut falls on a byte, not a character.
pub fn bounded_bytes(src: &[u8], capacity: usize) -> (Vec<u8>, PosixResult<()>) {
    let limit = capacity.saturating_sub(1);
    if src.len() <= limit && capacity > 0 {
        return (src.to_vec(), Ok(()));
    }
    (src[..limit.min(src.len())].to_vec(), Err(PosixError::Truncated { capacity }))
}

/// Appends `|`-joined entries into a fixed capacity.
///
/// After the first overflow the writer keeps the truncated prefix and
/// rejects further pushes.
#[derive(Debug)]
pub struct ListWriter {
    capacity: usize,
    out: Vec<u8>,
    overflowed: bool,
}

impl ListWriter {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            out: Vec::new(),
            overflowed: false,
        }
    }

    /// Append one entry, preceded by the delimiter unless it is the first.
    pub fn push(&mut self, entry: impl AsRef<[u8]>) -> PosixResult<()> {
        if self.overflowed {
            return Err(PosixError::Truncated { capacity: self.capacity });
        }
        let mut candidate = self.out.clone();
        if !candidate.is_empty() {
            candidate.push(LIST_DELIMITER as u8);
        }
        candidate.extend_from_slice(entry.as_ref());
        let (clipped, status) = bounded_bytes(&candidate, self.capacity);
        self.out = clipped;
        if status.is_err() {
            self.overflowed = true;
        }
        status
    }

    /// Append every entry, stopping at the first overflow.
    pub fn extend<E: AsRef<[u8]>>(&mut self, entries: impl IntoIterator<Item = E>) -> PosixResult<()> {
        entries.into_iter().try_for_each(|entry| self.push(entry))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }
}
