//! Value slots: the host's positional, mutable argument storage.
//!
//! The host passes every argument by slot; outputs are written back into
//! the same slots. Strings are raw bytes, passed to and from native calls
//! unchanged. Numeric reads are lenient the way the host language is: a
//! string slot holding digits reads as a number, an empty string reads as
//! zero.

use std::borrow::Cow;
use std::ffi::OsString;
use std::fmt;
use std::os::unix::ffi::OsStringExt;
use std::path::PathBuf;

use mposix_core::buffer::{ListWriter, bounded_bytes};
use mposix_core::{PosixError, PosixResult};

use crate::registry::{Direction, Kind, Param};

/// One host value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Int(i64),
    Uint(u64),
    Str(Vec<u8>),
}

impl Slot {
    /// Read as a signed integer.
    pub fn as_i64(&self) -> PosixResult<i64> {
        match self {
            Slot::Int(v) => Ok(*v),
            Slot::Uint(v) => Ok(*v as i64),
            Slot::Str(s) => parse_number(&String::from_utf8_lossy(s)),
        }
    }

    /// Read as an unsigned integer. Negative values wrap, so `-1` reads as
    /// all bits set (e.g. "leave unchanged" for `chown`).
    pub fn as_u64(&self) -> PosixResult<u64> {
        match self {
            Slot::Uint(v) => Ok(*v),
            Slot::Int(v) => Ok(*v as u64),
            Slot::Str(s) => {
                let text = String::from_utf8_lossy(s);
                let text = text.trim();
                match text.parse::<u64>() {
                    Ok(v) => Ok(v),
                    Err(_) => parse_number(text).map(|v| v as u64),
                }
            }
        }
    }

    /// The value as text, for option names and display. Bytes that are not
    /// UTF-8 are replaced.
    pub fn as_str(&self) -> Cow<'_, str> {
        match self {
            Slot::Str(s) => String::from_utf8_lossy(s),
            Slot::Int(v) => Cow::Owned(v.to_string()),
            Slot::Uint(v) => Cow::Owned(v.to_string()),
        }
    }

    /// The value exactly as the host passed it.
    pub fn as_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Slot::Str(s) => Cow::Borrowed(s),
            Slot::Int(v) => Cow::Owned(v.to_string().into_bytes()),
            Slot::Uint(v) => Cow::Owned(v.to_string().into_bytes()),
        }
    }
}

fn parse_number(s: &str) -> PosixResult<i64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0);
    }
    s.parse()
        .map_err(|_| PosixError::InvalidArgument(format!("not a number: {s:?}")))
}

impl From<i64> for Slot {
    fn from(v: i64) -> Self {
        Slot::Int(v)
    }
}

impl From<u64> for Slot {
    fn from(v: u64) -> Self {
        Slot::Uint(v)
    }
}

impl From<&str> for Slot {
    fn from(v: &str) -> Self {
        Slot::Str(v.as_bytes().to_vec())
    }
}

impl From<String> for Slot {
    fn from(v: String) -> Self {
        Slot::Str(v.into_bytes())
    }
}

impl From<&[u8]> for Slot {
    fn from(v: &[u8]) -> Self {
        Slot::Str(v.to_vec())
    }
}

impl From<Vec<u8>> for Slot {
    fn from(v: Vec<u8>) -> Self {
        Slot::Str(v)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Int(v) => write!(f, "{v}"),
            Slot::Uint(v) => write!(f, "{v}"),
            Slot::Str(s) => f.write_str(&String::from_utf8_lossy(s)),
        }
    }
}

/// A binding's view of its slots, typed by its parameter list.
///
/// Only constructed after the arity check, so `params` and `slots` have
/// the same length.
pub struct Args<'a> {
    params: &'static [Param],
    slots: &'a mut [Slot],
}

impl<'a> Args<'a> {
    pub(crate) fn new(params: &'static [Param], slots: &'a mut [Slot]) -> Self {
        debug_assert_eq!(params.len(), slots.len());
        Self { params, slots }
    }

    fn slot(&self, index: usize) -> PosixResult<&Slot> {
        self.slots
            .get(index)
            .ok_or_else(|| PosixError::InvalidArgument(format!("no argument at position {index}")))
    }

    fn slot_mut(&mut self, index: usize) -> PosixResult<&mut Slot> {
        self.slots
            .get_mut(index)
            .ok_or_else(|| PosixError::InvalidArgument(format!("no argument at position {index}")))
    }

    pub fn int(&self, index: usize) -> PosixResult<i64> {
        self.slot(index)?.as_i64()
    }

    pub fn uint(&self, index: usize) -> PosixResult<u64> {
        self.slot(index)?.as_u64()
    }

    /// Text view of a string argument, for option lists and names.
    pub fn str(&self, index: usize) -> PosixResult<Cow<'_, str>> {
        Ok(self.slot(index)?.as_str())
    }

    pub fn bytes(&self, index: usize) -> PosixResult<Cow<'_, [u8]>> {
        Ok(self.slot(index)?.as_bytes())
    }

    /// A string argument as a path, byte for byte.
    pub fn path(&self, index: usize) -> PosixResult<PathBuf> {
        Ok(PathBuf::from(OsString::from_vec(self.bytes(index)?.into_owned())))
    }

    pub fn set_int(&mut self, index: usize, value: i64) -> PosixResult<()> {
        *self.slot_mut(index)? = Slot::Int(value);
        Ok(())
    }

    pub fn set_uint(&mut self, index: usize, value: u64) -> PosixResult<()> {
        *self.slot_mut(index)? = Slot::Uint(value);
        Ok(())
    }

    /// Store a string output, clipped to the parameter's buffer capacity.
    ///
    /// On truncation the clipped value is stored and the error returned.
    pub fn set_str(&mut self, index: usize, value: impl AsRef<[u8]>) -> PosixResult<()> {
        let value = value.as_ref();
        let capacity = self.capacity(index);
        let (stored, status) = match capacity {
            Some(capacity) => bounded_bytes(value, capacity),
            None => (value.to_vec(), Ok(())),
        };
        *self.slot_mut(index)? = Slot::Str(stored);
        status
    }

    /// Store `entries` as a `|`-joined list, clipped to the buffer capacity.
    pub fn set_list<E: AsRef<[u8]>>(
        &mut self,
        index: usize,
        entries: impl IntoIterator<Item = E>,
    ) -> PosixResult<()> {
        let mut list = ListWriter::new(self.capacity(index).unwrap_or(usize::MAX));
        let status = list.extend(entries);
        *self.slot_mut(index)? = Slot::Str(list.into_bytes());
        status
    }

    fn capacity(&self, index: usize) -> Option<usize> {
        match self.params.get(index).map(|param| param.kind) {
            Some(Kind::Buffer(capacity)) => Some(capacity),
            _ => None,
        }
    }

    /// Reset every output slot to its zero value.
    pub(crate) fn clear_outputs(&mut self) {
        for (param, slot) in self.params.iter().zip(self.slots.iter_mut()) {
            if param.direction == Direction::Out {
                *slot = param.kind.zero();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Coercion ───────────────────────────────────────────────────

    #[test]
    fn numeric_strings_coerce() {
        assert_eq!(Slot::from("42").as_i64().unwrap(), 42);
        assert_eq!(Slot::from(" -7 ").as_i64().unwrap(), -7);
        assert_eq!(Slot::from("").as_u64().unwrap(), 0);
        assert_eq!(Slot::from("18446744073709551615").as_u64().unwrap(), u64::MAX);
    }

    #[test]
    fn negative_wraps_to_unsigned() {
        assert_eq!(Slot::Int(-1).as_u64().unwrap(), u64::MAX);
        assert_eq!(Slot::from("-1").as_u64().unwrap(), u64::MAX);
    }

    #[test]
    fn garbage_is_invalid_argument() {
        let err = Slot::from("twelve").as_i64().unwrap_err();
        assert_eq!(err.errno(), libc::EINVAL);
    }

    #[test]
    fn numbers_read_as_strings() {
        assert_eq!(Slot::Int(-3).as_str(), "-3");
        assert_eq!(Slot::Uint(9).to_string(), "9");
        assert_eq!(&*Slot::Uint(9).as_bytes(), b"9");
    }

    #[test]
    fn string_bytes_are_kept_verbatim() {
        let latin1 = Slot::from(&b"/tmp/caf\xe9"[..]);
        assert_eq!(&*latin1.as_bytes(), b"/tmp/caf\xe9");
        assert_eq!(latin1.as_str(), "/tmp/caf\u{fffd}");
        assert_eq!(latin1.to_string(), "/tmp/caf\u{fffd}");
    }

    // ── Args ───────────────────────────────────────────────────────

    static PARAMS: [Param; 3] = [
        Param::input("path", Kind::Str),
        Param::output("name", Kind::Buffer(8)),
        Param::output("size", Kind::Ulong),
    ];

    #[test]
    fn set_str_clips_to_capacity() {
        let mut slots = vec![Slot::from("/tmp"), Slot::from(""), Slot::Uint(0)];
        let mut args = Args::new(&PARAMS, &mut slots);
        assert!(args.set_str(1, "short").is_ok());
        assert!(args.set_str(1, "much too long").unwrap_err().is_truncation());
        assert_eq!(slots[1], Slot::from("much to"));
    }

    #[test]
    fn path_and_outputs_keep_non_utf8_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let mut slots = vec![Slot::from(&b"/tmp/caf\xe9"[..]), Slot::from(""), Slot::Uint(0)];
        let mut args = Args::new(&PARAMS, &mut slots);
        assert_eq!(args.path(0).unwrap().as_os_str().as_bytes(), b"/tmp/caf\xe9");
        // Clipping counts bytes: seven fit in an 8-byte buffer.
        assert!(args.set_str(1, b"\xe9\xe9\xe9\xe9\xe9\xe9\xe9\xe9").unwrap_err().is_truncation());
        assert_eq!(slots[1], Slot::Str(vec![0xe9; 7]));
    }

    #[test]
    fn set_list_joins_entries() {
        let mut slots = vec![Slot::from(""), Slot::from(""), Slot::Uint(0)];
        let mut args = Args::new(&PARAMS, &mut slots);
        args.set_list(1, ["a", "bc"]).unwrap();
        assert_eq!(args.str(1).unwrap(), "a|bc");
    }

    #[test]
    fn clear_outputs_leaves_inputs() {
        let mut slots = vec![Slot::from("/tmp"), Slot::from("stale"), Slot::Uint(5)];
        Args::new(&PARAMS, &mut slots).clear_outputs();
        assert_eq!(slots, vec![Slot::from("/tmp"), Slot::from(""), Slot::Uint(0)]);
    }
}
