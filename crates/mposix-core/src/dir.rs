//! Directory stream iteration.
//!
//! ```text
//! CLOSED ──open──▶ OPEN ──read──▶ OPEN   (next name, or "" at end)
//!                  OPEN ──close─▶ CLOSED
//! ```
//!
//! Streams are tracked in a [`HandleArena`]; a handle not in the table is
//! rejected with `EINVAL` and never reaches `readdir`/`closedir`.

use std::ffi::{CStr, OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr::NonNull;

use crate::error::{PosixError, PosixResult, c_string, check, clear_errno, last_os_error};
use crate::handles::{Handle, HandleArena, MAX_OPEN_DIRS};

/// Capacity of a directory entry name at the host boundary.
pub const NAME_CAPACITY: usize = 256;

/// An open `DIR*`, closed on drop unless closed explicitly first.
#[derive(Debug)]
struct DirStream(NonNull<libc::DIR>);

// SAFETY: a DIR* may move between threads; DirTable serializes all use
// through `&mut self`.
unsafe impl Send for DirStream {}

impl DirStream {
    fn open(path: &Path) -> PosixResult<Self> {
        let c_path = c_string("path", path.as_os_str().as_bytes())?;
        clear_errno();
        // SAFETY: the path is NUL-terminated.
        let raw = unsafe { libc::opendir(c_path.as_ptr()) };
        NonNull::new(raw)
            .map(Self)
            .ok_or_else(|| last_os_error("opendir"))
    }

    fn next_name(&mut self) -> PosixResult<Option<OsString>> {
        clear_errno();
        // SAFETY: the stream is open for as long as self exists.
        let entry = unsafe { libc::readdir(self.0.as_ptr()) };
        if entry.is_null() {
            // End of stream leaves errno untouched; an error sets it.
            return match nix::errno::Errno::last() {
                nix::errno::Errno::UnknownErrno => Ok(None),
                _ => Err(last_os_error("readdir")),
            };
        }
        // SAFETY: readdir returned a valid dirent with a NUL-terminated name.
        let name = unsafe { CStr::from_ptr((*entry).d_name.as_ptr()) };
        Ok(Some(OsStr::from_bytes(name.to_bytes()).to_os_string()))
    }

    fn close(self) -> PosixResult<()> {
        let raw = self.0.as_ptr();
        std::mem::forget(self);
        clear_errno();
        // SAFETY: raw came from opendir and is closed exactly once.
        check("closedir", unsafe { libc::closedir(raw) })
    }
}

impl Drop for DirStream {
    fn drop(&mut self) {
        // SAFETY: the stream is still open; `close` forgets self instead.
        unsafe { libc::closedir(self.0.as_ptr()) };
    }
}

/// The set of directory streams opened on behalf of the host.
#[derive(Debug)]
pub struct DirTable {
    streams: HandleArena<DirStream>,
}

impl DirTable {
    /// A table with the default ceiling of [`MAX_OPEN_DIRS`].
    pub fn new() -> Self {
        Self::with_limit(MAX_OPEN_DIRS)
    }

    /// A table with a lower ceiling. Limits above [`MAX_OPEN_DIRS`] are clamped.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            streams: HandleArena::with_capacity(limit.min(MAX_OPEN_DIRS)),
        }
    }

    pub fn limit(&self) -> usize {
        self.streams.capacity()
    }

    pub fn open_count(&self) -> usize {
        self.streams.len()
    }

    /// Open `path` and return its token.
    ///
    /// A full table fails with `EMFILE` before `opendir` is called.
    pub fn open(&mut self, path: impl AsRef<Path>) -> PosixResult<u64> {
        let path = path.as_ref();
        self.streams.ensure_vacancy()?;
        let stream = DirStream::open(path)?;
        let handle = self.streams.insert(stream).map_err(|(err, stream)| {
            drop(stream);
            err
        })?;
        let raw = handle.to_raw();
        tracing::debug!(path = %path.display(), handle = raw, open = self.streams.len(), "directory opened");
        Ok(raw)
    }

    /// Next entry name of the stream, or `""` once the stream is exhausted.
    /// Names are the raw `d_name` bytes.
    ///
    /// Reading past the end keeps returning `""`; the stream stays open.
    pub fn read(&mut self, handle: u64) -> PosixResult<OsString> {
        let stream = Handle::from_raw(handle)
            .and_then(|h| self.streams.get_mut(h))
            .ok_or(PosixError::UnknownHandle(handle))?;
        Ok(stream.next_name()?.unwrap_or_default())
    }

    /// Close the stream and retire its token.
    pub fn close(&mut self, handle: u64) -> PosixResult<()> {
        let stream = Handle::from_raw(handle)
            .and_then(|h| self.streams.remove(h))
            .ok_or(PosixError::UnknownHandle(handle))?;
        tracing::debug!(handle, open = self.streams.len(), "directory closed");
        stream.close()
    }

    /// Read every remaining entry name except `.` and `..`.
    pub(crate) fn entries(path: &Path) -> PosixResult<Vec<OsString>> {
        let mut stream = DirStream::open(path)?;
        let mut names = Vec::new();
        while let Some(name) = stream.next_name()? {
            if name != "." && name != ".." {
                names.push(name);
            }
        }
        stream.close()?;
        Ok(names)
    }
}

impl Default for DirTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DirTable {
    fn drop(&mut self) {
        let leaked = self.streams.len();
        if leaked > 0 {
            tracing::debug!(leaked, "closing directory streams left open");
        }
        self.streams.drain().for_each(drop);
    }
}
