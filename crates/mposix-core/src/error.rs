//! Error types for the POSIX bindings.
//!
//! Every failure is reported to the host as a status code. [`PosixError::errno`]
//! performs that mapping; native failures carry the `errno` value the platform
//! reported, unmodified.

use std::ffi::CString;

use nix::errno::Errno;
use thiserror::Error;

/// Result type alias for binding operations.
pub type PosixResult<T> = Result<T, PosixError>;

/// Errors that can occur while marshalling or executing a binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PosixError {
    #[error("expected {expected} arguments, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("unknown {family} option: {name}")]
    InvalidOption { family: &'static str, name: String },

    #[error("result does not fit in {capacity}-byte buffer")]
    Truncated { capacity: usize },

    #[error("unknown handle: {0:#x}")]
    UnknownHandle(u64),

    #[error("handle limit reached ({0} open)")]
    HandleLimit(usize),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{call}: {}", errno.desc())]
    Os { call: &'static str, errno: Errno },
}

impl PosixError {
    /// The status code surfaced to the host for this error.
    pub fn errno(&self) -> i32 {
        match self {
            Self::Arity { .. } => libc::ENODATA,
            Self::InvalidOption { .. } => libc::EINVAL,
            Self::Truncated { .. } => libc::ERANGE,
            Self::UnknownHandle(_) => libc::EINVAL,
            Self::HandleLimit(_) => libc::EMFILE,
            Self::NotFound(_) => libc::ENOENT,
            Self::InvalidArgument(_) => libc::EINVAL,
            Self::Os { errno, .. } => *errno as i32,
        }
    }

    /// Whether this error is an output truncation. Truncation happens after
    /// the native call, so already-written outputs stay in place.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }

    /// Wrap a native error reported by `call`.
    pub fn os(call: &'static str, errno: Errno) -> Self {
        Self::Os { call, errno }
    }
}

/// Reset the ambient error indicator ahead of a native call.
pub(crate) fn clear_errno() {
    // SAFETY: __errno_location always returns a valid thread-local pointer.
    unsafe { *libc::__errno_location() = 0 };
}

/// Capture the ambient error indicator after `call` reported failure.
///
/// A primitive that signals failure without setting `errno` is reported as
/// `EIO` rather than as success.
pub(crate) fn last_os_error(call: &'static str) -> PosixError {
    match Errno::last() {
        Errno::UnknownErrno => PosixError::os(call, Errno::EIO),
        errno => PosixError::os(call, errno),
    }
}

/// Convert a host string argument for a native call. The bytes pass through
/// unchanged; only an interior NUL is rejected.
pub(crate) fn c_string(what: &str, value: impl Into<Vec<u8>>) -> PosixResult<CString> {
    CString::new(value).map_err(|_| PosixError::InvalidArgument(format!("{what} contains NUL byte")))
}

/// Check a `0 or -1 with errno` return value.
pub(crate) fn check(call: &'static str, ret: libc::c_int) -> PosixResult<()> {
    if ret == -1 {
        return Err(last_os_error(call));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(PosixError::Arity { expected: 3, got: 1 }.errno(), libc::ENODATA);
        assert_eq!(
            PosixError::InvalidOption { family: "clock", name: "BOGUS".into() }.errno(),
            libc::EINVAL
        );
        assert_eq!(PosixError::Truncated { capacity: 64 }.errno(), libc::ERANGE);
        assert_eq!(PosixError::UnknownHandle(7).errno(), libc::EINVAL);
        assert_eq!(PosixError::HandleLimit(256).errno(), libc::EMFILE);
        assert_eq!(PosixError::NotFound("nobody".into()).errno(), libc::ENOENT);
    }

    #[test]
    fn native_errno_is_passed_through() {
        let err = PosixError::os("mkdir", Errno::EEXIST);
        assert_eq!(err.errno(), libc::EEXIST);
        assert!(err.to_string().starts_with("mkdir: "));
    }

    #[test]
    fn only_truncation_is_truncation() {
        assert!(PosixError::Truncated { capacity: 1 }.is_truncation());
        assert!(!PosixError::NotFound(String::new()).is_truncation());
    }

    #[test]
    fn check_reads_errno_on_failure() {
        clear_errno();
        // SAFETY: rmdir on a path that cannot exist only sets errno.
        let ret = unsafe { libc::rmdir(c"/nonexistent/mposix/dir".as_ptr()) };
        let err = check("rmdir", ret).unwrap_err();
        assert_eq!(err.errno(), libc::ENOENT);
    }
}
