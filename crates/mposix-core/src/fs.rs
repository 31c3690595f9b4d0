//! Filesystem metadata, permission, and link bindings.

use std::ffi::{CString, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::error::{PosixError, PosixResult, c_string, check, clear_errno, last_os_error};
use crate::options::ACCESS_MODES;

/// Capacity of the `readlink` result at the host boundary.
pub const READLINK_CAPACITY: usize = 1024;

/// File status, as reported by `stat(2)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    pub dev: u64,
    pub ino: u64,
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub size: i64,
    pub blksize: i64,
    pub blocks: i64,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
}

impl FileStat {
    fn from_raw(st: &libc::stat) -> Self {
        Self {
            dev: st.st_dev as u64,
            ino: st.st_ino as u64,
            mode: st.st_mode as u32,
            nlink: st.st_nlink as u64,
            uid: st.st_uid as u32,
            gid: st.st_gid as u32,
            rdev: st.st_rdev as u64,
            size: st.st_size as i64,
            blksize: st.st_blksize as i64,
            blocks: st.st_blocks as i64,
            atime: st.st_atime as i64,
            mtime: st.st_mtime as i64,
            ctime: st.st_ctime as i64,
        }
    }
}

fn path(value: &Path) -> PosixResult<CString> {
    c_string("path", value.as_os_str().as_bytes())
}

fn stat_with(
    call: &'static str,
    p: &Path,
    f: unsafe extern "C" fn(*const libc::c_char, *mut libc::stat) -> libc::c_int,
) -> PosixResult<FileStat> {
    let c_path = path(p)?;
    // SAFETY: libc::stat is plain data; zeroed is a valid output buffer.
    let mut st: libc::stat = unsafe { std::mem::zeroed() };
    clear_errno();
    // SAFETY: c_path is NUL-terminated and st is writable.
    check(call, unsafe { f(c_path.as_ptr(), &mut st) })?;
    Ok(FileStat::from_raw(&st))
}

/// Status of `path`, following symlinks.
pub fn stat(path: impl AsRef<Path>) -> PosixResult<FileStat> {
    stat_with("stat", path.as_ref(), libc::stat)
}

/// Status of `path` itself; a symlink is not followed.
pub fn lstat(path: impl AsRef<Path>) -> PosixResult<FileStat> {
    stat_with("lstat", path.as_ref(), libc::lstat)
}

/// Whether `path` resolves to an existing file (symlinks followed).
pub fn exists(path: impl AsRef<Path>) -> PosixResult<()> {
    stat(path).map(|_| ())
}

/// Whether `path` exists as a directory entry (dangling symlinks count).
pub fn lexists(path: impl AsRef<Path>) -> PosixResult<()> {
    lstat(path).map(|_| ())
}

/// Target of the symbolic link `path`, byte for byte.
///
/// Targets longer than [`READLINK_CAPACITY`]` - 1` bytes are reported as
/// truncation rather than silently cut.
pub fn readlink(p: impl AsRef<Path>) -> PosixResult<PathBuf> {
    let c_path = path(p.as_ref())?;
    let mut buf = [0u8; READLINK_CAPACITY];
    clear_errno();
    // SAFETY: buf is writable for its full length.
    let n = unsafe { libc::readlink(c_path.as_ptr(), buf.as_mut_ptr().cast(), buf.len()) };
    if n < 0 {
        return Err(last_os_error("readlink"));
    }
    let n = n as usize;
    if n >= READLINK_CAPACITY {
        return Err(PosixError::Truncated { capacity: READLINK_CAPACITY });
    }
    Ok(PathBuf::from(OsStr::from_bytes(&buf[..n])))
}

fn two_paths(
    call: &'static str,
    old: &Path,
    new: &Path,
    f: unsafe extern "C" fn(*const libc::c_char, *const libc::c_char) -> libc::c_int,
) -> PosixResult<()> {
    let c_old = path(old)?;
    let c_new = path(new)?;
    clear_errno();
    // SAFETY: both paths are NUL-terminated.
    check(call, unsafe { f(c_old.as_ptr(), c_new.as_ptr()) })
}

/// Create a hard link `new` to `old`.
pub fn link(old: impl AsRef<Path>, new: impl AsRef<Path>) -> PosixResult<()> {
    two_paths("link", old.as_ref(), new.as_ref(), libc::link)
}

/// Create a symbolic link `new` pointing at `old`.
pub fn symlink(old: impl AsRef<Path>, new: impl AsRef<Path>) -> PosixResult<()> {
    two_paths("symlink", old.as_ref(), new.as_ref(), libc::symlink)
}

pub fn rename(old: impl AsRef<Path>, new: impl AsRef<Path>) -> PosixResult<()> {
    two_paths("rename", old.as_ref(), new.as_ref(), libc::rename)
}

fn one_path(
    call: &'static str,
    p: &Path,
    f: unsafe extern "C" fn(*const libc::c_char) -> libc::c_int,
) -> PosixResult<()> {
    let c_path = path(p)?;
    clear_errno();
    // SAFETY: the path is NUL-terminated.
    check(call, unsafe { f(c_path.as_ptr()) })
}

pub fn unlink(path: impl AsRef<Path>) -> PosixResult<()> {
    one_path("unlink", path.as_ref(), libc::unlink)
}

pub fn rmdir(path: impl AsRef<Path>) -> PosixResult<()> {
    one_path("rmdir", path.as_ref(), libc::rmdir)
}

/// Create directory `path` with permission bits `mode` (subject to umask).
pub fn mkdir(p: impl AsRef<Path>, mode: u32) -> PosixResult<()> {
    let c_path = path(p.as_ref())?;
    clear_errno();
    // SAFETY: the path is NUL-terminated.
    check("mkdir", unsafe { libc::mkdir(c_path.as_ptr(), mode as libc::mode_t) })
}

pub fn chmod(p: impl AsRef<Path>, mode: u32) -> PosixResult<()> {
    let c_path = path(p.as_ref())?;
    clear_errno();
    // SAFETY: the path is NUL-terminated.
    check("chmod", unsafe { libc::chmod(c_path.as_ptr(), mode as libc::mode_t) })
}

fn chown_with(
    call: &'static str,
    p: &Path,
    uid: u32,
    gid: u32,
    f: unsafe extern "C" fn(*const libc::c_char, libc::uid_t, libc::gid_t) -> libc::c_int,
) -> PosixResult<()> {
    let c_path = path(p)?;
    clear_errno();
    // SAFETY: the path is NUL-terminated.
    check(call, unsafe { f(c_path.as_ptr(), uid, gid) })
}

/// Change owner and group of `path`; `u32::MAX` (i.e. `-1`) leaves one unchanged.
pub fn chown(path: impl AsRef<Path>, uid: u32, gid: u32) -> PosixResult<()> {
    chown_with("chown", path.as_ref(), uid, gid, libc::chown)
}

/// Like [`chown`], but a symlink itself is changed rather than its target.
pub fn lchown(path: impl AsRef<Path>, uid: u32, gid: u32) -> PosixResult<()> {
    chown_with("lchown", path.as_ref(), uid, gid, libc::lchown)
}

/// Check the caller's permissions on `path`. `modes` is a `|`-list over
/// `F`, `R`, `W`, `X`; an empty list checks existence.
pub fn access(p: impl AsRef<Path>, modes: &str) -> PosixResult<()> {
    let mode = ACCESS_MODES.parse_flags(modes)?;
    let c_path = path(p.as_ref())?;
    clear_errno();
    // SAFETY: the path is NUL-terminated.
    check("access", unsafe { libc::access(c_path.as_ptr(), mode) })
}
