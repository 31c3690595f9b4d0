//! Recursive path utilities built on the filesystem primitives.
//!
//! Both walks stop at the first failure and leave whatever was already
//! created or removed in place.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::dir::DirTable;
use crate::error::{PosixError, PosixResult};
use crate::fs;
use crate::mode::is_dir;

/// Create `path` and every missing ancestor with permission bits `mode`.
///
/// An existing directory (or symlink to one) is accepted at every level.
/// An existing non-directory component fails with `ENOTDIR` and nothing
/// below it is created.
pub fn mkpath(path: impl AsRef<Path>, mode: u32) -> PosixResult<()> {
    let path = path.as_ref();
    let mut prefix = PathBuf::new();
    if path.has_root() {
        prefix.push("/");
    }
    let components: Vec<&[u8]> = path
        .as_os_str()
        .as_bytes()
        .split(|&b| b == b'/')
        .filter(|c| !c.is_empty())
        .collect();
    if components.is_empty() {
        // "" fails like mkdir(""), "/" always exists.
        return if prefix.as_os_str().is_empty() { fs::mkdir(path, mode) } else { Ok(()) };
    }
    for component in components {
        prefix.push(OsStr::from_bytes(component));
        ensure_dir(&prefix, mode)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path, mode: u32) -> PosixResult<()> {
    match fs::stat(path) {
        Ok(st) if is_dir(st.mode) => return Ok(()),
        Ok(_) => return Err(PosixError::os("mkpath", nix::errno::Errno::ENOTDIR)),
        Err(err) if err.errno() == libc::ENOENT => {}
        Err(err) => return Err(err),
    }
    match fs::mkdir(path, mode) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), mode = format_args!("{mode:o}"), "directory created");
            Ok(())
        }
        // Lost a race with another creator; fine if it made a directory.
        Err(err) if err.errno() == libc::EEXIST => match fs::stat(path) {
            Ok(st) if is_dir(st.mode) => Ok(()),
            _ => Err(err),
        },
        Err(err) => Err(err),
    }
}

/// Remove `path`; a directory is emptied depth-first first.
///
/// Symlinks are never followed: a symlink to a directory is unlinked, not
/// descended into. The walk assumes the tree under `path` is acyclic, which
/// holds for any tree reachable without following symlinks, barring bind
/// mounts that loop back on themselves. Entry names are joined as raw bytes,
/// so names that are not valid UTF-8 are removed like any other.
pub fn rmpath(path: impl AsRef<Path>) -> PosixResult<()> {
    let path = path.as_ref();
    let st = fs::lstat(path)?;
    if !is_dir(st.mode) {
        return fs::unlink(path);
    }
    // The stream is closed before descending, so depth never costs more
    // than one open directory.
    let entries = DirTable::entries(path)?;
    for name in entries {
        rmpath(path.join(name))?;
    }
    fs::rmdir(path)?;
    tracing::debug!(path = %path.display(), "directory tree removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── mkpath ─────────────────────────────────────────────────────

    #[test]
    fn mkpath_creates_all_levels() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a/b/c");
        mkpath(&target, 0o755).unwrap();
        assert!(target.is_dir());
        assert!(tmp.path().join("a/b").is_dir());
    }

    #[test]
    fn mkpath_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("x/y");
        mkpath(&target, 0o755).unwrap();
        mkpath(&target, 0o755).unwrap();
        mkpath(format!("{}/", target.display()), 0o755).unwrap();
    }

    #[test]
    fn mkpath_stops_at_non_directory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("a")).unwrap();
        std::fs::write(tmp.path().join("a/b"), b"file").unwrap();
        let err = mkpath(tmp.path().join("a/b/c"), 0o755).unwrap_err();
        assert_eq!(err.errno(), libc::ENOTDIR);
        assert!(tmp.path().join("a/b").is_file());
    }

    #[test]
    fn mkpath_root_and_empty() {
        mkpath("/", 0o755).unwrap();
        assert_eq!(mkpath("", 0o755).unwrap_err().errno(), libc::ENOENT);
    }

    // ── rmpath ─────────────────────────────────────────────────────

    #[test]
    fn rmpath_removes_nested_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("tree");
        std::fs::create_dir_all(root.join("d1/d2")).unwrap();
        std::fs::write(root.join("f"), b"1").unwrap();
        std::fs::write(root.join("d1/d2/g"), b"2").unwrap();
        rmpath(&root).unwrap();
        assert!(!root.exists());
        assert!(tmp.path().exists());
    }

    #[test]
    fn rmpath_removes_entries_with_non_utf8_names() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("tree");
        let odd = root.join(OsStr::from_bytes(b"d\xff"));
        std::fs::create_dir_all(&odd).unwrap();
        std::fs::write(odd.join(OsStr::from_bytes(b"caf\xe9")), b"1").unwrap();
        std::fs::write(root.join(OsStr::from_bytes(b"\xff")), b"2").unwrap();
        rmpath(&root).unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn rmpath_on_file_is_unlink() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("f");
        std::fs::write(&file, b"x").unwrap();
        rmpath(&file).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn rmpath_does_not_follow_symlinks() {
        let tmp = tempfile::tempdir().unwrap();
        let kept = tmp.path().join("kept");
        std::fs::create_dir(&kept).unwrap();
        std::fs::write(kept.join("inside"), b"x").unwrap();
        let doomed = tmp.path().join("doomed");
        std::fs::create_dir(&doomed).unwrap();
        std::os::unix::fs::symlink(&kept, doomed.join("link")).unwrap();

        rmpath(&doomed).unwrap();
        assert!(!doomed.exists());
        assert!(kept.join("inside").exists());
    }

    #[test]
    fn rmpath_missing_is_enoent() {
        let tmp = tempfile::tempdir().unwrap();
        let err = rmpath(tmp.path().join("absent")).unwrap_err();
        assert_eq!(err.errno(), libc::ENOENT);
    }
}
