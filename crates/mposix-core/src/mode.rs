//! File mode helpers.
//!
//! Permission modes cross the host boundary as octal text (`"755"`), the
//! way people type them. These helpers convert between that text and the
//! linear integer the native calls take, and classify `st_mode` values.

use crate::error::{PosixError, PosixResult};

/// Largest mode expressible in four octal digits (`7777`).
pub const MAX_MODE: u32 = 0o7777;

/// Parse octal text into a mode.
///
/// Accepts one to four significant octal digits; leading zeros are ignored,
/// so `"0644"` and `"644"` are the same mode.
pub fn mode_from_octal(text: &str) -> PosixResult<u32> {
    let text = text.trim();
    let invalid = || PosixError::InvalidArgument(format!("not an octal mode: {text:?}"));
    if text.is_empty() || !text.bytes().all(|b| matches!(b, b'0'..=b'7')) {
        return Err(invalid());
    }
    let significant = text.trim_start_matches('0');
    if significant.len() > 4 {
        return Err(invalid());
    }
    Ok(significant
        .bytes()
        .fold(0, |mode, digit| mode * 8 + u32::from(digit - b'0')))
}

/// Render a mode as canonical octal text: no leading zeros, `"0"` for zero.
pub fn octal_from_mode(mode: u32) -> String {
    format!("{mode:o}")
}

/// The file type encoded in the `S_IFMT` field of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    CharDevice,
    BlockDevice,
    Fifo,
    Symlink,
    Socket,
}

impl FileType {
    pub const ALL: [FileType; 7] = [
        FileType::Regular,
        FileType::Directory,
        FileType::CharDevice,
        FileType::BlockDevice,
        FileType::Fifo,
        FileType::Symlink,
        FileType::Socket,
    ];

    /// Type bits as they appear in `st_mode`.
    pub fn bits(self) -> u32 {
        (match self {
            FileType::Regular => libc::S_IFREG,
            FileType::Directory => libc::S_IFDIR,
            FileType::CharDevice => libc::S_IFCHR,
            FileType::BlockDevice => libc::S_IFBLK,
            FileType::Fifo => libc::S_IFIFO,
            FileType::Symlink => libc::S_IFLNK,
            FileType::Socket => libc::S_IFSOCK,
        }) as u32
    }

    pub fn from_mode(mode: u32) -> Option<FileType> {
        let kind = mode & libc::S_IFMT as u32;
        Self::ALL.into_iter().find(|t| t.bits() == kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            FileType::Regular => "regular",
            FileType::Directory => "directory",
            FileType::CharDevice => "character device",
            FileType::BlockDevice => "block device",
            FileType::Fifo => "fifo",
            FileType::Symlink => "symlink",
            FileType::Socket => "socket",
        }
    }
}

/// Whether every bit of `mask` is set in `mode`.
pub fn has_bits(mode: u32, mask: u32) -> bool {
    mode & mask == mask
}

// The type field is compared whole: S_IFBLK shares bits with both S_IFDIR
// and S_IFCHR, and S_IFSOCK contains S_IFLNK.
fn is_type(mode: u32, kind: FileType) -> bool {
    FileType::from_mode(mode) == Some(kind)
}

pub fn is_reg(mode: u32) -> bool {
    is_type(mode, FileType::Regular)
}

pub fn is_dir(mode: u32) -> bool {
    is_type(mode, FileType::Directory)
}

pub fn is_chr(mode: u32) -> bool {
    is_type(mode, FileType::CharDevice)
}

pub fn is_blk(mode: u32) -> bool {
    is_type(mode, FileType::BlockDevice)
}

pub fn is_fifo(mode: u32) -> bool {
    is_type(mode, FileType::Fifo)
}

pub fn is_lnk(mode: u32) -> bool {
    is_type(mode, FileType::Symlink)
}

pub fn is_sock(mode: u32) -> bool {
    is_type(mode, FileType::Socket)
}

pub fn is_setuid(mode: u32) -> bool {
    has_bits(mode, libc::S_ISUID as u32)
}

pub fn is_setgid(mode: u32) -> bool {
    has_bits(mode, libc::S_ISGID as u32)
}

pub fn is_sticky(mode: u32) -> bool {
    has_bits(mode, libc::S_ISVTX as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREDICATES: [(FileType, fn(u32) -> bool); 7] = [
        (FileType::Regular, is_reg),
        (FileType::Directory, is_dir),
        (FileType::CharDevice, is_chr),
        (FileType::BlockDevice, is_blk),
        (FileType::Fifo, is_fifo),
        (FileType::Symlink, is_lnk),
        (FileType::Socket, is_sock),
    ];

    // ── Octal conversion ───────────────────────────────────────────

    #[test]
    fn parses_common_modes() {
        assert_eq!(mode_from_octal("755").unwrap(), 0o755);
        assert_eq!(mode_from_octal("0644").unwrap(), 0o644);
        assert_eq!(mode_from_octal("4755").unwrap(), 0o4755);
        assert_eq!(mode_from_octal("0").unwrap(), 0);
        assert_eq!(mode_from_octal("00000755").unwrap(), 0o755);
    }

    #[test]
    fn rejects_non_octal() {
        for bad in ["", "8", "79", "-1", "0x1ff", "12345", "abc", "7 7"] {
            let err = mode_from_octal(bad).unwrap_err();
            assert_eq!(err.errno(), libc::EINVAL, "{bad:?}");
        }
    }

    #[test]
    fn canonical_text_round_trips() {
        for n in 0..=MAX_MODE {
            let text = octal_from_mode(n);
            assert!(text.len() <= 4);
            assert_eq!(mode_from_octal(&text).unwrap(), n);
            assert_eq!(octal_from_mode(mode_from_octal(&text).unwrap()), text);
        }
    }

    #[test]
    fn renders_without_leading_zeros() {
        assert_eq!(octal_from_mode(0o644), "644");
        assert_eq!(octal_from_mode(0o7), "7");
        assert_eq!(octal_from_mode(0), "0");
    }

    // ── Type predicates ────────────────────────────────────────────

    #[test]
    fn exactly_one_type_predicate_holds() {
        for kind in FileType::ALL {
            let mode = kind.bits() | 0o644;
            let holding: Vec<_> = PREDICATES
                .iter()
                .filter(|(_, predicate)| predicate(mode))
                .map(|(t, _)| *t)
                .collect();
            assert_eq!(holding, vec![kind], "{}", kind.name());
        }
    }

    #[test]
    fn overlapping_type_bits_are_not_confused() {
        let block = libc::S_IFBLK as u32;
        assert!(is_blk(block));
        assert!(!is_dir(block));
        assert!(!is_chr(block));
        let socket = libc::S_IFSOCK as u32;
        assert!(!is_lnk(socket));
    }

    #[test]
    fn permissions_only_mode_has_no_type() {
        assert_eq!(FileType::from_mode(0o755), None);
        assert!(PREDICATES.iter().all(|(_, predicate)| !predicate(0o755)));
    }

    // ── Permission bits ────────────────────────────────────────────

    #[test]
    fn special_bits() {
        let mode = mode_from_octal("6755").unwrap();
        assert!(is_setuid(mode));
        assert!(is_setgid(mode));
        assert!(!is_sticky(mode));
        assert!(is_sticky(mode_from_octal("1777").unwrap()));
    }

    #[test]
    fn has_bits_requires_every_bit() {
        assert!(has_bits(0o755, 0o700));
        assert!(!has_bits(0o644, 0o111));
        assert!(has_bits(0o644, 0));
    }
}
