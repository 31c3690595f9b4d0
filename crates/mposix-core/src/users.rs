//! Password and group database lookups.
//!
//! `getpwnam(3)` and friends report a missing entry by returning null
//! without necessarily setting `errno`. Every lookup here turns a missing
//! entry into [`PosixError::NotFound`], so callers always see `ENOENT`.
//!
//! Lookups by name go through nix, which takes names as `&str`; a name that
//! is not valid UTF-8 is reported as not found. Every other field keeps the
//! bytes the database returned.

use std::ffi::{CStr, CString};
use std::path::PathBuf;
use std::sync::Mutex;

use nix::unistd::{Gid, Group, Uid, User};

use crate::buffer::ListWriter;
use crate::error::{PosixError, PosixResult, c_string};

/// Capacity of the member and group lists at the host boundary.
pub const LIST_CAPACITY: usize = 4096;

/// Serializes `getgrent` enumeration, whose cursor is process-global.
static GROUP_CURSOR: Mutex<()> = Mutex::new(());

/// A password database entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Passwd {
    pub name: String,
    pub passwd: CString,
    pub uid: u32,
    pub gid: u32,
    pub gecos: CString,
    pub dir: PathBuf,
    pub shell: PathBuf,
}

impl From<User> for Passwd {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            passwd: user.passwd,
            uid: user.uid.as_raw(),
            gid: user.gid.as_raw(),
            gecos: user.gecos,
            dir: user.dir,
            shell: user.shell,
        }
    }
}

/// A group database entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupEntry {
    pub name: String,
    pub passwd: CString,
    pub gid: u32,
    pub members: Vec<String>,
}

impl From<Group> for GroupEntry {
    fn from(group: Group) -> Self {
        Self {
            name: group.name,
            passwd: group.passwd,
            gid: group.gid.as_raw(),
            members: group.mem,
        }
    }
}

fn lookup<T, E>(
    call: &'static str,
    key: String,
    result: nix::Result<Option<E>>,
) -> PosixResult<T>
where
    T: From<E>,
{
    match result {
        Ok(Some(entry)) => Ok(entry.into()),
        Ok(None) => Err(PosixError::NotFound(key)),
        Err(errno) => {
            tracing::debug!(call, %errno, "database lookup failed");
            Err(PosixError::os(call, errno))
        }
    }
}

/// Interpret a host name argument for a nix lookup.
fn utf8_name(name: &[u8]) -> PosixResult<&str> {
    std::str::from_utf8(name).map_err(|_| PosixError::NotFound(String::from_utf8_lossy(name).into_owned()))
}

pub fn getpwnam(name: impl AsRef<[u8]>) -> PosixResult<Passwd> {
    let name = utf8_name(name.as_ref())?;
    lookup("getpwnam", name.to_string(), User::from_name(name))
}

pub fn getpwuid(uid: u32) -> PosixResult<Passwd> {
    lookup("getpwuid", format!("uid {uid}"), User::from_uid(Uid::from_raw(uid)))
}

pub fn getgrnam(name: impl AsRef<[u8]>) -> PosixResult<GroupEntry> {
    let name = utf8_name(name.as_ref())?;
    lookup("getgrnam", name.to_string(), Group::from_name(name))
}

pub fn getgrgid(gid: u32) -> PosixResult<GroupEntry> {
    lookup("getgrgid", format!("gid {gid}"), Group::from_gid(Gid::from_raw(gid)))
}

/// Names of every group that lists `user` as a member, `|`-joined.
///
/// Membership is matched on the raw bytes of `user`. The user's primary
/// group is included only if the group database lists the user explicitly.
/// Enumeration stops at the first overflow of [`LIST_CAPACITY`]; the partial
/// list is returned with the error.
pub fn getgrouplist(user: impl AsRef<[u8]>) -> (Vec<u8>, PosixResult<()>) {
    let c_user = match c_string("user", user.as_ref()) {
        Ok(c_user) => c_user,
        Err(err) => return (Vec::new(), Err(err)),
    };
    let mut list = ListWriter::new(LIST_CAPACITY);
    let status = for_each_group(|name, members| {
        if members.iter().any(|member| member.as_c_str() == c_user.as_c_str()) {
            list.push(name.to_bytes())?;
        }
        Ok(())
    });
    (list.into_bytes(), status)
}

/// Walk the group database with `getgrent(3)`, stopping at the first error
/// returned by `visit`. The enumeration is always closed with `endgrent`.
fn for_each_group(
    mut visit: impl FnMut(&CStr, &[CString]) -> PosixResult<()>,
) -> PosixResult<()> {
    let _cursor = GROUP_CURSOR.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    // SAFETY: setgrent/getgrent/endgrent operate on process-global state
    // guarded by GROUP_CURSOR.
    unsafe { libc::setgrent() };
    let mut status = Ok(());
    loop {
        // SAFETY: see above; the returned record is valid until the next call.
        let entry = unsafe { libc::getgrent() };
        if entry.is_null() {
            break;
        }
        // SAFETY: getgrent returned a valid group record.
        let (name, members) = unsafe {
            let group = &*entry;
            (CStr::from_ptr(group.gr_name).to_owned(), members_of(group.gr_mem))
        };
        if let Err(err) = visit(&name, &members) {
            status = Err(err);
            break;
        }
    }
    // SAFETY: closes the enumeration opened above.
    unsafe { libc::endgrent() };
    status
}

/// Copy a NULL-terminated `gr_mem` array.
///
/// # Safety
/// `mem` must be null or point to a NULL-terminated array of C strings.
unsafe fn members_of(mem: *mut *mut libc::c_char) -> Vec<CString> {
    let mut members = Vec::new();
    if mem.is_null() {
        return members;
    }
    let mut cursor = mem;
    // SAFETY: guaranteed by the caller.
    unsafe {
        while !(*cursor).is_null() {
            members.push(CStr::from_ptr(*cursor).to_owned());
            cursor = cursor.add(1);
        }
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── passwd ─────────────────────────────────────────────────────

    #[test]
    fn root_by_name_and_uid_agree() {
        let by_name = getpwnam("root").unwrap();
        let by_uid = getpwuid(0).unwrap();
        assert_eq!(by_name, by_uid);
        assert_eq!(by_name.uid, 0);
        assert!(!by_name.dir.as_os_str().is_empty());
    }

    #[test]
    fn missing_user_is_enoent() {
        let err = getpwnam("mposix-no-such-user").unwrap_err();
        assert_eq!(err.errno(), libc::ENOENT);
        assert_eq!(getpwuid(4_000_000_123).unwrap_err().errno(), libc::ENOENT);
    }

    #[test]
    fn non_utf8_name_is_not_found() {
        assert_eq!(getpwnam(b"caf\xe9").unwrap_err().errno(), libc::ENOENT);
        assert_eq!(getgrnam(b"caf\xe9").unwrap_err().errno(), libc::ENOENT);
    }

    // ── group ──────────────────────────────────────────────────────

    #[test]
    fn root_group_by_name_and_gid_agree() {
        let by_gid = getgrgid(0).unwrap();
        let by_name = getgrnam(&by_gid.name).unwrap();
        assert_eq!(by_gid, by_name);
    }

    #[test]
    fn missing_group_is_enoent() {
        assert_eq!(getgrnam("mposix-no-such-group").unwrap_err().errno(), libc::ENOENT);
        assert_eq!(getgrgid(4_000_000_123).unwrap_err().errno(), libc::ENOENT);
    }

    // ── group list ─────────────────────────────────────────────────

    #[test]
    fn grouplist_matches_membership() {
        let mut expected = Vec::new();
        for_each_group(|name, members| {
            if members.iter().any(|m| m.as_bytes() == b"root") {
                expected.push(name.to_bytes().to_vec());
            }
            Ok(())
        })
        .unwrap();
        let (list, status) = getgrouplist("root");
        status.unwrap();
        assert_eq!(list, expected.join(&b'|'));
    }

    #[test]
    fn grouplist_for_unknown_user_is_empty() {
        let (list, status) = getgrouplist("mposix-no-such-user");
        assert!(status.is_ok());
        assert!(list.is_empty());
    }
}
