//! Process, system, and environment bindings.

use std::ffi::{CStr, OsStr};
use std::os::unix::ffi::OsStrExt;

use crate::error::{PosixResult, c_string, check, clear_errno};

/// Capacity of each `uname` field at the host boundary.
pub const UTSNAME_CAPACITY: usize = 128;

/// Overall system statistics, as reported by `sysinfo(2)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemInfo {
    pub uptime: i64,
    pub load1: u64,
    pub load5: u64,
    pub load15: u64,
    pub totalram: u64,
    pub freeram: u64,
    pub sharedram: u64,
    pub bufferram: u64,
    pub totalswap: u64,
    pub freeswap: u64,
    pub procs: u32,
    pub totalhigh: u64,
    pub freehigh: u64,
    pub mem_unit: u32,
}

/// Kernel identification, as reported by `uname(2)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Utsname {
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

impl Utsname {
    /// Fields in host parameter order.
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.sysname,
            &self.nodename,
            &self.release,
            &self.version,
            &self.machine,
        ]
    }
}

fn field(raw: &[libc::c_char]) -> String {
    // SAFETY: the kernel NUL-terminates every utsname field within its array.
    unsafe { CStr::from_ptr(raw.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

pub fn sysinfo() -> PosixResult<SystemInfo> {
    // SAFETY: libc::sysinfo is plain data; zeroed is a valid initial state.
    let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
    clear_errno();
    // SAFETY: `info` is a valid output buffer.
    check("sysinfo", unsafe { libc::sysinfo(&mut info) })?;
    Ok(SystemInfo {
        uptime: info.uptime as i64,
        load1: info.loads[0] as u64,
        load5: info.loads[1] as u64,
        load15: info.loads[2] as u64,
        totalram: info.totalram as u64,
        freeram: info.freeram as u64,
        sharedram: info.sharedram as u64,
        bufferram: info.bufferram as u64,
        totalswap: info.totalswap as u64,
        freeswap: info.freeswap as u64,
        procs: info.procs as u32,
        totalhigh: info.totalhigh as u64,
        freehigh: info.freehigh as u64,
        mem_unit: info.mem_unit as u32,
    })
}

pub fn uname() -> PosixResult<Utsname> {
    // SAFETY: libc::utsname is plain data; zeroed is a valid initial state.
    let mut raw: libc::utsname = unsafe { std::mem::zeroed() };
    clear_errno();
    // SAFETY: `raw` is a valid output buffer.
    check("uname", unsafe { libc::uname(&mut raw) })?;
    Ok(Utsname {
        sysname: field(&raw.sysname),
        nodename: field(&raw.nodename),
        release: field(&raw.release),
        version: field(&raw.version),
        machine: field(&raw.machine),
    })
}

/// Add or change an environment variable. With `overwrite == false` an
/// existing value is kept.
pub fn setenv(name: impl AsRef<OsStr>, value: impl AsRef<OsStr>, overwrite: bool) -> PosixResult<()> {
    let c_name = c_string("name", name.as_ref().as_bytes())?;
    let c_value = c_string("value", value.as_ref().as_bytes())?;
    clear_errno();
    // SAFETY: both strings are NUL-terminated; the host is single-threaded
    // with respect to environment access.
    check("setenv", unsafe {
        libc::setenv(c_name.as_ptr(), c_value.as_ptr(), overwrite as libc::c_int)
    })
}

pub fn unsetenv(name: impl AsRef<OsStr>) -> PosixResult<()> {
    let c_name = c_string("name", name.as_ref().as_bytes())?;
    clear_errno();
    // SAFETY: see `setenv`.
    check("unsetenv", unsafe { libc::unsetenv(c_name.as_ptr()) })
}

/// Set the file mode creation mask and return the previous one.
pub fn umask(mask: u32) -> u32 {
    // SAFETY: umask cannot fail.
    unsafe { libc::umask(mask as libc::mode_t) as u32 }
}
