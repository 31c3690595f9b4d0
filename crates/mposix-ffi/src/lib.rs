//! C entry points for the host runtime's external-call table.
//!
//! Each exported `posix_*` function takes the host's argument count first,
//! followed by the operation's arguments in declaration order. Inputs arrive
//! as values or pointers, outputs as pointers the host preallocated. The
//! layout of every function matches the line `mposix table` renders for it.
//!
//! Directory handles opened through these functions stay valid for the
//! life of the process, up to the 256-handle ceiling.

pub mod types;

mod shim;

use shim::{Arg, dispatch, long_value, status};
use types::*;

macro_rules! status_fn {
    ($(#[$meta:meta])* $symbol:ident => $op:literal ( $($arg:ident : $ty:ty => $wrap:ident),* $(,)? )) => {
        $(#[$meta])*
        ///
        /// # Safety
        /// When `argc` matches the operation's arity, every pointer must be
        /// valid for the access its direction implies, input strings must be
        /// NUL-terminated and output buffers sized as in the call table.
        #[unsafe(no_mangle)]
        #[allow(clippy::too_many_arguments)]
        pub unsafe extern "C" fn $symbol(argc: gtm_int_t, $($arg: $ty),*) -> gtm_status_t {
            // SAFETY: forwarded from the caller.
            status(unsafe { dispatch($op, argc, &[$(Arg::$wrap($arg)),*]) })
        }
    };
}

// ── Time ─────────────────────────────────────────────────────────

/// Seconds since the epoch, or `ENODATA` on an arity mismatch.
#[unsafe(no_mangle)]
pub extern "C" fn posix_time(argc: gtm_int_t) -> gtm_long_t {
    // SAFETY: no pointers are passed.
    long_value(unsafe { dispatch("time", argc, &[]) })
}

status_fn!(
    /// Read a named clock.
    posix_clock_gettime => "clock_gettime" (
        clk_id: *const gtm_char_t => Str,
        tv_sec: *mut gtm_long_t => OutLong,
        tv_nsec: *mut gtm_long_t => OutLong,
    )
);

status_fn!(
    /// Resolution of a named clock.
    posix_clock_getres => "clock_getres" (
        clk_id: *const gtm_char_t => Str,
        tv_sec: *mut gtm_long_t => OutLong,
        tv_nsec: *mut gtm_long_t => OutLong,
    )
);

status_fn!(
    /// Split an epoch time in the local zone.
    posix_localtime => "localtime" (
        t: *const gtm_long_t => LongRef,
        tm_sec: *mut gtm_int_t => OutInt,
        tm_min: *mut gtm_int_t => OutInt,
        tm_hour: *mut gtm_int_t => OutInt,
        tm_mday: *mut gtm_int_t => OutInt,
        tm_mon: *mut gtm_int_t => OutInt,
        tm_year: *mut gtm_int_t => OutInt,
        tm_wday: *mut gtm_int_t => OutInt,
        tm_yday: *mut gtm_int_t => OutInt,
        tm_isdst: *mut gtm_int_t => OutInt,
    )
);

status_fn!(
    /// Split an epoch time in UTC.
    posix_gmtime => "gmtime" (
        t: *const gtm_long_t => LongRef,
        tm_sec: *mut gtm_int_t => OutInt,
        tm_min: *mut gtm_int_t => OutInt,
        tm_hour: *mut gtm_int_t => OutInt,
        tm_mday: *mut gtm_int_t => OutInt,
        tm_mon: *mut gtm_int_t => OutInt,
        tm_year: *mut gtm_int_t => OutInt,
        tm_wday: *mut gtm_int_t => OutInt,
        tm_yday: *mut gtm_int_t => OutInt,
        tm_isdst: *mut gtm_int_t => OutInt,
    )
);

/// Epoch time of broken-down local time; `-1` when it is not representable.
///
/// # Safety
/// When `argc` is 9, every pointer must be valid for reads.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn posix_mktime(
    argc: gtm_int_t,
    tm_sec: *const gtm_int_t,
    tm_min: *const gtm_int_t,
    tm_hour: *const gtm_int_t,
    tm_mday: *const gtm_int_t,
    tm_mon: *const gtm_int_t,
    tm_year: *const gtm_int_t,
    tm_wday: *const gtm_int_t,
    tm_yday: *const gtm_int_t,
    tm_isdst: *const gtm_int_t,
) -> gtm_long_t {
    let args = [
        Arg::IntRef(tm_sec),
        Arg::IntRef(tm_min),
        Arg::IntRef(tm_hour),
        Arg::IntRef(tm_mday),
        Arg::IntRef(tm_mon),
        Arg::IntRef(tm_year),
        Arg::IntRef(tm_wday),
        Arg::IntRef(tm_yday),
        Arg::IntRef(tm_isdst),
    ];
    // SAFETY: forwarded from the caller.
    long_value(unsafe { dispatch("mktime", argc, &args) })
}

status_fn!(
    /// Format broken-down time into a 128-byte buffer.
    posix_strftime => "strftime" (
        format: *const gtm_char_t => Str,
        tm_sec: *const gtm_int_t => IntRef,
        tm_min: *const gtm_int_t => IntRef,
        tm_hour: *const gtm_int_t => IntRef,
        tm_mday: *const gtm_int_t => IntRef,
        tm_mon: *const gtm_int_t => IntRef,
        tm_year: *const gtm_int_t => IntRef,
        tm_wday: *const gtm_int_t => IntRef,
        tm_yday: *const gtm_int_t => IntRef,
        tm_isdst: *const gtm_int_t => IntRef,
        s: *mut gtm_char_t => OutStr,
    )
);

status_fn!(
    /// Process and child CPU times in clock ticks.
    posix_times => "times" (
        tms_utime: *mut gtm_long_t => OutLong,
        tms_stime: *mut gtm_long_t => OutLong,
        tms_cutime: *mut gtm_long_t => OutLong,
        tms_cstime: *mut gtm_long_t => OutLong,
    )
);

// ── System ───────────────────────────────────────────────────────

status_fn!(
    /// System statistics.
    posix_sysinfo => "sysinfo" (
        uptime: *mut gtm_long_t => OutLong,
        load1: *mut gtm_ulong_t => OutUlong,
        load5: *mut gtm_ulong_t => OutUlong,
        load15: *mut gtm_ulong_t => OutUlong,
        totalram: *mut gtm_ulong_t => OutUlong,
        freeram: *mut gtm_ulong_t => OutUlong,
        sharedram: *mut gtm_ulong_t => OutUlong,
        bufferram: *mut gtm_ulong_t => OutUlong,
        totalswap: *mut gtm_ulong_t => OutUlong,
        freeswap: *mut gtm_ulong_t => OutUlong,
        procs: *mut gtm_uint_t => OutUint,
        totalhigh: *mut gtm_ulong_t => OutUlong,
        freehigh: *mut gtm_ulong_t => OutUlong,
        mem_unit: *mut gtm_uint_t => OutUint,
    )
);

status_fn!(
    /// Kernel identification, each field in a 128-byte buffer.
    posix_uname => "uname" (
        sysname: *mut gtm_char_t => OutStr,
        nodename: *mut gtm_char_t => OutStr,
        release: *mut gtm_char_t => OutStr,
        version: *mut gtm_char_t => OutStr,
        machine: *mut gtm_char_t => OutStr,
    )
);

status_fn!(
    posix_setenv => "setenv" (
        name: *const gtm_char_t => Str,
        value: *const gtm_char_t => Str,
        overwrite: gtm_int_t => Int,
    )
);

status_fn!(
    posix_unsetenv => "unsetenv" (
        name: *const gtm_char_t => Str,
    )
);

status_fn!(
    /// Open the system log; options and facility are both `|`-separated lists.
    posix_openlog => "openlog" (
        ident: *const gtm_char_t => Str,
        option: *const gtm_char_t => Str,
        facility: *const gtm_char_t => Str,
    )
);

status_fn!(
    posix_syslog => "syslog" (
        priority: *const gtm_char_t => Str,
        message: *const gtm_char_t => Str,
    )
);

#[unsafe(no_mangle)]
pub extern "C" fn posix_closelog(argc: gtm_int_t) {
    // SAFETY: no pointers are passed.
    let _ = unsafe { dispatch("closelog", argc, &[]) };
}

/// Set the file creation mask and return the previous one, or `ENODATA` on
/// an arity mismatch.
#[unsafe(no_mangle)]
pub extern "C" fn posix_umask(argc: gtm_int_t, mask: gtm_ulong_t) -> gtm_ulong_t {
    // SAFETY: no pointers are passed.
    long_value(unsafe { dispatch("umask", argc, &[Arg::Ulong(mask)]) }) as gtm_ulong_t
}

// ── Files ────────────────────────────────────────────────────────

macro_rules! stat_fn {
    ($(#[$meta:meta])* $symbol:ident => $op:literal) => {
        status_fn!(
            $(#[$meta])*
            $symbol => $op (
                path: *const gtm_char_t => Str,
                st_dev: *mut gtm_ulong_t => OutUlong,
                st_ino: *mut gtm_ulong_t => OutUlong,
                st_mode: *mut gtm_ulong_t => OutUlong,
                st_nlink: *mut gtm_ulong_t => OutUlong,
                st_uid: *mut gtm_ulong_t => OutUlong,
                st_gid: *mut gtm_ulong_t => OutUlong,
                st_rdev: *mut gtm_ulong_t => OutUlong,
                st_size: *mut gtm_ulong_t => OutUlong,
                st_blksize: *mut gtm_ulong_t => OutUlong,
                st_blocks: *mut gtm_ulong_t => OutUlong,
                atime: *mut gtm_ulong_t => OutUlong,
                mtime: *mut gtm_ulong_t => OutUlong,
                ctime: *mut gtm_ulong_t => OutUlong,
            )
        );
    };
}

stat_fn!(
    /// File status, following symbolic links.
    posix_stat => "stat"
);
stat_fn!(
    /// File status of the link itself.
    posix_lstat => "lstat"
);

status_fn!(
    /// Target of a symbolic link, into a 1024-byte buffer.
    posix_readlink => "readlink" (
        path: *const gtm_char_t => Str,
        name: *mut gtm_char_t => OutStr,
    )
);

status_fn!(
    posix_link => "link" (
        oldpath: *const gtm_char_t => Str,
        newpath: *const gtm_char_t => Str,
    )
);

status_fn!(
    posix_symlink => "symlink" (
        oldpath: *const gtm_char_t => Str,
        newpath: *const gtm_char_t => Str,
    )
);

status_fn!(posix_unlink => "unlink" (path: *const gtm_char_t => Str));

status_fn!(
    posix_rename => "rename" (
        oldpath: *const gtm_char_t => Str,
        newpath: *const gtm_char_t => Str,
    )
);

status_fn!(
    posix_mkdir => "mkdir" (
        path: *const gtm_char_t => Str,
        mode: gtm_ulong_t => Ulong,
    )
);

status_fn!(posix_rmdir => "rmdir" (path: *const gtm_char_t => Str));

status_fn!(
    posix_chmod => "chmod" (
        path: *const gtm_char_t => Str,
        mode: gtm_ulong_t => Ulong,
    )
);

status_fn!(
    posix_chown => "chown" (
        path: *const gtm_char_t => Str,
        uid: gtm_ulong_t => Ulong,
        gid: gtm_ulong_t => Ulong,
    )
);

status_fn!(
    posix_lchown => "lchown" (
        path: *const gtm_char_t => Str,
        uid: gtm_ulong_t => Ulong,
        gid: gtm_ulong_t => Ulong,
    )
);

status_fn!(
    /// Check access with `|`-separated modes (`R|W`, `F`, ...).
    posix_access => "access" (
        path: *const gtm_char_t => Str,
        mode: *const gtm_char_t => Str,
    )
);

status_fn!(posix_exists => "exists" (path: *const gtm_char_t => Str));
status_fn!(posix_lexists => "lexists" (path: *const gtm_char_t => Str));

// ── Users and groups ─────────────────────────────────────────────

macro_rules! passwd_fn {
    ($symbol:ident => $op:literal, $key:ident: $key_ty:ty => $key_wrap:ident) => {
        status_fn!(
            $symbol => $op (
                $key: $key_ty => $key_wrap,
                pw_name: *mut gtm_char_t => OutStr,
                pw_passwd: *mut gtm_char_t => OutStr,
                pw_uid: *mut gtm_ulong_t => OutUlong,
                pw_gid: *mut gtm_ulong_t => OutUlong,
                pw_gecos: *mut gtm_char_t => OutStr,
                pw_dir: *mut gtm_char_t => OutStr,
                pw_shell: *mut gtm_char_t => OutStr,
            )
        );
    };
}

macro_rules! group_fn {
    ($symbol:ident => $op:literal, $key:ident: $key_ty:ty => $key_wrap:ident) => {
        status_fn!(
            $symbol => $op (
                $key: $key_ty => $key_wrap,
                gr_name: *mut gtm_char_t => OutStr,
                gr_passwd: *mut gtm_char_t => OutStr,
                gr_gid: *mut gtm_ulong_t => OutUlong,
                gr_mem: *mut gtm_char_t => OutStr,
            )
        );
    };
}

passwd_fn!(posix_getpwnam => "getpwnam", name: *const gtm_char_t => Str);
passwd_fn!(posix_getpwuid => "getpwuid", uid: gtm_ulong_t => Ulong);
group_fn!(posix_getgrnam => "getgrnam", name: *const gtm_char_t => Str);
group_fn!(posix_getgrgid => "getgrgid", gid: gtm_ulong_t => Ulong);

status_fn!(
    /// Names of the groups listing a user as a member, `|`-separated.
    posix_getgrouplist => "getgrouplist" (
        name: *const gtm_char_t => Str,
        list: *mut gtm_char_t => OutStr,
    )
);

// ── Directories ──────────────────────────────────────────────────

status_fn!(
    /// Open a directory stream and return its handle.
    posix_opendir => "opendir" (
        path: *const gtm_char_t => Str,
        dir: *mut gtm_ulong_t => OutUlong,
    )
);

status_fn!(
    /// Next entry name; empty once the stream is exhausted.
    posix_readdir => "readdir" (
        dir: gtm_ulong_t => Ulong,
        name: *mut gtm_char_t => OutStr,
    )
);

status_fn!(posix_closedir => "closedir" (dir: gtm_ulong_t => Ulong));

// ── Trees ────────────────────────────────────────────────────────

status_fn!(
    /// Create a directory and any missing parents.
    posix_mkpath => "mkpath" (
        path: *const gtm_char_t => Str,
        mode: gtm_ulong_t => Ulong,
    )
);

status_fn!(
    /// Remove a path and everything below it.
    posix_rmpath => "rmpath" (path: *const gtm_char_t => Str)
);

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    fn text(buf: &[gtm_char_t]) -> String {
        // SAFETY: buffers are zero-initialised and written with a terminator.
        unsafe { CStr::from_ptr(buf.as_ptr()) }.to_string_lossy().into_owned()
    }

    // ── Arity ────────────────────────────────────────────────────────

    #[test]
    fn short_argc_reads_no_pointers() {
        // Dangling pointers are never dereferenced when argc disagrees.
        let bogus = 0x1 as *mut gtm_long_t;
        let rc = unsafe { posix_clock_gettime(2, c"REALTIME".as_ptr(), bogus, bogus) };
        assert_eq!(rc, libc::ENODATA);
        assert_eq!(posix_time(1), gtm_long_t::from(libc::ENODATA));
        assert_eq!(posix_umask(0, 0o22), libc::ENODATA as gtm_ulong_t);
    }

    // ── Outputs ──────────────────────────────────────────────────────

    #[test]
    fn clock_gettime_writes_through_pointers() {
        let (mut sec, mut nsec): (gtm_long_t, gtm_long_t) = (-1, -1);
        let rc = unsafe { posix_clock_gettime(3, c"MONOTONIC".as_ptr(), &mut sec, &mut nsec) };
        assert_eq!(rc, 0);
        assert!(sec >= 0);
        assert!((0..1_000_000_000).contains(&nsec));

        let rc = unsafe { posix_clock_gettime(3, c"NO_SUCH_CLOCK".as_ptr(), &mut sec, &mut nsec) };
        assert_eq!(rc, libc::EINVAL);
        assert_eq!((sec, nsec), (0, 0));
    }

    #[test]
    fn uname_fills_preallocated_buffers() {
        let mut fields = [[0 as gtm_char_t; 128]; 5];
        let [sysname, nodename, release, version, machine] = &mut fields;
        let rc = unsafe {
            posix_uname(
                5,
                sysname.as_mut_ptr(),
                nodename.as_mut_ptr(),
                release.as_mut_ptr(),
                version.as_mut_ptr(),
                machine.as_mut_ptr(),
            )
        };
        assert_eq!(rc, 0);
        assert_eq!(text(&fields[0]), "Linux");
    }

    #[test]
    fn gmtime_then_mktime_through_references() {
        let t: gtm_long_t = 86_400;
        let mut tm = [0 as gtm_int_t; 9];
        let [sec, min, hour, mday, mon, year, wday, yday, isdst] = &mut tm;
        let rc = unsafe { posix_gmtime(10, &t, sec, min, hour, mday, mon, year, wday, yday, isdst) };
        assert_eq!(rc, 0);
        assert_eq!(tm[3], 2);
        assert_eq!(tm[5], 70);

        let [sec, min, hour, mday, mon, year, wday, yday, isdst] = &tm;
        let local = unsafe { posix_mktime(9, sec, min, hour, mday, mon, year, wday, yday, isdst) };
        assert_ne!(local, -1);
        let short = unsafe { posix_mktime(3, sec, min, hour, mday, mon, year, wday, yday, isdst) };
        assert_eq!(short, gtm_long_t::from(libc::ENODATA));
    }

    #[test]
    fn strftime_overflow_fills_buffer_exactly() {
        let tm = [0, 0, 0, 1, 0, 70, 4, 0, 0];
        let [sec, min, hour, mday, mon, year, wday, yday, isdst] = &tm;
        let format = std::ffi::CString::new("%Y".repeat(100)).unwrap();
        // One guard byte past the 128-byte buffer must stay untouched.
        let mut out = [0x7f as gtm_char_t; 129];
        let rc = unsafe {
            posix_strftime(11, format.as_ptr(), sec, min, hour, mday, mon, year, wday, yday, isdst, out.as_mut_ptr())
        };
        assert_eq!(rc, libc::ERANGE);
        assert_eq!(text(&out), &"1970".repeat(32)[..127]);
        assert_eq!(out[127], 0);
        assert_eq!(out[128], 0x7f);
    }

    // ── Directories ──────────────────────────────────────────────────

    #[test]
    fn directory_handle_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("entry"), b"").unwrap();
        let path = std::ffi::CString::new(tmp.path().to_str().unwrap()).unwrap();

        let mut dir: gtm_ulong_t = 0;
        assert_eq!(unsafe { posix_opendir(2, path.as_ptr(), &mut dir) }, 0);
        assert_ne!(dir, 0);

        let mut names = Vec::new();
        loop {
            let mut name = [0 as gtm_char_t; 256];
            assert_eq!(unsafe { posix_readdir(2, dir, name.as_mut_ptr()) }, 0);
            let name = text(&name);
            if name.is_empty() {
                break;
            }
            names.push(name);
        }
        assert!(names.iter().any(|n| n == "entry"));

        assert_eq!(unsafe { posix_closedir(1, dir) }, 0);
        assert_eq!(unsafe { posix_closedir(1, dir) }, libc::EINVAL);
    }

    #[test]
    fn missing_path_status() {
        let rc = unsafe { posix_exists(1, c"/nonexistent/mposix-ffi".as_ptr()) };
        assert_eq!(rc, libc::ENOENT);
    }

    // ── Raw bytes ────────────────────────────────────────────────────

    #[test]
    fn latin1_paths_pass_through_unchanged() {
        use std::ffi::{CString, OsStr};
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("tree");
        let file = root.join(OsStr::from_bytes(b"caf\xe9"));
        std::fs::create_dir(&root).unwrap();
        std::fs::write(&file, b"").unwrap();
        std::fs::write(root.join(OsStr::from_bytes(b"\xff")), b"").unwrap();

        let c_file = CString::new(file.as_os_str().as_bytes()).unwrap();
        assert_eq!(unsafe { posix_exists(1, c_file.as_ptr()) }, 0);

        let c_root = CString::new(root.as_os_str().as_bytes()).unwrap();
        let mut dir: gtm_ulong_t = 0;
        assert_eq!(unsafe { posix_opendir(2, c_root.as_ptr(), &mut dir) }, 0);
        let mut names = Vec::new();
        loop {
            let mut name = [0 as gtm_char_t; 256];
            assert_eq!(unsafe { posix_readdir(2, dir, name.as_mut_ptr()) }, 0);
            // SAFETY: readdir always terminates the buffer.
            let name = unsafe { CStr::from_ptr(name.as_ptr()) }.to_bytes().to_vec();
            if name.is_empty() {
                break;
            }
            names.push(name);
        }
        assert_eq!(unsafe { posix_closedir(1, dir) }, 0);
        assert!(names.iter().any(|n| n == b"caf\xe9"));
        assert!(names.iter().any(|n| n == b"\xff"));

        assert_eq!(unsafe { posix_rmpath(1, c_root.as_ptr()) }, 0);
        assert!(!root.exists());
    }

    // ── Syslog ───────────────────────────────────────────────────────

    #[test]
    fn openlog_accepts_facility_lists() {
        let ident = c"mposix-ffi";
        assert_eq!(unsafe { posix_openlog(3, ident.as_ptr(), c"PID".as_ptr(), c"USER|LOCAL0".as_ptr()) }, 0);
        assert_eq!(unsafe { posix_openlog(3, ident.as_ptr(), c"".as_ptr(), c"".as_ptr()) }, 0);
        assert_eq!(
            unsafe { posix_openlog(3, ident.as_ptr(), c"PID".as_ptr(), c"NOWHERE".as_ptr()) },
            libc::EINVAL
        );
        posix_closelog(0);
    }
}
