//! The standard binding table.
//!
//! Parameter layouts and string capacities are part of the host ABI: the
//! host preallocates every `Buffer` output with exactly the listed size.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

use mposix_core::clock::{self, BrokenDownTime, STRFTIME_CAPACITY};
use mposix_core::dir::NAME_CAPACITY;
use mposix_core::fs::{self, FileStat, READLINK_CAPACITY};
use mposix_core::system::{self, UTSNAME_CAPACITY};
use mposix_core::users::{self, GroupEntry, LIST_CAPACITY, Passwd};
use mposix_core::{PosixResult, syslog, tree};

use crate::registry::{Binding, Context, Kind, Param};
use crate::slot::Args;

const NAME_FIELD: usize = 64;
const GECOS_FIELD: usize = 256;
const PATH_FIELD: usize = 1024;

// ── Parameter layouts ────────────────────────────────────────────

static NONE: [Param; 0] = [];

static CLOCK: [Param; 3] = [
    Param::input("clock", Kind::Str),
    Param::output("tv_sec", Kind::Long),
    Param::output("tv_nsec", Kind::Long),
];

static SPLIT_TIME: [Param; 10] = [
    Param::input_ref("t", Kind::Long),
    Param::output("tm_sec", Kind::Int),
    Param::output("tm_min", Kind::Int),
    Param::output("tm_hour", Kind::Int),
    Param::output("tm_mday", Kind::Int),
    Param::output("tm_mon", Kind::Int),
    Param::output("tm_year", Kind::Int),
    Param::output("tm_wday", Kind::Int),
    Param::output("tm_yday", Kind::Int),
    Param::output("tm_isdst", Kind::Int),
];

static MKTIME: [Param; 9] = [
    Param::input_ref("tm_sec", Kind::Int),
    Param::input_ref("tm_min", Kind::Int),
    Param::input_ref("tm_hour", Kind::Int),
    Param::input_ref("tm_mday", Kind::Int),
    Param::input_ref("tm_mon", Kind::Int),
    Param::input_ref("tm_year", Kind::Int),
    Param::input_ref("tm_wday", Kind::Int),
    Param::input_ref("tm_yday", Kind::Int),
    Param::input_ref("tm_isdst", Kind::Int),
];

static STRFTIME: [Param; 11] = [
    Param::input("format", Kind::Str),
    Param::input_ref("tm_sec", Kind::Int),
    Param::input_ref("tm_min", Kind::Int),
    Param::input_ref("tm_hour", Kind::Int),
    Param::input_ref("tm_mday", Kind::Int),
    Param::input_ref("tm_mon", Kind::Int),
    Param::input_ref("tm_year", Kind::Int),
    Param::input_ref("tm_wday", Kind::Int),
    Param::input_ref("tm_yday", Kind::Int),
    Param::input_ref("tm_isdst", Kind::Int),
    Param::output("s", Kind::Buffer(STRFTIME_CAPACITY)),
];

static TIMES: [Param; 4] = [
    Param::output("tms_utime", Kind::Long),
    Param::output("tms_stime", Kind::Long),
    Param::output("tms_cutime", Kind::Long),
    Param::output("tms_cstime", Kind::Long),
];

static SYSINFO: [Param; 14] = [
    Param::output("uptime", Kind::Long),
    Param::output("load1", Kind::Ulong),
    Param::output("load5", Kind::Ulong),
    Param::output("load15", Kind::Ulong),
    Param::output("totalram", Kind::Ulong),
    Param::output("freeram", Kind::Ulong),
    Param::output("sharedram", Kind::Ulong),
    Param::output("bufferram", Kind::Ulong),
    Param::output("totalswap", Kind::Ulong),
    Param::output("freeswap", Kind::Ulong),
    Param::output("procs", Kind::Uint),
    Param::output("totalhigh", Kind::Ulong),
    Param::output("freehigh", Kind::Ulong),
    Param::output("mem_unit", Kind::Uint),
];

static UNAME: [Param; 5] = [
    Param::output("sysname", Kind::Buffer(UTSNAME_CAPACITY)),
    Param::output("nodename", Kind::Buffer(UTSNAME_CAPACITY)),
    Param::output("release", Kind::Buffer(UTSNAME_CAPACITY)),
    Param::output("version", Kind::Buffer(UTSNAME_CAPACITY)),
    Param::output("machine", Kind::Buffer(UTSNAME_CAPACITY)),
];

static SETENV: [Param; 3] = [
    Param::input("name", Kind::Str),
    Param::input("value", Kind::Str),
    Param::input("overwrite", Kind::Int),
];

static NAME: [Param; 1] = [Param::input("name", Kind::Str)];

static OPENLOG: [Param; 3] = [
    Param::input("ident", Kind::Str),
    Param::input("option", Kind::Str),
    Param::input("facility", Kind::Str),
];

static SYSLOG: [Param; 2] = [
    Param::input("priority", Kind::Str),
    Param::input("message", Kind::Str),
];

static UMASK: [Param; 1] = [Param::input("mask", Kind::Ulong)];

static STAT: [Param; 14] = [
    Param::input("path", Kind::Str),
    Param::output("st_dev", Kind::Ulong),
    Param::output("st_ino", Kind::Ulong),
    Param::output("st_mode", Kind::Ulong),
    Param::output("st_nlink", Kind::Ulong),
    Param::output("st_uid", Kind::Ulong),
    Param::output("st_gid", Kind::Ulong),
    Param::output("st_rdev", Kind::Ulong),
    Param::output("st_size", Kind::Ulong),
    Param::output("st_blksize", Kind::Ulong),
    Param::output("st_blocks", Kind::Ulong),
    Param::output("atime", Kind::Ulong),
    Param::output("mtime", Kind::Ulong),
    Param::output("ctime", Kind::Ulong),
];

static READLINK: [Param; 2] = [
    Param::input("path", Kind::Str),
    Param::output("name", Kind::Buffer(READLINK_CAPACITY)),
];

static TWO_PATHS: [Param; 2] = [
    Param::input("oldpath", Kind::Str),
    Param::input("newpath", Kind::Str),
];

static PATH: [Param; 1] = [Param::input("path", Kind::Str)];

static PATH_MODE: [Param; 2] = [
    Param::input("path", Kind::Str),
    Param::input("mode", Kind::Ulong),
];

static CHOWN: [Param; 3] = [
    Param::input("path", Kind::Str),
    Param::input("uid", Kind::Ulong),
    Param::input("gid", Kind::Ulong),
];

static ACCESS: [Param; 2] = [
    Param::input("path", Kind::Str),
    Param::input("mode", Kind::Str),
];

static GETPWNAM: [Param; 8] = [
    Param::input("name", Kind::Str),
    Param::output("pw_name", Kind::Buffer(NAME_FIELD)),
    Param::output("pw_passwd", Kind::Buffer(NAME_FIELD)),
    Param::output("pw_uid", Kind::Ulong),
    Param::output("pw_gid", Kind::Ulong),
    Param::output("pw_gecos", Kind::Buffer(GECOS_FIELD)),
    Param::output("pw_dir", Kind::Buffer(PATH_FIELD)),
    Param::output("pw_shell", Kind::Buffer(PATH_FIELD)),
];

static GETPWUID: [Param; 8] = [
    Param::input("uid", Kind::Ulong),
    Param::output("pw_name", Kind::Buffer(NAME_FIELD)),
    Param::output("pw_passwd", Kind::Buffer(NAME_FIELD)),
    Param::output("pw_uid", Kind::Ulong),
    Param::output("pw_gid", Kind::Ulong),
    Param::output("pw_gecos", Kind::Buffer(GECOS_FIELD)),
    Param::output("pw_dir", Kind::Buffer(PATH_FIELD)),
    Param::output("pw_shell", Kind::Buffer(PATH_FIELD)),
];

static GETGRNAM: [Param; 5] = [
    Param::input("name", Kind::Str),
    Param::output("gr_name", Kind::Buffer(NAME_FIELD)),
    Param::output("gr_passwd", Kind::Buffer(NAME_FIELD)),
    Param::output("gr_gid", Kind::Ulong),
    Param::output("gr_mem", Kind::Buffer(LIST_CAPACITY)),
];

static GETGRGID: [Param; 5] = [
    Param::input("gid", Kind::Ulong),
    Param::output("gr_name", Kind::Buffer(NAME_FIELD)),
    Param::output("gr_passwd", Kind::Buffer(NAME_FIELD)),
    Param::output("gr_gid", Kind::Ulong),
    Param::output("gr_mem", Kind::Buffer(LIST_CAPACITY)),
];

static GETGROUPLIST: [Param; 2] = [
    Param::input("name", Kind::Str),
    Param::output("list", Kind::Buffer(LIST_CAPACITY)),
];

static OPENDIR: [Param; 2] = [
    Param::input("path", Kind::Str),
    Param::output("dir", Kind::Ulong),
];

static READDIR: [Param; 2] = [
    Param::input("dir", Kind::Ulong),
    Param::output("name", Kind::Buffer(NAME_CAPACITY)),
];

static CLOSEDIR: [Param; 1] = [Param::input("dir", Kind::Ulong)];

// ── Table ────────────────────────────────────────────────────────

/// Every binding the shared library exports, in call-table order.
///
/// `setenv`, `unsetenv`, `openlog` and `syslog` return a status like the
/// filesystem calls rather than being fire-and-forget. Each can fail on its
/// inputs (an unknown option such as `"PID|BOGUS"`, or a NUL in a name), and
/// the host sees that failure as `EINVAL` instead of losing it.
pub static STANDARD: &[Binding] = &[
    // time and clocks
    Binding::value("time", "posix_time", &NONE, Kind::Long, time),
    Binding::status("clock_gettime", "posix_clock_gettime", &CLOCK, clock_gettime),
    Binding::status("clock_getres", "posix_clock_getres", &CLOCK, clock_getres),
    Binding::status("localtime", "posix_localtime", &SPLIT_TIME, localtime),
    Binding::status("gmtime", "posix_gmtime", &SPLIT_TIME, gmtime),
    Binding::direct("mktime", "posix_mktime", &MKTIME, Kind::Long, mktime),
    Binding::status("strftime", "posix_strftime", &STRFTIME, strftime),
    Binding::status("times", "posix_times", &TIMES, times),
    // system and environment
    Binding::status("sysinfo", "posix_sysinfo", &SYSINFO, sysinfo),
    Binding::status("uname", "posix_uname", &UNAME, uname),
    Binding::status("setenv", "posix_setenv", &SETENV, setenv),
    Binding::status("unsetenv", "posix_unsetenv", &NAME, unsetenv),
    Binding::status("openlog", "posix_openlog", &OPENLOG, openlog),
    Binding::status("syslog", "posix_syslog", &SYSLOG, log_message),
    Binding::void("closelog", "posix_closelog", &NONE, closelog),
    Binding::value("umask", "posix_umask", &UMASK, Kind::Ulong, umask),
    // filesystem
    Binding::status("stat", "posix_stat", &STAT, stat),
    Binding::status("lstat", "posix_lstat", &STAT, lstat),
    Binding::status("readlink", "posix_readlink", &READLINK, readlink),
    Binding::status("link", "posix_link", &TWO_PATHS, link),
    Binding::status("symlink", "posix_symlink", &TWO_PATHS, symlink),
    Binding::status("unlink", "posix_unlink", &PATH, unlink),
    Binding::status("rename", "posix_rename", &TWO_PATHS, rename),
    Binding::status("mkdir", "posix_mkdir", &PATH_MODE, mkdir),
    Binding::status("rmdir", "posix_rmdir", &PATH, rmdir),
    Binding::status("chmod", "posix_chmod", &PATH_MODE, chmod),
    Binding::status("chown", "posix_chown", &CHOWN, chown),
    Binding::status("lchown", "posix_lchown", &CHOWN, lchown),
    Binding::status("access", "posix_access", &ACCESS, access),
    Binding::status("exists", "posix_exists", &PATH, exists),
    Binding::status("lexists", "posix_lexists", &PATH, lexists),
    // users and groups
    Binding::status("getpwnam", "posix_getpwnam", &GETPWNAM, getpwnam),
    Binding::status("getpwuid", "posix_getpwuid", &GETPWUID, getpwuid),
    Binding::status("getgrnam", "posix_getgrnam", &GETGRNAM, getgrnam),
    Binding::status("getgrgid", "posix_getgrgid", &GETGRGID, getgrgid),
    Binding::status("getgrouplist", "posix_getgrouplist", &GETGROUPLIST, getgrouplist),
    // directory streams
    Binding::status("opendir", "posix_opendir", &OPENDIR, opendir),
    Binding::status("readdir", "posix_readdir", &READDIR, readdir),
    Binding::status("closedir", "posix_closedir", &CLOSEDIR, closedir),
    // path utilities
    Binding::status("mkpath", "posix_mkpath", &PATH_MODE, mkpath),
    Binding::status("rmpath", "posix_rmpath", &PATH, rmpath),
];

// ── Handlers: time and clocks ────────────────────────────────────

fn time(_: &mut Context, _: &mut Args<'_>) -> PosixResult<i64> {
    Ok(clock::time())
}

fn write_timespec(args: &mut Args<'_>, ts: clock::Timespec) -> PosixResult<i64> {
    args.set_int(1, ts.sec)?;
    args.set_int(2, ts.nsec)?;
    Ok(0)
}

fn clock_gettime(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let ts = clock::clock_gettime(&args.str(0)?)?;
    write_timespec(args, ts)
}

fn clock_getres(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let ts = clock::clock_getres(&args.str(0)?)?;
    write_timespec(args, ts)
}

fn read_tm(args: &Args<'_>, first: usize) -> PosixResult<BrokenDownTime> {
    let field = |offset: usize| -> PosixResult<i32> { Ok(args.int(first + offset)? as i32) };
    Ok(BrokenDownTime {
        sec: field(0)?,
        min: field(1)?,
        hour: field(2)?,
        mday: field(3)?,
        mon: field(4)?,
        year: field(5)?,
        wday: field(6)?,
        yday: field(7)?,
        isdst: field(8)?,
    })
}

fn write_tm(args: &mut Args<'_>, first: usize, tm: &BrokenDownTime) -> PosixResult<i64> {
    let fields = [
        tm.sec, tm.min, tm.hour, tm.mday, tm.mon, tm.year, tm.wday, tm.yday, tm.isdst,
    ];
    for (offset, value) in fields.into_iter().enumerate() {
        args.set_int(first + offset, value.into())?;
    }
    Ok(0)
}

fn localtime(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let tm = clock::localtime(args.int(0)?)?;
    write_tm(args, 1, &tm)
}

fn gmtime(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let tm = clock::gmtime(args.int(0)?)?;
    write_tm(args, 1, &tm)
}

fn mktime(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    Ok(clock::mktime(&read_tm(args, 0)?))
}

fn strftime(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let tm = read_tm(args, 1)?;
    let formatted = clock::strftime(args.bytes(0)?, &tm)?;
    args.set_str(10, formatted)?;
    Ok(0)
}

fn times(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let t = clock::times()?;
    args.set_int(0, t.utime)?;
    args.set_int(1, t.stime)?;
    args.set_int(2, t.cutime)?;
    args.set_int(3, t.cstime)?;
    Ok(0)
}

// ── Handlers: system and environment ─────────────────────────────

fn sysinfo(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let info = system::sysinfo()?;
    args.set_int(0, info.uptime)?;
    let unsigned = [
        info.load1,
        info.load5,
        info.load15,
        info.totalram,
        info.freeram,
        info.sharedram,
        info.bufferram,
        info.totalswap,
        info.freeswap,
        info.procs.into(),
        info.totalhigh,
        info.freehigh,
        info.mem_unit.into(),
    ];
    for (offset, value) in unsigned.into_iter().enumerate() {
        args.set_uint(1 + offset, value)?;
    }
    Ok(0)
}

fn uname(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let uts = system::uname()?;
    for (index, field) in uts.fields().into_iter().enumerate() {
        args.set_str(index, field)?;
    }
    Ok(0)
}

fn setenv(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let (name, value) = (args.bytes(0)?, args.bytes(1)?);
    system::setenv(OsStr::from_bytes(&name), OsStr::from_bytes(&value), args.int(2)? != 0)?;
    Ok(0)
}

fn unsetenv(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    system::unsetenv(OsStr::from_bytes(&args.bytes(0)?))?;
    Ok(0)
}

fn openlog(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    syslog::openlog(args.bytes(0)?, &args.str(1)?, &args.str(2)?)?;
    Ok(0)
}

fn log_message(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    syslog::syslog(&args.str(0)?, args.bytes(1)?)?;
    Ok(0)
}

fn closelog(_: &mut Context, _: &mut Args<'_>) -> PosixResult<i64> {
    syslog::closelog();
    Ok(0)
}

fn umask(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    Ok(system::umask(args.uint(0)? as u32).into())
}

// ── Handlers: filesystem ─────────────────────────────────────────

fn write_stat(args: &mut Args<'_>, st: &FileStat) -> PosixResult<i64> {
    let fields = [
        st.dev,
        st.ino,
        st.mode.into(),
        st.nlink,
        st.uid.into(),
        st.gid.into(),
        st.rdev,
        st.size as u64,
        st.blksize as u64,
        st.blocks as u64,
        st.atime as u64,
        st.mtime as u64,
        st.ctime as u64,
    ];
    for (offset, value) in fields.into_iter().enumerate() {
        args.set_uint(1 + offset, value)?;
    }
    Ok(0)
}

fn stat(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let st = fs::stat(args.path(0)?)?;
    write_stat(args, &st)
}

fn lstat(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let st = fs::lstat(args.path(0)?)?;
    write_stat(args, &st)
}

fn readlink(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let target = fs::readlink(args.path(0)?)?;
    args.set_str(1, target.as_os_str().as_bytes())?;
    Ok(0)
}

fn link(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::link(args.path(0)?, args.path(1)?)?;
    Ok(0)
}

fn symlink(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::symlink(args.path(0)?, args.path(1)?)?;
    Ok(0)
}

fn rename(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::rename(args.path(0)?, args.path(1)?)?;
    Ok(0)
}

fn unlink(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::unlink(args.path(0)?)?;
    Ok(0)
}

fn mkdir(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::mkdir(args.path(0)?, args.uint(1)? as u32)?;
    Ok(0)
}

fn rmdir(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::rmdir(args.path(0)?)?;
    Ok(0)
}

fn chmod(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::chmod(args.path(0)?, args.uint(1)? as u32)?;
    Ok(0)
}

fn chown(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::chown(args.path(0)?, args.uint(1)? as u32, args.uint(2)? as u32)?;
    Ok(0)
}

fn lchown(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::lchown(args.path(0)?, args.uint(1)? as u32, args.uint(2)? as u32)?;
    Ok(0)
}

fn access(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::access(args.path(0)?, &args.str(1)?)?;
    Ok(0)
}

fn exists(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::exists(args.path(0)?)?;
    Ok(0)
}

fn lexists(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    fs::lexists(args.path(0)?)?;
    Ok(0)
}

// ── Handlers: users and groups ───────────────────────────────────

fn write_passwd(args: &mut Args<'_>, pw: &Passwd) -> PosixResult<i64> {
    args.set_uint(3, pw.uid.into())?;
    args.set_uint(4, pw.gid.into())?;
    args.set_str(1, &pw.name)?;
    args.set_str(2, pw.passwd.as_bytes())?;
    args.set_str(5, pw.gecos.as_bytes())?;
    args.set_str(6, pw.dir.as_os_str().as_bytes())?;
    args.set_str(7, pw.shell.as_os_str().as_bytes())?;
    Ok(0)
}

fn write_group(args: &mut Args<'_>, gr: &GroupEntry) -> PosixResult<i64> {
    args.set_uint(3, gr.gid.into())?;
    args.set_str(1, &gr.name)?;
    args.set_str(2, gr.passwd.as_bytes())?;
    args.set_list(4, &gr.members)?;
    Ok(0)
}

fn getpwnam(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let pw = users::getpwnam(args.bytes(0)?)?;
    write_passwd(args, &pw)
}

fn getpwuid(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let pw = users::getpwuid(args.uint(0)? as u32)?;
    write_passwd(args, &pw)
}

fn getgrnam(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let gr = users::getgrnam(args.bytes(0)?)?;
    write_group(args, &gr)
}

fn getgrgid(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let gr = users::getgrgid(args.uint(0)? as u32)?;
    write_group(args, &gr)
}

fn getgrouplist(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let (list, status) = users::getgrouplist(args.bytes(0)?);
    args.set_str(1, list)?;
    status?;
    Ok(0)
}

// ── Handlers: directory streams ──────────────────────────────────

fn opendir(ctx: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let handle = ctx.dirs.open(args.path(0)?)?;
    args.set_uint(1, handle)?;
    Ok(0)
}

fn readdir(ctx: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    let name = ctx.dirs.read(args.uint(0)?)?;
    args.set_str(1, name.as_bytes())?;
    Ok(0)
}

fn closedir(ctx: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    ctx.dirs.close(args.uint(0)?)?;
    Ok(0)
}

// ── Handlers: path utilities ─────────────────────────────────────

fn mkpath(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    tree::mkpath(args.path(0)?, args.uint(1)? as u32)?;
    Ok(0)
}

fn rmpath(_: &mut Context, args: &mut Args<'_>) -> PosixResult<i64> {
    tree::rmpath(args.path(0)?)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_and_symbols_are_unique() {
        let names: HashSet<_> = STANDARD.iter().map(|b| b.name).collect();
        let symbols: HashSet<_> = STANDARD.iter().map(|b| b.symbol).collect();
        assert_eq!(names.len(), STANDARD.len());
        assert_eq!(symbols.len(), STANDARD.len());
        assert!(STANDARD.iter().all(|b| b.symbol == format!("posix_{}", b.name)));
    }

    #[test]
    fn arities_match_host_abi() {
        let arity = |name: &str| STANDARD.iter().find(|b| b.name == name).unwrap().arity();
        assert_eq!(arity("time"), 0);
        assert_eq!(arity("clock_gettime"), 3);
        assert_eq!(arity("localtime"), 10);
        assert_eq!(arity("mktime"), 9);
        assert_eq!(arity("strftime"), 11);
        assert_eq!(arity("sysinfo"), 14);
        assert_eq!(arity("stat"), 14);
        assert_eq!(arity("getpwuid"), 8);
        assert_eq!(arity("getgrgid"), 5);
        assert_eq!(arity("readdir"), 2);
        assert_eq!(arity("closedir"), 1);
    }

    #[test]
    fn covers_every_operation() {
        assert_eq!(STANDARD.len(), 41);
    }
}
