//! Time and clock bindings.

use crate::error::{PosixResult, c_string, check, clear_errno, last_os_error};
use crate::options::CLOCK_IDS;

/// Capacity of the `strftime` output buffer, terminator included.
pub const STRFTIME_CAPACITY: usize = 128;

/// Largest buffer `strftime` is retried with before a zero-length result is
/// accepted as empty output.
pub const STRFTIME_LIMIT: usize = 64 * 1024;

/// Seconds and nanoseconds, as filled in by `clock_gettime`/`clock_getres`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timespec {
    pub sec: i64,
    pub nsec: i64,
}

/// The nine portable fields of `struct tm`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrokenDownTime {
    pub sec: i32,
    pub min: i32,
    pub hour: i32,
    pub mday: i32,
    pub mon: i32,
    pub year: i32,
    pub wday: i32,
    pub yday: i32,
    pub isdst: i32,
}

impl BrokenDownTime {
    fn from_tm(tm: &libc::tm) -> Self {
        Self {
            sec: tm.tm_sec,
            min: tm.tm_min,
            hour: tm.tm_hour,
            mday: tm.tm_mday,
            mon: tm.tm_mon,
            year: tm.tm_year,
            wday: tm.tm_wday,
            yday: tm.tm_yday,
            isdst: tm.tm_isdst,
        }
    }

    fn to_tm(self) -> libc::tm {
        // SAFETY: libc::tm is plain data; the platform-specific trailing
        // fields (gmtoff, zone) are valid when zeroed.
        let mut tm: libc::tm = unsafe { std::mem::zeroed() };
        tm.tm_sec = self.sec;
        tm.tm_min = self.min;
        tm.tm_hour = self.hour;
        tm.tm_mday = self.mday;
        tm.tm_mon = self.mon;
        tm.tm_year = self.year;
        tm.tm_wday = self.wday;
        tm.tm_yday = self.yday;
        tm.tm_isdst = self.isdst;
        tm
    }
}

/// Accumulated CPU times of the process and its waited-for children, in clock ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessTimes {
    pub utime: i64,
    pub stime: i64,
    pub cutime: i64,
    pub cstime: i64,
}

/// Current calendar time in seconds since the Epoch.
pub fn time() -> i64 {
    // SAFETY: a null argument is explicitly allowed.
    unsafe { libc::time(std::ptr::null_mut()) as i64 }
}

fn clock_query(
    call: &'static str,
    clock: &str,
    f: unsafe extern "C" fn(libc::clockid_t, *mut libc::timespec) -> libc::c_int,
) -> PosixResult<Timespec> {
    let id = CLOCK_IDS.lookup(clock)?;
    let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
    clear_errno();
    // SAFETY: `ts` is a valid, writable timespec.
    check(call, unsafe { f(id, &mut ts) })?;
    Ok(Timespec {
        sec: ts.tv_sec as i64,
        nsec: ts.tv_nsec as i64,
    })
}

/// Read the clock named `clock` (e.g. `"REALTIME"`, `"monotonic"`).
pub fn clock_gettime(clock: &str) -> PosixResult<Timespec> {
    clock_query("clock_gettime", clock, libc::clock_gettime)
}

/// Resolution of the clock named `clock`.
pub fn clock_getres(clock: &str) -> PosixResult<Timespec> {
    clock_query("clock_getres", clock, libc::clock_getres)
}

fn split_time(
    call: &'static str,
    t: i64,
    f: unsafe extern "C" fn(*const libc::time_t, *mut libc::tm) -> *mut libc::tm,
) -> PosixResult<BrokenDownTime> {
    let t = t as libc::time_t;
    // SAFETY: zeroed tm is a valid output buffer.
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    clear_errno();
    // SAFETY: both pointers reference live locals.
    let ret = unsafe { f(&t, &mut tm) };
    if ret.is_null() {
        return Err(last_os_error(call));
    }
    Ok(BrokenDownTime::from_tm(&tm))
}

/// Split `t` into local broken-down time.
pub fn localtime(t: i64) -> PosixResult<BrokenDownTime> {
    split_time("localtime", t, libc::localtime_r)
}

/// Split `t` into UTC broken-down time.
pub fn gmtime(t: i64) -> PosixResult<BrokenDownTime> {
    split_time("gmtime", t, libc::gmtime_r)
}

/// Compose local broken-down time into seconds since the Epoch.
///
/// Returns the native result unchanged: `-1` when the time cannot be
/// represented. `mktime` has no errno contract.
pub fn mktime(tm: &BrokenDownTime) -> i64 {
    let mut raw = tm.to_tm();
    // SAFETY: `raw` is a valid tm; mktime may normalize it in place.
    unsafe { libc::mktime(&mut raw) as i64 }
}

/// Format `tm` according to `format`, returning the whole result.
///
/// `strftime` reports overflow and a legitimately empty result (`%p` in a
/// locale without AM/PM strings) the same way: zero bytes written. A zero
/// result is retried with larger buffers up to [`STRFTIME_LIMIT`] bytes, and
/// only then taken to be the real, empty output. Fitting the result into the
/// host's [`STRFTIME_CAPACITY`] is left to the caller.
pub fn strftime(format: impl AsRef<[u8]>, tm: &BrokenDownTime) -> PosixResult<Vec<u8>> {
    let format = format.as_ref();
    let c_format = c_string("format", format)?;
    let raw = tm.to_tm();
    let mut capacity = STRFTIME_CAPACITY;
    loop {
        let mut buf = vec![0u8; capacity];
        // SAFETY: buf is writable for its full length; format and tm are valid.
        let n = unsafe { libc::strftime(buf.as_mut_ptr().cast(), buf.len(), c_format.as_ptr(), &raw) };
        if n > 0 || format.is_empty() || capacity >= STRFTIME_LIMIT {
            buf.truncate(n);
            return Ok(buf);
        }
        capacity *= 8;
    }
}

/// CPU times consumed by this process and its children.
pub fn times() -> PosixResult<ProcessTimes> {
    let mut tms = libc::tms {
        tms_utime: 0,
        tms_stime: 0,
        tms_cutime: 0,
        tms_cstime: 0,
    };
    clear_errno();
    // SAFETY: `tms` is a valid output buffer.
    let ret = unsafe { libc::times(&mut tms) };
    if ret == -1 as libc::clock_t {
        return Err(last_os_error("times"));
    }
    Ok(ProcessTimes {
        utime: tms.tms_utime as i64,
        stime: tms.tms_stime as i64,
        cutime: tms.tms_cutime as i64,
        cstime: tms.tms_cstime as i64,
    })
}
