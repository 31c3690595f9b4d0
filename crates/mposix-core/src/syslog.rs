//! System logger bindings.
//!
//! `openlog` keeps the `ident` pointer it is given, so the identity string is
//! owned here for as long as the logger may use it.

use std::ffi::CString;
use std::sync::Mutex;

use crate::error::{PosixResult, c_string};
use crate::options::{SYSLOG_FACILITIES, SYSLOG_OPTIONS, SYSLOG_PRIORITIES};

static IDENT: Mutex<Option<CString>> = Mutex::new(None);

/// Open a connection to the system logger.
///
/// `options` and `facility` are both `|`-separated lists (e.g. `"NDELAY|PID"`,
/// `"USER"`) whose values are OR-ed; an empty list is 0. Both are decoded
/// before the logger is touched.
pub fn openlog(ident: impl AsRef<[u8]>, options: &str, facility: &str) -> PosixResult<()> {
    let option = SYSLOG_OPTIONS.parse_flags(options)?;
    let facility = SYSLOG_FACILITIES.parse_flags(facility)?;
    let ident = c_string("ident", ident.as_ref())?;

    let mut slot = IDENT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    // SAFETY: `ident` is moved into IDENT below and outlives this logger
    // configuration; the previous identity is dropped only after openlog
    // has switched to the new one.
    unsafe { libc::openlog(ident.as_ptr(), option, facility) };
    *slot = Some(ident);
    tracing::debug!(option, facility, "syslog opened");
    Ok(())
}

/// Log `message` at `priority` (e.g. `"INFO"`). The message bytes are
/// logged as given.
pub fn syslog(priority: &str, message: impl AsRef<[u8]>) -> PosixResult<()> {
    let priority = SYSLOG_PRIORITIES.lookup(priority)?;
    let message = c_string("message", message.as_ref())?;
    // SAFETY: the message is passed as an argument to a constant "%s" format.
    unsafe { libc::syslog(priority, c"%s".as_ptr(), message.as_ptr()) };
    Ok(())
}

/// Close the logger connection. The identity string is released.
pub fn closelog() {
    let mut slot = IDENT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    // SAFETY: closelog takes no arguments.
    unsafe { libc::closelog() };
    *slot = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openlog_rejects_unknown_option_before_opening() {
        let err = openlog("mposix-test", "PID|BOGUS", "USER").unwrap_err();
        assert_eq!(err, crate::PosixError::InvalidOption {
            family: "syslog option",
            name: "BOGUS".into(),
        });
    }

    #[test]
    fn openlog_rejects_unknown_facility() {
        let err = openlog("mposix-test", "PID", "USER|NOWHERE").unwrap_err();
        assert_eq!(err.errno(), libc::EINVAL);
    }

    #[test]
    fn facility_is_a_list() {
        assert_eq!(SYSLOG_FACILITIES.parse_flags("USER|LOCAL0").unwrap(), libc::LOG_USER | libc::LOG_LOCAL0);
        openlog("mposix-test", "PID", "USER|LOCAL0").unwrap();
        openlog("mposix-test", "", "").unwrap();
        closelog();
    }

    #[test]
    fn syslog_rejects_unknown_priority() {
        assert_eq!(syslog("LOUD", "hello").unwrap_err().errno(), libc::EINVAL);
    }

    #[test]
    fn open_log_close_round() {
        openlog("mposix-test", "NDELAY|PID", "user").unwrap();
        syslog("debug", "mposix unit test message %s %n").unwrap();
        syslog("debug", b"latin-1 caf\xe9").unwrap();
        closelog();
    }
}
