//! Stringified option names.
//!
//! The host passes enumerated options (clock ids, syslog options, facilities,
//! priorities, access modes) as names with the common C prefix stripped,
//! e.g. `"REALTIME"` for `CLOCK_REALTIME`. Names match case-insensitively.
//! Multi-valued options are one string with entries joined by `|`.

use crate::error::{PosixError, PosixResult};

/// Separator for multi-valued option strings and list outputs.
pub const LIST_DELIMITER: char = '|';

/// A static name → value table for one option family.
#[derive(Debug, Clone, Copy)]
pub struct OptionTable {
    /// Family name used in error messages (e.g. `"clock"`).
    pub family: &'static str,
    entries: &'static [(&'static str, libc::c_int)],
}

impl OptionTable {
    pub const fn new(family: &'static str, entries: &'static [(&'static str, libc::c_int)]) -> Self {
        Self { family, entries }
    }

    /// Resolve a single option name.
    pub fn lookup(&self, name: &str) -> PosixResult<libc::c_int> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
            .ok_or_else(|| PosixError::InvalidOption {
                family: self.family,
                name: name.to_string(),
            })
    }

    /// Resolve a `|`-separated list of names into a bitmask.
    ///
    /// Fails on the first unknown entry; no partial mask is returned.
    /// Empty entries are skipped, so `""` decodes to `0`.
    pub fn parse_flags(&self, list: &str) -> PosixResult<libc::c_int> {
        list.split(LIST_DELIMITER)
            .filter(|entry| !entry.is_empty())
            .try_fold(0, |mask, entry| -> PosixResult<libc::c_int> {
                Ok(mask | self.lookup(entry)?)
            })
    }

    /// All option names in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(name, _)| *name)
    }
}

pub static CLOCK_IDS: OptionTable = OptionTable::new(
    "clock",
    &[
        ("REALTIME", libc::CLOCK_REALTIME),
        ("MONOTONIC", libc::CLOCK_MONOTONIC),
        ("MONOTONIC_RAW", libc::CLOCK_MONOTONIC_RAW),
        ("PROCESS_CPUTIME_ID", libc::CLOCK_PROCESS_CPUTIME_ID),
        ("THREAD_CPUTIME_ID", libc::CLOCK_THREAD_CPUTIME_ID),
        ("REALTIME_COARSE", libc::CLOCK_REALTIME_COARSE),
        ("MONOTONIC_COARSE", libc::CLOCK_MONOTONIC_COARSE),
        ("BOOTTIME", libc::CLOCK_BOOTTIME),
    ],
);

pub static SYSLOG_OPTIONS: OptionTable = OptionTable::new(
    "syslog option",
    &[
        ("CONS", libc::LOG_CONS),
        ("NDELAY", libc::LOG_NDELAY),
        ("NOWAIT", libc::LOG_NOWAIT),
        ("ODELAY", libc::LOG_ODELAY),
        ("PERROR", libc::LOG_PERROR),
        ("PID", libc::LOG_PID),
    ],
);

pub static SYSLOG_FACILITIES: OptionTable = OptionTable::new(
    "syslog facility",
    &[
        ("AUTH", libc::LOG_AUTH),
        ("AUTHPRIV", libc::LOG_AUTHPRIV),
        ("CRON", libc::LOG_CRON),
        ("DAEMON", libc::LOG_DAEMON),
        ("FTP", libc::LOG_FTP),
        ("KERN", libc::LOG_KERN),
        ("LOCAL0", libc::LOG_LOCAL0),
        ("LOCAL1", libc::LOG_LOCAL1),
        ("LOCAL2", libc::LOG_LOCAL2),
        ("LOCAL3", libc::LOG_LOCAL3),
        ("LOCAL4", libc::LOG_LOCAL4),
        ("LOCAL5", libc::LOG_LOCAL5),
        ("LOCAL6", libc::LOG_LOCAL6),
        ("LOCAL7", libc::LOG_LOCAL7),
        ("LPR", libc::LOG_LPR),
        ("MAIL", libc::LOG_MAIL),
        ("NEWS", libc::LOG_NEWS),
        ("SYSLOG", libc::LOG_SYSLOG),
        ("USER", libc::LOG_USER),
        ("UUCP", libc::LOG_UUCP),
    ],
);

pub static SYSLOG_PRIORITIES: OptionTable = OptionTable::new(
    "syslog priority",
    &[
        ("EMERG", libc::LOG_EMERG),
        ("ALERT", libc::LOG_ALERT),
        ("CRIT", libc::LOG_CRIT),
        ("ERR", libc::LOG_ERR),
        ("WARNING", libc::LOG_WARNING),
        ("NOTICE", libc::LOG_NOTICE),
        ("INFO", libc::LOG_INFO),
        ("DEBUG", libc::LOG_DEBUG),
    ],
);

pub static ACCESS_MODES: OptionTable = OptionTable::new(
    "access mode",
    &[
        ("F", libc::F_OK),
        ("R", libc::R_OK),
        ("W", libc::W_OK),
        ("X", libc::X_OK),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    // ── Single values ──────────────────────────────────────────────

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(CLOCK_IDS.lookup("realtime").unwrap(), libc::CLOCK_REALTIME);
        assert_eq!(CLOCK_IDS.lookup("Monotonic_Raw").unwrap(), libc::CLOCK_MONOTONIC_RAW);
        assert_eq!(SYSLOG_PRIORITIES.lookup("err").unwrap(), libc::LOG_ERR);
    }

    #[test]
    fn lookup_requires_exact_name() {
        assert!(CLOCK_IDS.lookup("REAL").is_err());
        assert!(CLOCK_IDS.lookup("CLOCK_REALTIME").is_err());
        assert!(CLOCK_IDS.lookup("").is_err());
    }

    #[test]
    fn unknown_name_reports_family() {
        let err = SYSLOG_FACILITIES.lookup("BOGUS").unwrap_err();
        assert_eq!(
            err,
            PosixError::InvalidOption { family: "syslog facility", name: "BOGUS".into() }
        );
        assert_eq!(err.errno(), libc::EINVAL);
    }

    // ── Multi-valued flags ─────────────────────────────────────────

    #[test]
    fn flags_are_or_combined() {
        let mask = SYSLOG_OPTIONS.parse_flags("PID|CONS").unwrap();
        assert_eq!(mask, libc::LOG_PID | libc::LOG_CONS);
    }

    #[test]
    fn flag_order_does_not_matter() {
        assert_eq!(
            SYSLOG_OPTIONS.parse_flags("PID|CONS").unwrap(),
            SYSLOG_OPTIONS.parse_flags("cons|pid").unwrap()
        );
    }

    #[test]
    fn one_unknown_flag_fails_whole_list() {
        let err = SYSLOG_OPTIONS.parse_flags("PID|BOGUS").unwrap_err();
        assert!(matches!(err, PosixError::InvalidOption { ref name, .. } if name == "BOGUS"));
    }

    #[test]
    fn empty_flag_list_is_zero() {
        assert_eq!(SYSLOG_OPTIONS.parse_flags("").unwrap(), 0);
        assert_eq!(ACCESS_MODES.parse_flags("R||W").unwrap(), libc::R_OK | libc::W_OK);
    }

    #[test]
    fn names_lists_table_order() {
        let names: Vec<_> = SYSLOG_PRIORITIES.names().collect();
        assert_eq!(names.first(), Some(&"EMERG"));
        assert_eq!(names.last(), Some(&"DEBUG"));
    }
}
