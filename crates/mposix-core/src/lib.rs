//! mposix-core: typed POSIX wrappers for the mposix host bindings.
//!
//! Each function here wraps one native call and returns an explicit
//! [`PosixResult`]; nothing reads `errno` across calls. Modules:
//! - **clock**: `time`, clocks, broken-down time, `strftime`, `times`
//! - **system**: `sysinfo`, `uname`, environment, `umask`
//! - **syslog**: `openlog` / `syslog` / `closelog`
//! - **fs**: `stat`, links, `mkdir`, permissions and ownership
//! - **users**: password and group database lookups
//! - **dir**: directory streams tracked in a bounded handle arena
//! - **mode** / **tree**: octal mode helpers, `mkpath` and `rmpath`
//!
//! Enumerated options (clock ids, syslog flags) are decoded by name through
//! the shared tables in [`options`]; string results that cross into
//! fixed-size host buffers go through [`buffer`].

pub mod buffer;
pub mod clock;
pub mod dir;
pub mod error;
pub mod fs;
pub mod handles;
pub mod mode;
pub mod options;
pub mod syslog;
pub mod system;
pub mod tree;
pub mod users;

pub use dir::DirTable;
pub use error::{PosixError, PosixResult};
pub use handles::MAX_OPEN_DIRS;
