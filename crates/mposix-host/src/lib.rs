//! mposix-host: the host calling convention for the POSIX bindings.
//!
//! The host invokes operations by name with a positional list of mutable
//! value slots. This crate provides:
//! - **slot**: the slot type and typed argument access
//! - **registry**: binding definitions and the per-call marshalling shim
//! - **bindings**: the standard table of POSIX operations
//! - **session**: raise/suppress policy on top of status codes
//! - **config**: `mposix.toml` parsing
//! - **manifest**: JSON manifest and external-call table rendering

pub mod bindings;
pub mod config;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod session;
pub mod slot;

pub use config::MposixConfig;
pub use error::{HostError, HostResult};
pub use registry::{Binding, Category, Context, Registry, Reply};
pub use session::{ErrorPolicy, Propagation, Session};
pub use slot::{Args, Slot};
