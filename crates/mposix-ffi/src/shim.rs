//! Pointer marshalling between the C entry points and the registry.
//!
//! An entry point describes its raw arguments as a list of [`Arg`]s and
//! hands them to [`dispatch`]. `argc` is checked against the binding before
//! any argument is read, so a short call never dereferences a pointer the
//! caller did not pass.

use std::ffi::CStr;
use std::sync::{LazyLock, Mutex, MutexGuard};

use mposix_core::buffer::copy_bounded;
use mposix_host::registry::{Binding, Context, Kind, Registry, Reply};
use mposix_host::slot::Slot;

use crate::types::*;

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::standard);

/// Directory handles live for the whole process.
static CONTEXT: LazyLock<Mutex<Context>> = LazyLock::new(|| Mutex::new(Context::new()));

fn context() -> MutexGuard<'static, Context> {
    CONTEXT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One raw argument as received from the host.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Arg {
    Str(*const gtm_char_t),
    Int(gtm_int_t),
    Ulong(gtm_ulong_t),
    IntRef(*const gtm_int_t),
    LongRef(*const gtm_long_t),
    OutInt(*mut gtm_int_t),
    OutUint(*mut gtm_uint_t),
    OutLong(*mut gtm_long_t),
    OutUlong(*mut gtm_ulong_t),
    /// Preallocated buffer; its capacity comes from the binding.
    OutStr(*mut gtm_char_t),
}

impl Arg {
    /// Read an input argument into a slot.
    ///
    /// # Safety
    /// Every non-null pointer must be valid for reads; strings must be
    /// NUL-terminated.
    unsafe fn read(self, kind: Kind) -> Slot {
        // SAFETY: guaranteed by the caller.
        unsafe {
            match self {
                Arg::Str(p) if !p.is_null() => Slot::Str(CStr::from_ptr(p).to_bytes().to_vec()),
                Arg::Int(v) => Slot::Int(v.into()),
                Arg::Ulong(v) => Slot::Uint(v as u64),
                Arg::IntRef(p) if !p.is_null() => Slot::Int((*p).into()),
                Arg::LongRef(p) if !p.is_null() => Slot::Int(*p as i64),
                _ => kind.zero(),
            }
        }
    }

    /// Write an output slot back through the argument's pointer.
    ///
    /// # Safety
    /// Every non-null pointer must be valid for writes; a string buffer must
    /// hold at least `capacity` bytes.
    unsafe fn write(self, kind: Kind, slot: &Slot) {
        // SAFETY: guaranteed by the caller.
        unsafe {
            match self {
                Arg::OutInt(p) if !p.is_null() => *p = slot.as_i64().unwrap_or(0) as gtm_int_t,
                Arg::OutUint(p) if !p.is_null() => *p = slot.as_u64().unwrap_or(0) as gtm_uint_t,
                Arg::OutLong(p) if !p.is_null() => *p = slot.as_i64().unwrap_or(0) as gtm_long_t,
                Arg::OutUlong(p) if !p.is_null() => *p = slot.as_u64().unwrap_or(0) as gtm_ulong_t,
                Arg::OutStr(p) if !p.is_null() => {
                    if let Kind::Buffer(capacity) = kind {
                        let dst = std::slice::from_raw_parts_mut(p.cast::<u8>(), capacity);
                        let copied = copy_bounded(dst, &slot.as_bytes());
                        debug_assert!(copied.is_ok(), "output slot exceeds its {capacity}-byte buffer");
                    }
                }
                _ => {}
            }
        }
    }
}

fn binding(operation: &str) -> Option<&'static Binding> {
    REGISTRY.get(operation)
}

/// Run `operation` over raw host arguments.
///
/// # Safety
/// When `argc` equals the binding's arity, every pointer in `args` must be
/// valid as described on [`Arg`]. When it does not, `args` is not read.
pub(crate) unsafe fn dispatch(operation: &str, argc: gtm_int_t, args: &[Arg]) -> Reply {
    let Some(binding) = binding(operation) else {
        tracing::error!(operation, "entry point without binding");
        return Reply::Status(libc::ENOSYS);
    };
    if args.len() != binding.arity() {
        tracing::error!(operation, declared = args.len(), "entry point disagrees with binding");
        return Reply::Status(libc::ENOSYS);
    }
    let mut ctx = context();

    let supplied = usize::try_from(argc).unwrap_or(usize::MAX);
    if supplied != binding.arity() {
        // Let the binding report the mismatch; no argument is touched.
        let mut placeholder = vec![Slot::Int(0); supplied.min(binding.arity() + 1)];
        return binding.call(&mut ctx, &mut placeholder);
    }

    let mut slots: Vec<Slot> = args
        .iter()
        .zip(binding.params)
        // SAFETY: argc matched, so the caller passed every argument.
        .map(|(arg, param)| unsafe { arg.read(param.kind) })
        .collect();
    let reply = binding.call(&mut ctx, &mut slots);
    for ((arg, param), slot) in args.iter().zip(binding.params).zip(&slots) {
        // SAFETY: as above; outputs are written even after a failure so the
        // host always sees zeroed or empty values.
        unsafe { arg.write(param.kind, slot) };
    }
    reply
}

pub(crate) fn status(reply: Reply) -> gtm_status_t {
    match reply {
        Reply::Status(status) => status,
        Reply::Value(value) => value as gtm_status_t,
        Reply::Void => 0,
    }
}

pub(crate) fn long_value(reply: Reply) -> gtm_long_t {
    match reply {
        Reply::Value(value) => value as gtm_long_t,
        Reply::Status(status) => status.into(),
        Reply::Void => 0,
    }
}
