//! Binding definitions and the per-call marshalling shim.
//!
//! Every operation follows the same protocol:
//! 1. the slot count must equal the binding's arity, or the call fails with
//!    `ENODATA` and nothing else happens;
//! 2. the handler decodes its inputs (option names included) and makes the
//!    native call;
//! 3. on failure every output slot is reset to its zero value, except after
//!    a truncation, where the clipped outputs stay;
//! 4. the outcome is folded into a [`Reply`] according to the binding's
//!    [`Category`].

use std::fmt;

use mposix_core::{DirTable, PosixResult};
use serde::Serialize;

use crate::error::{HostError, HostResult};
use crate::slot::{Args, Slot};

/// Per-process state the bindings share.
#[derive(Debug, Default)]
pub struct Context {
    pub dirs: DirTable,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose directory table admits at most `max_open` streams.
    pub fn with_dir_limit(max_open: usize) -> Self {
        Self {
            dirs: DirTable::with_limit(max_open),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// The native type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Int,
    Uint,
    Long,
    Ulong,
    /// Input string.
    Str,
    /// Preallocated string output of the given capacity, terminator included.
    Buffer(usize),
}

impl Kind {
    /// The value an output of this kind holds after a failed call.
    pub fn zero(self) -> Slot {
        match self {
            Kind::Int | Kind::Long => Slot::Int(0),
            Kind::Uint | Kind::Ulong => Slot::Uint(0),
            Kind::Str | Kind::Buffer(_) => Slot::Str(Vec::new()),
        }
    }

    /// The host runtime's name for this type.
    pub fn c_type(self) -> &'static str {
        match self {
            Kind::Int => "gtm_int_t",
            Kind::Uint => "gtm_uint_t",
            Kind::Long => "gtm_long_t",
            Kind::Ulong => "gtm_ulong_t",
            Kind::Str | Kind::Buffer(_) => "gtm_char_t",
        }
    }
}

/// One positional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: &'static str,
    pub direction: Direction,
    pub kind: Kind,
    /// Input passed by pointer rather than by value.
    pub by_ref: bool,
}

impl Param {
    pub const fn input(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            direction: Direction::In,
            kind,
            by_ref: false,
        }
    }

    pub const fn input_ref(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            direction: Direction::In,
            kind,
            by_ref: true,
        }
    }

    pub const fn output(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            direction: Direction::Out,
            kind,
            by_ref: true,
        }
    }

    /// Declaration in the external-call table, e.g. `O:gtm_char_t*[128]`.
    pub fn declaration(&self) -> String {
        let prefix = match self.direction {
            Direction::In => "I",
            Direction::Out => "O",
        };
        let pointer = matches!(self.kind, Kind::Str | Kind::Buffer(_)) || self.by_ref;
        let mut decl = format!("{prefix}:{}{}", self.kind.c_type(), if pointer { "*" } else { "" });
        if let Kind::Buffer(capacity) = self.kind {
            decl.push_str(&format!("[{capacity}]"));
        }
        decl
    }
}

/// What an operation hands back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Returns the status code; `0` is success.
    Status,
    /// Returns the native result; failure would be a defect, not a user error.
    Value,
    /// Returns nothing.
    Void,
    /// Returns the native result of a primitive with no `errno` channel.
    Direct,
}

impl Category {
    fn reply(self, outcome: &PosixResult<i64>) -> Reply {
        match (self, outcome) {
            (Category::Void, _) => Reply::Void,
            (Category::Status, Ok(_)) => Reply::Status(0),
            (Category::Status, Err(err)) => Reply::Status(err.errno()),
            (Category::Value | Category::Direct, Ok(value)) => Reply::Value(*value),
            (Category::Value | Category::Direct, Err(err)) => Reply::Value(err.errno().into()),
        }
    }
}

/// The return value of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reply {
    Status(i32),
    Value(i64),
    Void,
}

impl Reply {
    /// The status code, for status-bearing replies.
    pub fn status(&self) -> Option<i32> {
        match self {
            Reply::Status(status) => Some(*status),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Reply::Status(status) if *status != 0)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Status(status) => write!(f, "status={status}"),
            Reply::Value(value) => write!(f, "value={value}"),
            Reply::Void => f.write_str("void"),
        }
    }
}

/// Handler for one operation. Status-bearing handlers return `Ok(0)`.
pub type Handler = fn(&mut Context, &mut Args<'_>) -> PosixResult<i64>;

/// One operation: name, parameter layout, return category, handler.
#[derive(Clone, Copy)]
pub struct Binding {
    pub name: &'static str,
    pub symbol: &'static str,
    pub params: &'static [Param],
    pub category: Category,
    /// Native type of the returned value, for `Value` and `Direct` bindings.
    pub returns: Option<Kind>,
    pub handler: Handler,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("symbol", &self.symbol)
            .field("arity", &self.arity())
            .field("category", &self.category)
            .finish()
    }
}

impl Binding {
    pub const fn status(
        name: &'static str,
        symbol: &'static str,
        params: &'static [Param],
        handler: Handler,
    ) -> Self {
        Self {
            name,
            symbol,
            params,
            category: Category::Status,
            returns: None,
            handler,
        }
    }

    pub const fn value(
        name: &'static str,
        symbol: &'static str,
        params: &'static [Param],
        returns: Kind,
        handler: Handler,
    ) -> Self {
        Self {
            name,
            symbol,
            params,
            category: Category::Value,
            returns: Some(returns),
            handler,
        }
    }

    pub const fn direct(
        name: &'static str,
        symbol: &'static str,
        params: &'static [Param],
        returns: Kind,
        handler: Handler,
    ) -> Self {
        Self {
            name,
            symbol,
            params,
            category: Category::Direct,
            returns: Some(returns),
            handler,
        }
    }

    pub const fn void(
        name: &'static str,
        symbol: &'static str,
        params: &'static [Param],
        handler: Handler,
    ) -> Self {
        Self {
            name,
            symbol,
            params,
            category: Category::Void,
            returns: None,
            handler,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Name in the external-call table, which does not allow `_`.
    pub fn table_name(&self) -> String {
        self.name.replace('_', "")
    }

    /// Return type in the external-call table.
    pub fn return_type(&self) -> &'static str {
        match (self.category, self.returns) {
            (Category::Status, _) => "gtm_status_t",
            (Category::Void, _) => "void",
            (_, Some(kind)) => kind.c_type(),
            (_, None) => "gtm_long_t",
        }
    }

    /// Slots for a call: inputs taken from `inputs` in order, outputs empty.
    ///
    /// Missing inputs are left as empty strings, which read as zero.
    pub fn slots_from_inputs<I>(&self, inputs: I) -> Vec<Slot>
    where
        I: IntoIterator,
        I::Item: Into<Slot>,
    {
        let mut inputs = inputs.into_iter();
        self.params
            .iter()
            .map(|param| match param.direction {
                Direction::In => inputs.next().map(Into::into).unwrap_or_else(|| Kind::Str.zero()),
                Direction::Out => param.kind.zero(),
            })
            .collect()
    }

    /// Run the marshalling protocol for one call.
    pub fn call(&self, ctx: &mut Context, slots: &mut [Slot]) -> Reply {
        if slots.len() != self.arity() {
            tracing::warn!(
                operation = self.name,
                expected = self.arity(),
                got = slots.len(),
                "arity mismatch"
            );
            let err = mposix_core::PosixError::Arity {
                expected: self.arity(),
                got: slots.len(),
            };
            return self.category.reply(&Err(err));
        }

        let mut args = Args::new(self.params, slots);
        let outcome = (self.handler)(ctx, &mut args);
        if let Err(err) = &outcome {
            if !err.is_truncation() {
                args.clear_outputs();
            }
            tracing::debug!(operation = self.name, errno = err.errno(), %err, "binding failed");
        }
        let reply = self.category.reply(&outcome);
        tracing::debug!(operation = self.name, arity = self.arity(), %reply, "binding invoked");
        reply
    }
}

/// Every operation the host can call, by name.
#[derive(Debug, Clone)]
pub struct Registry {
    bindings: Vec<Binding>,
}

impl Registry {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    /// The full POSIX binding set.
    pub fn standard() -> Self {
        Self::new(crate::bindings::STANDARD.to_vec())
    }

    /// Look up by operation name, table name, or exported symbol.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|b| b.name == name || b.symbol == name)
            .or_else(|| self.bindings.iter().find(|b| b.table_name() == name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Call the operation `name` with `slots`.
    pub fn invoke(&self, ctx: &mut Context, name: &str, slots: &mut [Slot]) -> HostResult<Reply> {
        let binding = self
            .get(name)
            .ok_or_else(|| HostError::UnknownOperation(name.to_string()))?;
        Ok(binding.call(ctx, slots))
    }
}
