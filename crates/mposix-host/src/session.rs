//! Host-side failure propagation.
//!
//! The bindings only ever return status codes. A [`Session`] is the host
//! calling convention on top: a failed status-bearing call becomes a
//! [`HostError::Raised`], except for operations the [`ErrorPolicy`]
//! suppresses (by default the two existence checks, so they can be used as
//! plain boolean tests). Call sites may override the policy per call.

use std::collections::BTreeSet;

use nix::errno::Errno;

use crate::config::{ErrorsConfig, MposixConfig};
use crate::error::{HostError, HostResult};
use crate::registry::{Context, Registry, Reply};
use crate::slot::Slot;

/// Which operations raise on a non-zero status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPolicy {
    raise: bool,
    suppress: BTreeSet<String>,
}

impl ErrorPolicy {
    pub fn new(raise: bool, suppress: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            raise,
            suppress: suppress.into_iter().map(Into::into).collect(),
        }
    }

    /// Never raise.
    pub fn returning() -> Self {
        Self::new(false, Vec::<String>::new())
    }

    pub fn from_config(config: &ErrorsConfig) -> Self {
        Self::new(config.raise, config.suppress.iter().cloned())
    }

    /// Whether a failure of `operation` is raised under this policy.
    pub fn raises(&self, operation: &str) -> bool {
        self.raise && !self.suppress.contains(operation)
    }

    pub fn suppressed(&self) -> impl Iterator<Item = &str> {
        self.suppress.iter().map(String::as_str)
    }
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self::from_config(&ErrorsConfig::default())
    }
}

/// Per-call override of the session's [`ErrorPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Follow the session policy.
    #[default]
    Policy,
    /// Raise on failure, even for a suppressed operation.
    Raise,
    /// Return the status code.
    Return,
}

/// A registry, its shared state, and an error policy.
#[derive(Debug)]
pub struct Session {
    registry: Registry,
    context: Context,
    policy: ErrorPolicy,
}

impl Session {
    pub fn new(registry: Registry, context: Context, policy: ErrorPolicy) -> Self {
        Self {
            registry,
            context,
            policy,
        }
    }

    /// A session over the standard bindings, configured from `config`.
    ///
    /// Suppressed operation names must exist in the registry.
    pub fn from_config(config: &MposixConfig) -> HostResult<Self> {
        config.validate()?;
        let registry = Registry::standard();
        let policy = ErrorPolicy::from_config(&config.errors);
        if let Some(unknown) = policy.suppressed().find(|name| registry.get(name).is_none()) {
            return Err(HostError::Config(format!("cannot suppress unknown operation {unknown:?}")));
        }
        let context = Context::with_dir_limit(config.directories.max_open);
        Ok(Self::new(registry, context, policy))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn policy(&self) -> &ErrorPolicy {
        &self.policy
    }

    /// Call `operation`, raising on failure unless the policy suppresses it.
    pub fn call(&mut self, operation: &str, slots: &mut [Slot]) -> HostResult<Reply> {
        self.call_with(operation, slots, Propagation::Policy)
    }

    pub fn call_with(
        &mut self,
        operation: &str,
        slots: &mut [Slot],
        propagation: Propagation,
    ) -> HostResult<Reply> {
        let binding = self
            .registry
            .get(operation)
            .ok_or_else(|| HostError::UnknownOperation(operation.to_string()))?;
        let reply = binding.call(&mut self.context, slots);
        let raise = match propagation {
            Propagation::Policy => self.policy.raises(binding.name),
            Propagation::Raise => true,
            Propagation::Return => false,
        };
        match reply.status() {
            Some(errno) if errno != 0 && raise => {
                let message = Errno::from_raw(errno).desc().to_string();
                tracing::warn!(operation = binding.name, errno, %message, "raising failed call");
                Err(HostError::Raised {
                    operation: binding.name.to_string(),
                    errno,
                    message,
                })
            }
            _ => Ok(reply),
        }
    }

    /// Call `operation` with `inputs` and return the output slots.
    pub fn call_inputs<I>(&mut self, operation: &str, inputs: I) -> HostResult<(Reply, Vec<Slot>)>
    where
        I: IntoIterator,
        I::Item: Into<Slot>,
    {
        let mut slots = self
            .registry
            .get(operation)
            .ok_or_else(|| HostError::UnknownOperation(operation.to_string()))?
            .slots_from_inputs(inputs);
        let reply = self.call(operation, &mut slots)?;
        Ok((reply, slots))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Registry::standard(), Context::new(), ErrorPolicy::default())
    }
}
