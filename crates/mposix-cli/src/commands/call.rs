use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;

use anyhow::Context as _;
use mposix_host::registry::Direction;
use mposix_host::{Propagation, Session, Slot};

pub fn call(
    session: &mut Session,
    operation: &str,
    args: &[OsString],
    raw: bool,
    no_raise: bool,
) -> anyhow::Result<()> {
    let binding = *session
        .registry()
        .get(operation)
        .with_context(|| format!("unknown operation '{operation}' (see `mposix ops`)"))?;

    let mut slots: Vec<Slot> = if raw {
        args.iter().map(|arg| Slot::from(arg.as_bytes())).collect()
    } else {
        binding.slots_from_inputs(args.iter().map(|arg| arg.as_bytes()))
    };
    let propagation = if no_raise {
        Propagation::Return
    } else {
        Propagation::Policy
    };

    let reply = session.call_with(binding.name, &mut slots, propagation)?;
    println!("{reply}");
    if slots.len() == binding.arity() {
        for (param, slot) in binding.params.iter().zip(&slots) {
            if param.direction == Direction::Out {
                println!("{}={slot}", param.name);
            }
        }
    }
    Ok(())
}
