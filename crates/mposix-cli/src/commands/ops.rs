use mposix_host::Session;
use mposix_host::manifest::{Manifest, render_call_table};

pub fn list(session: &Session, json: bool) -> anyhow::Result<()> {
    let registry = session.registry();
    if json {
        println!("{}", Manifest::from_registry(registry).to_json()?);
        return Ok(());
    }

    for binding in registry.iter() {
        let category = serde_json::to_value(binding.category)?;
        println!(
            "{:<14} {:>2}  {:<7} {}",
            binding.name,
            binding.arity(),
            category.as_str().unwrap_or_default(),
            binding.symbol
        );
    }
    Ok(())
}

pub fn table(session: &Session, library: &str) -> anyhow::Result<()> {
    print!("{}", render_call_table(session.registry(), library));
    Ok(())
}
