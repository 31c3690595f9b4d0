use mposix_core::mode::{self, FileType};

pub fn mode(octal: &str) -> anyhow::Result<()> {
    let value = mode::mode_from_octal(octal)?;
    println!("{value}");
    Ok(())
}

pub fn octal(value: u32) -> anyhow::Result<()> {
    println!("{}", mode::octal_from_mode(value & mode::MAX_MODE));
    if let Some(kind) = FileType::from_mode(value) {
        println!("type={}", kind.name());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_octal_digits() {
        assert!(mode("0755").is_ok());
        assert!(mode("789").is_err());
        assert!(mode("17777").is_err());
    }
}
