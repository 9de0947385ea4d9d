//! Show version information.

use anyhow::Result;
use colored::Colorize;

pub fn execute(detailed: bool) -> Result<()> {
    println!("{} {}", "flog".cyan().bold(), flog_core::VERSION);

    if detailed {
        println!("\nBuild Information:");
        println!("  Version: {}", env!("CARGO_PKG_VERSION"));
        println!("  Target: {}", std::env::consts::ARCH);
        println!("  OS: {}", std::env::consts::OS);
        println!("  Rust Version: {}", env!("CARGO_PKG_RUST_VERSION"));
        if let Some(path) = flog_core::config::TreeConfig::default_path() {
            println!("  Default Config: {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_runs() {
        execute(false).unwrap();
        execute(true).unwrap();
    }
}
