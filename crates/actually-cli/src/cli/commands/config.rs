//! `actually config` handlers.

use actually_core::config::{Config, paths};
use anyhow::{Context, Result};

/// Prints the config path. Notes on stderr when the file does not exist yet.
pub fn path() {
    let path = paths::config_path();
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(not created yet; run `actually config init`)");
    }
}

pub fn init() -> Result<()> {
    let path = paths::config_path();
    Config::init(&path).with_context(|| format!("init config at {}", path.display()))?;
    println!("Created config at {}", path.display());
    Ok(())
}

pub fn generate() -> Result<()> {
    print!("{}", Config::generate()?);
    Ok(())
}
