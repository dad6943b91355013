//! Init command implementation

use anyhow::{Result, bail};
use std::path::PathBuf;

use growquest::config::Config;

/// Write the default config to `config_path` (or ~/.growquest/config.toml)
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if !Config::write_default(&config_path, force)? {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    println!("Created: {}", config_path.display());
    Ok(())
}
