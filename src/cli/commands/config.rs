//! Config command implementation
//!
//! Handles `reelsmith config`: effective values and where each came from.

use anyhow::Result;

use crate::Config;

/// Execute the config command
pub fn execute_config_command(config: &Config) -> Result<()> {
    let effective = config.effective_config();
    let width = effective.keys().map(String::len).max().unwrap_or(0);

    println!("Effective configuration:");
    for (key, (value, source)) in &effective {
        println!("  {key:<width$} = {value}  ({source})");
    }
    Ok(())
}
