//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::Confirm;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Prompt user to confirm a destructive change to the dataset
pub fn confirm_drop(count: usize, what: &str) -> Result<bool> {
    let message = format!("Drop {} {}? This cannot be undone in the output file", count, what);
    confirm_step(&message)
}
