//! Interactive prompts for `scf init --interactive`.
//!
//! Detection results become prompt defaults, so pressing Enter through the
//! wizard gives the same buildstate as the non-interactive path.

use dialoguer::{Confirm, Input};
use scf_detect::Detection;

#[derive(Debug, Clone)]
pub struct InitAnswers {
    pub name: String,
    pub description: Option<String>,
    pub focus: Option<String>,
}

/// Run the init wizard. Returns `None` when the user declines the final
/// confirmation.
pub fn run_init_wizard(detection: &Detection) -> anyhow::Result<Option<InitAnswers>> {
    println!();
    println!(
        "  Detected a {} project: {}",
        detection.kind.label(),
        detection.name
    );
    println!();

    let name: String = Input::new()
        .with_prompt("Project name")
        .default(detection.name.clone())
        .interact_text()?;

    let description: String = Input::new()
        .with_prompt("One-line description (optional)")
        .allow_empty(true)
        .interact_text()?;

    let focus: String = Input::new()
        .with_prompt("What are you working on right now? (optional)")
        .allow_empty(true)
        .interact_text()?;

    println!();
    let confirmed = Confirm::new()
        .with_prompt(format!("Write buildstate files for '{name}'?"))
        .default(true)
        .interact()?;

    if !confirmed {
        return Ok(None);
    }

    Ok(Some(InitAnswers {
        name,
        description: non_empty(description),
        focus: non_empty(focus),
    }))
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
