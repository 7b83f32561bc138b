use anyhow::Result;
use console::style;

use verdict::{Persona, PromptLibrary};

/// List the available personas with a one-line summary of each.
pub fn handle_personas() -> Result<()> {
    let library = PromptLibrary::default();

    println!("\n{}", style("Available personas").bold().cyan());
    println!("{}", style("─".repeat(60)).dim());

    for persona in Persona::all() {
        let profile = library.profile(persona);
        println!(
            "  {} {}",
            style(format!("{:<12}", profile.name())).bold(),
            style(summary(&profile.instructions)).dim()
        );
    }
    println!();

    Ok(())
}

/// First sentence of the instruction text.
fn summary(instructions: &str) -> String {
    let first_line = instructions.lines().next().unwrap_or_default();
    first_line
        .split_inclusive('.')
        .next()
        .unwrap_or(first_line)
        .to_string()
}
