use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use futures::StreamExt;

use verdict::providers::OpenAiProvider;
use verdict::{
    judge_team, DeliberationEngine, PersonaStyle, PromptLibrary, RunResult, TeamBehavior,
};

/// Handle the run command.
pub async fn handle_run(
    topic: String,
    stream: bool,
    show_members: bool,
    assertive: bool,
    format: String,
) -> Result<()> {
    let provider = Arc::new(OpenAiProvider::from_env()?);
    let engine = Arc::new(DeliberationEngine::new(provider));

    let persona_style = if assertive {
        PersonaStyle::Assertive
    } else {
        PersonaStyle::Balanced
    };
    let library = PromptLibrary::builtin(persona_style);

    let behavior = TeamBehavior::default()
        .with_show_member_responses(show_members)
        .with_stream_intermediate_steps(show_members);
    let team = judge_team(&library, engine)?.with_behavior(behavior);

    println!(
        "\n{}",
        style(format!("{} - deliberating on: {topic}", team.config().name))
            .bold()
            .cyan()
    );
    println!("{}", style("─".repeat(60)).dim());
    println!();

    if stream {
        let mut chunks = team.run_stream(&topic).await?;
        while let Some(chunk) = chunks.next().await {
            print!("{}", chunk?);
            std::io::stdout().flush().ok();
        }
        println!();
        return Ok(());
    }

    let result = team.run(&topic).await?;
    match format.as_str() {
        "json" => display_json(&result)?,
        _ => display_text(&result),
    }

    Ok(())
}

fn display_text(result: &RunResult) {
    if !result.member_reports.is_empty() {
        println!("{}", style("Member reports:").bold());
        for report in &result.member_reports {
            println!("\n{}", style(&report.persona).cyan().bold());
            println!("{}", style(&report.content).dim());
        }
        println!("\n{}", style("─".repeat(60)).dim());
    }

    println!("\n{}\n", style("Final assessment").bold().green());
    match &result.content {
        Some(content) => println!("{content}"),
        None => println!("{}", style("(the engine returned no content)").dim()),
    }

    if let Some(total) = result.usage.total_tokens {
        println!(
            "\n{}",
            style(format!("model: {} · tokens: {total}", result.model)).dim()
        );
    }
}

fn display_json(result: &RunResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
