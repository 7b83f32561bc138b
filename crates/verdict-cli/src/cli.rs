use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{personas, run};

#[derive(Parser)]
#[command(
    name = "verdict",
    about = "Multi-perspective AI deliberation: a panel of persona agents reports on a topic and a judge synthesizes the result",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the judge panel on a topic
    Run {
        /// The topic to deliberate
        topic: String,

        /// Stream the synthesis as it is produced
        #[arg(long)]
        stream: bool,

        /// Include member reports in the output
        #[arg(long)]
        show_members: bool,

        /// Use the assertive persona style (personas argue their
        /// perspective as definitive)
        #[arg(long)]
        assertive: bool,

        /// Output format
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// List the available personas
    Personas,
}

pub async fn cli() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            topic,
            stream,
            show_members,
            assertive,
            format,
        } => run::handle_run(topic, stream, show_members, assertive, format).await,
        Command::Personas => personas::handle_personas(),
    }
}
