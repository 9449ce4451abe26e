use crate::demo::{run_prompt, run_rubric_check, run_score, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mnv_scorecard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "M&V Plan Scorecard",
    about = "Serve and inspect the rubric-driven M&V plan scorecard",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the compliance system prompt built from the active rubric
    Prompt,
    /// Recompute the scores in a saved model response
    Score(ScoreArgs),
    /// Inspect the active rubric
    Rubric {
        #[command(subcommand)]
        command: RubricCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RubricCommand {
    /// Load and validate the rubric, then print its counts
    Check,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Prompt => run_prompt(),
        Command::Score(args) => run_score(args),
        Command::Rubric {
            command: RubricCommand::Check,
        } => run_rubric_check(),
    }
}
