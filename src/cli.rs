use crate::demo::{run_extract, run_presets, run_score, ExtractArgs, PresetsArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_explainer::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "credit-explainer",
    about = "Score loan applicants and explain credit decisions in plain language",
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
    /// Score one applicant from a preset or explicit field values
    Score(ScoreArgs),
    /// Score every preset applicant under both models
    Presets(PresetsArgs),
    /// Extract applicant fields from a local document and assess them
    Extract(ExtractArgs),
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
        Command::Score(args) => run_score(args).await,
        Command::Presets(args) => run_presets(args),
        Command::Extract(args) => run_extract(args).await,
    }
}
