use crate::commands::{run_quiz, run_score, run_share, QuizArgs, ScoreArgs, ShareArgs};
use crate::infra::DataArgs;
use crate::server;
use clap::{Args, Parser, Subcommand};
use wahlmatch::config::AppConfig;
use wahlmatch::error::AppError;
use wahlmatch::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "wahlmatch",
    about = "Match voter answers against party positions from the command line or over HTTP",
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
    /// Score an answer file and print the ranked parties
    Score(ScoreArgs),
    /// Answer the theses interactively on the terminal
    Quiz(QuizArgs),
    /// Render the share card for the best match of an answer file
    Share(ShareArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    match command {
        Command::Serve(mut args) => {
            std::mem::take(&mut args.data).apply(&mut config);
            server::run(config, args).await
        }
        Command::Score(args) => run_score(config, args),
        Command::Quiz(args) => run_quiz(config, args),
        Command::Share(args) => run_share(config, args),
    }
}
