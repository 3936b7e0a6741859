use crate::server;
use crate::tools::{run_hash_password, run_score, HashPasswordArgs, ScoreArgs};
use clap::{Args, Parser, Subcommand};
use property_leads::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Property Lead Manager",
    about = "Run the property lead capture API and its provisioning helpers",
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
    /// Score a lead form and print how each answer contributed
    Score(ScoreArgs),
    /// Print an Argon2id hash for an agent's `password_hash` column
    HashPassword(HashPasswordArgs),
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
        Command::Score(args) => run_score(args),
        Command::HashPassword(args) => run_hash_password(args),
    }
}
