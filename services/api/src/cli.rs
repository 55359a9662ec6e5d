use crate::quote::{run_idv, run_quote, IdvArgs, QuoteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use premium_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Premium Engine",
    about = "Serve or query the motor premium rating engine from the command line",
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
    /// Price a single vehicle and print the premium breakdown
    Quote(QuoteArgs),
    /// Print the IDV band for a vehicle
    Idv(IdvArgs),
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
        Command::Quote(args) => run_quote(args),
        Command::Idv(args) => run_idv(args),
    }
}
