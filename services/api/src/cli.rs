use crate::demo::{run_demo, run_evaluate, run_seed_check, DemoArgs, EvaluateArgs, SeedCheckArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use entry_requirements::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "IB Entry Requirements",
    about = "Author IB program entry requirements and check candidate eligibility",
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
    /// Evaluate one candidate profile against one program, both read from JSON files
    Evaluate(EvaluateArgs),
    /// Work with bulk seed exports
    Seed {
        #[command(subcommand)]
        command: SeedCommand,
    },
    /// Walk through authoring a program and evaluating sample candidates
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum SeedCommand {
    /// Import a seed CSV and report what it would load, without starting the server
    Check(SeedCheckArgs),
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
        Command::Evaluate(args) => run_evaluate(args),
        Command::Seed {
            command: SeedCommand::Check(args),
        } => run_seed_check(args),
        Command::Demo(args) => run_demo(args),
    }
}
