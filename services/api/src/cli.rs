use crate::demo::{run_demo, run_proposal, run_qualify, DemoArgs, ProposalArgs, QualifyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use solar_crm::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Solar Proposal Service",
    about = "Qualify roofs, price solar proposals, and track milestone commissions",
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
    /// Score a roof and print the savings model and break-even horizon
    Proposal(ProposalArgs),
    /// Score every roof in an irradiance lookup CSV export
    Qualify(QualifyArgs),
    /// Walk one lead from qualification through commission payout
    Demo(DemoArgs),
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
        Command::Proposal(args) => run_proposal(args),
        Command::Qualify(args) => run_qualify(args),
        Command::Demo(args) => run_demo(args),
    }
}
