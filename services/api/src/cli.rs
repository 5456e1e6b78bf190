use crate::demo::{run_alerts, run_demo, run_technical_review, AlertsArgs, DemoArgs, ReviewArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fleet_ops::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Operations Console",
    about = "Run and inspect the fleet administration service from the command line",
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
    /// Print the ranked alert board for a database file
    Alerts(AlertsArgs),
    /// Generate operational reports
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Run a self-contained demo on a seeded in-memory fleet
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Technical-review standing per truck, soonest expiry first
    TechnicalReview(ReviewArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured database file
    #[arg(long)]
    pub(crate) db: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Alerts(args) => run_alerts(args),
        Command::Report {
            command: ReportCommand::TechnicalReview(args),
        } => run_technical_review(args),
        Command::Demo(args) => run_demo(args),
    }
}
