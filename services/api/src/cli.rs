use crate::recommend::{
    run_chart_check, run_chart_list, run_recommend, ChartCheckArgs, ChartListArgs, RecommendArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use size_advisor::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Size Advisor",
    about = "Serve and query garment size recommendations from the command line",
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
    /// Recommend a size for one set of measurements
    Recommend(RecommendArgs),
    /// Inspect size chart data
    Charts {
        #[command(subcommand)]
        command: ChartsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ChartsCommand {
    /// List the charts the service would load
    List(ChartListArgs),
    /// Validate a size chart CSV file without starting the service
    Check(ChartCheckArgs),
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
        Command::Recommend(args) => run_recommend(args),
        Command::Charts {
            command: ChartsCommand::List(args),
        } => run_chart_list(args),
        Command::Charts {
            command: ChartsCommand::Check(args),
        } => run_chart_check(args),
    }
}
