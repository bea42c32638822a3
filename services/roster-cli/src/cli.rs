use crate::commands::{
    run_login, run_logout, run_metrics, run_reconcile, run_summary, run_units, Dashboard,
    LoginArgs, LogoutArgs, MetricsArgs, ReconcileArgs, SummaryArgs, UnitsArgs,
};
use clap::{Parser, Subcommand};
use roster_core::config::AppConfig;
use roster_core::error::AppError;
use roster_core::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Roster Dashboard",
    about = "Reconcile and summarize personnel roster spreadsheets from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record the role an identity signed in with
    Login(LoginArgs),
    /// Forget the stored role for an identity
    Logout(LogoutArgs),
    /// Planned vs. actual headcount grouped by a key, with top deficits
    Summary(SummaryArgs),
    /// Flag posts whose filled rank/specialty disagrees with the assigned one
    Reconcile(ReconcileArgs),
    /// List the organizational units the caller may select
    Units(UnitsArgs),
    /// Per-rank fill-rate and qualification averages
    Metrics(MetricsArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let dashboard = Dashboard::new(config)?;

    match cli.command {
        Command::Login(args) => run_login(&dashboard, args),
        Command::Logout(args) => run_logout(&dashboard, args),
        Command::Summary(args) => run_summary(&dashboard, args),
        Command::Reconcile(args) => run_reconcile(&dashboard, args),
        Command::Units(args) => run_units(&dashboard, args),
        Command::Metrics(args) => run_metrics(&dashboard, args),
    }
}
