use crate::render::{
    render_metrics, render_reconciliation, render_summary, render_units, OutputFormat,
};
use clap::Args;
use roster_core::config::AppConfig;
use roster_core::error::AppError;
use roster_core::import::RosterImporter;
use roster_core::roster::access::{
    units_in, AccessPolicy, FileSessionStore, SessionContext, SessionStore,
};
use roster_core::roster::aggregation::{percentage_metrics, top_deficits, Grouping};
use roster_core::roster::ReconciliationEngine;
use std::path::PathBuf;
use tracing::info;

/// Configuration, policy table and session store resolved once per process.
pub(crate) struct Dashboard {
    config: AppConfig,
    policy: AccessPolicy,
    sessions: FileSessionStore,
}

impl Dashboard {
    pub(crate) fn new(config: AppConfig) -> Result<Self, AppError> {
        let policy = config.access.load_policy()?;
        let sessions = FileSessionStore::new(config.session.path.clone());
        Ok(Self {
            config,
            policy,
            sessions,
        })
    }

    fn session(&self, identity: &str) -> Result<SessionContext, AppError> {
        Ok(SessionContext::from_store(identity, &self.sessions, &self.policy)?)
    }
}

fn parse_grouping(raw: &str) -> Result<Grouping, String> {
    raw.parse()
}

#[derive(Args, Debug)]
pub(crate) struct LoginArgs {
    /// Identity of the signed-in user
    #[arg(long)]
    pub(crate) identity: String,
    /// Role granted by the identity provider
    #[arg(long)]
    pub(crate) role: String,
}

#[derive(Args, Debug)]
pub(crate) struct LogoutArgs {
    /// Identity whose stored role should be cleared
    #[arg(long)]
    pub(crate) identity: String,
}

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// Headcount CSV export (OM, POSTO, ESP, TMFT, EXI, ...)
    #[arg(long)]
    pub(crate) staffing: PathBuf,
    /// Identity whose stored role scopes the output
    #[arg(long)]
    pub(crate) identity: String,
    /// unit, rank, specialty, rank-unit, specialty-rank or month
    #[arg(long, default_value = "unit", value_parser = parse_grouping)]
    pub(crate) group_by: Grouping,
    /// Number of deficit rows to highlight (defaults to ROSTER_TOP_DEFICITS)
    #[arg(long)]
    pub(crate) top: Option<usize>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct ReconcileArgs {
    /// NEO roster CSV export (OM, POSTO TMFT, ESP TMFT, POSTO EFE, ESP EFE, NOME, ...)
    #[arg(long)]
    pub(crate) personnel: PathBuf,
    /// Identity whose stored role scopes the output
    #[arg(long)]
    pub(crate) identity: String,
    /// Only list out-of-spec posts
    #[arg(long)]
    pub(crate) only_mismatches: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct UnitsArgs {
    /// Headcount CSV export used as the unit universe
    #[arg(long)]
    pub(crate) staffing: PathBuf,
    /// Identity whose stored role scopes the output
    #[arg(long)]
    pub(crate) identity: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct MetricsArgs {
    /// Headcount CSV export carrying the percentage columns
    #[arg(long)]
    pub(crate) staffing: PathBuf,
    /// Identity whose stored role scopes the output
    #[arg(long)]
    pub(crate) identity: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

pub(crate) fn run_login(dashboard: &Dashboard, args: LoginArgs) -> Result<(), AppError> {
    dashboard.sessions.store(&args.identity, &args.role)?;
    info!(identity = %args.identity, role = %args.role, "session stored");
    println!("Signed in {} as {}", args.identity, args.role);
    Ok(())
}

pub(crate) fn run_logout(dashboard: &Dashboard, args: LogoutArgs) -> Result<(), AppError> {
    dashboard.sessions.clear(&args.identity)?;
    info!(identity = %args.identity, "session cleared");
    println!("Signed out {}", args.identity);
    Ok(())
}

pub(crate) fn run_summary(dashboard: &Dashboard, args: SummaryArgs) -> Result<(), AppError> {
    let SummaryArgs {
        staffing,
        identity,
        group_by,
        top,
        format,
    } = args;

    let session = dashboard.session(&identity)?;
    let records = session.filter(RosterImporter::staffing_from_path(staffing)?);

    let summary = group_by.apply(&records);
    let rows = summary.clone().into_rows();
    let top = top.unwrap_or(dashboard.config.report.top_deficits);
    let deficits = top_deficits(&rows, top);

    info!(
        identity = %identity,
        grouping = group_by.label(),
        records = records.len(),
        rows = rows.len(),
        "summary rendered"
    );
    render_summary(&summary.to_view(group_by.label(), &deficits), format)
}

pub(crate) fn run_reconcile(dashboard: &Dashboard, args: ReconcileArgs) -> Result<(), AppError> {
    let ReconcileArgs {
        personnel,
        identity,
        only_mismatches,
        format,
    } = args;

    let session = dashboard.session(&identity)?;
    let records = session.filter(RosterImporter::personnel_from_path(personnel)?);
    let mut report = ReconciliationEngine::standard().reconcile(&records);

    if only_mismatches {
        report.findings.retain(|finding| finding.out_of_spec);
    }

    info!(
        identity = %identity,
        posts = records.len(),
        out_of_spec = report.out_of_spec_count(),
        "reconciliation rendered"
    );
    render_reconciliation(&report, format)
}

pub(crate) fn run_units(dashboard: &Dashboard, args: UnitsArgs) -> Result<(), AppError> {
    let session = dashboard.session(&args.identity)?;
    let records = RosterImporter::staffing_from_path(&args.staffing)?;
    let units = session.available_units(units_in(&records));
    render_units(&units, args.format)
}

pub(crate) fn run_metrics(dashboard: &Dashboard, args: MetricsArgs) -> Result<(), AppError> {
    let session = dashboard.session(&args.identity)?;
    let records = session.filter(RosterImporter::staffing_from_path(&args.staffing)?);
    let views: Vec<_> = percentage_metrics(&records)
        .iter()
        .map(|entry| entry.to_view())
        .collect();
    render_metrics(&views, args.format)
}
