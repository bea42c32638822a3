use clap::ValueEnum;
use roster_core::error::AppError;
use roster_core::roster::aggregation::views::{RankPercentageView, RosterSummaryView};
use roster_core::roster::ReconciliationReport;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn render_summary(
    view: &RosterSummaryView,
    format: OutputFormat,
) -> Result<(), AppError> {
    if format == OutputFormat::Json {
        return print_json(view);
    }

    println!("Headcount by {}", view.grouping);
    if view.rows.is_empty() {
        println!("- no visible records");
        return Ok(());
    }

    for row in &view.rows {
        println!(
            "- {}: TMFT {} | EXI {} | DIF {:+}",
            row.key, row.planned, row.actual, row.difference
        );
    }
    println!(
        "Total: TMFT {} | EXI {} | DIF {:+}",
        view.totals.planned, view.totals.actual, view.totals.difference
    );

    if view.top_deficits.is_empty() {
        println!("\nDeficits: none");
    } else {
        println!("\nLargest deficits");
        for (rank, row) in view.top_deficits.iter().enumerate() {
            println!("{}. {} ({:+})", rank + 1, row.key, row.difference);
        }
    }

    Ok(())
}

pub(crate) fn render_reconciliation(
    report: &ReconciliationReport,
    format: OutputFormat,
) -> Result<(), AppError> {
    if format == OutputFormat::Json {
        return print_json(report);
    }

    println!("NEO reconciliation");
    for unit in &report.units {
        println!(
            "- {}: {} posts, {} occupied, {} vacant, {} extra allocation, {} out of spec",
            unit.unit,
            unit.posts,
            unit.occupied,
            unit.vacant,
            unit.extra_allocation,
            unit.out_of_spec
        );
    }

    if report.findings.is_empty() {
        println!("\nPosts: none visible");
        return Ok(());
    }

    println!("\nPosts");
    for finding in &report.findings {
        let flag = if finding.out_of_spec { "!" } else { " " };
        let detail = finding
            .description
            .as_deref()
            .map(|description| format!(" ({description})"))
            .unwrap_or_default();
        println!(
            "{} {} | {} | {}{}",
            flag, finding.unit, finding.id, finding.display_name, detail
        );
    }

    Ok(())
}

pub(crate) fn render_units(units: &[String], format: OutputFormat) -> Result<(), AppError> {
    if format == OutputFormat::Json {
        return print_json(units);
    }

    if units.is_empty() {
        println!("No units available for this session");
    } else {
        for unit in units {
            println!("{unit}");
        }
    }
    Ok(())
}

pub(crate) fn render_metrics(
    views: &[RankPercentageView],
    format: OutputFormat,
) -> Result<(), AppError> {
    if format == OutputFormat::Json {
        return print_json(views);
    }

    fn pct(value: Option<i64>) -> String {
        value.map_or_else(|| "-".to_string(), |value| format!("{value}%"))
    }

    println!("Averages by rank");
    for view in views {
        println!(
            "- {}: fill rate {} | qualification {}",
            view.rank,
            pct(view.fill_rate_pct),
            pct(view.qualification_pct)
        );
    }
    Ok(())
}
