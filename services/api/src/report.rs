use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use org_compliance::analysis::{
    AnalysisPolicy, ComplianceReport, ComplianceReportSummary, PolicyError,
};
use org_compliance::config::{AnalysisConfig, AppConfig};
use org_compliance::error::AppError;
use org_compliance::loader::{EmployeeLoad, EmployeeLoader, SkippedRow};
use org_compliance::org::OrgIndex;
use org_compliance::telemetry;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Employee CSV file with Id, firstName, lastName, salary and managerId columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Maximum number of managers allowed between an employee and the CEO
    #[arg(long)]
    pub(crate) max_depth: Option<usize>,
    /// Lowest acceptable manager salary as a multiple of the reports' average
    #[arg(long)]
    pub(crate) min_ratio: Option<f64>,
    /// Highest acceptable manager salary as a multiple of the reports' average
    #[arg(long)]
    pub(crate) max_ratio: Option<f64>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrgReportResponse {
    pub(crate) generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub(crate) summary: ComplianceReportSummary,
    pub(crate) skipped_rows: Vec<SkippedRow>,
}

/// Apply per-run overrides on top of the configured company rules.
///
/// Overrides are validated like the `ORG_SALARY_*` settings: a band that is not
/// positive and ordered is an error, never silently replaced.
pub(crate) fn resolve_policy(
    base: AnalysisConfig,
    max_depth: Option<usize>,
    min_ratio: Option<f64>,
    max_ratio: Option<f64>,
) -> Result<AnalysisPolicy, PolicyError> {
    AnalysisPolicy::checked(
        min_ratio.unwrap_or(base.min_salary_ratio),
        max_ratio.unwrap_or(base.max_salary_ratio),
        max_depth.unwrap_or(base.max_reporting_depth),
    )
}

pub(crate) fn split_load(load: EmployeeLoad) -> (OrgIndex, Vec<SkippedRow>) {
    let skipped = load.skipped.clone();
    (load.into_index(), skipped)
}

/// Run both analyses on their own threads; for synchronous callers only.
pub(crate) fn analyze_load(
    load: EmployeeLoad,
    policy: &AnalysisPolicy,
) -> (ComplianceReport, Vec<SkippedRow>) {
    let (index, skipped) = split_load(load);
    let report = ComplianceReport::generate_parallel(&index, policy);
    (report, skipped)
}

pub(crate) fn build_response(report: &ComplianceReport, skipped: Vec<SkippedRow>) -> OrgReportResponse {
    OrgReportResponse {
        generated_at: Utc::now(),
        summary: report.summary(),
        skipped_rows: skipped,
    }
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let ReportArgs {
        csv,
        max_depth,
        min_ratio,
        max_ratio,
        format,
    } = args;

    let policy = resolve_policy(config.analysis, max_depth, min_ratio, max_ratio)?;
    let load = EmployeeLoader::from_path(&csv)?;
    let (report, skipped) = analyze_load(load, &policy);

    let output = match format {
        OutputFormat::Text => render_text(&report, &skipped),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&build_response(&report, skipped))?;
            json.push('\n');
            json
        }
    };

    print!("{output}");
    Ok(())
}

pub(crate) fn render_text(report: &ComplianceReport, skipped: &[SkippedRow]) -> String {
    let mut out = String::new();

    let salary = report.salary_messages();
    if salary.is_empty() {
        out.push_str("Salary compliance: no findings\n");
    } else {
        out.push_str("Salary compliance\n");
        for message in &salary {
            out.push_str(&format!("- {message}\n"));
        }
    }

    let depth = report.depth_messages();
    if depth.is_empty() {
        out.push_str("\nReporting lines: no findings\n");
    } else {
        out.push_str("\nReporting lines\n");
        for message in &depth {
            out.push_str(&format!("- {message}\n"));
        }
    }

    if !skipped.is_empty() {
        out.push_str(&format!("\nSkipped rows ({})\n", skipped.len()));
        for row in skipped {
            out.push_str(&format!("- line {}: {}\n", row.line, row.reason));
        }
    }

    out
}
