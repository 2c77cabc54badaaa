mod depth;
mod policy;
mod salary;

pub use depth::{walk_reporting_line, ChainEnd, ChainWalk, DepthFinding, ReportingDepthAnalyzer};
pub use policy::{
    AnalysisPolicy, PolicyError, DEFAULT_MAX_REPORTING_DEPTH, DEFAULT_MAX_SALARY_RATIO,
    DEFAULT_MIN_SALARY_RATIO,
};
pub use salary::{PayDeviation, SalaryComplianceAnalyzer, SalaryFinding};

use crate::org::OrgIndex;
use serde::Serialize;
use std::thread;
use tracing::info;

/// Results of both analyses over one organization snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceReport {
    pub policy: AnalysisPolicy,
    pub employee_count: usize,
    pub salary_findings: Vec<SalaryFinding>,
    pub depth_findings: Vec<DepthFinding>,
}

impl ComplianceReport {
    pub fn generate(index: &OrgIndex, policy: &AnalysisPolicy) -> Self {
        let salary_findings = SalaryComplianceAnalyzer::new(*policy).analyze(index);
        let depth_findings = ReportingDepthAnalyzer::new(*policy).analyze(index);
        Self::assemble(index, policy, salary_findings, depth_findings)
    }

    /// Same result as [`ComplianceReport::generate`], with each analysis on its own thread.
    pub fn generate_parallel(index: &OrgIndex, policy: &AnalysisPolicy) -> Self {
        let (salary_findings, depth_findings) = thread::scope(|scope| {
            let salary = scope.spawn(|| SalaryComplianceAnalyzer::new(*policy).analyze(index));
            let depth = ReportingDepthAnalyzer::new(*policy).analyze(index);
            let salary = match salary.join() {
                Ok(findings) => findings,
                Err(panic) => std::panic::resume_unwind(panic),
            };
            (salary, depth)
        });
        Self::assemble(index, policy, salary_findings, depth_findings)
    }

    fn assemble(
        index: &OrgIndex,
        policy: &AnalysisPolicy,
        salary_findings: Vec<SalaryFinding>,
        depth_findings: Vec<DepthFinding>,
    ) -> Self {
        info!(
            employees = index.len(),
            salary_findings = salary_findings.len(),
            depth_findings = depth_findings.len(),
            "compliance analysis complete"
        );

        Self {
            policy: *policy,
            employee_count: index.len(),
            salary_findings,
            depth_findings,
        }
    }

    pub fn salary_messages(&self) -> Vec<String> {
        self.salary_findings.iter().map(ToString::to_string).collect()
    }

    pub fn depth_messages(&self) -> Vec<String> {
        self.depth_findings.iter().map(ToString::to_string).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.salary_findings.is_empty() && self.depth_findings.is_empty()
    }

    pub fn summary(&self) -> ComplianceReportSummary {
        let salary_findings = self
            .salary_findings
            .iter()
            .map(|finding| SalaryFindingView {
                employee_id: finding.employee_id.0,
                name: finding.name.clone(),
                kind: finding.kind,
                kind_label: finding.kind.label(),
                magnitude: finding.rounded_magnitude(),
                subordinate_average: salary::round_to_cents(finding.subordinate_average),
                message: finding.to_string(),
            })
            .collect();

        let depth_findings = self
            .depth_findings
            .iter()
            .map(|finding| DepthFindingView {
                employee_id: finding.employee_id.0,
                name: finding.name.clone(),
                depth: finding.depth,
                excess: finding.excess,
                chain_end: finding.end,
                chain_end_label: finding.end.label(),
                message: finding.to_string(),
            })
            .collect();

        ComplianceReportSummary {
            employee_count: self.employee_count,
            min_salary_ratio: self.policy.min_salary_ratio(),
            max_salary_ratio: self.policy.max_salary_ratio(),
            max_reporting_depth: self.policy.max_reporting_depth(),
            salary_findings,
            depth_findings,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SalaryFindingView {
    pub employee_id: i64,
    pub name: String,
    pub kind: PayDeviation,
    pub kind_label: &'static str,
    pub magnitude: f64,
    pub subordinate_average: f64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepthFindingView {
    pub employee_id: i64,
    pub name: String,
    pub depth: usize,
    pub excess: usize,
    pub chain_end: ChainEnd,
    pub chain_end_label: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReportSummary {
    pub employee_count: usize,
    pub min_salary_ratio: f64,
    pub max_salary_ratio: f64,
    pub max_reporting_depth: usize,
    pub salary_findings: Vec<SalaryFindingView>,
    pub depth_findings: Vec<DepthFindingView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org::Employee;

    fn sample_index() -> OrgIndex {
        OrgIndex::from_records([
            Employee::new(123, "Joe", "Doe", 60_000.0, None),
            Employee::new(124, "Martin", "Chekov", 45_000.0, Some(123)),
            Employee::new(125, "Bob", "Ronstad", 47_000.0, Some(123)),
            Employee::new(300, "Alice", "Hasacat", 50_000.0, Some(124)),
            Employee::new(305, "Brett", "Hardleaf", 42_500.0, Some(300)),
        ])
    }

    #[test]
    fn report_collects_both_finding_lists() {
        let report = ComplianceReport::generate(&sample_index(), &AnalysisPolicy::default());

        assert_eq!(report.employee_count, 5);
        assert_eq!(
            report.salary_messages(),
            vec![
                "Martin Chekov earns less than they should by 15000.00".to_string(),
                "Alice Hasacat earns less than they should by 1000.00".to_string(),
            ]
        );
        assert!(report.depth_messages().is_empty());
        assert!(!report.is_clean());
    }

    #[test]
    fn parallel_generation_matches_sequential() {
        let index = sample_index();
        let policy = AnalysisPolicy::default().with_max_reporting_depth(1);
        let sequential = ComplianceReport::generate(&index, &policy);
        let parallel = ComplianceReport::generate_parallel(&index, &policy);

        assert_eq!(sequential, parallel);
        assert_eq!(
            parallel.depth_messages(),
            vec![
                "Alice Hasacat has a reporting line which is too long by 1 levels".to_string(),
                "Brett Hardleaf has a reporting line which is too long by 2 levels".to_string(),
            ]
        );
    }

    #[test]
    fn repeated_runs_are_identical() {
        let index = sample_index();
        let policy = AnalysisPolicy::default();
        let first = ComplianceReport::generate(&index, &policy);
        let second = ComplianceReport::generate(&index, &policy);
        assert_eq!(first.salary_messages(), second.salary_messages());
        assert_eq!(first.depth_messages(), second.depth_messages());
    }

    #[test]
    fn summary_serializes_findings() {
        let report = ComplianceReport::generate(&sample_index(), &AnalysisPolicy::default());
        let summary = report.summary();
        assert_eq!(summary.salary_findings.len(), 2);
        assert_eq!(summary.salary_findings[0].kind_label, "Underpaid");
        assert_eq!(summary.salary_findings[0].magnitude, 15_000.0);

        let json = serde_json::to_value(&summary).expect("summary serializes");
        assert_eq!(json["max_reporting_depth"], 4);
        assert_eq!(json["salary_findings"][0]["kind"], "underpaid");
        assert_eq!(json["salary_findings"][1]["employee_id"], 300);
    }
}
