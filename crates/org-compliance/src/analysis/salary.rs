use super::policy::AnalysisPolicy;
use crate::org::{Employee, EmployeeId, OrgIndex};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayDeviation {
    Underpaid,
    Overpaid,
}

impl PayDeviation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Underpaid => "Underpaid",
            Self::Overpaid => "Overpaid",
        }
    }

    const fn phrase(self) -> &'static str {
        match self {
            Self::Underpaid => "earns less than they should by",
            Self::Overpaid => "earns more than they should by",
        }
    }
}

/// A manager whose salary falls outside the band around their reports' average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryFinding {
    pub employee_id: EmployeeId,
    pub name: String,
    pub kind: PayDeviation,
    /// Distance to the nearest band edge, unrounded.
    pub magnitude: f64,
    pub subordinate_average: f64,
}

impl SalaryFinding {
    /// Magnitude rounded to cents, half away from zero.
    pub fn rounded_magnitude(&self) -> f64 {
        round_to_cents(self.magnitude)
    }
}

impl fmt::Display for SalaryFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:.2}",
            self.name,
            self.kind.phrase(),
            self.rounded_magnitude()
        )
    }
}

/// `{:.2}` alone rounds exact ties to even, so scale and round explicitly first.
pub(crate) fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Default)]
pub struct SalaryComplianceAnalyzer {
    policy: AnalysisPolicy,
}

impl SalaryComplianceAnalyzer {
    pub fn new(policy: AnalysisPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AnalysisPolicy {
        &self.policy
    }

    /// Findings for every manager outside the band, in ascending manager id order.
    pub fn analyze(&self, index: &OrgIndex) -> Vec<SalaryFinding> {
        index
            .managers()
            .filter_map(|manager| self.evaluate(manager, index.subordinates_of(manager.id)))
            .collect()
    }

    pub fn evaluate(&self, manager: &Employee, subordinates: &[Employee]) -> Option<SalaryFinding> {
        if subordinates.is_empty() {
            return None;
        }

        let total: f64 = subordinates.iter().map(|subordinate| subordinate.salary).sum();
        let average = total / subordinates.len() as f64;
        let low = self.policy.min_salary_ratio() * average;
        let high = self.policy.max_salary_ratio() * average;

        let (kind, magnitude) = if manager.salary < low {
            (PayDeviation::Underpaid, low - manager.salary)
        } else if manager.salary > high {
            (PayDeviation::Overpaid, manager.salary - high)
        } else {
            return None;
        };

        Some(SalaryFinding {
            employee_id: manager.id,
            name: manager.full_name(),
            kind,
            magnitude,
            subordinate_average: average,
        })
    }
}
