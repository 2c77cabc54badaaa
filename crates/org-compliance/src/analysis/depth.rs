use super::policy::AnalysisPolicy;
use crate::org::{Employee, EmployeeId, OrgIndex};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// How a walk up the reporting line stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainEnd {
    /// Reached a record without a manager.
    Root,
    /// The next manager id has no record in the index.
    Dangling { missing: EmployeeId },
    /// The next manager id was already visited during this walk.
    Cycle { repeated: EmployeeId },
}

impl ChainEnd {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::Dangling { .. } => "Dangling manager",
            Self::Cycle { .. } => "Cycle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainWalk {
    /// Manager hops taken before the walk stopped.
    pub depth: usize,
    pub end: ChainEnd,
}

/// Count manager hops from `employee` to the top of the known hierarchy.
///
/// Every terminal state yields a depth: the root ends the walk normally, an
/// unknown manager truncates it, and a repeated id aborts it with the hops
/// counted before the repeat. The visited set is checked before each hop, so an
/// employee managing themselves has depth 0. Every hop lands on a distinct record
/// of the index, so a walk never takes more than `index.len()` hops.
pub fn walk_reporting_line(index: &OrgIndex, employee: &Employee) -> ChainWalk {
    let mut visited = HashSet::from([employee.id]);
    let mut current = employee;
    let mut depth = 0;

    loop {
        let Some(manager_id) = current.manager_id else {
            return ChainWalk {
                depth,
                end: ChainEnd::Root,
            };
        };

        if visited.contains(&manager_id) {
            warn!(
                employee_id = %employee.id,
                repeated = %manager_id,
                depth,
                "circular reporting line detected, stopping walk"
            );
            return ChainWalk {
                depth,
                end: ChainEnd::Cycle {
                    repeated: manager_id,
                },
            };
        }

        let Some(manager) = index.lookup(manager_id) else {
            debug!(
                employee_id = %employee.id,
                missing = %manager_id,
                depth,
                "manager not found, reporting line ends here"
            );
            return ChainWalk {
                depth,
                end: ChainEnd::Dangling {
                    missing: manager_id,
                },
            };
        };

        visited.insert(manager_id);
        current = manager;
        depth += 1;
    }
}

/// An employee with more managers above them than the policy allows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthFinding {
    pub employee_id: EmployeeId,
    pub name: String,
    pub depth: usize,
    pub excess: usize,
    pub end: ChainEnd,
}

impl fmt::Display for DepthFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} has a reporting line which is too long by {} levels",
            self.name, self.excess
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportingDepthAnalyzer {
    policy: AnalysisPolicy,
}

impl ReportingDepthAnalyzer {
    pub fn new(policy: AnalysisPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AnalysisPolicy {
        &self.policy
    }

    /// Depth of the record stored under `id`, if there is one.
    pub fn depth_of(&self, index: &OrgIndex, id: EmployeeId) -> Option<ChainWalk> {
        index
            .lookup(id)
            .map(|employee| walk_reporting_line(index, employee))
    }

    /// Findings for every non-root employee whose line is too long, in ascending id order.
    pub fn analyze(&self, index: &OrgIndex) -> Vec<DepthFinding> {
        let max_depth = self.policy.max_reporting_depth();

        index
            .employees()
            .filter(|employee| !employee.is_root())
            .filter_map(|employee| {
                let walk = walk_reporting_line(index, employee);
                (walk.depth > max_depth).then(|| DepthFinding {
                    employee_id: employee.id,
                    name: employee.full_name(),
                    depth: walk.depth,
                    excess: walk.depth - max_depth,
                    end: walk.end,
                })
            })
            .collect()
    }
}
