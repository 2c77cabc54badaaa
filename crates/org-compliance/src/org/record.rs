use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of an employee record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EmployeeId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A single row of the organization chart.
///
/// `manager_id` is `None` only for the organizational root. A present id is not
/// guaranteed to resolve; the analyzers treat an unknown manager as the end of
/// the reporting line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub salary: f64,
    pub manager_id: Option<EmployeeId>,
}

impl Employee {
    pub fn new(
        id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        salary: f64,
        manager_id: Option<i64>,
    ) -> Self {
        Self {
            id: EmployeeId(id),
            first_name: first_name.into(),
            last_name: last_name.into(),
            salary,
            manager_id: manager_id.map(EmployeeId),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_root(&self) -> bool {
        self.manager_id.is_none()
    }
}
