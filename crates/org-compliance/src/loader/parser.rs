use crate::org::{Employee, EmployeeId};
use csv::StringRecord;
use serde::{Deserialize, Deserializer};

pub(crate) const ID_COLUMN: &str = "Id";
pub(crate) const FIRST_NAME_COLUMN: &str = "firstName";
pub(crate) const LAST_NAME_COLUMN: &str = "lastName";
pub(crate) const SALARY_COLUMN: &str = "salary";
pub(crate) const MANAGER_ID_COLUMN: &str = "managerId";

pub(crate) const REQUIRED_COLUMNS: [&str; 5] = [
    ID_COLUMN,
    FIRST_NAME_COLUMN,
    LAST_NAME_COLUMN,
    SALARY_COLUMN,
    MANAGER_ID_COLUMN,
];

/// Why a single data row was left out of the load.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RowError {
    #[error("malformed row: {0}")]
    Malformed(#[from] csv::Error),
    #[error("invalid employee id '{0}'")]
    InvalidId(String),
    #[error("invalid salary '{0}'")]
    InvalidSalary(String),
    #[error("salary must be a non-negative amount, found {0}")]
    NegativeSalary(f64),
    #[error("invalid manager id '{0}'")]
    InvalidManagerId(String),
}

#[derive(Debug, Deserialize)]
struct EmployeeRow {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "firstName")]
    first_name: String,
    #[serde(rename = "lastName")]
    last_name: String,
    #[serde(rename = "salary")]
    salary: String,
    #[serde(rename = "managerId", deserialize_with = "empty_string_as_none")]
    manager_id: Option<String>,
}

impl EmployeeRow {
    fn into_employee(self) -> Result<Employee, RowError> {
        let id = self
            .id
            .parse::<i64>()
            .map_err(|_| RowError::InvalidId(self.id.clone()))?;

        let salary = self
            .salary
            .parse::<f64>()
            .ok()
            .filter(|salary| salary.is_finite())
            .ok_or_else(|| RowError::InvalidSalary(self.salary.clone()))?;
        if salary < 0.0 {
            return Err(RowError::NegativeSalary(salary));
        }

        let manager_id = self
            .manager_id
            .map(|raw| {
                raw.parse::<i64>()
                    .map(EmployeeId)
                    .map_err(|_| RowError::InvalidManagerId(raw))
            })
            .transpose()?;

        Ok(Employee {
            id: EmployeeId(id),
            first_name: self.first_name,
            last_name: self.last_name,
            salary,
            manager_id,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Columns from `REQUIRED_COLUMNS` absent from the header row.
pub(crate) fn missing_columns(headers: &StringRecord) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .into_iter()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect()
}

/// Convert one data row, resolving columns by header name.
pub(crate) fn parse_row(record: &StringRecord, headers: &StringRecord) -> Result<Employee, RowError> {
    let row: EmployeeRow = record.deserialize(Some(headers))?;
    row.into_employee()
}
