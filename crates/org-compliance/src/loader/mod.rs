mod parser;

use crate::org::{Employee, OrgIndex};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Failures that abort a load before any analysis can run.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read employee file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid employee CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("employee file is empty")]
    Empty,
    #[error("employee file header is missing the '{column}' column")]
    MissingColumn { column: &'static str },
}

/// A data row that was left out of the load, with the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default, Clone)]
pub struct EmployeeLoad {
    pub employees: Vec<Employee>,
    pub skipped: Vec<SkippedRow>,
}

impl EmployeeLoad {
    pub fn into_index(self) -> OrgIndex {
        OrgIndex::from_records(self.employees)
    }
}

pub struct EmployeeLoader;

impl EmployeeLoader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<EmployeeLoad, LoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read a header line naming `Id, firstName, lastName, salary, managerId` in
    /// any order, followed by one employee per line.
    ///
    /// Rows that fail to parse are logged and collected in
    /// [`EmployeeLoad::skipped`]; only I/O failures, empty input and missing
    /// columns abort the load.
    pub fn from_reader<R: Read>(reader: R) -> Result<EmployeeLoad, LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.is_empty() {
            return Err(LoadError::Empty);
        }
        if let Some(column) = parser::missing_columns(&headers).first().copied() {
            return Err(LoadError::MissingColumn { column });
        }

        let mut load = EmployeeLoad::default();

        for result in csv_reader.records() {
            let outcome = match result {
                Ok(record) => {
                    let line = record.position().map(|pos| pos.line()).unwrap_or_default();
                    parser::parse_row(&record, &headers).map_err(|err| (line, err.to_string()))
                }
                Err(err) if err.is_io_error() => return Err(LoadError::Csv(err)),
                Err(err) => {
                    let line = err.position().map(|pos| pos.line()).unwrap_or_default();
                    Err((line, format!("malformed row: {err}")))
                }
            };

            match outcome {
                Ok(employee) => load.employees.push(employee),
                Err((line, reason)) => {
                    warn!(line, %reason, "skipping employee row");
                    load.skipped.push(SkippedRow { line, reason });
                }
            }
        }

        info!(
            employees = load.employees.len(),
            skipped = load.skipped.len(),
            "employee data loaded"
        );

        Ok(load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org::EmployeeId;
    use std::io::Cursor;

    const SAMPLE: &str = "Id,firstName,lastName,salary,managerId\n\
123,Joe,Doe,60000,\n\
124,Martin,Chekov,45000,123\n\
125,Bob,Ronstad,47000,123\n\
300,Alice,Hasacat,50000,124\n\
305,Brett,Hardleaf,34000,300\n";

    #[test]
    fn loads_sample_file() {
        let load = EmployeeLoader::from_reader(Cursor::new(SAMPLE)).expect("load succeeds");
        assert_eq!(load.employees.len(), 5);
        assert!(load.skipped.is_empty());

        let index = load.into_index();
        assert_eq!(index.root().map(|root| root.id), Some(EmployeeId(123)));
        assert_eq!(index.subordinates_of(EmployeeId(123)).len(), 2);
    }

    #[test]
    fn tolerates_padded_headers_and_fields() {
        let csv = " salary , managerId ,Id, firstName , lastName\n 60000 , , 1 , Joe , Doe \n";
        let load = EmployeeLoader::from_reader(Cursor::new(csv)).expect("load succeeds");
        assert_eq!(load.employees, vec![Employee::new(1, "Joe", "Doe", 60_000.0, None)]);
    }

    #[test]
    fn skips_malformed_rows_and_keeps_going() {
        let csv = "Id,firstName,lastName,salary,managerId\n\
1,Joe,Doe,60000,\n\
x,Broken,Id,1000,1\n\
3,Short,Row\n\
4,Bad,Salary,lots,1\n\
5,Fine,Report,40000,1\n";
        let load = EmployeeLoader::from_reader(Cursor::new(csv)).expect("load succeeds");

        let ids: Vec<_> = load.employees.iter().map(|employee| employee.id.0).collect();
        assert_eq!(ids, vec![1, 5]);

        let lines: Vec<_> = load.skipped.iter().map(|row| row.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert_eq!(load.skipped[0].reason, "invalid employee id 'x'");
        assert!(load.skipped[1].reason.starts_with("malformed row"));
        assert_eq!(load.skipped[2].reason, "invalid salary 'lots'");
    }

    #[test]
    fn header_only_file_yields_no_employees() {
        let load = EmployeeLoader::from_reader(Cursor::new("Id,firstName,lastName,salary,managerId\n"))
            .expect("load succeeds");
        assert!(load.employees.is_empty());
        assert!(load.into_index().is_empty());
    }

    #[test]
    fn empty_input_is_fatal() {
        let error = EmployeeLoader::from_reader(Cursor::new("")).expect_err("empty input rejected");
        assert!(matches!(error, LoadError::Empty));
    }

    #[test]
    fn missing_column_is_fatal() {
        let error = EmployeeLoader::from_reader(Cursor::new("Id,firstName,lastName,salary\n1,A,B,5\n"))
            .expect_err("header rejected");
        match error {
            LoadError::MissingColumn { column } => assert_eq!(column, "managerId"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = EmployeeLoader::from_path("./does-not-exist.csv").expect_err("expected io error");
        match error {
            LoadError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
