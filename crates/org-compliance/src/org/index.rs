use super::record::{Employee, EmployeeId};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Lookup structures derived from a set of employee records.
///
/// Records are kept in ascending id order so both analyzers emit findings in a
/// stable order. The subordinate groups are keyed by manager id and may exist
/// for managers that never appear as records themselves.
#[derive(Debug, Default, Clone)]
pub struct OrgIndex {
    employees: BTreeMap<EmployeeId, Employee>,
    subordinates: HashMap<EmployeeId, Vec<Employee>>,
    root: Option<EmployeeId>,
}

impl OrgIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Employee>,
    {
        records.into_iter().collect()
    }

    /// Insert a record, replacing any earlier record that carries the same id.
    ///
    /// A replaced record is detached from its previous manager group first so the
    /// groups always mirror the `manager_id` values of the records currently held.
    /// A record without a manager becomes the root; when several do, the last one
    /// inserted wins.
    pub fn add_employee(&mut self, employee: Employee) {
        if let Some(previous) = self.employees.remove(&employee.id) {
            warn!(
                employee_id = %employee.id,
                "duplicate employee id, replacing earlier record"
            );
            self.detach(&previous);
        }

        match employee.manager_id {
            Some(manager_id) => self
                .subordinates
                .entry(manager_id)
                .or_default()
                .push(employee.clone()),
            None => {
                if let Some(current) = self.root.filter(|root| *root != employee.id) {
                    warn!(
                        previous_root = %current,
                        new_root = %employee.id,
                        "multiple employees without a manager, keeping the latest as root"
                    );
                }
                self.root = Some(employee.id);
            }
        }

        self.employees.insert(employee.id, employee);
    }

    fn detach(&mut self, previous: &Employee) {
        match previous.manager_id {
            Some(manager_id) => {
                if let Some(group) = self.subordinates.get_mut(&manager_id) {
                    group.retain(|subordinate| subordinate.id != previous.id);
                    if group.is_empty() {
                        self.subordinates.remove(&manager_id);
                    }
                }
            }
            None => {
                if self.root == Some(previous.id) {
                    self.root = None;
                }
            }
        }
    }

    /// Direct reports of `manager_id` in insertion order; empty when there are none.
    pub fn subordinates_of(&self, manager_id: EmployeeId) -> &[Employee] {
        self.subordinates
            .get(&manager_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn lookup(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.get(&id)
    }

    pub fn root(&self) -> Option<&Employee> {
        self.root.and_then(|id| self.employees.get(&id))
    }

    /// All records in ascending id order.
    pub fn employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values()
    }

    /// Records with at least one direct report, in ascending id order.
    pub fn managers(&self) -> impl Iterator<Item = &Employee> {
        self.employees
            .values()
            .filter(move |employee| !self.subordinates_of(employee.id).is_empty())
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

impl FromIterator<Employee> for OrgIndex {
    fn from_iter<T: IntoIterator<Item = Employee>>(iter: T) -> Self {
        let mut index = OrgIndex::new();
        index.extend(iter);
        index
    }
}

impl Extend<Employee> for OrgIndex {
    fn extend<T: IntoIterator<Item = Employee>>(&mut self, iter: T) {
        for employee in iter {
            self.add_employee(employee);
        }
    }
}
