mod index;
mod record;

pub use index::OrgIndex;
pub use record::{Employee, EmployeeId};
