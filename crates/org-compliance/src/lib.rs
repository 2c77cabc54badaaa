//! Organization chart compliance checks.
//!
//! Employee records are loaded into an [`org::OrgIndex`], which the salary and
//! reporting-line analyzers in [`analysis`] read to produce findings.

pub mod analysis;
pub mod config;
pub mod error;
pub mod loader;
pub mod org;
pub mod telemetry;
