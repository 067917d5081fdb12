//! Current schema version reporting.

use std::fmt;

use crate::error::{Result, SwitchbackError};
use crate::runner::{Runner, VersionMarker};

/// The schema version as seen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// A marker exists.
    At(VersionMarker),
    /// No migration has ever been applied (or the marker was cleared).
    NoneApplied,
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::At(VersionMarker {
                version,
                dirty: false,
            }) => write!(f, "Schema is at v{}.", version),
            SchemaVersion::At(VersionMarker {
                version,
                dirty: true,
            }) => write!(f, "Schema is at v{} (dirty).", version),
            SchemaVersion::NoneApplied => f.write_str("No migrations have been done yet."),
        }
    }
}

/// Ask the runner for its version marker.
///
/// The runner's "no version" signal becomes [`SchemaVersion::NoneApplied`];
/// any other error is returned to the caller.
pub fn current_version<M: Runner + ?Sized>(runner: &mut M) -> Result<SchemaVersion> {
    match runner.version() {
        Ok(marker) => Ok(SchemaVersion::At(marker)),
        Err(SwitchbackError::NilVersion) => Ok(SchemaVersion::NoneApplied),
        Err(e) => Err(e),
    }
}
