//! In-memory runner used by unit tests in place of a database.

use crate::error::{Result, SwitchbackError};
use crate::runner::{Runner, VersionMarker};

/// Records every call and simulates an engine whose newest migration is `latest`.
#[derive(Debug, Default)]
pub(crate) struct RecordingRunner {
    /// Highest known migration version; `up` moves the marker here.
    pub latest: i64,
    /// Current marker, `None` when nothing has been applied.
    pub current: Option<i64>,
    pub dirty: bool,
    /// Calls in order, e.g. `["Force(0)", "Drop"]`.
    pub calls: Vec<String>,
    /// When set, the named call fails with a database error instead of running.
    pub fail_on: Option<&'static str>,
}

impl RecordingRunner {
    pub fn with_versions(latest: i64, current: Option<i64>) -> Self {
        Self {
            latest,
            current,
            ..Default::default()
        }
    }

    fn record(&mut self, call: String) -> Result<()> {
        let name = call.split('(').next().unwrap_or_default().to_string();
        self.calls.push(call);
        if self.fail_on == Some(name.as_str()) {
            return Err(SwitchbackError::DatabaseError(sqlx::Error::Protocol(
                format!("{} failed", name),
            )));
        }
        Ok(())
    }
}

impl Runner for RecordingRunner {
    fn up(&mut self) -> Result<()> {
        self.record("Up".to_string())?;
        if self.current == Some(self.latest) {
            return Err(SwitchbackError::NoChange);
        }
        self.current = Some(self.latest);
        Ok(())
    }

    fn down(&mut self) -> Result<()> {
        self.record("Down".to_string())?;
        if self.current.is_none() {
            return Err(SwitchbackError::NoChange);
        }
        self.current = None;
        Ok(())
    }

    fn drop_all(&mut self) -> Result<()> {
        self.record("Drop".to_string())?;
        self.current = None;
        self.dirty = false;
        Ok(())
    }

    fn force(&mut self, version: i64) -> Result<()> {
        self.record(format!("Force({})", version))?;
        self.current = (version > 0).then_some(version);
        self.dirty = false;
        Ok(())
    }

    fn version(&mut self) -> Result<VersionMarker> {
        self.record("Version".to_string())?;
        self.current
            .map(|version| VersionMarker {
                version,
                dirty: self.dirty,
            })
            .ok_or(SwitchbackError::NilVersion)
    }

    fn close(&mut self) -> Result<()> {
        self.record("Close".to_string())
    }
}
