//! The narrow runner interface the dispatcher drives.

/// The version marker recorded by the migration engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionMarker {
    /// Version of the last (or forced) migration.
    pub version: i64,
    /// Whether that migration failed part-way and left the schema dirty.
    pub dirty: bool,
}

/// Operations a migration engine exposes to the console.
///
/// `up` and `down` report [`SwitchbackError::NoChange`] when there is nothing
/// to do in that direction, and `version` reports
/// [`SwitchbackError::NilVersion`] when no marker exists. Every other error is
/// passed through untouched.
///
/// [`SwitchbackError::NoChange`]: crate::error::SwitchbackError::NoChange
/// [`SwitchbackError::NilVersion`]: crate::error::SwitchbackError::NilVersion
pub trait Runner {
    /// Apply every pending migration.
    fn up(&mut self) -> crate::Result<()>;

    /// Revert every applied migration.
    fn down(&mut self) -> crate::Result<()>;

    /// Drop every object in the managed schema.
    fn drop_all(&mut self) -> crate::Result<()>;

    /// Set the version marker without running any migration, clearing dirty state.
    fn force(&mut self, version: i64) -> crate::Result<()>;

    /// Current version marker.
    fn version(&mut self) -> crate::Result<VersionMarker>;

    /// Release the connection. Safe to call more than once.
    fn close(&mut self) -> crate::Result<()>;
}
