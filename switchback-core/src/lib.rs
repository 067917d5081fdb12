//! Decision layer for an interactive PostgreSQL migration console.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use switchback_core::config::{CliOverrides, SwitchbackConfig};
//! use switchback_core::{current_version, execute_option, MenuOption, PostgresRunner, Runner};
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SwitchbackConfig::load(None, &CliOverrides::default())?;
//! let mut runner = PostgresRunner::open(&config)?;
//! let outcome = execute_option(&mut std::io::empty(), &mut runner, MenuOption::Up)?;
//! println!("{}", outcome);
//! println!("{}", current_version(&mut runner)?);
//! runner.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`runner`] — The narrow [`Runner`] trait the dispatcher drives
//! - [`postgres`] — [`Runner`] adapter over `sqlx::migrate`
//! - [`option`] — The six menu options
//! - [`dispatch`] — Option → runner operation, no-op normalization
//! - [`version`] — Current version reporting
//! - [`config`] — Configuration loading (TOML, env vars, CLI overrides)
//! - [`db`] — Connection retries and identifier quoting
//! - [`error`] — Error types

pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod option;
pub mod postgres;
pub mod runner;
pub mod version;

#[cfg(test)]
mod testing;

pub use dispatch::{execute_option, Outcome, FORCE_PROMPT};
pub use error::{Result, SwitchbackError};
pub use option::MenuOption;
pub use postgres::PostgresRunner;
pub use runner::{Runner, VersionMarker};
pub use version::{current_version, SchemaVersion};
