pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::Settings;
pub use crate::core::{Aggregator, ReportFormat, Reporter};
pub use crate::domain::model::{Domain, Report, ReportRow, ResolutionResult, SourceKind};
pub use crate::utils::error::{EnumError, Result};
