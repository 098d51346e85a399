pub mod config;
pub mod core;
pub mod cpd;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use core::{engine::TrackerEngine, pipeline::ReportPipeline};
pub use cpd::{apply_rules, calc_missing, calc_progress, Period, StatusPolicy};
pub use domain::model::{Activity, AppliedActivity, CapSet, ComplianceSummary};
pub use utils::error::{CpdError, Result};
