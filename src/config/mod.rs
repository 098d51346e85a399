pub mod cli;
pub mod toml_config;

use crate::core::CapSet;
use crate::utils::error::{CpdError, Result};
use crate::utils::validation::validate_points;
use std::collections::HashMap;

#[cfg(feature = "cli")]
use crate::core::{ActivitySource, ConfigProvider};
#[cfg(feature = "cli")]
use crate::cpd::period::Period;
#[cfg(feature = "cli")]
use crate::cpd::status::StatusPolicy;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    self, validate_file_extension, validate_path, validate_range, validate_url,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "cpd-tracker")]
#[command(about = "Track continuing-education points against a reporting period")]
pub struct CliConfig {
    /// 本地活動檔（.csv 或 .json）
    #[arg(long, default_value = "activities.csv")]
    pub activities_file: String,

    /// 改從 HTTP 端點抓活動（回傳 JSON 陣列），設定後優先於本地檔
    #[arg(long)]
    pub api_endpoint: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "200")]
    pub required_points: f64,

    #[arg(long)]
    pub period_start: Option<i32>,

    #[arg(long)]
    pub period_end: Option<i32>,

    /// 類別上限，格式 Label=Points，可用逗號分隔多組
    #[arg(long, value_delimiter = ',')]
    pub cap: Vec<String>,

    #[arg(long, default_value = "missing", help = "Status policy: missing or progress")]
    pub policy: String,

    #[arg(long, help = "Bundle report files into a ZIP archive")]
    pub bundle: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

/// 解析 "Label=Points" 形式的上限設定
pub fn parse_cap_entries(entries: &[String]) -> Result<CapSet> {
    let mut caps = HashMap::new();
    for entry in entries {
        let (label, value) = entry.split_once('=').ok_or_else(|| {
            CpdError::InvalidConfigValueError {
                field: "cap".to_string(),
                value: entry.clone(),
                reason: "Expected Label=Points format".to_string(),
            }
        })?;
        let points: f64 =
            value
                .trim()
                .parse()
                .map_err(|_| CpdError::InvalidConfigValueError {
                    field: "cap".to_string(),
                    value: entry.clone(),
                    reason: "Points must be a number".to_string(),
                })?;
        validate_points("cap", points)?;
        caps.insert(label.trim().to_string(), points);
    }
    Ok(caps)
}

#[cfg(feature = "cli")]
impl validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("output_path", &self.output_path)?;
        validate_points("required_points", self.required_points)?;

        match &self.api_endpoint {
            Some(endpoint) => validate_url("api_endpoint", endpoint)?,
            None => {
                validate_file_extension("activities_file", &self.activities_file, &["csv", "json"])?
            }
        }

        if self.period_start.is_some() != self.period_end.is_some() {
            return Err(CpdError::ConfigValidationError {
                field: "period".to_string(),
                message: "Provide both --period-start and --period-end, or neither".to_string(),
            });
        }
        if let (Some(start), Some(end)) = (self.period_start, self.period_end) {
            validate_range("period_start", start, 1950, 2100)?;
            validate_range("period_end", end, 1950, 2100)?;
        }

        parse_cap_entries(&self.cap)?;

        self.policy
            .parse::<StatusPolicy>()
            .map_err(|reason| CpdError::InvalidConfigValueError {
                field: "policy".to_string(),
                value: self.policy.clone(),
                reason,
            })?;

        Ok(())
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn source(&self) -> ActivitySource {
        if let Some(endpoint) = &self.api_endpoint {
            return ActivitySource::Api {
                endpoint: endpoint.clone(),
                headers: HashMap::new(),
            };
        }
        if self.activities_file.ends_with(".json") {
            ActivitySource::JsonFile(self.activities_file.clone())
        } else {
            ActivitySource::CsvFile(self.activities_file.clone())
        }
    }

    fn required_points(&self) -> f64 {
        self.required_points
    }

    fn period(&self) -> Option<Period> {
        match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => Some(Period::normalized(start, end)),
            _ => None,
        }
    }

    fn caps(&self) -> CapSet {
        // validate() 應已擋下格式錯誤，仍可能被跳過，壞掉的設定不可無聲消失
        match parse_cap_entries(&self.cap) {
            Ok(caps) => caps,
            Err(e) => {
                tracing::warn!("Ignoring malformed cap entries: {}", e);
                CapSet::new()
            }
        }
    }

    fn status_policy(&self) -> StatusPolicy {
        self.policy.parse().unwrap_or(StatusPolicy::MissingBased)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn bundle_reports(&self) -> bool {
        self.bundle
    }
}
