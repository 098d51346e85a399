use crate::core::{ActivitySource, CapSet, ConfigProvider};
use crate::cpd::period::Period;
use crate::cpd::status::StatusPolicy;
use crate::utils::error::{CpdError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub profile: ProfileConfig,
    pub source: SourceConfig,
    pub rules: Option<RulesConfig>,
    pub report: ReportConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub name: Option<String>,
    pub required_points: f64,
    pub period_start: Option<i32>,
    pub period_end: Option<i32>,
    pub status_policy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: String,
    pub endpoint: Option<String>,
    pub path: Option<String>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    pub category_caps: Option<HashMap<String, f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_path: String,
    pub bundle: Option<BundleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CpdError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CpdError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_KEY})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_points(
            "profile.required_points",
            self.profile.required_points,
        )?;

        if self.profile.period_start.is_some() != self.profile.period_end.is_some() {
            return Err(CpdError::ConfigValidationError {
                field: "profile".to_string(),
                message: "Provide both period_start and period_end, or neither".to_string(),
            });
        }
        if let (Some(start), Some(end)) = (self.profile.period_start, self.profile.period_end) {
            crate::utils::validation::validate_range("profile.period_start", start, 1950, 2100)?;
            crate::utils::validation::validate_range("profile.period_end", end, 1950, 2100)?;
        }

        if let Some(policy) = &self.profile.status_policy {
            policy
                .parse::<StatusPolicy>()
                .map_err(|reason| CpdError::InvalidConfigValueError {
                    field: "profile.status_policy".to_string(),
                    value: policy.clone(),
                    reason,
                })?;
        }

        match self.source.r#type.as_str() {
            "api" => {
                let endpoint = crate::utils::validation::validate_required_field(
                    "source.endpoint",
                    &self.source.endpoint,
                )?;
                crate::utils::validation::validate_url("source.endpoint", endpoint)?;
            }
            "csv" | "json" => {
                let path = crate::utils::validation::validate_required_field(
                    "source.path",
                    &self.source.path,
                )?;
                crate::utils::validation::validate_path("source.path", path)?;
            }
            other => {
                return Err(CpdError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Supported source types: api, csv, json".to_string(),
                });
            }
        }

        crate::utils::validation::validate_path("report.output_path", &self.report.output_path)?;

        if let Some(rules) = &self.rules {
            if let Some(caps) = &rules.category_caps {
                for (label, points) in caps {
                    crate::utils::validation::validate_non_empty_string(
                        "rules.category_caps",
                        label,
                    )?;
                    crate::utils::validation::validate_points("rules.category_caps", *points)?;
                }
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn source(&self) -> ActivitySource {
        match self.source.r#type.as_str() {
            "api" => ActivitySource::Api {
                endpoint: self.source.endpoint.clone().unwrap_or_default(),
                headers: self.source.headers.clone().unwrap_or_default(),
            },
            "json" => ActivitySource::JsonFile(self.source.path.clone().unwrap_or_default()),
            _ => ActivitySource::CsvFile(self.source.path.clone().unwrap_or_default()),
        }
    }

    fn required_points(&self) -> f64 {
        self.profile.required_points
    }

    fn period(&self) -> Option<Period> {
        match (self.profile.period_start, self.profile.period_end) {
            (Some(start), Some(end)) => Some(Period::normalized(start, end)),
            _ => None,
        }
    }

    fn caps(&self) -> CapSet {
        self.rules
            .as_ref()
            .and_then(|r| r.category_caps.clone())
            .unwrap_or_default()
    }

    fn status_policy(&self) -> StatusPolicy {
        self.profile
            .status_policy
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or(StatusPolicy::MissingBased)
    }

    fn output_path(&self) -> &str {
        &self.report.output_path
    }

    fn bundle_reports(&self) -> bool {
        self.report
            .bundle
            .as_ref()
            .map(|b| b.enabled)
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[profile]
name = "Lekarz - okres 2023-2026"
required_points = 200
period_start = 2023
period_end = 2026

[source]
type = "csv"
path = "activities.csv"

[rules.category_caps]
"Samokształcenie" = 20

[report]
output_path = "./reports"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.profile.required_points, 200.0);
        assert_eq!(config.period(), Some(Period::normalized(2023, 2026)));
        assert_eq!(config.caps().get("Samokształcenie"), Some(&20.0));
        assert_eq!(config.status_policy(), StatusPolicy::MissingBased);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_CPD_ENDPOINT", "https://cpd.example.com/activities");

        let toml_content = r#"
[profile]
required_points = 200

[source]
type = "api"
endpoint = "${TEST_CPD_ENDPOINT}"

[report]
output_path = "./reports"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.source.endpoint.as_deref(),
            Some("https://cpd.example.com/activities")
        );

        std::env::remove_var("TEST_CPD_ENDPOINT");
    }

    #[test]
    fn test_config_validation_rejects_bad_endpoint() {
        let toml_content = r#"
[profile]
required_points = 200

[source]
type = "api"
endpoint = "not-a-url"

[report]
output_path = "./reports"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_unknown_source_type() {
        let toml_content = r#"
[profile]
required_points = 200

[source]
type = "postgres"
path = "activities.csv"

[report]
output_path = "./reports"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_progress_policy_is_selectable() {
        let toml_content = r#"
[profile]
required_points = 200
status_policy = "progress"

[source]
type = "json"
path = "activities.json"

[report]
output_path = "./reports"

[report.bundle]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.status_policy(), StatusPolicy::ProgressBased);
        assert!(config.bundle_reports());
        assert_eq!(
            config.source(),
            ActivitySource::JsonFile("activities.json".to_string())
        );
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[profile]
name = "file-test"
required_points = 100

[source]
type = "csv"
path = "activities.csv"

[report]
output_path = "./reports"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.profile.name.as_deref(), Some("file-test"));
        assert_eq!(config.profile.required_points, 100.0);
    }
}
