use crate::cpd::period::Period;
use crate::cpd::status::{ComplianceStatus, StatusPolicy};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 一筆進修活動，欄位在 I/O 邊界完成驗證與轉型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub title: String,
    pub category: String,
    pub points: f64,
    pub year: Option<i32>,
    pub date: Option<NaiveDate>,
}

impl Activity {
    /// 活動年份：優先使用 year 欄位，否則從活動日期推導
    pub fn effective_year(&self) -> Option<i32> {
        self.year.or_else(|| self.date.map(|d| d.year()))
    }
}

/// 規則引擎的輸出：原活動加上套用結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedActivity {
    #[serde(flatten)]
    pub activity: Activity,
    pub in_period: bool,
    pub applied_points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// 類別標籤 → 每年點數上限
pub type CapSet = HashMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub total_points: f64,
    pub required_points: f64,
    pub missing_points: f64,
    pub progress_percent: f64,
    pub status: ComplianceStatus,
    pub policy: StatusPolicy,
}

/// evaluate 階段的完整結果，交給 report 階段輸出
#[derive(Debug, Clone)]
pub struct ReportResult {
    pub applied: Vec<AppliedActivity>,
    pub summary: ComplianceSummary,
    pub csv_output: String,
}

/// 活動資料的來源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivitySource {
    Api {
        endpoint: String,
        headers: HashMap<String, String>,
    },
    CsvFile(String),
    JsonFile(String),
}

impl ActivitySource {
    pub fn describe(&self) -> String {
        match self {
            ActivitySource::Api { endpoint, .. } => format!("API endpoint {}", endpoint),
            ActivitySource::CsvFile(path) => format!("CSV file {}", path),
            ActivitySource::JsonFile(path) => format!("JSON file {}", path),
        }
    }
}
