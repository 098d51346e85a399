use serde::{Deserialize, Serialize};

/// 合規狀態標籤，兩種政策共用同一組標籤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Met,
    Warn,
    Risk,
}

impl ComplianceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ComplianceStatus::Met => "met",
            ComplianceStatus::Warn => "warn",
            ComplianceStatus::Risk => "risk",
        }
    }
}

/// 兩種獨立的狀態判定政策。上游來源就有兩套互不一致的門檻，
/// 這裡明確保留兩者而不是硬併成一套。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    MissingBased,
    ProgressBased,
}

impl StatusPolicy {
    pub fn classify(&self, missing: f64, progress: f64) -> ComplianceStatus {
        match self {
            StatusPolicy::MissingBased => classify_by_missing(missing),
            StatusPolicy::ProgressBased => classify_by_progress(missing, progress),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StatusPolicy::MissingBased => "missing_based",
            StatusPolicy::ProgressBased => "progress_based",
        }
    }
}

impl std::str::FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "missing" | "missing-based" | "missing_based" => Ok(StatusPolicy::MissingBased),
            "progress" | "progress-based" | "progress_based" => Ok(StatusPolicy::ProgressBased),
            other => Err(format!(
                "Unknown status policy: {} (expected 'missing' or 'progress')",
                other
            )),
        }
    }
}

/// 以缺少點數為準的門檻：<= 0 達標，<= 20 提醒，其餘高風險
pub fn classify_by_missing(missing: f64) -> ComplianceStatus {
    if missing <= 0.0 {
        ComplianceStatus::Met
    } else if missing <= 20.0 {
        ComplianceStatus::Warn
    } else {
        ComplianceStatus::Risk
    }
}

/// 以完成百分比為準的門檻：先檢查缺少點數歸零，
/// 再依 >= 70 / >= 35 分級
pub fn classify_by_progress(missing: f64, progress: f64) -> ComplianceStatus {
    if missing <= 0.0 {
        return ComplianceStatus::Met;
    }
    if progress >= 70.0 {
        ComplianceStatus::Met
    } else if progress >= 35.0 {
        ComplianceStatus::Warn
    } else {
        ComplianceStatus::Risk
    }
}
