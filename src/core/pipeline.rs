use crate::core::{
    Activity, ActivitySource, ConfigProvider, Pipeline, ReportResult, Storage,
};
use crate::cpd;
use crate::domain::model::ComplianceSummary;
use crate::utils::error::{CpdError, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    async fn fetch_from_api(
        &self,
        endpoint: &str,
        headers: &std::collections::HashMap<String, String>,
    ) -> Result<Vec<Activity>> {
        tracing::debug!("Making API request to: {}", endpoint);

        let mut request = self.client.get(endpoint);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(CpdError::SourceError {
                message: format!("activities endpoint returned HTTP {}", response.status()),
            });
        }

        let json_data: serde_json::Value = response.json().await?;
        parse_activity_array(&json_data)
    }

    async fn fetch_from_csv(&self, path: &str) -> Result<Vec<Activity>> {
        let data = self.storage.read_file(path).await?;
        let mut reader = csv::Reader::from_reader(data.as_slice());

        let mut activities = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            match row {
                Ok(row) => activities.push(row.into_activity()),
                // 壞掉的列不讓整個匯入失敗，記錄後跳過
                Err(e) => tracing::warn!("Skipping malformed CSV row: {}", e),
            }
        }
        Ok(activities)
    }

    async fn fetch_from_json(&self, path: &str) -> Result<Vec<Activity>> {
        let data = self.storage.read_file(path).await?;
        let json_data: serde_json::Value = serde_json::from_slice(&data)?;
        parse_activity_array(&json_data)
    }
}

/// CSV 列的原始形狀，數值欄位留到 into_activity 再做寬鬆轉型
#[derive(Debug, Deserialize)]
struct CsvRow {
    title: Option<String>,
    category: Option<String>,
    points: Option<String>,
    year: Option<String>,
    date: Option<String>,
}

impl CsvRow {
    fn into_activity(self) -> Activity {
        Activity {
            title: self.title.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            // 解析失敗留給規則引擎以警告方式處理
            points: self
                .points
                .and_then(|p| p.trim().parse::<f64>().ok())
                .unwrap_or(f64::NAN),
            year: self.year.and_then(|y| y.trim().parse::<i32>().ok()),
            date: self
                .date
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()),
        }
    }
}

/// 把來源回傳的鬆散 JSON 陣列轉成有型別的活動紀錄。
/// 單筆欄位壞掉不會失敗，只有整體不是陣列時才回報錯誤。
fn parse_activity_array(json_data: &serde_json::Value) -> Result<Vec<Activity>> {
    let items = json_data.as_array().ok_or_else(|| CpdError::SourceError {
        message: "expected a JSON array of activity objects".to_string(),
    })?;

    let mut activities = Vec::new();
    for item in items {
        let Some(obj) = item.as_object() else {
            tracing::warn!("Skipping non-object entry in activities array");
            continue;
        };

        let title = obj
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        // 上游同時存在 "type" 與 "category" 兩種欄位名
        let category = obj
            .get("category")
            .or_else(|| obj.get("type"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let points = match obj.get("points") {
            Some(v) => v
                .as_f64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
                .unwrap_or(f64::NAN),
            None => f64::NAN,
        };
        let year = obj.get("year").and_then(|v| {
            v.as_i64()
                .map(|y| y as i32)
                .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        });
        let date = obj
            .get("date")
            .and_then(|v| v.as_str())
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok());

        activities.push(Activity {
            title,
            category,
            points,
            year,
            date,
        });
    }
    Ok(activities)
}

fn render_applied_csv(applied: &[crate::core::AppliedActivity]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "title",
        "category",
        "points",
        "year",
        "in_period",
        "applied_points",
        "warning",
    ])?;

    for entry in applied {
        writer.write_record(&[
            entry.activity.title.clone(),
            entry.activity.category.clone(),
            entry.activity.points.to_string(),
            entry
                .activity
                .effective_year()
                .map(|y| y.to_string())
                .unwrap_or_default(),
            entry.in_period.to_string(),
            entry.applied_points.to_string(),
            entry.warning.clone().unwrap_or_default(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| CpdError::ReportError {
        message: format!("could not finalize report CSV: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| CpdError::ReportError {
        message: format!("report CSV is not valid UTF-8: {}", e),
    })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn fetch(&self) -> Result<Vec<Activity>> {
        match self.config.source() {
            ActivitySource::Api { endpoint, headers } => {
                self.fetch_from_api(&endpoint, &headers).await
            }
            ActivitySource::CsvFile(path) => self.fetch_from_csv(&path).await,
            ActivitySource::JsonFile(path) => self.fetch_from_json(&path).await,
        }
    }

    async fn evaluate(&self, activities: Vec<Activity>) -> Result<ReportResult> {
        let period = self.config.period();
        let caps = self.config.caps();
        let required = self.config.required_points();
        let policy = self.config.status_policy();

        let applied = cpd::apply_rules(&activities, period, &caps);

        let warnings = applied.iter().filter(|a| a.warning.is_some()).count();
        if warnings > 0 {
            tracing::warn!("{} of {} activities have warnings", warnings, applied.len());
        }

        let total_points = cpd::total_applied(&applied);
        let missing_points = cpd::calc_missing(total_points, required);
        let progress_percent = cpd::calc_progress(total_points, required);
        let status = policy.classify(missing_points, progress_percent);

        let summary = ComplianceSummary {
            total_points,
            required_points: required,
            missing_points,
            progress_percent,
            status,
            policy,
        };

        let csv_output = render_applied_csv(&applied)?;

        Ok(ReportResult {
            applied,
            summary,
            csv_output,
        })
    }

    async fn report(&self, result: ReportResult) -> Result<String> {
        let output_path = self.config.output_path().trim_end_matches('/').to_string();
        tracing::debug!(
            "Writing report for {} activities to {}",
            result.applied.len(),
            output_path
        );

        self.storage
            .write_file(&format!("{}/report.csv", output_path), result.csv_output.as_bytes())
            .await?;

        let summary_json = serde_json::to_string_pretty(&serde_json::json!({
            "summary": result.summary,
            "activities": result.applied,
        }))?;
        self.storage
            .write_file(&format!("{}/summary.json", output_path), summary_json.as_bytes())
            .await?;

        if self.config.bundle_reports() {
            // 打包成單一 ZIP，方便一次下載或歸檔
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

                zip.start_file::<_, ()>("report.csv", FileOptions::default())?;
                zip.write_all(result.csv_output.as_bytes())?;

                zip.start_file::<_, ()>("summary.json", FileOptions::default())?;
                zip.write_all(summary_json.as_bytes())?;

                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            tracing::debug!("Writing report bundle ({} bytes)", zip_data.len());
            self.storage
                .write_file(&format!("{}/cpd_report.zip", output_path), &zip_data)
                .await?;
        }

        Ok(output_path)
    }
}
