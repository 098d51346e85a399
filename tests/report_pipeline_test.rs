use cpd_tracker::core::Pipeline;
use cpd_tracker::{LocalStorage, ReportPipeline, TomlConfig, TrackerEngine};
use httpmock::prelude::*;
use tempfile::TempDir;

fn api_config(endpoint: &str) -> TomlConfig {
    let toml_content = format!(
        r#"
[profile]
name = "Lekarz - okres 2023-2026"
required_points = 200
period_start = 2023
period_end = 2026

[source]
type = "api"
endpoint = "{}"

[source.headers]
apikey = "test-key"

[rules.category_caps]
"Samokształcenie" = 20

[report]
output_path = "reports"

[report.bundle]
enabled = true
"#,
        endpoint
    );
    TomlConfig::from_toml_str(&toml_content).unwrap()
}

#[tokio::test]
async fn test_api_report_end_to_end() {
    let server = MockServer::start();
    let mock_data = serde_json::json!([
        {"title": "Kurs ratownictwa", "type": "Kursy medyczne", "points": 50, "year": 2024},
        {"title": "Lektura prasy", "type": "Samokształcenie", "points": 15, "year": 2024},
        {"title": "Podcast", "type": "Samokształcenie", "points": 10, "year": 2024},
        {"title": "Stary kurs", "type": "Kursy medyczne", "points": 30, "year": 2021}
    ]);

    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/activities").header("apikey", "test-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(mock_data);
    });

    let temp_dir = TempDir::new().unwrap();
    let config = api_config(&format!("{}/activities", server.base_url()));
    let storage = LocalStorage::new(temp_dir.path());
    let engine = TrackerEngine::new(ReportPipeline::new(storage, config));

    let report = engine.run().await.unwrap();

    api_mock.assert();

    // 50 (kurs) + 15 + 5 (cap 20) + 0 (poza okresem) = 70
    assert_eq!(report.summary.total_points, 70.0);
    assert_eq!(report.summary.missing_points, 130.0);
    assert_eq!(report.summary.progress_percent, 35.0);
    assert_eq!(report.summary.status.label(), "risk");

    let report_csv =
        std::fs::read_to_string(temp_dir.path().join("reports/report.csv")).unwrap();
    assert!(report_csv.contains("Podcast"));
    assert!(report_csv.contains("5 of 10 points not counted"));
    assert!(report_csv.contains("outside the reporting period"));

    let summary_json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("reports/summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary_json["summary"]["status"], "risk");
    assert_eq!(summary_json["summary"]["policy"], "missing_based");
    assert_eq!(summary_json["activities"].as_array().unwrap().len(), 4);

    // 啟用 bundle 時要多產出一個 ZIP，內容要和散裝的報告檔一致
    use std::io::Read;
    let zip_bytes = std::fs::read(temp_dir.path().join("reports/cpd_report.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

    let mut bundled_csv = String::new();
    archive
        .by_name("report.csv")
        .unwrap()
        .read_to_string(&mut bundled_csv)
        .unwrap();
    assert_eq!(bundled_csv, report_csv);

    let mut bundled_summary = String::new();
    archive
        .by_name("summary.json")
        .unwrap()
        .read_to_string(&mut bundled_summary)
        .unwrap();
    let bundled_json: serde_json::Value = serde_json::from_str(&bundled_summary).unwrap();
    assert_eq!(bundled_json["summary"]["status"], "risk");
    assert_eq!(bundled_json["activities"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_api_server_error_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/activities");
        then.status(500);
    });

    let temp_dir = TempDir::new().unwrap();
    let config = api_config(&format!("{}/activities", server.base_url()));
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = ReportPipeline::new(storage, config);

    let result = pipeline.fetch().await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("HTTP 500"));
}

#[tokio::test]
async fn test_fetch_tolerates_loose_rows() {
    let server = MockServer::start();
    // 上游資料型別鬆散：字串點數、缺年份、非物件項目
    let mock_data = serde_json::json!([
        {"title": "Kurs", "type": "Kursy medyczne", "points": "12.5", "year": "2024"},
        {"title": "Bez roku", "type": "Inne", "points": 5},
        "not-an-object",
        {"title": "Bez punktów", "type": "Inne", "year": 2024}
    ]);

    server.mock(|when, then| {
        when.method(GET).path("/activities");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(mock_data);
    });

    let temp_dir = TempDir::new().unwrap();
    let config = api_config(&format!("{}/activities", server.base_url()));
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = ReportPipeline::new(storage, config);

    let activities = pipeline.fetch().await.unwrap();

    assert_eq!(activities.len(), 3);
    assert_eq!(activities[0].points, 12.5);
    assert_eq!(activities[0].year, Some(2024));
    assert_eq!(activities[1].year, None);
    assert!(activities[2].points.is_nan());
}

#[tokio::test]
async fn test_non_array_payload_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/activities");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"error": "unexpected shape"}));
    });

    let temp_dir = TempDir::new().unwrap();
    let config = api_config(&format!("{}/activities", server.base_url()));
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = ReportPipeline::new(storage, config);

    assert!(pipeline.fetch().await.is_err());
}
