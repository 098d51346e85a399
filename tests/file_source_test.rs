use cpd_tracker::core::Pipeline;
use cpd_tracker::{LocalStorage, ReportPipeline, TomlConfig, TrackerEngine};
use tempfile::TempDir;

fn file_config(source_type: &str, path: &str, policy: &str) -> TomlConfig {
    let toml_content = format!(
        r#"
[profile]
required_points = 200
period_start = 2023
period_end = 2026
status_policy = "{}"

[source]
type = "{}"
path = "{}"

[rules.category_caps]
"Samokształcenie" = 20

[report]
output_path = "reports"
"#,
        policy, source_type, path
    );
    TomlConfig::from_toml_str(&toml_content).unwrap()
}

#[tokio::test]
async fn test_csv_report_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let csv_content = "\
title,category,points,year,date
Kurs ratownictwa,Kursy medyczne,50,2024,2024-03-10
Lektura prasy,Samokształcenie,15,2024,
Podcast,Samokształcenie,10,2024,
Stary kurs,Kursy medyczne,30,2021,
Zepsuty wpis,Inne,abc,2024,
";
    std::fs::write(temp_dir.path().join("activities.csv"), csv_content).unwrap();

    let config = file_config("csv", "activities.csv", "missing");
    let storage = LocalStorage::new(temp_dir.path());
    let engine = TrackerEngine::new(ReportPipeline::new(storage, config));

    let report = engine.run().await.unwrap();

    // 50 + 15 + 5 (cap) + 0 (poza okresem) + 0 (zepsute punkty) = 70
    assert_eq!(report.summary.total_points, 70.0);
    assert_eq!(report.summary.status.label(), "risk");

    let report_csv =
        std::fs::read_to_string(temp_dir.path().join("reports/report.csv")).unwrap();
    assert!(report_csv.contains("invalid points value"));
    assert!(report_csv.contains("5 of 10 points not counted"));

    // 未啟用 bundle 就不該有 ZIP
    assert!(!temp_dir.path().join("reports/cpd_report.zip").exists());
}

#[tokio::test]
async fn test_csv_year_falls_back_to_date_column() {
    let temp_dir = TempDir::new().unwrap();
    let csv_content = "\
title,category,points,year,date
Konferencja,Konferencje,25,,2024-06-15
";
    std::fs::write(temp_dir.path().join("activities.csv"), csv_content).unwrap();

    let config = file_config("csv", "activities.csv", "missing");
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = ReportPipeline::new(storage, config);

    let activities = pipeline.fetch().await.unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].year, None);
    assert_eq!(activities[0].effective_year(), Some(2024));

    let result = pipeline.evaluate(activities).await.unwrap();
    assert_eq!(result.summary.total_points, 25.0);
}

#[tokio::test]
async fn test_json_file_source() {
    let temp_dir = TempDir::new().unwrap();
    let json_content = serde_json::json!([
        {"title": "Kurs", "category": "Kursy medyczne", "points": 100, "year": 2024},
        {"title": "Szkolenie", "category": "Kursy medyczne", "points": 50, "year": 2025}
    ]);
    std::fs::write(
        temp_dir.path().join("activities.json"),
        serde_json::to_vec(&json_content).unwrap(),
    )
    .unwrap();

    let config = file_config("json", "activities.json", "progress");
    let storage = LocalStorage::new(temp_dir.path());
    let engine = TrackerEngine::new(ReportPipeline::new(storage, config));

    let report = engine.run().await.unwrap();

    // 150/200 = 75%：progress 政策給 met，missing 政策會給 risk
    assert_eq!(report.summary.total_points, 150.0);
    assert_eq!(report.summary.progress_percent, 75.0);
    assert_eq!(report.summary.missing_points, 50.0);
    assert_eq!(report.summary.status.label(), "met");
    assert_eq!(report.summary.policy.name(), "progress_based");
}

#[tokio::test]
async fn test_missing_activities_file_is_an_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = file_config("csv", "does-not-exist.csv", "missing");
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = ReportPipeline::new(storage, config);

    let err = pipeline.fetch().await.unwrap_err();
    assert!(matches!(err, cpd_tracker::CpdError::IoError(_)));
}

#[tokio::test]
async fn test_malformed_csv_rows_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    // 第二列欄位數不對，應被跳過而不是整批失敗
    let csv_content = "\
title,category,points,year,date
Kurs,Kursy medyczne,50,2024,
Zepsuta,linia,z,za,duza,iloscia,pol
Szkolenie,Kursy medyczne,25,2024,
";
    std::fs::write(temp_dir.path().join("activities.csv"), csv_content).unwrap();

    let config = file_config("csv", "activities.csv", "missing");
    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = ReportPipeline::new(storage, config);

    let activities = pipeline.fetch().await.unwrap();
    assert_eq!(activities.len(), 2);
}
