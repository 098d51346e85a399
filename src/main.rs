use clap::Parser;
use cpd_tracker::utils::{logger, validation::Validate};
use cpd_tracker::{CliConfig, LocalStorage, ReportPipeline, TrackerEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting cpd-tracker CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道，來源檔與報告路徑都相對於工作目錄解析
    let storage = LocalStorage::new(".");
    let pipeline = ReportPipeline::new(storage, config);

    // 創建引擎並執行
    let engine = TrackerEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ CPD report completed successfully!");
            tracing::info!("📁 Report saved to: {}", report.output_path);
            println!("✅ CPD report completed successfully!");
            println!(
                "🎯 {:.1} / {:.1} points ({:.0}%), missing {:.1}, status: {}",
                report.summary.total_points,
                report.summary.required_points,
                report.summary.progress_percent,
                report.summary.missing_points,
                report.summary.status.label()
            );
            println!("📁 Report saved to: {}", report.output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ CPD report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                cpd_tracker::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                cpd_tracker::utils::error::ErrorSeverity::Medium => 2, // 重試錯誤
                cpd_tracker::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                cpd_tracker::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
