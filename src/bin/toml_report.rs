use clap::Parser;
use cpd_tracker::core::ConfigProvider;
use cpd_tracker::utils::{logger, validation::Validate};
use cpd_tracker::{LocalStorage, ReportPipeline, TomlConfig, TrackerEngine};

#[derive(Parser)]
#[command(name = "toml_report")]
#[command(about = "CPD point report driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "cpd-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based CPD report");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".");
    let pipeline = ReportPipeline::new(storage, config);
    let engine = TrackerEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
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
            tracing::error!(
                "❌ CPD report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration summary:");
    if let Some(name) = &config.profile.name {
        tracing::info!("   Profile: {}", name);
    }
    tracing::info!("   Required points: {}", config.required_points());
    match config.period() {
        Some(period) => tracing::info!("   Reporting period: {}", period),
        None => tracing::info!("   Reporting period: unrestricted"),
    }
    tracing::info!("   Category caps: {}", config.caps().len());
    tracing::info!("   Status policy: {}", config.status_policy().name());
    tracing::info!("   Source: {}", config.source().describe());
    tracing::info!("   Output path: {}", config.output_path());
    tracing::info!("   Bundle reports: {}", config.bundle_reports());
}
