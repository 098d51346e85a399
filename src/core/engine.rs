use crate::core::Pipeline;
use crate::domain::model::ComplianceSummary;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

/// 一次完整執行的結果
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub summary: ComplianceSummary,
}

pub struct TrackerEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> TrackerEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Fetching activities...");
        let activities = self.pipeline.fetch().await?;
        tracing::info!("Fetched {} activities", activities.len());
        self.monitor.finish_phase("fetch");

        tracing::info!("Applying period and cap rules...");
        let result = self.pipeline.evaluate(activities).await?;
        let summary = result.summary.clone();
        tracing::info!(
            "Applied {:.1} of {:.1} required points ({:.0}%), status: {}",
            summary.total_points,
            summary.required_points,
            summary.progress_percent,
            summary.status.label()
        );
        self.monitor.finish_phase("evaluate");

        tracing::info!("Writing report...");
        let output_path = self.pipeline.report(result).await?;
        tracing::info!("Report saved to: {}", output_path);
        self.monitor.finish_phase("report");

        self.monitor.log_final_stats();

        Ok(RunReport {
            output_path,
            summary,
        })
    }
}
