use crate::cpd::period::Period;
use crate::cpd::status::StatusPolicy;
use crate::domain::model::{Activity, ActivitySource, CapSet, ReportResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source(&self) -> ActivitySource;
    fn required_points(&self) -> f64;
    fn period(&self) -> Option<Period>;
    fn caps(&self) -> CapSet;
    fn status_policy(&self) -> StatusPolicy;
    fn output_path(&self) -> &str;
    fn bundle_reports(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Activity>>;
    async fn evaluate(&self, activities: Vec<Activity>) -> Result<ReportResult>;
    async fn report(&self, result: ReportResult) -> Result<String>;
}
