use crate::core::report::ReportFormat;
use crate::domain::model::{Evaluation, FeedDocument, Organization};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn registry_path(&self) -> &str;
    fn inactivity_period_days(&self) -> u32;
    fn user_agent(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn max_entity_characters(&self) -> usize;
    fn output_path(&self) -> Option<&str>;
    fn report_format(&self) -> ReportFormat;
}

/// Fetches and parses one feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FeedDocument>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Organization>>;
    async fn transform(&self, organizations: Vec<Organization>) -> Result<Evaluation>;
    async fn load(&self, evaluation: &Evaluation) -> Result<String>;
}
