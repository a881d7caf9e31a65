use crate::core::registry::load_registry;
use crate::core::report::render;
use crate::core::{evaluator, resolver};
use crate::core::{ConfigProvider, FeedSource, Pipeline, Storage};
use crate::domain::model::{Evaluation, FailedCheck, Organization};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

/// Registry → fetch → resolve → evaluate → report, one organization at a time.
pub struct FeedPipeline<S: Storage, F: FeedSource, C: ConfigProvider> {
    storage: S,
    source: F,
    config: C,
}

impl<S: Storage, F: FeedSource, C: ConfigProvider> FeedPipeline<S, F, C> {
    pub fn new(storage: S, source: F, config: C) -> Self {
        Self {
            storage,
            source,
            config,
        }
    }

    /// Evaluates every organization against the same `now`. A feed that cannot
    /// be fetched is recorded as a failure and the remaining feeds still run.
    pub async fn evaluate_at(
        &self,
        organizations: Vec<Organization>,
        now: DateTime<Utc>,
    ) -> Evaluation {
        let threshold = self.config.inactivity_period_days();
        let mut evaluation = Evaluation::default();

        for organization in organizations {
            evaluation.checked += 1;

            let feed = match self.source.fetch(organization.feed_url()).await {
                Ok(feed) => feed,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", organization.name(), e);
                    evaluation.failures.push(FailedCheck {
                        organization,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let last_published = resolver::resolve_last_published(&feed);
            let Some(assessment) = evaluator::assess(&organization, last_published, now) else {
                tracing::debug!(
                    "{} has no publish date on its latest item, not evaluable",
                    organization.name()
                );
                evaluation.not_evaluable.push(organization);
                continue;
            };

            tracing::debug!(
                "{} last published {} ({} days ago)",
                organization.name(),
                assessment.last_published,
                assessment.inactive_days
            );

            if let Some(result) = evaluator::classify(&assessment, threshold) {
                evaluation.inactive.push(result);
            }
            evaluation.assessments.push(assessment);
        }

        evaluation
    }
}

#[async_trait::async_trait]
impl<S: Storage, F: FeedSource, C: ConfigProvider> Pipeline for FeedPipeline<S, F, C> {
    async fn extract(&self) -> Result<Vec<Organization>> {
        load_registry(&self.storage, self.config.registry_path()).await
    }

    async fn transform(&self, organizations: Vec<Organization>) -> Result<Evaluation> {
        Ok(self.evaluate_at(organizations, Utc::now()).await)
    }

    async fn load(&self, evaluation: &Evaluation) -> Result<String> {
        let report = render(&evaluation.inactive, self.config.report_format())?;

        if let Some(output_path) = self.config.output_path() {
            tracing::debug!("Writing report ({} bytes) to {}", report.len(), output_path);
            self.storage.write_file(output_path, report.as_bytes()).await?;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::ReportFormat;
    use crate::domain::model::{FeedDocument, FeedItem};
    use crate::utils::error::{FetchFailure, QuietusError};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_registry(content: &str) -> Self {
            let mut files = HashMap::new();
            files.insert("registry.txt".to_string(), content.as_bytes().to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                QuietusError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    /// Serves canned feeds by URL; unknown URLs fail like an unreachable host.
    struct MockSource {
        feeds: HashMap<String, FeedDocument>,
    }

    #[async_trait]
    impl FeedSource for MockSource {
        async fn fetch(&self, url: &str) -> Result<FeedDocument> {
            self.feeds
                .get(url)
                .cloned()
                .ok_or_else(|| QuietusError::feed_fetch(url, FetchFailure::Status(404)))
        }
    }

    struct MockConfig {
        registry_path: String,
        threshold: u32,
        output_path: Option<String>,
    }

    impl MockConfig {
        fn new(threshold: u32) -> Self {
            Self {
                registry_path: "registry.txt".to_string(),
                threshold,
                output_path: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn registry_path(&self) -> &str {
            &self.registry_path
        }

        fn inactivity_period_days(&self) -> u32 {
            self.threshold
        }

        fn user_agent(&self) -> &str {
            "Quietus/1.0"
        }

        fn request_timeout(&self) -> std::time::Duration {
            std::time::Duration::from_secs(5)
        }

        fn max_entity_characters(&self) -> usize {
            1024
        }

        fn output_path(&self) -> Option<&str> {
            self.output_path.as_deref()
        }

        fn report_format(&self) -> ReportFormat {
            ReportFormat::Text
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn feed(published: Option<i64>, updated: Option<i64>) -> FeedDocument {
        FeedDocument {
            title: None,
            items: vec![FeedItem {
                title: Some("Latest".to_string()),
                published: published.map(|days| now() - Duration::days(days)),
                updated: updated.map(|days| now() - Duration::days(days)),
            }],
        }
    }

    fn source(feeds: &[(&str, FeedDocument)]) -> MockSource {
        MockSource {
            feeds: feeds
                .iter()
                .map(|(url, feed)| (url.to_string(), feed.clone()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_evaluate_filters_by_threshold_in_registry_order() {
        let storage = MockStorage::with_registry("");
        let source = source(&[
            ("http://a.test/rss", feed(Some(10), None)),
            ("http://b.test/rss", feed(None, Some(3))),
            ("http://c.test/rss", feed(Some(7), Some(1))),
        ]);
        let pipeline = FeedPipeline::new(storage, source, MockConfig::new(7));

        let organizations = vec![
            Organization::new("Acme", "http://a.test/rss"),
            Organization::new("Beta", "http://b.test/rss"),
            Organization::new("Gamma", "http://c.test/rss"),
        ];
        let evaluation = pipeline.evaluate_at(organizations, now()).await;

        assert_eq!(evaluation.checked, 3);
        assert_eq!(evaluation.assessments.len(), 3);
        assert_eq!(evaluation.assessments[1].inactive_days, 3);
        assert_eq!(evaluation.inactive.len(), 2);
        assert_eq!(evaluation.inactive[0].name, "Acme");
        assert_eq!(evaluation.inactive[0].inactive_days, 10);
        assert_eq!(evaluation.inactive[1].name, "Gamma");
        assert_eq!(evaluation.inactive[1].inactive_days, 7);
    }

    #[tokio::test]
    async fn test_fetch_failure_does_not_stop_the_run() {
        let storage = MockStorage::with_registry("");
        let source = source(&[("http://b.test/rss", feed(Some(30), None))]);
        let pipeline = FeedPipeline::new(storage, source, MockConfig::new(7));

        let organizations = vec![
            Organization::new("Down", "http://down.test/rss"),
            Organization::new("Beta", "http://b.test/rss"),
        ];
        let evaluation = pipeline.evaluate_at(organizations, now()).await;

        assert_eq!(evaluation.failures.len(), 1);
        assert_eq!(evaluation.failures[0].organization.name(), "Down");
        assert!(evaluation.failures[0].reason.contains("http://down.test/rss"));
        assert_eq!(evaluation.inactive.len(), 1);
        assert_eq!(evaluation.inactive[0].name, "Beta");
    }

    #[tokio::test]
    async fn test_feed_without_dates_is_not_evaluable() {
        let storage = MockStorage::with_registry("");
        let source = source(&[
            ("http://q.test/rss", feed(None, None)),
            ("http://e.test/rss", FeedDocument::default()),
        ]);
        let pipeline = FeedPipeline::new(storage, source, MockConfig::new(0));

        let organizations = vec![
            Organization::new("Quarterly", "http://q.test/rss"),
            Organization::new("Empty", "http://e.test/rss"),
        ];
        let evaluation = pipeline.evaluate_at(organizations, now()).await;

        assert!(evaluation.inactive.is_empty());
        assert!(evaluation.failures.is_empty());
        assert_eq!(evaluation.not_evaluable.len(), 2);
    }

    #[tokio::test]
    async fn test_extract_reads_registry_from_storage() {
        let storage = MockStorage::with_registry("Acme, http://a.test/rss\nBeta, http://b.test/rss\n");
        let pipeline = FeedPipeline::new(storage, source(&[]), MockConfig::new(7));

        let organizations = pipeline.extract().await.unwrap();

        assert_eq!(organizations.len(), 2);
        assert_eq!(organizations[1].name(), "Beta");
    }

    #[tokio::test]
    async fn test_extract_missing_registry_is_not_found() {
        let storage = MockStorage::with_registry("");
        let mut config = MockConfig::new(7);
        config.registry_path = "missing.txt".to_string();
        let pipeline = FeedPipeline::new(storage, source(&[]), config);

        assert!(matches!(
            pipeline.extract().await,
            Err(QuietusError::NotFound { path }) if path == "missing.txt"
        ));
    }

    #[tokio::test]
    async fn test_load_writes_report_when_output_configured() {
        let storage = MockStorage::with_registry("");
        let mut config = MockConfig::new(7);
        config.output_path = Some("report.txt".to_string());
        let pipeline = FeedPipeline::new(storage.clone(), source(&[]), config);

        let mut evaluation = Evaluation::default();
        evaluation.inactive.push(crate::domain::model::InactivityResult {
            name: "Acme".to_string(),
            feed_url: "http://a.test/rss".to_string(),
            inactive_days: 10,
        });

        let report = pipeline.load(&evaluation).await.unwrap();

        assert_eq!(report, "\nAcme feed has been inactive for 10 day(s).\n");
        assert_eq!(
            storage.get_file("report.txt").await.unwrap(),
            report.as_bytes().to_vec()
        );
    }
}
