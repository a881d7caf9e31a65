use crate::core::Pipeline;
use crate::domain::model::Evaluation;
use crate::utils::error::Result;
use std::time::Instant;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub report: String,
    pub evaluation: Evaluation,
}

pub struct InactivityEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> InactivityEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs the three stages. A registry failure aborts before any feed is
    /// fetched and no report is produced.
    pub async fn run(&self) -> Result<RunOutput> {
        let started = Instant::now();
        tracing::info!("Starting inactivity check");

        let organizations = self.pipeline.extract().await?;
        tracing::info!("Loaded {} organizations from registry", organizations.len());

        let evaluation = self.pipeline.transform(organizations).await?;
        tracing::info!(
            "Checked {} feeds: {} inactive, {} without a publish date, {} failed",
            evaluation.checked,
            evaluation.inactive.len(),
            evaluation.not_evaluable.len(),
            evaluation.failures.len()
        );

        let report = self.pipeline.load(&evaluation).await?;
        tracing::info!("Inactivity check finished in {:?}", started.elapsed());

        Ok(RunOutput { report, evaluation })
    }
}
