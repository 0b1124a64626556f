// src/flows/optimize.rs
use tracing::info;

use super::{with_watchdog, FlowError, ResumeFlows, OPTIMIZE_TIMEOUT_MESSAGE};
use crate::error::ApiError;
use crate::types::{Job, ResumeOptimizationResponse};

impl ResumeFlows {
    /// Ask the backend how the active résumé should change for `job`.
    /// Read-only with respect to the session.
    pub async fn optimize(&self, job: &Job) -> Result<ResumeOptimizationResponse, FlowError> {
        self.gate.ensure_connected()?;

        let snapshot = self.session.snapshot();
        let text = snapshot
            .usable_text()
            .ok_or_else(|| ApiError::validation("Resume not found"))?;

        let response = with_watchdog(self.optimize_watchdog, OPTIMIZE_TIMEOUT_MESSAGE, async {
            self.client
                .optimize_resume(text, &job.title, &job.description)
                .await
                .map_err(FlowError::from)
        })
        .await?;

        if response.is_empty_result() {
            info!("Optimization for '{}' came back empty", job.title);
            return Err(FlowError::EmptyResults);
        }
        Ok(response)
    }
}
