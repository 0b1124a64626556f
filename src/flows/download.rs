// src/flows/download.rs
use std::path::PathBuf;

use super::{FlowError, ResumeFlows};
use crate::error::ApiError;
use crate::types::Job;

impl ResumeFlows {
    /// Fetch the résumé rewritten for `job` and return where it was saved.
    pub async fn download(&self, job: &Job) -> Result<PathBuf, FlowError> {
        self.gate.ensure_connected()?;

        let file = self
            .session
            .resume_file()
            .ok_or_else(|| ApiError::validation("No resume uploaded"))?;

        let path = self
            .client
            .download_optimized_resume(&file, &job.description)
            .await?;
        Ok(path)
    }
}
