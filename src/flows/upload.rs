// src/flows/upload.rs
use std::io;
use std::path::Path;
use tracing::{error, info};

use super::{with_watchdog, FlowError, ResumeFlows, UPLOAD_TIMEOUT_MESSAGE};
use crate::core::FsOps;
use crate::error::ApiError;
use crate::types::{Country, Job};

impl ResumeFlows {
    /// Stage `picked`, upload it, remember it as the active résumé, then fetch
    /// matching jobs for `country`.
    ///
    /// The copy only replaces the staged résumé once the upload succeeded, and
    /// the session is committed right after. A job fetch failure still leaves
    /// the résumé available for optimization.
    pub async fn upload(&self, picked: &Path, country: &Country) -> Result<Vec<Job>, FlowError> {
        self.gate.ensure_connected()?;
        with_watchdog(
            self.upload_watchdog,
            UPLOAD_TIMEOUT_MESSAGE,
            self.run_upload(picked, country),
        )
        .await
    }

    async fn run_upload(&self, picked: &Path, country: &Country) -> Result<Vec<Job>, FlowError> {
        let pending = FsOps::stage_file(self.client.scope(), picked, &self.staged_path)
            .await
            .map_err(|e| staging_error(picked, e))?;

        let text = self.client.upload_resume(pending.path()).await?;
        let staged = pending.promote(&self.staged_path).await.map_err(|e| {
            error!("Failed to keep {}: {}", self.staged_path.display(), e);
            ApiError::encoding("Failed to save the resume", e)
        })?;
        self.session.commit(&staged, text);

        let jobs = self.client.fetch_jobs_from_resume(&staged, country).await?;
        if jobs.is_empty() {
            info!("Upload complete but no jobs matched");
            return Err(FlowError::NoJobsFound);
        }
        Ok(jobs)
    }
}

fn staging_error(picked: &Path, e: io::Error) -> ApiError {
    error!("Failed to stage {}: {}", picked.display(), e);
    if e.kind() == io::ErrorKind::PermissionDenied {
        ApiError::validation("Permission denied")
    } else {
        ApiError::encoding("Failed to read file", e)
    }
}
