// src/flows/mod.rs
//! User-level flows: upload → jobs, optimize, download.
//!
//! Each flow checks connectivity before building any request, runs its steps
//! strictly in order, and touches the session only on success.

mod download;
mod optimize;
mod upload;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::config::ClientConfig;
use crate::core::{ConnectivityGate, ServiceClient, Session};
use crate::error::ApiError;

pub const UPLOAD_TIMEOUT_MESSAGE: &str = "Upload timed out, please retry";
pub const OPTIMIZE_TIMEOUT_MESSAGE: &str = "Optimization timed out, please retry";
const DEFAULT_WATCHDOG: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Upload succeeded but the backend matched no jobs.
    #[error("No jobs found for this resume")]
    NoJobsFound,

    /// Optimization returned neither missing skills nor improved bullets.
    #[error("AI returned empty results")]
    EmptyResults,
}

impl FlowError {
    /// `false` for outcomes that are reported to the user but leave the
    /// session usable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Wires the backend client, the shared session and the connectivity gate
/// together. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct ResumeFlows {
    client: ServiceClient,
    session: Session,
    gate: ConnectivityGate,
    staged_path: PathBuf,
    upload_watchdog: Duration,
    optimize_watchdog: Duration,
}

impl ResumeFlows {
    pub fn new(
        client: ServiceClient,
        session: Session,
        gate: ConnectivityGate,
        staged_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            session,
            gate,
            staged_path: staged_path.into(),
            upload_watchdog: DEFAULT_WATCHDOG,
            optimize_watchdog: DEFAULT_WATCHDOG,
        }
    }

    pub fn from_config(
        config: &ClientConfig,
        client: ServiceClient,
        session: Session,
        gate: ConnectivityGate,
    ) -> Self {
        Self::new(client, session, gate, config.staged_resume_path())
            .with_watchdogs(config.upload_watchdog, config.optimize_watchdog)
    }

    pub fn with_watchdogs(mut self, upload: Duration, optimize: Duration) -> Self {
        self.upload_watchdog = upload;
        self.optimize_watchdog = optimize;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    pub fn staged_path(&self) -> &Path {
        &self.staged_path
    }
}

/// Run `flow` under a deadline. On expiry the future is dropped, so whatever
/// it would have produced afterwards never reaches the caller.
async fn with_watchdog<T, F>(limit: Duration, message: &str, flow: F) -> Result<T, FlowError>
where
    F: Future<Output = Result<T, FlowError>>,
{
    match tokio::time::timeout(limit, flow).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Watchdog fired after {:?}: {}", limit, message);
            Err(ApiError::Timeout(message.to_string()).into())
        }
    }
}
