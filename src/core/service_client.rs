// src/core/service_client.rs
//! Résumé/job backend client.
//!
//! Every operation funnels through the same response classification:
//! transport failure, non-2xx status, missing body, undecodable body.

use anyhow::Context;
use bytes::Bytes;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::core::endpoints::Endpoints;
use crate::core::fs_ops::{SecurityScope, UnrestrictedScope};
use crate::core::multipart::{MultipartForm, Part};
use crate::core::transport::{
    ApiRequest, Downloaded, RawResponse, ReqwestTransport, Transport, TransportError,
};
use crate::error::ApiError;
use crate::types::response::{OptimizeRequest, RawOptimizationResponse};
use crate::types::{Country, Job, ResumeOptimizationResponse};

pub const DOWNLOAD_FILE_NAME: &str = "optimized_resume.pdf";

const RAW_BODY_LOG_LIMIT: usize = 512;

/// Per-operation transport deadlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    pub upload: Duration,
    pub jobs: Duration,
    pub optimize: Duration,
    pub download: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            upload: Duration::from_secs(20),
            jobs: Duration::from_secs(60),
            optimize: Duration::from_secs(45),
            download: Duration::from_secs(45),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    UploadResume,
    JobsFromResume,
    OptimizeResume,
    DownloadResume,
}

impl Operation {
    fn label(&self) -> &'static str {
        match self {
            Operation::UploadResume => "resume upload",
            Operation::JobsFromResume => "jobs from resume",
            Operation::OptimizeResume => "resume optimization",
            Operation::DownloadResume => "optimized resume download",
        }
    }

    /// Message for a non-2xx response without a usable `detail`.
    fn server_fallback(&self, status: u16) -> String {
        match self {
            Operation::JobsFromResume => "Upload failed".to_string(),
            _ => format!("Server error {}", status),
        }
    }

    fn empty_message(&self) -> &'static str {
        match self {
            Operation::UploadResume => "No response",
            Operation::JobsFromResume => "No response from server.",
            Operation::OptimizeResume => "No response from server.",
            Operation::DownloadResume => "No file received",
        }
    }

    fn decode_message(&self) -> &'static str {
        match self {
            Operation::UploadResume => "Invalid server response",
            Operation::JobsFromResume => "Could not read job listings, please try again.",
            Operation::OptimizeResume => "Optimization failed, please try again.",
            Operation::DownloadResume => "Invalid server response",
        }
    }
}

/// Stateless client for the résumé/job backend. Cheap to clone; independent
/// calls may run concurrently.
#[derive(Clone)]
pub struct ServiceClient {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    scope: Arc<dyn SecurityScope>,
    timeouts: Timeouts,
    download_path: PathBuf,
}

impl ServiceClient {
    pub fn new(endpoints: Endpoints, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            endpoints,
            scope: Arc::new(UnrestrictedScope),
            timeouts: Timeouts::default(),
            download_path: std::env::temp_dir().join(DOWNLOAD_FILE_NAME),
        }
    }

    /// Create a reqwest-backed client from configuration
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let endpoints = Endpoints::new(&config.base_url)
            .with_context(|| format!("Invalid backend URL: {}", config.base_url))?;
        let transport = ReqwestTransport::new().context("Failed to create HTTP client")?;

        Ok(Self::new(endpoints, Arc::new(transport))
            .with_timeouts(config.timeouts.clone())
            .with_download_path(config.download_dir().join(DOWNLOAD_FILE_NAME)))
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_scope(mut self, scope: Arc<dyn SecurityScope>) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_download_path(mut self, path: PathBuf) -> Self {
        self.download_path = path;
        self
    }

    pub fn scope(&self) -> &dyn SecurityScope {
        self.scope.as_ref()
    }

    pub fn download_path(&self) -> &Path {
        &self.download_path
    }

    /// 1. Résumé upload - sends the PDF, receives the server-extracted text
    pub async fn upload_resume(&self, file: &Path) -> Result<String, ApiError> {
        let op = Operation::UploadResume;
        let form = MultipartForm::new().part(Part::resume_pdf(file));
        let body = self
            .post_multipart(op, self.endpoints.upload_resume(), &form, self.timeouts.upload)
            .await?;

        let value: serde_json::Value = decode(op, &body)?;
        match value.get("text").and_then(|text| text.as_str()) {
            Some(text) => {
                info!("Resume uploaded, {} characters extracted", text.len());
                Ok(text.to_string())
            }
            None => {
                warn!("Upload response has no string 'text' field");
                log_raw_body(&body);
                Err(ApiError::Decode(op.decode_message().to_string()))
            }
        }
    }

    /// 2. Job matching - sends the PDF, receives listings for `country`
    pub async fn fetch_jobs_from_resume(
        &self,
        file: &Path,
        country: &Country,
    ) -> Result<Vec<Job>, ApiError> {
        let op = Operation::JobsFromResume;
        let form = MultipartForm::new().part(Part::resume_pdf(file));
        let body = self
            .post_multipart(
                op,
                self.endpoints.jobs_from_resume(country),
                &form,
                self.timeouts.jobs,
            )
            .await?;

        let jobs: Vec<Job> = decode(op, &body)?;
        info!("Received {} jobs for country {}", jobs.len(), country);
        Ok(jobs)
    }

    /// 3. Résumé optimization - sends text + target job, receives suggestions
    pub async fn optimize_resume(
        &self,
        resume_text: &str,
        job_title: &str,
        job_description: &str,
    ) -> Result<ResumeOptimizationResponse, ApiError> {
        let op = Operation::OptimizeResume;
        let payload = OptimizeRequest {
            resume_text,
            job_title,
            job_description,
        };
        let json = serde_json::to_vec(&payload)
            .map_err(|e| ApiError::encoding("Failed to build optimization request", e))?;

        let request = ApiRequest {
            url: self.endpoints.optimize_resume(),
            content_type: "application/json".to_string(),
            body: Bytes::from(json),
            timeout: self.timeouts.optimize,
        };
        let body = self.execute(op, request).await?;

        let raw: RawOptimizationResponse = decode(op, &body)?;
        raw.into_response().ok_or_else(|| {
            warn!("Optimization response decoded with every field missing");
            log_raw_body(&body);
            ApiError::Decode(op.decode_message().to_string())
        })
    }

    /// 4. Optimized résumé download - sends PDF + job description, saves the
    /// returned PDF at the download path and returns that path
    pub async fn download_optimized_resume(
        &self,
        resume_file: &Path,
        job_description: &str,
    ) -> Result<PathBuf, ApiError> {
        if job_description.trim().is_empty() {
            return Err(ApiError::validation("Job description is required"));
        }

        let op = Operation::DownloadResume;
        let form = MultipartForm::new()
            .part(Part::resume_pdf(resume_file))
            .part(Part::text("job_description", job_description));
        let request = self
            .multipart_request(self.endpoints.download_resume(), &form, self.timeouts.download)
            .await?;
        info!("Calling {} service: {}", op.label(), request.url);

        let outcome = self
            .transport
            .download(request, &self.download_path)
            .await
            .map_err(|e| transport_error(op, e))?;

        match outcome {
            Downloaded::Rejected(response) => Err(server_error(op, &response)),
            Downloaded::Saved { status, bytes: 0 } => {
                warn!("{} returned status {} with no body", op.label(), status);
                Err(ApiError::EmptyResponse(op.empty_message().to_string()))
            }
            Downloaded::Saved { bytes, .. } => {
                info!(
                    "Optimized resume saved to {} ({} bytes)",
                    self.download_path.display(),
                    bytes
                );
                Ok(self.download_path.clone())
            }
        }
    }

    async fn post_multipart(
        &self,
        op: Operation,
        url: Url,
        form: &MultipartForm,
        timeout: Duration,
    ) -> Result<Bytes, ApiError> {
        let request = self.multipart_request(url, form, timeout).await?;
        self.execute(op, request).await
    }

    async fn multipart_request(
        &self,
        url: Url,
        form: &MultipartForm,
        timeout: Duration,
    ) -> Result<ApiRequest, ApiError> {
        let encoded = form.encode(self.scope.as_ref()).await?;
        Ok(ApiRequest {
            url,
            content_type: encoded.content_type(),
            body: encoded.body,
            timeout,
        })
    }

    async fn execute(&self, op: Operation, request: ApiRequest) -> Result<Bytes, ApiError> {
        info!("Calling {} service: {}", op.label(), request.url);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| transport_error(op, e))?;

        classify(op, response)
    }
}

fn transport_error(op: Operation, e: TransportError) -> ApiError {
    error!("{} request failed: {:?}", op.label(), e);
    if matches!(e, TransportError::Sink(_)) {
        return ApiError::encoding("Failed to save the optimized resume", e);
    }
    let message = match &e {
        TransportError::TimedOut(_) => "The request timed out",
        TransportError::Connect(_) => "Could not connect to the server",
        _ => "Network request failed",
    };
    ApiError::network(message, e)
}

fn classify(op: Operation, response: RawResponse) -> Result<Bytes, ApiError> {
    if !response.is_success() {
        return Err(server_error(op, &response));
    }

    let status = response.status;
    response.body.ok_or_else(|| {
        warn!("{} returned status {} with no body", op.label(), status);
        ApiError::EmptyResponse(op.empty_message().to_string())
    })
}

fn server_error(op: Operation, response: &RawResponse) -> ApiError {
    let status = response.status;
    let message = response
        .body
        .as_deref()
        .and_then(detail_message)
        .unwrap_or_else(|| op.server_fallback(status));
    error!("{} service error {}: {}", op.label(), status, message);
    ApiError::Server { status, message }
}

/// `detail` from a `{"detail": "..."}` error body, if present and a string.
fn detail_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}

fn decode<T: DeserializeOwned>(op: Operation, body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("Failed to parse {} response: {}", op.label(), e);
        log_raw_body(body);
        ApiError::Decode(op.decode_message().to_string())
    })
}

fn log_raw_body(body: &[u8]) {
    let text = String::from_utf8_lossy(body);
    let shown: String = text.chars().take(RAW_BODY_LOG_LIMIT).collect();
    debug!("Raw response: {}", shown);
}
