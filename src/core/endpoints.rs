// src/core/endpoints.rs
//! Backend endpoint registry

use reqwest::Url;

use crate::error::ApiError;
use crate::types::Country;

const UPLOAD_RESUME_ENDPOINT: &str = "/resume/upload";
const OPTIMIZE_RESUME_ENDPOINT: &str = "/resume/optimize";
const DOWNLOAD_RESUME_ENDPOINT: &str = "/resume/download";
const JOBS_FROM_RESUME_ENDPOINT: &str = "/jobs/from-resume";
// Reserved by the backend; no flow calls it yet.
const JOBS_MATCH_ENDPOINT: &str = "/jobs/match";

/// Logical backend operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    UploadResume,
    OptimizeResume,
    DownloadResume,
    JobsFromResume,
    JobsMatch,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::UploadResume => UPLOAD_RESUME_ENDPOINT,
            Endpoint::OptimizeResume => OPTIMIZE_RESUME_ENDPOINT,
            Endpoint::DownloadResume => DOWNLOAD_RESUME_ENDPOINT,
            Endpoint::JobsFromResume => JOBS_FROM_RESUME_ENDPOINT,
            Endpoint::JobsMatch => JOBS_MATCH_ENDPOINT,
        }
    }
}

/// Resolves [`Endpoint`]s against a single configured origin.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed)
            .map_err(|e| ApiError::encoding(format!("Invalid server URL: {}", trimmed), e))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Encoding {
                message: format!("Invalid server URL: {}", trimmed),
                source: None,
            });
        }
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}{}", prefix, endpoint.path()));
        url
    }

    pub fn upload_resume(&self) -> Url {
        self.url(Endpoint::UploadResume)
    }

    pub fn optimize_resume(&self) -> Url {
        self.url(Endpoint::OptimizeResume)
    }

    pub fn download_resume(&self) -> Url {
        self.url(Endpoint::DownloadResume)
    }

    pub fn jobs_from_resume(&self, country: &Country) -> Url {
        let mut url = self.url(Endpoint::JobsFromResume);
        url.query_pairs_mut().append_pair("country", country.code());
        url
    }

    pub fn jobs_match(&self) -> Url {
        self.url(Endpoint::JobsMatch)
    }
}
