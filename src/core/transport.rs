// src/core/transport.rs
//! Transport seam between the service client and the network.
//!
//! The service client prepares a fully encoded [`ApiRequest`]; a
//! [`Transport`] delivers it and hands back the raw status and body. All
//! interpretation of the response happens in the client.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

use crate::core::fs_ops::FsOps;
use crate::error::BoxError;

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub url: Url,
    pub content_type: String,
    pub body: Bytes,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// `None` when the backend sent no body (or a zero-length one).
    pub body: Option<Bytes>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        Self {
            status,
            body: if body.is_empty() { None } else { Some(body) },
        }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    TimedOut(#[source] BoxError),

    #[error("could not connect")]
    Connect(#[source] BoxError),

    #[error("transport failure")]
    Other(#[source] BoxError),

    /// The body arrived but could not be written locally.
    #[error("could not write response body")]
    Sink(#[source] io::Error),
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        TransportError::Sink(e)
    }
}

/// Outcome of [`Transport::download`].
#[derive(Debug)]
pub enum Downloaded {
    /// 2xx; the body is at the destination path.
    Saved { status: u16, bytes: u64 },
    /// Anything else, buffered for classification.
    Rejected(RawResponse),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::TimedOut(Box::new(e))
        } else if e.is_connect() {
            TransportError::Connect(Box::new(e))
        } else {
            TransportError::Other(Box::new(e))
        }
    }
}

/// Delivers one POST request. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError>;

    /// Deliver `request` and write a 2xx body to `dest`. The file at `dest`
    /// is only replaced once the whole body has arrived.
    async fn download(
        &self,
        request: ApiRequest,
        dest: &Path,
    ) -> Result<Downloaded, TransportError> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Ok(Downloaded::Rejected(response));
        }
        let status = response.status;
        let body = response.body.unwrap_or_default();
        let chunks = stream::iter([Ok::<_, TransportError>(body)]);
        let bytes = FsOps::replace_from_stream(dest, chunks).await?;
        Ok(Downloaded::Saved { status, bytes })
    }
}

/// [`Transport`] backed by a pooled [`reqwest::Client`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    async fn post(&self, request: ApiRequest) -> Result<reqwest::Response, TransportError> {
        trace!(
            "POST {} ({} bytes, timeout {:?})",
            request.url,
            request.body.len(),
            request.timeout
        );

        let response = self
            .client
            .post(request.url)
            .header(CONTENT_TYPE, request.content_type)
            .timeout(request.timeout)
            .body(request.body)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        let response = self.post(request).await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!("Response status: {} ({} bytes)", status, body.len());

        Ok(RawResponse::new(status, body))
    }

    async fn download(
        &self,
        request: ApiRequest,
        dest: &Path,
    ) -> Result<Downloaded, TransportError> {
        let response = self.post(request).await?;
        let status = response.status().as_u16();
        if !(200..=299).contains(&status) {
            let body = response.bytes().await?;
            debug!("Download rejected: {} ({} bytes)", status, body.len());
            return Ok(Downloaded::Rejected(RawResponse::new(status, body)));
        }

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::from));
        let bytes = FsOps::replace_from_stream(dest, chunks).await?;
        debug!("Response status: {} ({} bytes streamed)", status, bytes);

        Ok(Downloaded::Saved { status, bytes })
    }
}
