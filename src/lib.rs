//! Client layer for the GradHire résumé and job-matching backend.

pub mod bookmarks;
pub mod config;
pub mod core;
pub mod error;
pub mod flows;
pub mod types;

pub use bookmarks::{BookmarkStore, JsonFileStore, KeyValueStore};
pub use config::ClientConfig;
pub use self::core::{connectivity, ConnectivityGate, ServiceClient, Session};
pub use error::ApiError;
pub use flows::{FlowError, ResumeFlows};
pub use types::{Country, Job, Readiness, ResumeOptimizationResponse};
