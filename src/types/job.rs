// src/types/job.rs
//! Job listings as returned by the matching backend.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ApiError;

const TOP_MATCH_THRESHOLD: i32 = 85;
const GOOD_MATCH_THRESHOLD: i32 = 65;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    #[serde(rename = "matchScore")]
    pub match_score: i32,
    #[serde(rename = "applyURL")]
    pub apply_url: String,
}

/// How ready the résumé is for a given listing, derived from the match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Strong,
    Good,
    Low,
}

impl Readiness {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= TOP_MATCH_THRESHOLD => Readiness::Strong,
            s if s >= GOOD_MATCH_THRESHOLD => Readiness::Good,
            _ => Readiness::Low,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Readiness::Strong => "Strong match, you're ready to apply",
            Readiness::Good => "Good match, minor improvements recommended",
            Readiness::Low => "Low match, optimize before applying",
        }
    }
}

impl Job {
    /// Parsed apply link; `None` when the backend sent an empty or malformed URL.
    pub fn apply_url(&self) -> Option<Url> {
        let raw = self.apply_url.trim();
        if raw.is_empty() {
            return None;
        }
        Url::parse(raw).ok()
    }

    pub fn readiness(&self) -> Readiness {
        Readiness::from_score(self.match_score)
    }

    pub fn is_top_match(&self) -> bool {
        self.match_score >= TOP_MATCH_THRESHOLD
    }
}

/// Job-market country sent as the `country` query value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country(String);

impl Country {
    /// Countries the backend is known to serve, with display labels.
    pub const SUPPORTED: [(&'static str, &'static str); 2] =
        [("in", "India"), ("us", "USA (Visa Friendly)")];

    pub fn parse(code: &str) -> Result<Self, ApiError> {
        let code = code.trim().to_ascii_lowercase();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ApiError::validation(format!(
                "Unsupported country code: {}",
                code
            )));
        }
        Ok(Self(code))
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn label(&self) -> &str {
        Self::SUPPORTED
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, label)| *label)
            .unwrap_or(self.0.as_str())
    }
}

impl Default for Country {
    fn default() -> Self {
        Self("in".to_string())
    }
}

impl FromStr for Country {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
