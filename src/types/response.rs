use serde::{Deserialize, Serialize};

// ===== Service Response Types =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeOptimizationResponse {
    pub missing_skills: Vec<String>,
    pub improved_bullets: Vec<String>,
    pub ats_keywords: Vec<String>,
}

impl ResumeOptimizationResponse {
    /// True when the AI produced neither skill gaps nor rewritten bullets.
    /// ATS keywords alone do not count as a usable result.
    pub fn is_empty_result(&self) -> bool {
        self.missing_skills.is_empty() && self.improved_bullets.is_empty()
    }
}

/// Wire shape of `/resume/optimize`. Every field may be absent or null;
/// the client rejects a payload where all three are.
#[derive(Debug, Deserialize)]
pub(crate) struct RawOptimizationResponse {
    #[serde(default)]
    pub missing_skills: Option<Vec<String>>,
    #[serde(default)]
    pub improved_bullets: Option<Vec<String>>,
    #[serde(default)]
    pub ats_keywords: Option<Vec<String>>,
}

impl RawOptimizationResponse {
    pub fn into_response(self) -> Option<ResumeOptimizationResponse> {
        if self.missing_skills.is_none()
            && self.improved_bullets.is_none()
            && self.ats_keywords.is_none()
        {
            return None;
        }
        Some(ResumeOptimizationResponse {
            missing_skills: self.missing_skills.unwrap_or_default(),
            improved_bullets: self.improved_bullets.unwrap_or_default(),
            ats_keywords: self.ats_keywords.unwrap_or_default(),
        })
    }
}

// ===== Service Request Types =====

#[derive(Debug, Serialize)]
pub(crate) struct OptimizeRequest<'a> {
    pub resume_text: &'a str,
    pub job_title: &'a str,
    pub job_description: &'a str,
}
