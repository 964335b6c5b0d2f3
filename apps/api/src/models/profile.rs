use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical job-seeker profile.
///
/// Built from the backend's JSON by `profile::normalize::normalize_profile`.
/// Every text field is `Some` only when it carries a non-blank value, so
/// presence checks are plain `is_some()` calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub emirates_id: Option<String>,
    pub passport_number: Option<String>,
    pub professional_summary: Option<String>,
    /// Most recent entry of `professionalExperience`.
    pub experience: ExperienceRecord,
    /// First entry of `education`.
    pub education: EducationRecord,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub preferred_job_types: Vec<String>,
    pub social_links: SocialLinks,
    pub resume_sources: Vec<ResumeSource>,
    pub rewards: Rewards,
    pub deducted_points: i64,
    pub precomputed: Option<PrecomputedCompletion>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    pub current_role: Option<String>,
    pub company: Option<String>,
    pub years_of_experience: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub graduation_year: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
}

/// Reward points earned in other parts of the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    pub apply_for_jobs: i64,
    pub rm_service: i64,
}

/// Where a resume was found on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResumeSource {
    Document { reference: String },
    Url { url: String },
    Attached,
    PreferenceDocuments { count: usize },
    DocumentEntry { name: String },
}

/// A completion percentage stored by the backend alongside the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecomputedCompletion {
    /// Always within 1..=100.
    pub percentage: u8,
    pub computed_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn has_resume(&self) -> bool {
        !self.resume_sources.is_empty()
    }

    /// Returns the stored percentage unless the profile changed after it
    /// was computed. Without both timestamps the stored value is trusted.
    pub fn fresh_precomputed_percentage(&self) -> Option<u8> {
        let precomputed = self.precomputed?;
        match (precomputed.computed_at, self.updated_at) {
            (Some(computed_at), Some(updated_at)) if updated_at > computed_at => None,
            _ => Some(precomputed.percentage),
        }
    }
}
