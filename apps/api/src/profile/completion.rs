use serde::{Deserialize, Serialize};

use crate::models::profile::{Profile, Rewards};

/// Size of the completion checklist.
pub const TOTAL_FIELDS: u32 = 24;
/// Minimum completion percentage required to apply for jobs.
pub const APPLY_THRESHOLD: u8 = 80;

const BASE_POINTS: i64 = 50;
const POINTS_PER_PERCENT: i64 = 2;

const RESUME_LABEL: &str = "Resume";
const RESUME_REQUIRED_LABEL: &str = "Resume (required to apply)";

/// Which path produced the percentage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionSource {
    /// Walked the checklist field by field.
    Computed,
    /// Trusted the percentage stored on the profile.
    Precomputed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileCompletionResult {
    pub percentage: u8,
    pub points: u64,
    /// Back-computed from `percentage` when `source` is `Precomputed`.
    pub completed_fields: u32,
    pub total_fields: u32,
    pub missing_fields: Vec<String>,
    pub has_resume: bool,
    /// Advisory only. The eligibility endpoint re-evaluates server-side.
    pub can_apply: bool,
    pub source: CompletionSource,
}

/// The checklist in display order. The resume criterion is always last.
fn criteria(p: &Profile) -> [(&'static str, bool); TOTAL_FIELDS as usize] {
    [
        ("Full Name", p.full_name.is_some()),
        ("Email", p.email.is_some()),
        ("Phone Number", p.phone_number.is_some()),
        ("Location", p.location.is_some()),
        ("Date of Birth", p.date_of_birth.is_some()),
        ("Nationality", p.nationality.is_some()),
        ("Emirates ID", p.emirates_id.is_some()),
        ("Passport Number", p.passport_number.is_some()),
        ("Professional Summary", p.professional_summary.is_some()),
        ("Current Role", p.experience.current_role.is_some()),
        ("Company", p.experience.company.is_some()),
        ("Years of Experience", p.experience.years_of_experience.is_some()),
        ("Industry", p.experience.industry.is_some()),
        ("Degree", p.education.degree.is_some()),
        ("Institution", p.education.institution.is_some()),
        ("Graduation Year", p.education.graduation_year.is_some()),
        ("Grade / CGPA", p.education.grade.is_some()),
        ("Skills", !p.skills.is_empty()),
        ("Job Preferences", !p.preferred_job_types.is_empty()),
        ("Certifications", !p.certifications.is_empty()),
        ("LinkedIn", p.social_links.linkedin.is_some()),
        ("Instagram", p.social_links.instagram.is_some()),
        ("Twitter / X", p.social_links.twitter.is_some()),
        (RESUME_LABEL, p.has_resume()),
    ]
}

/// Scores a profile. Pure and total: sparse profiles just score lower.
pub fn evaluate(profile: &Profile) -> ProfileCompletionResult {
    let has_resume = profile.has_resume();

    let (percentage, completed_fields, missing_fields, source) =
        match profile.fresh_precomputed_percentage() {
            Some(percentage) => {
                let mut missing = Vec::new();
                if !has_resume {
                    missing.push(RESUME_REQUIRED_LABEL.to_string());
                }
                if percentage < APPLY_THRESHOLD {
                    missing.extend(
                        criteria(profile)
                            .into_iter()
                            .filter(|(label, met)| !met && *label != RESUME_LABEL)
                            .map(|(label, _)| label.to_string()),
                    );
                }
                let completed =
                    (f64::from(percentage) * f64::from(TOTAL_FIELDS) / 100.0).round() as u32;
                (percentage, completed, missing, CompletionSource::Precomputed)
            }
            None => {
                let mut completed = 0_u32;
                let mut missing = Vec::new();
                for (label, met) in criteria(profile) {
                    if met {
                        completed += 1;
                    } else {
                        missing.push(label.to_string());
                    }
                }
                let percentage =
                    (f64::from(completed) / f64::from(TOTAL_FIELDS) * 100.0).round() as u8;
                (percentage, completed, missing, CompletionSource::Computed)
            }
        };

    ProfileCompletionResult {
        percentage,
        points: compute_points(percentage, profile.rewards, profile.deducted_points),
        completed_fields,
        total_fields: TOTAL_FIELDS,
        missing_fields,
        has_resume,
        can_apply: can_apply(percentage, has_resume),
        source,
    }
}

/// `50 + 2 × percentage + earned rewards − spent points`, floored at 0.
pub fn compute_points(percentage: u8, rewards: Rewards, deducted: i64) -> u64 {
    let balance = BASE_POINTS
        .saturating_add(POINTS_PER_PERCENT * i64::from(percentage))
        .saturating_add(rewards.apply_for_jobs)
        .saturating_add(rewards.rm_service)
        .saturating_sub(deducted);
    balance.max(0) as u64
}

/// Completion alone is not enough; a resume must be on file too.
pub fn can_apply(percentage: u8, has_resume: bool) -> bool {
    percentage >= APPLY_THRESHOLD && has_resume
}
