//! Adapter from the backend's profile JSON to the canonical `Profile`.
//!
//! The backend has shipped several schema revisions, so some concepts live
//! under two key names (`degree` / `highestDegree`, ...). All alternates are
//! resolved here; nothing downstream looks at raw JSON.
//!
//! Normalization is total: wrong types, nulls and missing objects all
//! collapse to "absent".

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::profile::{
    EducationRecord, ExperienceRecord, PrecomputedCompletion, Profile, ResumeSource, Rewards,
    SocialLinks,
};

pub fn normalize_profile(raw: &Value) -> Profile {
    let root = Some(raw);
    let experience = first_entry(raw, "professionalExperience");
    let education = first_entry(raw, "education");
    let preferences = raw.get("jobPreferences");
    let socials = raw.get("socialLinks");
    let rewards = raw.get("rewards");

    Profile {
        full_name: text(root, &["fullName"]),
        email: text(root, &["email"]),
        phone_number: text(root, &["phoneNumber"]),
        location: text(root, &["location"]),
        date_of_birth: text(root, &["dateOfBirth"]),
        nationality: text(root, &["nationality"]),
        emirates_id: text(root, &["emiratesId"]),
        passport_number: text(root, &["passportNumber"]),
        professional_summary: text(root, &["professionalSummary"]),
        experience: ExperienceRecord {
            current_role: text(experience, &["currentRole"]),
            company: text(experience, &["company"]),
            years_of_experience: text(experience, &["yearsOfExperience"]),
            industry: text(experience, &["industry"]),
        },
        education: EducationRecord {
            degree: text(education, &["degree", "highestDegree"]),
            institution: text(education, &["institution", "institutionName"]),
            graduation_year: text(education, &["graduationYear", "yearOfGraduation"]),
            grade: text(education, &["grade", "cgpa"]),
        },
        skills: string_list(raw.get("skills")),
        certifications: string_list(raw.get("certifications")),
        preferred_job_types: string_list(preferences.and_then(|p| p.get("preferredJobType"))),
        social_links: SocialLinks {
            linkedin: text(socials, &["linkedin", "linkedIn"]),
            instagram: text(socials, &["instagram", "instagramUrl"]),
            twitter: text(socials, &["twitter", "x"]),
        },
        resume_sources: resume_sources(raw),
        rewards: Rewards {
            apply_for_jobs: number(rewards.and_then(|r| r.get("applyForJobs"))),
            rm_service: number(rewards.and_then(|r| r.get("rmService"))),
        },
        deducted_points: number(raw.get("deductedPoints")),
        precomputed: precomputed(raw),
        updated_at: timestamp(raw.get("updatedAt")),
    }
}

fn first_entry<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get(key).and_then(Value::as_array).and_then(|a| a.first())
}

/// First alternate key holding a usable value wins.
fn text(obj: Option<&Value>, keys: &[&str]) -> Option<String> {
    let obj = obj?;
    keys.iter().find_map(|k| obj.get(*k).and_then(as_text))
}

/// Non-blank strings and non-zero numbers count as text.
fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => non_blank(s),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn non_blank_str(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str).and_then(non_blank)
}

fn string_list(v: Option<&Value>) -> Vec<String> {
    let Some(items) = v.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(_) => text(Some(item), &["name", "title"]),
            other => as_text(other),
        })
        .collect()
}

/// Numbers or numeric strings, rounded; anything else is 0.
fn number(v: Option<&Value>) -> i64 {
    let parsed = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|f| f.is_finite())
        .map(|f| f.round() as i64)
        .unwrap_or(0)
}

fn timestamp(v: Option<&Value>) -> Option<DateTime<Utc>> {
    v.and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn precomputed(raw: &Value) -> Option<PrecomputedCompletion> {
    let percentage = match raw.get("profileCompleted")? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64),
        Value::String(s) => leading_integer(s),
        _ => None,
    }?;
    if percentage <= 0 {
        return None;
    }
    Some(PrecomputedCompletion {
        percentage: percentage.min(100) as u8,
        computed_at: timestamp(raw.get("profileCompletedAt")),
    })
}

/// Parses the integer prefix of `s`, so `" 85%"` and `"85.6"` both give 85.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let value = digits.parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// JavaScript-style truthiness, except that whitespace-only strings are falsy.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn resume_sources(raw: &Value) -> Vec<ResumeSource> {
    let mut sources = Vec::new();

    if let Some(reference) = non_blank_str(raw.get("resumeDocument")) {
        sources.push(ResumeSource::Document { reference });
    }
    if let Some(url) = non_blank_str(raw.get("resumeUrl")) {
        sources.push(ResumeSource::Url { url });
    }
    if raw.get("resume").is_some_and(is_truthy) {
        sources.push(ResumeSource::Attached);
    }

    let preference_docs = raw
        .get("jobPreferences")
        .and_then(|p| p.get("resumeAndDocs"))
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    if preference_docs > 0 {
        sources.push(ResumeSource::PreferenceDocuments {
            count: preference_docs,
        });
    }

    if let Some(documents) = raw.get("documents").and_then(Value::as_array) {
        for doc in documents {
            let doc_type = doc.get("type").and_then(Value::as_str).unwrap_or_default();
            let name = doc.get("name").and_then(Value::as_str).unwrap_or_default();
            let lower_name = name.to_lowercase();
            if doc_type.eq_ignore_ascii_case("resume")
                || lower_name.contains("resume")
                || lower_name.contains("cv")
            {
                let label = if name.trim().is_empty() { doc_type } else { name };
                sources.push(ResumeSource::DocumentEntry {
                    name: label.trim().to_string(),
                });
            }
        }
    }

    sources
}
