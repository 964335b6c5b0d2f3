use axum::{extract::Path, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::profile::ResumeSource;
use crate::profile::completion::{evaluate, ProfileCompletionResult, APPLY_THRESHOLD};
use crate::profile::normalize::normalize_profile;
use crate::profile::tier::{classify_tier, Tier};

#[derive(Serialize)]
pub struct CompletionResponse {
    #[serde(flatten)]
    pub completion: ProfileCompletionResult,
    pub tier: Tier,
    /// Every place a resume was found, in lookup order.
    pub resume_sources: Vec<ResumeSource>,
}

#[derive(Serialize)]
pub struct TierResponse {
    pub percentage: u8,
    pub tier: Tier,
}

#[derive(Serialize)]
pub struct EligibilityResponse {
    pub eligible: bool,
    pub completion: ProfileCompletionResult,
}

/// POST /api/v1/profile/completion
/// Accepts any JSON document, including `null`.
pub async fn handle_profile_completion(Json(raw): Json<Value>) -> Json<CompletionResponse> {
    let profile = normalize_profile(&raw);
    let completion = evaluate(&profile);
    debug!(
        percentage = completion.percentage,
        missing = completion.missing_fields.len(),
        "Profile completion evaluated"
    );
    let tier = classify_tier(completion.percentage);
    Json(CompletionResponse {
        completion,
        tier,
        resume_sources: profile.resume_sources,
    })
}

/// GET /api/v1/profile/tier/:percentage
pub async fn handle_tier(Path(raw): Path<String>) -> Result<Json<TierResponse>, AppError> {
    let percentage = raw
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| {
            AppError::Validation(format!("percentage must be between 0 and 100, got '{raw}'"))
        })?;
    Ok(Json(TierResponse {
        percentage,
        tier: classify_tier(percentage),
    }))
}

/// POST /api/v1/applications/eligibility
/// Authoritative gate: the client-side `can_apply` flag is never trusted.
pub async fn handle_eligibility(
    Json(raw): Json<Value>,
) -> Result<Json<EligibilityResponse>, AppError> {
    let completion = evaluate(&normalize_profile(&raw));

    if !completion.can_apply {
        let mut reasons = Vec::new();
        if completion.percentage < APPLY_THRESHOLD {
            reasons.push(format!(
                "profile is {}% complete; {}% is required",
                completion.percentage, APPLY_THRESHOLD
            ));
        }
        if !completion.has_resume {
            reasons.push("a resume must be uploaded".to_string());
        }
        info!(
            percentage = completion.percentage,
            has_resume = completion.has_resume,
            "Application refused"
        );
        return Err(AppError::NotEligible(reasons.join("; ")));
    }

    Ok(Json(EligibilityResponse {
        eligible: true,
        completion,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::send;

    #[tokio::test]
    async fn test_completion_accepts_null() {
        let (status, body) = send(
            Method::POST,
            "/api/v1/profile/completion",
            Some(json!(null)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["percentage"], 0);
        assert_eq!(body["tier"], "Bronze");
        assert_eq!(body["can_apply"], false);
        assert_eq!(body["total_fields"], 24);
        assert_eq!(body["resume_sources"], json!([]));
    }

    #[tokio::test]
    async fn test_completion_uses_precomputed_value() {
        let (status, body) = send(
            Method::POST,
            "/api/v1/profile/completion",
            Some(json!({ "profileCompleted": "92", "resumeUrl": "https://cdn/cv.pdf" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["percentage"], 92);
        assert_eq!(body["tier"], "Platinum");
        assert_eq!(body["source"], "precomputed");
        assert_eq!(body["can_apply"], true);
        assert_eq!(body["points"], 234);
    }

    #[tokio::test]
    async fn test_tier_route() {
        let (status, body) = send(Method::GET, "/api/v1/profile/tier/80", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tier"], "Gold");

        let (status, body) = send(Method::GET, "/api/v1/profile/tier/101", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_tier_route_rejects_non_numeric_with_json_error() {
        for path in ["/api/v1/profile/tier/-1", "/api/v1/profile/tier/abc"] {
            let (status, body) = send(Method::GET, path, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "path {path}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "path {path}");
        }
    }

    #[tokio::test]
    async fn test_completion_reports_resume_sources() {
        let (status, body) = send(
            Method::POST,
            "/api/v1/profile/completion",
            Some(json!({
                "resumeUrl": "https://cdn/cv.pdf",
                "documents": [{ "type": "resume", "name": "Jane_CV.pdf" }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_resume"], true);
        assert_eq!(
            body["resume_sources"],
            json!([
                { "kind": "url", "url": "https://cdn/cv.pdf" },
                { "kind": "document_entry", "name": "Jane_CV.pdf" }
            ])
        );
    }

    #[tokio::test]
    async fn test_eligibility_accepts_complete_profile() {
        let (status, body) = send(
            Method::POST,
            "/api/v1/applications/eligibility",
            Some(json!({ "profileCompleted": 85, "resume": "cv.pdf" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["eligible"], true);
        assert_eq!(body["completion"]["percentage"], 85);
    }

    #[tokio::test]
    async fn test_eligibility_refuses_without_resume() {
        let (status, body) = send(
            Method::POST,
            "/api/v1/applications/eligibility",
            Some(json!({ "profileCompleted": 95 })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "NOT_ELIGIBLE");
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("resume"));
        assert!(!message.contains("complete;"));
    }

    #[tokio::test]
    async fn test_eligibility_lists_every_reason() {
        let (status, body) = send(
            Method::POST,
            "/api/v1/applications/eligibility",
            Some(json!({ "profileCompleted": 40 })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("40% complete; 80% is required"));
        assert!(message.contains("a resume must be uploaded"));
    }
}
