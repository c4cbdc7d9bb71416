//! Parsers for structured model responses.
//!
//! Grading and routing calls depend on a strict JSON contract. Responses are
//! tolerated for cosmetic noise (whitespace, Markdown code fences) but
//! rejected for structural violations: missing keys, extra keys, or values
//! outside the allowed literals. A violation is a recoverable
//! `AppError::GradeParse`, never a crash.

use clerk_core::{AppError, AppResult};
use serde::Deserialize;

/// A binary relevance or usefulness judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeScore {
    Yes,
    No,
}

impl GradeScore {
    pub fn is_yes(self) -> bool {
        matches!(self, GradeScore::Yes)
    }
}

/// Parsed grading response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub score: GradeScore,
}

/// Which backend a question should be answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Retrieval-augmented answer over the document store
    Rag,
    /// SQL answer over the configured database
    Sql,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGrade {
    score: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRoute {
    datasource: String,
}

/// Parse a grading response against the `score` contract.
pub fn parse_grade(response: &str) -> AppResult<Grade> {
    let cleaned = strip_fences(response);

    let raw: RawGrade = serde_json::from_str(cleaned)
        .map_err(|e| AppError::GradeParse(format!("{} (response: {:?})", e, response)))?;

    match raw.score.trim().to_lowercase().as_str() {
        "yes" => Ok(Grade {
            score: GradeScore::Yes,
        }),
        "no" => Ok(Grade {
            score: GradeScore::No,
        }),
        other => Err(AppError::GradeParse(format!(
            "score must be 'yes' or 'no', got {:?}",
            other
        ))),
    }
}

/// Parse a routing response against the `datasource` contract.
pub fn parse_route(response: &str) -> AppResult<Route> {
    let cleaned = strip_fences(response);

    let raw: RawRoute = serde_json::from_str(cleaned)
        .map_err(|e| AppError::GradeParse(format!("{} (response: {:?})", e, response)))?;

    match raw.datasource.trim().to_lowercase().as_str() {
        "rag" | "vectorstore" => Ok(Route::Rag),
        "sql" | "db" => Ok(Route::Sql),
        other => Err(AppError::GradeParse(format!(
            "datasource must be 'rag' or 'sql', got {:?}",
            other
        ))),
    }
}

/// Strip surrounding Markdown code fences and whitespace.
fn strip_fences(response: &str) -> &str {
    let mut text = response.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop an optional language tag on the fence line
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        text = rest.strip_suffix("```").unwrap_or(rest).trim();
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grade_yes_no() {
        assert_eq!(
            parse_grade(r#"{"score": "yes"}"#).unwrap().score,
            GradeScore::Yes
        );
        assert_eq!(
            parse_grade(r#"{"score": "no"}"#).unwrap().score,
            GradeScore::No
        );
        // Case and whitespace tolerated in the value
        assert_eq!(
            parse_grade(r#"{"score": " Yes "}"#).unwrap().score,
            GradeScore::Yes
        );
    }

    #[test]
    fn test_parse_grade_tolerates_code_fences() {
        let fenced = "```json\n{\"score\": \"yes\"}\n```";
        assert_eq!(parse_grade(fenced).unwrap().score, GradeScore::Yes);

        let bare_fence = "```\n{\"score\": \"no\"}\n```";
        assert_eq!(parse_grade(bare_fence).unwrap().score, GradeScore::No);
    }

    #[test]
    fn test_parse_grade_rejects_extra_keys() {
        let result = parse_grade(r#"{"score": "yes", "reason": "matches"}"#);
        assert!(matches!(result, Err(AppError::GradeParse(_))));
    }

    #[test]
    fn test_parse_grade_rejects_missing_score() {
        assert!(parse_grade(r#"{"grade": "yes"}"#).is_err());
        assert!(parse_grade("").is_err());
        assert!(parse_grade("the document is relevant").is_err());
    }

    #[test]
    fn test_parse_grade_rejects_other_literals() {
        assert!(parse_grade(r#"{"score": "maybe"}"#).is_err());
        assert!(parse_grade(r#"{"score": 1}"#).is_err());
    }

    #[test]
    fn test_parse_route() {
        assert_eq!(parse_route(r#"{"datasource": "rag"}"#).unwrap(), Route::Rag);
        assert_eq!(parse_route(r#"{"datasource": "sql"}"#).unwrap(), Route::Sql);
        assert_eq!(
            parse_route(r#"{"datasource": "vectorstore"}"#).unwrap(),
            Route::Rag
        );
        assert!(parse_route(r#"{"datasource": "web"}"#).is_err());
        assert!(parse_route("use the database").is_err());
    }
}
