//! HTTP client for the external code-execution service.
//!
//! The service evaluates submitted code and decides success; this client
//! treats its responses as opaque trusted inputs and only surfaces
//! transport/parse failures to the caller.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Outcome of a `run` call (evaluation without submission)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub success: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub execution_time_ms: Option<u64>,
}

/// Outcome of a `submit` call; `xp_earned` is awarded by the service
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub success: bool,
    #[serde(default)]
    pub xp_earned: u32,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub execution_time_ms: Option<u64>,
}

/// Client for the execution service's exercise endpoints
pub struct ExecutionClient {
    base_url: String,
    client: ureq::Agent,
}

impl ExecutionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Run code against an exercise without submitting it
    pub fn run(&self, exercise_id: u64, code: &str) -> Result<RunOutcome> {
        let url = format!("{}/exercises/{}/run", self.base_url, exercise_id);

        #[derive(serde::Serialize)]
        struct Body<'a> {
            code: &'a str,
        }

        self.client
            .post(&url)
            .send_json(Body { code })
            .context("Failed to run exercise")?
            .into_json()
            .context("Failed to parse run response")
    }

    /// Submit code for evaluation; success triggers the ledger pipeline
    pub fn submit(&self, exercise_id: u64, code: &str) -> Result<SubmitOutcome> {
        let url = format!("{}/exercises/{}/submit", self.base_url, exercise_id);

        #[derive(serde::Serialize)]
        struct Body<'a> {
            code: &'a str,
        }

        self.client
            .post(&url)
            .send_json(Body { code })
            .context("Failed to submit exercise")?
            .into_json()
            .context("Failed to parse submit response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_outcome_deserializes_camel_case() {
        let json = r#"{
            "success": true,
            "xpEarned": 15,
            "output": "All tests passed",
            "executionTimeMs": 250
        }"#;
        let outcome: SubmitOutcome = serde_json::from_str(json).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.xp_earned, 15);
        assert_eq!(outcome.execution_time_ms, Some(250));
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn test_run_outcome_defaults_optional_fields() {
        let json = r#"{"success": false, "error": "compile error"}"#;
        let outcome: RunOutcome = serde_json::from_str(json).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("compile error"));
        assert_eq!(outcome.execution_time_ms, None);
        assert_eq!(outcome.output, "");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ExecutionClient::new("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
