//! Black Forest Labs image API client
//!
//! `POST {base}/v1/{model}` submits a job and returns its id;
//! `GET {base}/v1/get_result?id=` reports status and, once ready, the sample URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{ImageClient, ImageError, JobId, JobStatus, Status};
use crate::config::ImageConfig;

/// BFL API client
pub struct BflClient {
    model: String,
    api_key: String,
    base_url: String,
    width: u32,
    height: u32,
    http: Client,
}

impl BflClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in the config.
    pub fn from_config(config: &ImageConfig) -> Result<Self, ImageError> {
        debug!(model = %config.model, "from_config: called");
        let api_key = config
            .api_key()
            .ok_or_else(|| ImageError::MissingApiKey(config.api_key_env.clone()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(ImageError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            width: config.width,
            height: config.height,
            http,
        })
    }

    fn build_submit_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "prompt": prompt,
            "width": self.width,
            "height": self.height,
        })
    }
}

/// Extract the job id from a submit response
fn parse_submit_response(body: &str) -> Result<JobId, ImageError> {
    let response: SubmitResponse =
        serde_json::from_str(body).map_err(|_| ImageError::MissingJobId(body.to_string()))?;
    match response.id {
        Some(id) if !id.is_empty() => Ok(JobId(id)),
        _ => Err(ImageError::MissingJobId(body.to_string())),
    }
}

fn parse_result_response(response: ResultResponse) -> JobStatus {
    JobStatus {
        status: Status::parse(&response.status),
        sample: response.result.and_then(|r| r.sample),
    }
}

#[async_trait]
impl ImageClient for BflClient {
    async fn submit(&self, prompt: &str) -> Result<JobId, ImageError> {
        debug!(%self.model, prompt_len = prompt.len(), "submit: called");
        let url = format!("{}/v1/{}", self.base_url, self.model);

        let response = self
            .http
            .post(url)
            .header("x-key", &self.api_key)
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .json(&self.build_submit_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "submit: API error");
            return Err(ImageError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let job = parse_submit_response(&text)?;
        debug!(%job, "submit: accepted");
        Ok(job)
    }

    async fn poll(&self, job: &JobId) -> Result<JobStatus, ImageError> {
        debug!(%job, "poll: called");
        let url = format!("{}/v1/get_result?id={}", self.base_url, job);

        let response = self
            .http
            .get(url)
            .header("x-key", &self.api_key)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ResultResponse = response
            .json()
            .await
            .map_err(|e| ImageError::InvalidResponse(e.to_string()))?;
        let job_status = parse_result_response(body);
        debug!(status = ?job_status.status, "poll: done");
        Ok(job_status)
    }
}

// BFL response types

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultResponse {
    status: String,
    result: Option<ResultPayload>,
}

#[derive(Debug, Deserialize)]
struct ResultPayload {
    sample: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BflClient {
        BflClient {
            model: "flux-pro-1.1".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://api.us1.bfl.ai".to_string(),
            width: 1024,
            height: 1024,
            http: Client::new(),
        }
    }

    #[test]
    fn test_submit_body() {
        let body = client().build_submit_body("a chair");
        assert_eq!(body["prompt"], "a chair");
        assert_eq!(body["width"], 1024);
        assert_eq!(body["height"], 1024);
    }

    #[test]
    fn test_parse_submit_response() {
        let job = parse_submit_response(r#"{"id": "abc-123", "polling_url": "x"}"#).unwrap();
        assert_eq!(job, JobId("abc-123".to_string()));
    }

    #[test]
    fn test_parse_submit_response_without_id() {
        let err = parse_submit_response(r#"{"detail": "Not authenticated"}"#).unwrap_err();
        assert!(matches!(err, ImageError::MissingJobId(_)));

        let err = parse_submit_response("not json").unwrap_err();
        assert!(matches!(err, ImageError::MissingJobId(_)));
    }

    #[test]
    fn test_parse_result_ready() {
        let response: ResultResponse = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "status": "Ready",
            "result": { "sample": "https://cdn.example/abc.jpg", "prompt": "a chair" }
        }))
        .unwrap();
        let status = parse_result_response(response);
        assert_eq!(status, JobStatus::ready("https://cdn.example/abc.jpg"));
    }

    #[test]
    fn test_parse_result_pending() {
        let response: ResultResponse =
            serde_json::from_value(serde_json::json!({ "id": "abc", "status": "Pending", "result": null })).unwrap();
        assert_eq!(parse_result_response(response), JobStatus::pending());
    }
}
