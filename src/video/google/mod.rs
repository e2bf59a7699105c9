//! Google video analysis.
//!
//! Feature jobs run on the Video Intelligence API as long-running
//! operations: `videos:annotate` returns an operation name that is polled
//! until `done`. Question answering uploads the video to the Gemini file
//! API and asks `generateContent` about it.

pub mod normalize;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::provider::{
    QuestionAnswerResponse, VideoAnalyzer, VideoFeature, VideoJob, VideoQuestion,
};
use crate::config::GoogleConfig;
use crate::error::{Error, Result};
use crate::json_path::{first, path, path_obj, path_str};
use crate::llm::Usage;
use crate::records::QuestionAnswerRecord;

pub use normalize::normalize;

/// Vendor identifier used by the registry and the keys file.
pub const PROVIDER: &str = "google";

/// Largest video accepted for synchronous question answering.
pub const MAX_QUESTION_VIDEO_BYTES: usize = 20 * 1024 * 1024;

const FILE_POLL_ATTEMPTS: u32 = 12;

#[derive(Debug)]
pub struct GoogleVideoAnalyzer {
    client: reqwest::Client,
    config: GoogleConfig,
    poll_interval: Duration,
}

impl GoogleVideoAnalyzer {
    pub fn new(config: GoogleConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            config,
            poll_interval: Duration::from_secs(5),
        }
    }

    /// Delay between checks while an uploaded file is still processing.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Check if either API has credentials.
    pub fn is_configured(&self) -> bool {
        self.access_token().is_ok() || self.genai_key().is_ok()
    }

    fn access_token(&self) -> Result<&str> {
        self.config
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Configuration("Google access token not configured".to_string()))
    }

    fn genai_key(&self) -> Result<&str> {
        self.config
            .genai_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Configuration("Google genai_api_key not configured".to_string()))
    }

    fn video_url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.video_base_url.trim_end_matches('/'))
    }

    fn genai_url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.genai_base_url.trim_end_matches('/'))
    }

    /// Upload the video to the file API and wait until it is usable.
    async fn upload_file(&self, question: &VideoQuestion, api_key: &str) -> Result<Value> {
        let part = reqwest::multipart::Part::bytes(question.video.bytes.clone())
            .file_name(question.video.file_name.clone())
            .mime_str(&question.video.mime_type)?;

        let response = self
            .client
            .post(self.genai_url("upload/v1beta/files"))
            .query(&[("key", api_key)])
            .multipart(reqwest::multipart::Form::new().part("file", part))
            .send()
            .await?;
        let body = crate::http::read_json(PROVIDER, response).await?;
        let mut file = path(&body, &["file"])
            .cloned()
            .ok_or_else(|| missing("file upload", "file", &body))?;

        for _ in 0..FILE_POLL_ATTEMPTS {
            match path_str(&file, &["state"]).as_deref() {
                Some("PROCESSING") => {}
                Some("FAILED") => {
                    return Err(Error::Provider {
                        status: 500,
                        message: format!("Video processing failed: {file}"),
                    });
                }
                _ => return Ok(file),
            }

            tracing::debug!(provider = PROVIDER, "Uploaded video still processing");
            tokio::time::sleep(self.poll_interval).await;

            let uri = path_str(&file, &["uri"]).ok_or_else(|| missing("file upload", "uri", &file))?;
            let response = self
                .client
                .get(uri)
                .query(&[("key", api_key)])
                .send()
                .await?;
            file = crate::http::read_json(PROVIDER, response).await?;
        }

        Err(Error::Provider {
            status: 504,
            message: format!(
                "Video still processing after {FILE_POLL_ATTEMPTS} checks: {}",
                path_str(&file, &["name"]).unwrap_or_default()
            ),
        })
    }
}

#[async_trait]
impl VideoAnalyzer for GoogleVideoAnalyzer {
    async fn launch_job(&self, input_uri: &str, feature: VideoFeature) -> Result<String> {
        let token = self.access_token()?;
        tracing::info!(
            provider = PROVIDER,
            feature = %feature,
            input_uri = input_uri,
            "Launching video job"
        );

        let response = self
            .client
            .post(self.video_url("videos:annotate"))
            .bearer_auth(token)
            .json(&annotate_body(input_uri, feature))
            .send()
            .await?;
        let body = crate::http::read_json(PROVIDER, response).await?;

        path_str(&body, &["name"]).ok_or_else(|| missing("videos:annotate", "name", &body))
    }

    async fn job_result(&self, job_id: &str, feature: VideoFeature) -> Result<VideoJob> {
        let token = self.access_token()?;
        let response = self
            .client
            .get(self.video_url(job_id))
            .bearer_auth(token)
            .send()
            .await?;
        let operation = crate::http::read_json(PROVIDER, response).await?;

        let job = parse_operation(job_id, feature, operation)?;
        tracing::debug!(
            provider = PROVIDER,
            job_id = job_id,
            feature = %feature,
            done = job.is_done(),
            "Video job polled"
        );
        Ok(job)
    }

    async fn question_answer(&self, question: VideoQuestion) -> Result<QuestionAnswerResponse> {
        let api_key = self.genai_key()?;
        if question.video.bytes.len() >= MAX_QUESTION_VIDEO_BYTES {
            return Err(Error::Configuration(format!(
                "The video file is too large ({} bytes, limit {MAX_QUESTION_VIDEO_BYTES})",
                question.video.bytes.len()
            )));
        }

        let model = question.model.as_deref().unwrap_or(&self.config.genai_model);
        tracing::info!(
            provider = PROVIDER,
            model = model,
            file_name = %question.video.file_name,
            size = question.video.bytes.len(),
            "Asking about video"
        );

        let file = self.upload_file(&question, api_key).await?;
        let response = self
            .client
            .post(self.genai_url(&format!("v1beta/models/{model}:generateContent")))
            .query(&[("key", api_key)])
            .json(&question_body(&question, &file))
            .send()
            .await?;
        let original_response = crate::http::read_json(PROVIDER, response).await?;

        parse_answer(original_response)
    }

    fn provider_name(&self) -> &'static str {
        "Google"
    }
}

/// Request body for `videos:annotate`.
fn annotate_body(input_uri: &str, feature: VideoFeature) -> Value {
    let mut body = json!({
        "inputUri": input_uri,
        "features": [annotation_feature(feature)],
    });

    let context = match feature {
        VideoFeature::FaceDetection => Some(json!({
            "faceDetectionConfig": {"includeBoundingBoxes": true, "includeAttributes": true}
        })),
        _ => None,
    };
    if let Some(context) = context {
        body["videoContext"] = context;
    }
    body
}

fn annotation_feature(feature: VideoFeature) -> &'static str {
    match feature {
        VideoFeature::LabelDetection => "LABEL_DETECTION",
        VideoFeature::TextDetection => "TEXT_DETECTION",
        VideoFeature::ShotChangeDetection => "SHOT_CHANGE_DETECTION",
        VideoFeature::ExplicitContentDetection => "EXPLICIT_CONTENT_DETECTION",
        VideoFeature::LogoDetection => "LOGO_RECOGNITION",
        VideoFeature::ObjectTracking => "OBJECT_TRACKING",
        VideoFeature::FaceDetection => "FACE_DETECTION",
    }
}

/// Map a polled operation onto a job state.
fn parse_operation(job_id: &str, feature: VideoFeature, operation: Value) -> Result<VideoJob> {
    if let Some(error) = path(&operation, &["error"]) {
        return Err(Error::Provider {
            status: 400,
            message: path_str(error, &["message"]).unwrap_or_else(|| error.to_string()),
        });
    }

    if path(&operation, &["done"]).and_then(Value::as_bool) != Some(true) {
        return Ok(VideoJob::Pending {
            job_id: job_id.to_string(),
        });
    }

    let original_response = path(&operation, &["response"]).cloned().unwrap_or_default();
    let standardized_response = normalize(feature, first(&original_response, &["annotationResults"]));

    Ok(VideoJob::Succeeded {
        job_id: job_id.to_string(),
        original_response,
        standardized_response,
    })
}

fn question_body(question: &VideoQuestion, file: &Value) -> Value {
    json!({
        "contents": [{
            "parts": [
                {"text": question.text},
                {"file_data": {
                    "mime_type": path_str(file, &["mimeType"]).unwrap_or_else(|| question.video.mime_type.clone()),
                    "file_uri": path_str(file, &["uri"]),
                }}
            ]
        }],
        "generationConfig": {"candidateCount": 1, "temperature": question.temperature},
    })
}

fn parse_answer(original_response: Value) -> Result<QuestionAnswerResponse> {
    let answer = path_str(
        first(path_obj(first(&original_response, &["candidates"]), &["content"]), &["parts"]),
        &["text"],
    )
    .ok_or_else(|| missing("generateContent", "candidates[0].content.parts[0].text", &original_response))?;

    let count = |key: &str| path(&original_response, &["usageMetadata", key]).and_then(Value::as_u64);
    let usage = Usage {
        prompt_tokens: count("promptTokenCount"),
        completion_tokens: count("candidatesTokenCount"),
        total_tokens: count("totalTokenCount"),
    };

    Ok(QuestionAnswerResponse {
        standardized_response: QuestionAnswerRecord { answer },
        usage,
        original_response,
    })
}

fn missing(call: &str, field: &str, body: &Value) -> Error {
    Error::Provider {
        status: 500,
        message: format!("{call} response has no {field}: {body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ShotFrame, VideoRecord};

    fn config(token: Option<&str>, key: Option<&str>) -> GoogleConfig {
        GoogleConfig {
            access_token: token.map(ToString::to_string),
            genai_api_key: key.map(ToString::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_configured() {
        let client = reqwest::Client::new();
        assert!(GoogleVideoAnalyzer::new(config(Some("t"), None), client.clone()).is_configured());
        assert!(GoogleVideoAnalyzer::new(config(None, Some("k")), client.clone()).is_configured());
        assert!(!GoogleVideoAnalyzer::new(config(Some(""), None), client).is_configured());
    }

    #[test]
    fn test_annotate_body() {
        let body = annotate_body("gs://videos/a.mp4", VideoFeature::LogoDetection);
        assert_eq!(body["features"], json!(["LOGO_RECOGNITION"]));
        assert!(body.get("videoContext").is_none());

        let body = annotate_body("gs://videos/a.mp4", VideoFeature::FaceDetection);
        assert_eq!(body["inputUri"], "gs://videos/a.mp4");
        assert_eq!(
            body["videoContext"]["faceDetectionConfig"]["includeAttributes"],
            true
        );
    }

    #[test]
    fn test_operation_states() {
        let pending = parse_operation("op", VideoFeature::ShotChangeDetection, json!({"name": "op"}))
            .unwrap();
        assert!(!pending.is_done());

        let done = parse_operation(
            "op",
            VideoFeature::ShotChangeDetection,
            json!({
                "done": true,
                "response": {"annotationResults": [{
                    "shotAnnotations": [{"startTimeOffset": "0s", "endTimeOffset": "2.5s"}]
                }]}
            }),
        )
        .unwrap();
        match done {
            VideoJob::Succeeded {
                standardized_response: VideoRecord::ShotChanges { shots },
                original_response,
                ..
            } => {
                assert_eq!(shots, vec![ShotFrame { start: 0.0, end: 2.5 }]);
                assert!(original_response.get("annotationResults").is_some());
            }
            other => panic!("unexpected job: {other:?}"),
        }
    }

    #[test]
    fn test_failed_operation_is_provider_error() {
        let err = parse_operation(
            "op",
            VideoFeature::ExplicitContentDetection,
            json!({"done": true, "error": {"code": 3, "message": "Invalid input URI"}}),
        )
        .unwrap_err();
        match err {
            Error::Provider { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid input URI");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_answer() {
        let response = parse_answer(json!({
            "candidates": [{"content": {"parts": [{"text": "A cat jumps."}], "role": "model"}}],
            "usageMetadata": {"promptTokenCount": 310, "candidatesTokenCount": 4, "totalTokenCount": 314}
        }))
        .unwrap();
        assert_eq!(response.standardized_response.answer, "A cat jumps.");
        assert_eq!(response.usage.total_tokens, Some(314));

        assert!(matches!(
            parse_answer(json!({"candidates": []})),
            Err(Error::Provider { status: 500, .. })
        ));
    }
}
