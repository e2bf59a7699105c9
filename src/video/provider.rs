//! Core trait and types for video analysis providers.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::llm::Usage;
use crate::ocr::Document;
use crate::records::{QuestionAnswerRecord, VideoRecord};

/// Analysis a video job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFeature {
    LabelDetection,
    TextDetection,
    ShotChangeDetection,
    ExplicitContentDetection,
    LogoDetection,
    ObjectTracking,
    FaceDetection,
}

impl VideoFeature {
    pub const ALL: [Self; 7] = [
        Self::LabelDetection,
        Self::TextDetection,
        Self::ShotChangeDetection,
        Self::ExplicitContentDetection,
        Self::LogoDetection,
        Self::ObjectTracking,
        Self::FaceDetection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LabelDetection => "label_detection",
            Self::TextDetection => "text_detection",
            Self::ShotChangeDetection => "shot_change_detection",
            Self::ExplicitContentDetection => "explicit_content_detection",
            Self::LogoDetection => "logo_detection",
            Self::ObjectTracking => "object_tracking",
            Self::FaceDetection => "face_detection",
        }
    }
}

impl fmt::Display for VideoFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoFeature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|feature| feature.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| Error::Configuration(format!("Unknown video feature: {s}")))
    }
}

/// State of a launched analysis job.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VideoJob {
    Pending {
        job_id: String,
    },
    Succeeded {
        job_id: String,
        original_response: serde_json::Value,
        standardized_response: VideoRecord,
    },
}

impl VideoJob {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// A question about a video.
#[derive(Debug, Clone)]
pub struct VideoQuestion {
    pub text: String,
    pub video: Document,
    pub temperature: f64,
    /// Overrides the configured model.
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionAnswerResponse {
    pub original_response: serde_json::Value,
    pub standardized_response: QuestionAnswerRecord,
    pub usage: Usage,
}

/// Trait for video analysis providers.
///
/// Feature analysis is asynchronous on the vendor side: [`launch_job`]
/// returns a job id to poll with [`job_result`] until it reports
/// [`VideoJob::Succeeded`].
///
/// [`launch_job`]: VideoAnalyzer::launch_job
/// [`job_result`]: VideoAnalyzer::job_result
#[async_trait]
pub trait VideoAnalyzer: Send + Sync + fmt::Debug {
    /// Start analysing the video at `input_uri` (a bucket URI the vendor can read).
    async fn launch_job(&self, input_uri: &str, feature: VideoFeature) -> Result<String>;

    /// Fetch the state of a job, normalizing its result once done.
    ///
    /// # Errors
    ///
    /// [`Error::Provider`] when the vendor reports the job itself failed.
    async fn job_result(&self, job_id: &str, feature: VideoFeature) -> Result<VideoJob>;

    /// Answer a question about a short video.
    async fn question_answer(&self, question: VideoQuestion) -> Result<QuestionAnswerResponse>;

    /// Get the provider name for logging and debugging.
    fn provider_name(&self) -> &'static str;
}
