//! Canonical video analysis records.
//!
//! Timestamps and offsets are seconds from the start of the video. Bounding
//! boxes are normalized to `0.0..=1.0` of the frame, except for text frames
//! which carry the vendor's vertex coordinates as-is.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoBoundingBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// A label seen over one or more segments of the video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoLabel {
    pub name: String,
    pub category: Vec<String>,
    /// Mean confidence over every segment.
    pub confidence: f64,
    pub timestamp: Vec<LabelTimestamp>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelTimestamp {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoText {
    pub text: String,
    pub frames: Vec<TextFrame>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFrame {
    pub confidence: f64,
    pub timestamp: f64,
    pub bounding_box: VideoBoundingBox,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotFrame {
    pub start: f64,
    pub end: f64,
}

/// One frame judged for explicit content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentNsfw {
    pub timestamp: f64,
    pub category: String,
    /// Likelihood mapped onto `0.0..=1.0`.
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogoTrack {
    pub description: String,
    pub tracking: Vec<VideoLogo>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoLogo {
    pub timestamp: f64,
    pub bounding_box: VideoBoundingBox,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectTrack {
    pub description: String,
    pub confidence: f64,
    pub frames: Vec<ObjectFrame>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectFrame {
    pub timestamp: f64,
    pub bounding_box: VideoBoundingBox,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoFace {
    pub offset: f64,
    pub bounding_box: VideoBoundingBox,
    pub attributes: FaceAttributes,
}

/// Attribute confidences; `None` when the vendor did not report one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceAttributes {
    pub headwear: Option<f64>,
    pub frontal_gaze: Option<f64>,
    pub eyes_visible: Option<f64>,
    pub glasses: Option<f64>,
    pub mouth_open: Option<f64>,
    pub smiling: Option<f64>,
}

/// The answer to a question asked about a video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswerRecord {
    pub answer: String,
}

/// One finished analysis job, tagged with its feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "feature", rename_all = "snake_case")]
pub enum VideoRecord {
    Labels { labels: Vec<VideoLabel> },
    Texts { texts: Vec<VideoText> },
    ShotChanges { shots: Vec<ShotFrame> },
    ExplicitContent { moderation: Vec<ContentNsfw> },
    Logos { logos: Vec<LogoTrack> },
    Objects { objects: Vec<ObjectTrack> },
    Faces { faces: Vec<VideoFace> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_tagged_by_feature() {
        let record = VideoRecord::ShotChanges {
            shots: vec![ShotFrame { start: 0.0, end: 1.5 }],
        };
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["feature"], "shot_changes");
        assert_eq!(v["shots"][0]["end"], 1.5);
    }
}
