//! Reshape Google Video Intelligence annotation results into canonical
//! video records.
//!
//! Every function takes one entry of `response.annotationResults` and never
//! fails: missing keys collapse to empty lists or zeroes.

use serde_json::Value;

use crate::json_path::{path, path_array, path_f64, path_obj, path_str};
use crate::records::{
    ContentNsfw, FaceAttributes, LabelTimestamp, LogoTrack, ObjectFrame, ObjectTrack, ShotFrame,
    TextFrame, VideoBoundingBox, VideoFace, VideoLabel, VideoLogo, VideoRecord, VideoText,
};
use crate::video::VideoFeature;

/// Normalize one annotation result for `feature`.
pub fn normalize(feature: VideoFeature, result: &Value) -> VideoRecord {
    match feature {
        VideoFeature::LabelDetection => VideoRecord::Labels {
            labels: normalize_labels(result),
        },
        VideoFeature::TextDetection => VideoRecord::Texts {
            texts: normalize_texts(result),
        },
        VideoFeature::ShotChangeDetection => VideoRecord::ShotChanges {
            shots: normalize_shot_changes(result),
        },
        VideoFeature::ExplicitContentDetection => VideoRecord::ExplicitContent {
            moderation: normalize_explicit_content(result),
        },
        VideoFeature::LogoDetection => VideoRecord::Logos {
            logos: normalize_logos(result),
        },
        VideoFeature::ObjectTracking => VideoRecord::Objects {
            objects: normalize_objects(result),
        },
        VideoFeature::FaceDetection => VideoRecord::Faces {
            faces: normalize_faces(result),
        },
    }
}

/// Segment-level and shot-level labels, in that order.
pub fn normalize_labels(result: &Value) -> Vec<VideoLabel> {
    path_array(result, &["segmentLabelAnnotations"])
        .iter()
        .chain(path_array(result, &["shotLabelAnnotations"]))
        .map(|entity| {
            let segments = path_array(entity, &["segments"]);
            let confidences: Vec<f64> = segments
                .iter()
                .map(|s| path_f64(s, &["confidence"]).unwrap_or(0.0))
                .collect();

            VideoLabel {
                name: path_str(entity, &["entity", "description"]).unwrap_or_default(),
                category: path_array(entity, &["categoryEntities"])
                    .iter()
                    .filter_map(|c| path_str(c, &["description"]))
                    .collect(),
                confidence: mean(&confidences),
                timestamp: segments
                    .iter()
                    .map(|s| LabelTimestamp {
                        start: seconds(s, &["segment", "startTimeOffset"]),
                        end: seconds(s, &["segment", "endTimeOffset"]),
                    })
                    .collect(),
            }
        })
        .collect()
}

pub fn normalize_texts(result: &Value) -> Vec<VideoText> {
    path_array(result, &["textAnnotations"])
        .iter()
        .map(|annotation| {
            let frames = path_array(annotation, &["segments"])
                .iter()
                .flat_map(|segment| {
                    let confidence = round2(path_f64(segment, &["confidence"]).unwrap_or(0.0));
                    path_array(segment, &["frames"])
                        .iter()
                        .map(move |frame| TextFrame {
                            confidence,
                            timestamp: seconds(frame, &["timeOffset"]),
                            bounding_box: vertex_box(path_array(
                                frame,
                                &["rotatedBoundingBox", "vertices"],
                            )),
                        })
                })
                .collect();

            VideoText {
                text: path_str(annotation, &["text"]).unwrap_or_default(),
                frames,
            }
        })
        .collect()
}

pub fn normalize_shot_changes(result: &Value) -> Vec<ShotFrame> {
    path_array(result, &["shotAnnotations"])
        .iter()
        .map(|shot| ShotFrame {
            start: seconds(shot, &["startTimeOffset"]),
            end: seconds(shot, &["endTimeOffset"]),
        })
        .collect()
}

pub fn normalize_explicit_content(result: &Value) -> Vec<ContentNsfw> {
    path_array(result, &["explicitAnnotation", "frames"])
        .iter()
        .map(|frame| ContentNsfw {
            timestamp: seconds(frame, &["timeOffset"]),
            category: "Explicit Nudity".to_string(),
            confidence: f64::from(likelihood_score(
                path_str(frame, &["pornographyLikelihood"]).as_deref(),
            )) / 5.0,
        })
        .collect()
}

pub fn normalize_logos(result: &Value) -> Vec<LogoTrack> {
    path_array(result, &["logoRecognitionAnnotations"])
        .iter()
        .map(|logo| LogoTrack {
            description: path_str(logo, &["entity", "description"]).unwrap_or_default(),
            tracking: path_array(logo, &["tracks"])
                .iter()
                .flat_map(|track| {
                    let confidence = path_f64(track, &["confidence"]).unwrap_or(0.0);
                    path_array(track, &["timestampedObjects"])
                        .iter()
                        .map(move |object| VideoLogo {
                            timestamp: seconds(object, &["timeOffset"]),
                            bounding_box: normalized_box(object),
                            confidence,
                        })
                })
                .collect(),
        })
        .collect()
}

pub fn normalize_objects(result: &Value) -> Vec<ObjectTrack> {
    path_array(result, &["objectAnnotations"])
        .iter()
        .map(|object| ObjectTrack {
            description: path_str(object, &["entity", "description"]).unwrap_or_default(),
            confidence: path_f64(object, &["confidence"]).unwrap_or(0.0),
            frames: path_array(object, &["frames"])
                .iter()
                .map(|frame| ObjectFrame {
                    timestamp: seconds(frame, &["timeOffset"]),
                    bounding_box: normalized_box(frame),
                })
                .collect(),
        })
        .collect()
}

/// One face per track, taken from the track's first timestamped object.
pub fn normalize_faces(result: &Value) -> Vec<VideoFace> {
    path_array(result, &["faceDetectionAnnotations"])
        .iter()
        .flat_map(|annotation| path_array(annotation, &["tracks"]))
        .filter_map(|track| path_array(track, &["timestampedObjects"]).first())
        .map(|object| {
            let attribute = |name: &str| {
                path_array(object, &["attributes"])
                    .iter()
                    .find(|a| path_str(a, &["name"]).as_deref() == Some(name))
                    .and_then(|a| path_f64(a, &["confidence"]))
            };

            VideoFace {
                offset: seconds(object, &["timeOffset"]),
                bounding_box: normalized_box(object),
                attributes: FaceAttributes {
                    headwear: attribute("headwear"),
                    frontal_gaze: attribute("looking_at_camera"),
                    eyes_visible: attribute("eyes_visible"),
                    glasses: attribute("glasses"),
                    mouth_open: attribute("mouth_open"),
                    smiling: attribute("smiling"),
                },
            }
        })
        .collect()
}

/// Likelihood enum name to a 0-5 score.
pub fn likelihood_score(likelihood: Option<&str>) -> u8 {
    match likelihood {
        Some("VERY_UNLIKELY") => 1,
        Some("UNLIKELY") => 2,
        Some("POSSIBLE") => 3,
        Some("LIKELY") => 4,
        Some("VERY_LIKELY") => 5,
        _ => 0,
    }
}

/// A protobuf JSON duration such as `"12.500s"`, in seconds.
fn seconds(root: &Value, keys: &[&str]) -> f64 {
    path_str(root, keys)
        .and_then(|s| s.trim().trim_end_matches('s').parse().ok())
        .unwrap_or(0.0)
}

/// `normalizedBoundingBox` edges to top/left/width/height.
fn normalized_box(object: &Value) -> VideoBoundingBox {
    let bbox = path_obj(object, &["normalizedBoundingBox"]);
    let edge = |name: &str| path_f64(bbox, &[name]).unwrap_or(0.0);
    let (top, left) = (edge("top"), edge("left"));
    VideoBoundingBox {
        top,
        left,
        width: edge("right") - left,
        height: edge("bottom") - top,
    }
}

/// Box spanned by the first, second and third vertices of a rotated box.
fn vertex_box(vertices: &[Value]) -> VideoBoundingBox {
    let at = |i: usize, axis: &str| {
        vertices
            .get(i)
            .and_then(|v| path(v, &[axis]))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };
    let (left, top) = (at(0, "x"), at(0, "y"));
    VideoBoundingBox {
        top,
        left,
        width: at(1, "x") - left,
        height: at(2, "y") - top,
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
