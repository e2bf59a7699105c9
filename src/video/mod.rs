//! Video analysis over vendor APIs.
//!
//! A [`VideoAnalyzer`] launches feature jobs (labels, text, shot changes,
//! explicit content, logos, objects, faces), polls them and reshapes the
//! finished result into a [`VideoRecord`](crate::records::VideoRecord). It
//! also answers questions about short videos.
//!
//! # Providers
//!
//! - [`GoogleVideoAnalyzer`] - Video Intelligence jobs and Gemini question answering

pub mod google;
mod provider;

pub use google::GoogleVideoAnalyzer;
pub use provider::{
    QuestionAnswerResponse, VideoAnalyzer, VideoFeature, VideoJob, VideoQuestion,
};
