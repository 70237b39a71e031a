//! `depthsight-extract` – obstacle extraction.
//!
//! The decision core of the pipeline: given a depth frame and the candidate
//! regions segmented from it, decide which candidates are real obstacles and
//! compute each one's world position and physical diameter.
//!
//! # Modules
//!
//! - [`extractor`] – [`ObstacleExtractor`][extractor::ObstacleExtractor]: the
//!   per-candidate accept/reject pipeline, its tunable bounds
//!   ([`ExtractorConfig`][extractor::ExtractorConfig]), and the typed
//!   per-candidate failure ([`CandidateError`][extractor::CandidateError]).

pub mod extractor;

pub use extractor::{CandidateError, ExtractorConfig, ObstacleDetection, ObstacleExtractor};
