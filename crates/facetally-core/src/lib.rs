//! facetally-core — Unique-face deduplication domain.
//!
//! Converts a stream of face detections into a stable count of distinct
//! individuals: embeddings are quantized into equality-comparable
//! signatures and tested against a session-scoped identity registry.
//! The ONNX-backed locator and extractor implement the black-box
//! capability contracts the dedup logic depends on.

pub mod capability;
pub mod extractor;
pub mod locator;
pub mod registry;
mod resample;
pub mod signature;
pub mod types;

pub use capability::{CapabilityError, EmbeddingExtractor, FaceLocator};
pub use extractor::OnnxEmbeddingExtractor;
pub use locator::OnnxFaceLocator;
pub use registry::IdentityRegistry;
pub use signature::SignatureError;
pub use types::{Embedding, FaceRegion, Signature};
