//! Black-box capability contracts the dedup core relies on.
//!
//! The locator and extractor are external model capabilities: the core only
//! depends on these traits and on the error taxonomy below. Production
//! implementations live in [`crate::locator`] and [`crate::extractor`].

use crate::types::{Embedding, FaceRegion};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("face region degenerates to zero area within a {frame_width}x{frame_height} frame")]
    DegenerateRegion { frame_width: u32, frame_height: u32 },
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Given a grayscale frame, return zero or more face regions.
pub trait FaceLocator {
    fn locate(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<FaceRegion>, CapabilityError>;
}

/// Given a face region within a grayscale frame, return a fixed-length
/// identity embedding.
pub trait EmbeddingExtractor {
    fn extract(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
        region: &FaceRegion,
    ) -> Result<Embedding, CapabilityError>;
}
