//! FaceNet-style embedding extractor via ONNX Runtime.
//!
//! Crops the detected region out of the frame, resizes to the model input
//! and produces a 128-dimensional identity embedding. The output is left
//! un-normalized on purpose: the signature policy quantizes raw component
//! values, and rescaling them would change which faces match.

use crate::capability::{CapabilityError, EmbeddingExtractor};
use crate::resample;
use crate::types::{Embedding, FaceRegion};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;

// --- Named constants ---
const FACENET_INPUT_SIZE: usize = 160;
const FACENET_MEAN: f32 = 127.5;
const FACENET_STD: f32 = 128.0;
const FACENET_EMBEDDING_DIM: usize = 128;

/// FaceNet-based embedding extractor.
pub struct OnnxEmbeddingExtractor {
    session: Session,
}

impl OnnxEmbeddingExtractor {
    /// Load the FaceNet ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, CapabilityError> {
        if !Path::new(model_path).exists() {
            return Err(CapabilityError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded FaceNet model"
        );

        Ok(Self { session })
    }

    /// Preprocess a square face crop into the NCHW input tensor.
    fn preprocess(face: &[u8]) -> Array4<f32> {
        let size = FACENET_INPUT_SIZE;
        let mut tensor = Array4::<f32>::zeros((1, 3, size, size));

        for y in 0..size {
            for x in 0..size {
                let pixel = face.get(y * size + x).copied().unwrap_or(0) as f32;
                let normalized = (pixel - FACENET_MEAN) / FACENET_STD;
                // Grayscale → 3-channel: replicate Y → [R=Y, G=Y, B=Y]
                tensor[[0, 0, y, x]] = normalized;
                tensor[[0, 1, y, x]] = normalized;
                tensor[[0, 2, y, x]] = normalized;
            }
        }
        tensor
    }
}

impl EmbeddingExtractor for OnnxEmbeddingExtractor {
    fn extract(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
        region: &FaceRegion,
    ) -> Result<Embedding, CapabilityError> {
        let clipped = region
            .clamped(width, height)
            .ok_or(CapabilityError::DegenerateRegion {
                frame_width: width,
                frame_height: height,
            })?;

        let crop = resample::crop(
            frame,
            width as usize,
            clipped.x as usize,
            clipped.y as usize,
            clipped.width as usize,
            clipped.height as usize,
        );
        let resized = resample::resize_bilinear(
            &crop,
            clipped.width as usize,
            clipped.height as usize,
            FACENET_INPUT_SIZE,
            FACENET_INPUT_SIZE,
        );

        let input = Self::preprocess(&resized);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, raw) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| CapabilityError::InferenceFailed(format!("embedding extraction: {e}")))?;

        if raw.len() != FACENET_EMBEDDING_DIM {
            return Err(CapabilityError::InferenceFailed(format!(
                "expected {FACENET_EMBEDDING_DIM}-dim embedding, got {}",
                raw.len()
            )));
        }

        Ok(Embedding::new(raw.to_vec()))
    }
}
