//! UltraFace face locator via ONNX Runtime.
//!
//! Single-shot detector with two outputs: class scores `[1, N, 2]` and
//! normalized corner boxes `[1, N, 4]`. Decoding is score thresholding
//! followed by IoU non-maximum suppression; box coordinates come out
//! normalized so mapping back to frame space is a plain scale.

use crate::capability::{CapabilityError, FaceLocator};
use crate::resample;
use crate::types::FaceRegion;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;

// --- Named constants (these encode the detection policy) ---
const ULTRAFACE_INPUT_WIDTH: usize = 320;
const ULTRAFACE_INPUT_HEIGHT: usize = 240;
const ULTRAFACE_MEAN: f32 = 127.0;
const ULTRAFACE_STD: f32 = 128.0;
const ULTRAFACE_CONFIDENCE_THRESHOLD: f32 = 0.7;
const ULTRAFACE_NMS_THRESHOLD: f32 = 0.3;

/// A decoded detection in frame pixel space, pre-NMS.
#[derive(Debug, Clone)]
struct Candidate {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    confidence: f32,
}

/// UltraFace-based face locator.
pub struct OnnxFaceLocator {
    session: Session,
}

impl OnnxFaceLocator {
    /// Load the UltraFace ONNX model from the given path.
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
            "loaded UltraFace model"
        );

        Ok(Self { session })
    }

    /// Preprocess a grayscale frame into the NCHW input tensor.
    ///
    /// The frame is stretched (no letterbox) to the model input size with
    /// bilinear interpolation, channel-replicated, and normalized to the
    /// UltraFace input distribution.
    fn preprocess(frame: &[u8], width: usize, height: usize) -> Array4<f32> {
        let resized = resample::resize_bilinear(
            frame,
            width,
            height,
            ULTRAFACE_INPUT_WIDTH,
            ULTRAFACE_INPUT_HEIGHT,
        );

        let mut tensor =
            Array4::<f32>::zeros((1, 3, ULTRAFACE_INPUT_HEIGHT, ULTRAFACE_INPUT_WIDTH));
        for y in 0..ULTRAFACE_INPUT_HEIGHT {
            for x in 0..ULTRAFACE_INPUT_WIDTH {
                let pixel = resized[y * ULTRAFACE_INPUT_WIDTH + x] as f32;
                let normalized = (pixel - ULTRAFACE_MEAN) / ULTRAFACE_STD;
                // Grayscale → 3-channel: replicate Y → [R=Y, G=Y, B=Y]
                tensor[[0, 0, y, x]] = normalized;
                tensor[[0, 1, y, x]] = normalized;
                tensor[[0, 2, y, x]] = normalized;
            }
        }
        tensor
    }
}

impl FaceLocator for OnnxFaceLocator {
    /// Detect faces in a grayscale frame, returning regions sorted by
    /// confidence (highest first).
    fn locate(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<FaceRegion>, CapabilityError> {
        let expected = (width as usize) * (height as usize);
        if frame.len() < expected {
            return Err(CapabilityError::InferenceFailed(format!(
                "frame buffer too short: expected {expected}, got {}",
                frame.len()
            )));
        }

        let input = Self::preprocess(frame, width as usize, height as usize);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| CapabilityError::InferenceFailed(format!("scores: {e}")))?;
        let (_, boxes) = outputs[1]
            .try_extract_tensor::<f32>()
            .map_err(|e| CapabilityError::InferenceFailed(format!("boxes: {e}")))?;

        let candidates = decode(
            scores,
            boxes,
            width as f32,
            height as f32,
            ULTRAFACE_CONFIDENCE_THRESHOLD,
        );
        let kept = nms(candidates, ULTRAFACE_NMS_THRESHOLD);

        let mut regions: Vec<FaceRegion> = kept
            .into_iter()
            .filter_map(|c| to_region(&c, width, height))
            .collect();
        regions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(regions)
    }
}

/// Decode raw score/box tensors into frame-space candidates above the
/// confidence threshold.
///
/// `scores` is `[1, N, 2]` flattened (background, face); `boxes` is
/// `[1, N, 4]` flattened normalized corners (x1, y1, x2, y2).
fn decode(
    scores: &[f32],
    boxes: &[f32],
    frame_width: f32,
    frame_height: f32,
    threshold: f32,
) -> Vec<Candidate> {
    let num_anchors = scores.len() / 2;
    let mut candidates = Vec::new();

    for idx in 0..num_anchors {
        let confidence = scores[idx * 2 + 1];
        if confidence <= threshold {
            continue;
        }
        let off = idx * 4;
        if off + 3 >= boxes.len() {
            continue;
        }
        candidates.push(Candidate {
            x1: (boxes[off] * frame_width).max(0.0),
            y1: (boxes[off + 1] * frame_height).max(0.0),
            x2: (boxes[off + 2] * frame_width).min(frame_width),
            y2: (boxes[off + 3] * frame_height).min(frame_height),
            confidence,
        });
    }
    candidates
}

/// Intersection-over-union of two candidates.
fn iou(a: &Candidate, b: &Candidate) -> f32 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);

    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let area_a = (a.x2 - a.x1).max(0.0) * (a.y2 - a.y1).max(0.0);
    let area_b = (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0);
    let union = area_a + area_b - inter;

    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}

/// Greedy non-maximum suppression: keep the highest-confidence candidate,
/// drop everything overlapping it beyond the threshold, repeat.
fn nms(mut candidates: Vec<Candidate>, threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.iter().all(|k| iou(k, &candidate) <= threshold) {
            kept.push(candidate);
        }
    }
    kept
}

/// Convert a frame-space candidate to an integral region, discarding
/// anything that rounds to zero area.
fn to_region(c: &Candidate, frame_width: u32, frame_height: u32) -> Option<FaceRegion> {
    let x = (c.x1.round().max(0.0) as u32).min(frame_width.saturating_sub(1));
    let y = (c.y1.round().max(0.0) as u32).min(frame_height.saturating_sub(1));
    let x2 = (c.x2.round().max(0.0) as u32).min(frame_width);
    let y2 = (c.y2.round().max(0.0) as u32).min(frame_height);

    let width = x2.saturating_sub(x);
    let height = y2.saturating_sub(y);
    if width == 0 || height == 0 {
        return None;
    }

    Some(FaceRegion {
        x,
        y,
        width,
        height,
        confidence: c.confidence,
    })
}
