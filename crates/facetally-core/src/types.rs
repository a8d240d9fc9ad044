use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned face rectangle in frame coordinates.
///
/// Produced by a [`FaceLocator`](crate::capability::FaceLocator) for one
/// frame and consumed within the same tick; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub confidence: f32,
}

impl FaceRegion {
    /// Clip the region to the frame bounds.
    ///
    /// Returns `None` if the region lies entirely outside the frame or
    /// degenerates to zero area after clipping.
    pub fn clamped(&self, frame_width: u32, frame_height: u32) -> Option<FaceRegion> {
        if self.x >= frame_width || self.y >= frame_height {
            return None;
        }
        let width = self.width.min(frame_width - self.x);
        let height = self.height.min(frame_height - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(FaceRegion {
            x: self.x,
            y: self.y,
            width,
            height,
            confidence: self.confidence,
        })
    }
}

/// Face embedding vector (128-dimensional for the FaceNet-style extractor).
///
/// Raw model output, deliberately not L2-normalized: the signature policy
/// quantizes the component values exactly as produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Opaque identity key for a face, derived from a quantized embedding.
///
/// Equality is the sole matching rule: two signatures either match exactly
/// or not at all. There is no similarity threshold anywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub(crate) [u8; 32]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_inside_frame() {
        let region = FaceRegion { x: 10, y: 20, width: 30, height: 40, confidence: 0.9 };
        let clamped = region.clamped(640, 480).unwrap();
        assert_eq!(clamped, region);
    }

    #[test]
    fn test_clamped_overhanging_edge() {
        let region = FaceRegion { x: 600, y: 450, width: 100, height: 100, confidence: 0.9 };
        let clamped = region.clamped(640, 480).unwrap();
        assert_eq!(clamped.width, 40);
        assert_eq!(clamped.height, 30);
    }

    #[test]
    fn test_clamped_outside_frame() {
        let region = FaceRegion { x: 700, y: 10, width: 50, height: 50, confidence: 0.9 };
        assert!(region.clamped(640, 480).is_none());
    }

    #[test]
    fn test_clamped_zero_area() {
        let region = FaceRegion { x: 10, y: 10, width: 0, height: 50, confidence: 0.9 };
        assert!(region.clamped(640, 480).is_none());
    }

    #[test]
    fn test_signature_display_is_hex() {
        let sig = Signature([0xab; 32]);
        let hex = sig.to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
