//! Frame type, YUYV conversion and bounding-box annotation.

/// A captured grayscale camera frame.
#[derive(Clone)]
pub struct Frame {
    /// Grayscale pixel data (width * height bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
}

impl Frame {
    /// Average pixel brightness (0.0–255.0).
    pub fn avg_brightness(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&b| b as f32).sum::<f32>() / self.data.len() as f32
    }
}

/// Convert packed YUYV (4:2:2) to grayscale by extracting the Y channel.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V].
/// Grayscale = every even-indexed byte.
pub fn yuyv_to_grayscale(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height * 2) as usize;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }
    Ok(yuyv[..expected].iter().step_by(2).copied().collect())
}

/// Outline thickness in pixels for [`draw_region`].
const REGION_OUTLINE_PX: u32 = 2;
/// Outline intensity (white on grayscale frames).
const REGION_OUTLINE_VALUE: u8 = 255;

/// Draw a rectangle outline onto a grayscale frame.
///
/// Edges falling outside the frame are clipped; a rectangle entirely
/// off-frame draws nothing. The outline grows inward so the marked region
/// never exceeds the requested bounds.
pub fn draw_region(frame: &mut Frame, x: u32, y: u32, width: u32, height: u32) {
    let fw = frame.width;
    let fh = frame.height;
    if x >= fw || y >= fh || width == 0 || height == 0 {
        return;
    }

    let x2 = (x + width).min(fw);
    let y2 = (y + height).min(fh);
    let thickness = REGION_OUTLINE_PX.min(width).min(height);

    for row in y..y2 {
        for col in x..x2 {
            let on_horizontal_edge = row < y + thickness || row >= y2.saturating_sub(thickness);
            let on_vertical_edge = col < x + thickness || col >= x2.saturating_sub(thickness);
            if on_horizontal_edge || on_vertical_edge {
                frame.data[(row * fw + col) as usize] = REGION_OUTLINE_VALUE;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid YUYV length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
