//! Grayscale resampling helpers shared by the ONNX capabilities.

/// Resize a grayscale image with bilinear interpolation.
///
/// Sampling is center-aligned: destination pixel centers map back into the
/// source grid, with edge clamping.
pub(crate) fn resize_bilinear(
    src: &[u8],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<u8> {
    if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
        return Vec::new();
    }

    let scale_x = src_width as f32 / dst_width as f32;
    let scale_y = src_height as f32 / dst_height as f32;

    let mut dst = vec![0u8; dst_width * dst_height];
    for y in 0..dst_height {
        let src_y = ((y as f32 + 0.5) * scale_y - 0.5).max(0.0);
        let y0 = (src_y.floor() as i32).clamp(0, src_height as i32 - 1) as usize;
        let y1 = (y0 + 1).min(src_height - 1);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..dst_width {
            let src_x = ((x as f32 + 0.5) * scale_x - 0.5).max(0.0);
            let x0 = (src_x.floor() as i32).clamp(0, src_width as i32 - 1) as usize;
            let x1 = (x0 + 1).min(src_width - 1);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            let tl = src[y0 * src_width + x0] as f32;
            let tr = src[y0 * src_width + x1] as f32;
            let bl = src[y1 * src_width + x0] as f32;
            let br = src[y1 * src_width + x1] as f32;

            let val = tl * (1.0 - fx) * (1.0 - fy)
                + tr * fx * (1.0 - fy)
                + bl * (1.0 - fx) * fy
                + br * fx * fy;

            dst[y * dst_width + x] = val.round().clamp(0.0, 255.0) as u8;
        }
    }
    dst
}

/// Copy a rectangular sub-image out of a grayscale frame.
///
/// The caller is responsible for clipping the rectangle to the frame first;
/// out-of-range rows or columns are skipped defensively rather than read
/// out of bounds.
pub(crate) fn crop(
    frame: &[u8],
    frame_width: usize,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height);
    for row in y..y + height {
        let start = row * frame_width + x;
        let end = start + width;
        if end <= frame.len() {
            out.extend_from_slice(&frame[start..end]);
        } else {
            out.extend(std::iter::repeat(0u8).take(width));
        }
    }
    out
}
