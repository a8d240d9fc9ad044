//! facetally-hw — Hardware abstraction for camera capture.
//!
//! Provides V4L2-based camera access, grayscale frames and the
//! bounding-box annotation used by the capture daemon's display output.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, PixelFormat};
pub use frame::{draw_region, Frame, FrameError};
