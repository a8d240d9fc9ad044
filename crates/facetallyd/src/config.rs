use std::path::PathBuf;

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,
    /// Data directory for the settings file and the embedded store.
    pub data_dir: PathBuf,
    /// Path to the store settings file (editable at runtime by the CLI).
    pub settings_path: PathBuf,
    /// Frame-processing tick interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Number of warmup frames to discard at startup (camera AGC/AE stabilization).
    pub warmup_frames: usize,
}

impl Config {
    /// Load configuration from `FACETALLY_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("FACETALLY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| facetally_store::default_data_dir());

        let model_dir = std::env::var("FACETALLY_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("models"));

        let settings_path = std::env::var("FACETALLY_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("settings.toml"));

        Self {
            camera_device: std::env::var("FACETALLY_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            model_dir,
            data_dir,
            settings_path,
            poll_interval_ms: env_u64("FACETALLY_POLL_INTERVAL_MS", 100),
            warmup_frames: env_usize("FACETALLY_WARMUP_FRAMES", 4),
        }
    }

    /// Path to the UltraFace detection model.
    pub fn locator_model_path(&self) -> String {
        self.model_dir
            .join("version-RFB-320.onnx")
            .to_string_lossy()
            .into_owned()
    }

    /// Path to the FaceNet embedding model.
    pub fn extractor_model_path(&self) -> String {
        self.model_dir
            .join("facenet-128.onnx")
            .to_string_lossy()
            .into_owned()
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
