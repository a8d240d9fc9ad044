//! Frame-processing engine: the count/persist controller and the capture loop.
//!
//! Error containment follows a strict ladder: per-face failures (extraction,
//! invalid embedding) skip that face only; a locator failure costs the
//! frame's detections but not the frame; only a camera failure stops the
//! loop. Nothing on this path can un-increment the running count or leave
//! the registry half-updated.

use crate::config::Config;
use crate::display::DisplaySink;
use facetally_core::{
    signature, CapabilityError, EmbeddingExtractor, FaceLocator, FaceRegion, IdentityRegistry,
    OnnxEmbeddingExtractor, OnnxFaceLocator,
};
use facetally_hw::{frame::draw_region, Camera, CameraError, Frame};
use facetally_store::CountEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),
    #[error("failed to spawn capture thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// One tick's output: the frame with every detected region outlined, plus
/// the running count at the end of the tick.
pub struct AnnotatedFrame {
    pub frame: Frame,
    pub regions: Vec<FaceRegion>,
    pub unique_count: u64,
}

/// Count/persist controller: orchestrates locate → extract → derive →
/// test-and-insert per frame and owns the session's running count.
pub struct FrameProcessor {
    locator: Box<dyn FaceLocator + Send>,
    extractor: Box<dyn EmbeddingExtractor + Send>,
    registry: IdentityRegistry,
    running_count: u64,
    events: mpsc::Sender<CountEvent>,
    display: Box<dyn DisplaySink>,
}

impl FrameProcessor {
    pub fn new(
        locator: Box<dyn FaceLocator + Send>,
        extractor: Box<dyn EmbeddingExtractor + Send>,
        events: mpsc::Sender<CountEvent>,
        display: Box<dyn DisplaySink>,
    ) -> Self {
        Self {
            locator,
            extractor,
            registry: IdentityRegistry::new(),
            running_count: 0,
            events,
            display,
        }
    }

    /// Distinct faces seen this session. Starts at 0, never decreases.
    pub fn running_count(&self) -> u64 {
        self.running_count
    }

    /// Process one frame to completion and hand the result to the display
    /// sink. Never fails: all capability errors are contained here.
    pub fn process_frame(&mut self, mut frame: Frame) -> AnnotatedFrame {
        let regions = match self.locator.locate(&frame.data, frame.width, frame.height) {
            Ok(regions) => regions,
            Err(error) => {
                tracing::warn!(%error, seq = frame.sequence, "face locator failed; no detections this tick");
                Vec::new()
            }
        };

        // Count first against the unannotated frame, then draw: the outline
        // pixels must not bleed into a neighboring region's crop.
        for region in &regions {
            let embedding =
                match self
                    .extractor
                    .extract(&frame.data, frame.width, frame.height, region)
                {
                    Ok(embedding) => embedding,
                    Err(error) => {
                        tracing::debug!(%error, "embedding extraction failed; skipping region");
                        continue;
                    }
                };

            let sig = match signature::derive(&embedding) {
                Ok(sig) => sig,
                Err(error) => {
                    tracing::warn!(%error, "invalid embedding; skipping region");
                    continue;
                }
            };

            if self.registry.test_and_insert(sig) {
                self.running_count += 1;
                tracing::info!(count = self.running_count, signature = %sig, "new unique face");
                // Fire-and-forget: a full or closed queue drops the event
                // rather than delay the frame loop.
                if let Err(error) = self.events.try_send(CountEvent::new(self.running_count)) {
                    tracing::warn!(%error, "store writer unavailable; dropping count event");
                }
            }
        }

        // Every detected region is outlined, new or duplicate.
        for region in &regions {
            draw_region(&mut frame, region.x, region.y, region.width, region.height);
        }

        let annotated = AnnotatedFrame {
            frame,
            regions,
            unique_count: self.running_count,
        };
        self.display.present(&annotated);
        annotated
    }
}

/// Spawn the capture loop on a dedicated OS thread.
///
/// Opens the camera and loads both models synchronously (fail-fast), then
/// polls at the configured interval until shutdown is flagged or the frame
/// source dies. The camera handle lives on the thread's stack, so it is
/// released when the loop exits, whichever tick was in flight.
pub fn spawn_capture_loop(
    config: &Config,
    events: mpsc::Sender<CountEvent>,
    display: Box<dyn DisplaySink>,
    shutdown: Arc<AtomicBool>,
) -> Result<std::thread::JoinHandle<()>, EngineError> {
    let camera = Camera::open(&config.camera_device)?;
    tracing::info!(
        device = %config.camera_device,
        width = camera.width,
        height = camera.height,
        fourcc = ?camera.fourcc,
        "camera opened"
    );

    let locator = OnnxFaceLocator::load(&config.locator_model_path())?;
    let extractor = OnnxEmbeddingExtractor::load(&config.extractor_model_path())?;

    if config.warmup_frames > 0 {
        tracing::info!(count = config.warmup_frames, "discarding warmup frames");
        for _ in 0..config.warmup_frames {
            let _ = camera.capture_frame();
        }
    }

    let interval = Duration::from_millis(config.poll_interval_ms);
    let mut processor =
        FrameProcessor::new(Box::new(locator), Box::new(extractor), events, display);

    let handle = std::thread::Builder::new()
        .name("facetally-capture".into())
        .spawn(move || {
            tracing::info!("capture loop started");
            while !shutdown.load(Ordering::Relaxed) {
                let tick_started = Instant::now();

                match camera.capture_frame() {
                    Ok(frame) => {
                        let _ = processor.process_frame(frame);
                    }
                    Err(error) => {
                        tracing::error!(%error, "frame source unavailable; stopping capture loop");
                        break;
                    }
                }

                // Fixed-interval poll: a tick that overruns the interval
                // simply serializes into the next one.
                if let Some(remaining) = interval.checked_sub(tick_started.elapsed()) {
                    std::thread::sleep(remaining);
                }
            }
            tracing::info!(
                unique_faces = processor.running_count(),
                "capture loop stopped; releasing camera"
            );
        })?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facetally_core::Embedding;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Locator scripted with one region list per frame.
    struct ScriptedLocator {
        frames: VecDeque<Vec<FaceRegion>>,
    }

    impl FaceLocator for ScriptedLocator {
        fn locate(
            &mut self,
            _frame: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<FaceRegion>, CapabilityError> {
            Ok(self.frames.pop_front().unwrap_or_default())
        }
    }

    struct FailingLocator;

    impl FaceLocator for FailingLocator {
        fn locate(
            &mut self,
            _frame: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<FaceRegion>, CapabilityError> {
            Err(CapabilityError::InferenceFailed("scripted failure".into()))
        }
    }

    /// Extractor keyed on region position: identical positions give
    /// identical embeddings; `fail_x` simulates a per-region capability
    /// failure.
    struct KeyedExtractor {
        fail_x: Option<u32>,
    }

    impl EmbeddingExtractor for KeyedExtractor {
        fn extract(
            &mut self,
            _frame: &[u8],
            _width: u32,
            _height: u32,
            region: &FaceRegion,
        ) -> Result<Embedding, CapabilityError> {
            if Some(region.x) == self.fail_x {
                return Err(CapabilityError::InferenceFailed("scripted failure".into()));
            }
            Ok(Embedding::new(vec![
                region.x as f32 / 10.0,
                region.y as f32 / 10.0,
            ]))
        }
    }

    /// Sink recording the count presented on every tick.
    struct RecordingSink {
        counts: Arc<Mutex<Vec<u64>>>,
    }

    impl DisplaySink for RecordingSink {
        fn present(&mut self, frame: &AnnotatedFrame) {
            self.counts.lock().unwrap().push(frame.unique_count);
        }
    }

    fn region(x: u32, y: u32) -> FaceRegion {
        FaceRegion { x, y, width: 16, height: 16, confidence: 0.9 }
    }

    fn blank_frame(sequence: u32) -> Frame {
        Frame {
            data: vec![0u8; 64 * 64],
            width: 64,
            height: 64,
            timestamp: Instant::now(),
            sequence,
        }
    }

    fn processor_with(
        scripted: Vec<Vec<FaceRegion>>,
        fail_x: Option<u32>,
        events: mpsc::Sender<CountEvent>,
    ) -> (FrameProcessor, Arc<Mutex<Vec<u64>>>) {
        let counts = Arc::new(Mutex::new(Vec::new()));
        let processor = FrameProcessor::new(
            Box::new(ScriptedLocator { frames: scripted.into() }),
            Box::new(KeyedExtractor { fail_x }),
            events,
            Box::new(RecordingSink { counts: Arc::clone(&counts) }),
        );
        (processor, counts)
    }

    #[test]
    fn test_five_frame_scenario_counts_two() {
        // Frames 1,2: face A. Frame 3: A again plus new face B.
        // Frames 4,5: empty.
        let a = region(10, 10);
        let b = region(40, 10);
        let script = vec![
            vec![a.clone()],
            vec![a.clone()],
            vec![a.clone(), b.clone()],
            vec![],
            vec![],
        ];

        let (events_tx, mut events_rx) = mpsc::channel(16);
        let (mut processor, counts) = processor_with(script, None, events_tx);

        for sequence in 0..5 {
            processor.process_frame(blank_frame(sequence));
        }

        assert_eq!(processor.running_count(), 2);

        // Exactly two events, sequences 1 then 2, in creation order.
        assert_eq!(events_rx.try_recv().unwrap().sequence, 1);
        assert_eq!(events_rx.try_recv().unwrap().sequence, 2);
        assert!(events_rx.try_recv().is_err());

        // Display saw every tick with the then-current count.
        assert_eq!(*counts.lock().unwrap(), vec![1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_per_region_failure_spares_other_regions() {
        // Three faces in one frame; the middle one fails extraction.
        let script = vec![vec![region(10, 10), region(30, 10), region(50, 10)]];
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let (mut processor, _) = processor_with(script, Some(30), events_tx);

        let annotated = processor.process_frame(blank_frame(0));

        // All three regions are still outlined...
        assert_eq!(annotated.regions.len(), 3);
        // ...but only the two healthy ones counted.
        assert_eq!(processor.running_count(), 2);
        assert_eq!(events_rx.try_recv().unwrap().sequence, 1);
        assert_eq!(events_rx.try_recv().unwrap().sequence, 2);
        assert!(events_rx.try_recv().is_err());
    }

    #[test]
    fn test_duplicate_within_one_frame_counts_once() {
        let script = vec![vec![region(10, 10), region(10, 10)]];
        let (events_tx, _events_rx) = mpsc::channel(16);
        let (mut processor, _) = processor_with(script, None, events_tx);

        let annotated = processor.process_frame(blank_frame(0));
        assert_eq!(annotated.regions.len(), 2);
        assert_eq!(processor.running_count(), 1);
    }

    #[test]
    fn test_locator_failure_yields_empty_tick() {
        let (events_tx, _events_rx) = mpsc::channel(16);
        let counts = Arc::new(Mutex::new(Vec::new()));
        let mut processor = FrameProcessor::new(
            Box::new(FailingLocator),
            Box::new(KeyedExtractor { fail_x: None }),
            events_tx,
            Box::new(RecordingSink { counts: Arc::clone(&counts) }),
        );

        let annotated = processor.process_frame(blank_frame(0));
        assert!(annotated.regions.is_empty());
        assert_eq!(processor.running_count(), 0);
        // The tick still reached the display.
        assert_eq!(*counts.lock().unwrap(), vec![0]);
    }

    #[test]
    fn test_store_unavailable_never_touches_count() {
        let script = vec![vec![region(10, 10)], vec![region(40, 10)]];
        let (events_tx, events_rx) = mpsc::channel(16);
        // Writer gone: every try_send fails from the first frame on.
        drop(events_rx);

        let (mut processor, _) = processor_with(script, None, events_tx);
        processor.process_frame(blank_frame(0));
        processor.process_frame(blank_frame(1));

        // Counting is independent of persistence success.
        assert_eq!(processor.running_count(), 2);
    }

    #[test]
    fn test_annotation_marks_region_outline() {
        let script = vec![vec![region(10, 10)]];
        let (events_tx, _events_rx) = mpsc::channel(16);
        let (mut processor, _) = processor_with(script, None, events_tx);

        let annotated = processor.process_frame(blank_frame(0));
        let idx = (10 * annotated.frame.width + 10) as usize;
        assert_eq!(annotated.frame.data[idx], 255);
    }
}
