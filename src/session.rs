//! The enter/exit frame protocol.
//!
//! A [`FrameSession`] owns the capture source and every output sink. Each
//! loop iteration calls [`FrameSession::enter_frame`], processes the frame
//! returned by [`FrameSession::frame`] in place, then calls
//! [`FrameSession::exit_frame`], which counts the frame and fans it out to
//! the preview, a pending snapshot and the recording.

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};
use thiserror::Error;

use crate::camera::{mirror_horizontal, CameraError, Frame, FrameFormat, FrameSource};
use crate::clock::SessionClock;
use crate::recording::{FourCc, RecordingController, RecordingError, VideoEncoder};
use crate::window::WindowError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("enter_frame called while a frame is already in flight")]
    ProtocolViolation,

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("failed to write snapshot: {0}")]
    Image(#[from] ImageSinkError),

    #[error(transparent)]
    Display(#[from] WindowError),

    #[error(transparent)]
    Recording(#[from] RecordingError),
}

#[derive(Debug, Error)]
pub enum ImageSinkError {
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("frame buffer does not match its {width}x{height} size")]
    InvalidBuffer { width: u32, height: u32 },
}

/// Shows processed frames to the user.
pub trait PreviewSink {
    fn show(&mut self, frame: &Frame) -> Result<(), WindowError>;
}

/// Writes single frames to image files.
pub trait ImageSink {
    fn write(&mut self, path: &Path, frame: &Frame) -> Result<(), ImageSinkError>;
}

/// Saves snapshots with the `image` crate; the format follows the file
/// extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileSink;

impl ImageSink for ImageFileSink {
    fn write(&mut self, path: &Path, frame: &Frame) -> Result<(), ImageSinkError> {
        let color = match frame.format {
            FrameFormat::Rgb => image::ColorType::Rgb8,
            FrameFormat::Gray => image::ColorType::L8,
        };
        if frame.data.len() != frame.pixel_count() * frame.bytes_per_pixel() {
            return Err(ImageSinkError::InvalidBuffer {
                width: frame.width,
                height: frame.height,
            });
        }
        image::save_buffer(path, &frame.data, frame.width, frame.height, color)?;
        info!("Saved snapshot {}", path.display());
        Ok(())
    }
}

pub struct FrameSession<S: FrameSource, P: PreviewSink> {
    source: S,
    preview: Option<P>,
    mirror_preview: bool,
    image_sink: Box<dyn ImageSink>,
    recording: RecordingController,
    clock: SessionClock,

    in_flight: bool,
    // Lazily decoded frame for the current cycle; `decoded` is set even when
    // retrieval produced nothing so it is attempted once.
    frame: Option<Frame>,
    decoded: bool,
    pending_image: Option<PathBuf>,
}

impl<S: FrameSource, P: PreviewSink> FrameSession<S, P> {
    pub fn new(
        source: S,
        preview: Option<P>,
        mirror_preview: bool,
        image_sink: Box<dyn ImageSink>,
        encoder: Box<dyn VideoEncoder>,
    ) -> Self {
        Self {
            source,
            preview,
            mirror_preview,
            image_sink,
            recording: RecordingController::new(encoder),
            clock: SessionClock::new(),
            in_flight: false,
            frame: None,
            decoded: false,
            pending_image: None,
        }
    }

    /// Grab the next frame.
    ///
    /// Returns `Ok(false)` when the source has nothing; the session then
    /// stays idle and the iteration can be skipped.
    pub fn enter_frame(&mut self) -> Result<bool, SessionError> {
        if self.in_flight {
            return Err(SessionError::ProtocolViolation);
        }
        self.in_flight = self.source.grab();
        Ok(self.in_flight)
    }

    /// The current frame, decoded on first access and cached until exit.
    pub fn frame(&mut self) -> Result<Option<&mut Frame>, SessionError> {
        if !self.in_flight {
            return Ok(None);
        }
        if !self.decoded {
            self.decoded = true;
            self.frame = self.source.retrieve()?;
        }
        Ok(self.frame.as_mut())
    }

    pub fn exit_frame(&mut self) -> Result<(), SessionError> {
        self.exit_frame_at(Instant::now())
    }

    /// Finish the current frame as if at `now`.
    ///
    /// The frame is released and the session is idle afterwards even when a
    /// sink fails; the first sink error is returned.
    pub fn exit_frame_at(&mut self, now: Instant) -> Result<(), SessionError> {
        if !self.in_flight {
            return Ok(());
        }

        let retrieved = self.frame().map(|f| f.is_some());
        let frame = self.frame.take();
        self.in_flight = false;
        self.decoded = false;
        retrieved?;

        let Some(frame) = frame else {
            return Ok(());
        };

        self.clock.tick(now);

        let mut first_error: Option<SessionError> = None;

        if let Some(preview) = self.preview.as_mut() {
            let shown = if self.mirror_preview {
                let mut mirrored = frame.clone();
                mirror_horizontal(&mut mirrored);
                preview.show(&mirrored)
            } else {
                preview.show(&frame)
            };
            if let Err(e) = shown {
                first_error.get_or_insert(e.into());
            }
        }

        if let Some(path) = self.pending_image.take() {
            if let Err(e) = self.image_sink.write(&path, &frame) {
                first_error.get_or_insert(e.into());
            }
        }

        if self.recording.is_active() {
            let fps = self.source.fps();
            if let Err(e) = self.recording.write_frame(&frame, fps, &self.clock) {
                first_error.get_or_insert(e.into());
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Save the next exited frame to `path`, once.
    pub fn write_image(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!("Snapshot armed: {}", path.display());
        self.pending_image = Some(path);
    }

    pub fn start_writing_video(&mut self, path: impl Into<PathBuf>, fourcc: FourCc) {
        self.recording.start(path, fourcc);
    }

    pub fn stop_writing_video(&mut self) {
        self.recording.stop();
    }

    pub fn is_writing_image(&self) -> bool {
        self.pending_image.is_some()
    }

    pub fn is_writing_video(&self) -> bool {
        self.recording.is_active()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn fps_estimate(&self) -> Option<f64> {
        self.clock.fps_estimate()
    }

    pub fn frames_elapsed(&self) -> u64 {
        self.clock.frames_elapsed()
    }

    pub fn recording(&self) -> &RecordingController {
        &self.recording
    }

    pub fn preview(&self) -> Option<&P> {
        self.preview.as_ref()
    }

    pub fn preview_mut(&mut self) -> Option<&mut P> {
        self.preview.as_mut()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::VideoWriter;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Default)]
    struct Calls {
        grabs: usize,
        retrieves: usize,
        shown: Vec<Frame>,
        images: Vec<(PathBuf, Frame)>,
        opened: Vec<f64>,
        recorded: Vec<Frame>,
    }

    type Shared = Rc<RefCell<Calls>>;

    struct FakeSource {
        calls: Shared,
        frames: VecDeque<Option<Frame>>,
        fps: f64,
    }

    impl FrameSource for FakeSource {
        fn grab(&mut self) -> bool {
            self.calls.borrow_mut().grabs += 1;
            !self.frames.is_empty()
        }

        fn retrieve(&mut self) -> Result<Option<Frame>, CameraError> {
            self.calls.borrow_mut().retrieves += 1;
            Ok(self.frames.pop_front().flatten())
        }

        fn fps(&self) -> f64 {
            self.fps
        }
    }

    struct FakePreview(Shared);

    impl PreviewSink for FakePreview {
        fn show(&mut self, frame: &Frame) -> Result<(), WindowError> {
            self.0.borrow_mut().shown.push(frame.clone());
            Ok(())
        }
    }

    struct FakeImages(Shared);

    impl ImageSink for FakeImages {
        fn write(&mut self, path: &Path, frame: &Frame) -> Result<(), ImageSinkError> {
            self.0
                .borrow_mut()
                .images
                .push((path.to_path_buf(), frame.clone()));
            Ok(())
        }
    }

    struct FakeEncoder(Shared);
    struct FakeWriter(Shared);

    impl VideoEncoder for FakeEncoder {
        fn open(
            &self,
            _path: &Path,
            _fourcc: FourCc,
            fps: f64,
            _size: (u32, u32),
        ) -> Result<Box<dyn VideoWriter>, RecordingError> {
            self.0.borrow_mut().opened.push(fps);
            Ok(Box::new(FakeWriter(self.0.clone())))
        }
    }

    impl VideoWriter for FakeWriter {
        fn write(&mut self, frame: &Frame) -> Result<(), RecordingError> {
            self.0.borrow_mut().recorded.push(frame.clone());
            Ok(())
        }
    }

    fn asymmetric() -> Frame {
        Frame::rgb(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap()
    }

    fn session(
        frames: Vec<Option<Frame>>,
        fps: f64,
        mirror: bool,
    ) -> (FrameSession<FakeSource, FakePreview>, Shared) {
        let calls: Shared = Rc::default();
        let source = FakeSource {
            calls: calls.clone(),
            frames: frames.into(),
            fps,
        };
        let session = FrameSession::new(
            source,
            Some(FakePreview(calls.clone())),
            mirror,
            Box::new(FakeImages(calls.clone())),
            Box::new(FakeEncoder(calls.clone())),
        );
        (session, calls)
    }

    #[test]
    fn test_enter_twice_is_protocol_violation() {
        let (mut s, _) = session(vec![Some(asymmetric()), Some(asymmetric())], 30.0, false);
        assert!(s.enter_frame().unwrap());
        assert!(matches!(s.enter_frame(), Err(SessionError::ProtocolViolation)));
        s.exit_frame().unwrap();
        assert!(s.enter_frame().unwrap());
    }

    #[test]
    fn test_no_frame_available_stays_idle() {
        let (mut s, calls) = session(vec![], 30.0, false);
        assert!(!s.enter_frame().unwrap());
        assert!(!s.is_in_flight());
        assert!(s.frame().unwrap().is_none());
        s.exit_frame().unwrap();
        assert_eq!(s.frames_elapsed(), 0);
        assert!(calls.borrow().shown.is_empty());
    }

    #[test]
    fn test_empty_retrieve_exits_without_side_effects() {
        let (mut s, calls) = session(vec![None], 30.0, false);
        s.write_image("shot.png");
        assert!(s.enter_frame().unwrap());
        s.exit_frame().unwrap();
        assert!(!s.is_in_flight());
        assert_eq!(s.frames_elapsed(), 0);
        assert!(calls.borrow().shown.is_empty());
        // still armed for the next real frame
        assert!(s.is_writing_image());
    }

    #[test]
    fn test_frame_is_decoded_once() {
        let (mut s, calls) = session(vec![Some(asymmetric())], 30.0, false);
        s.enter_frame().unwrap();
        s.frame().unwrap().unwrap().data[0] = 99;
        assert_eq!(s.frame().unwrap().unwrap().data[0], 99);
        s.exit_frame().unwrap();
        assert_eq!(calls.borrow().retrieves, 1);
        assert_eq!(calls.borrow().shown[0].data[0], 99);
    }

    #[test]
    fn test_mirrored_preview_does_not_alter_recorded_or_saved_frame() {
        let (mut s, calls) = session(vec![Some(asymmetric())], 30.0, true);
        s.write_image("shot.png");
        s.start_writing_video("out.avi", FourCc::I420);
        s.enter_frame().unwrap();
        s.exit_frame().unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.shown[0].data, vec![4, 5, 6, 1, 2, 3]);
        assert_eq!(calls.images[0].1.data, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(calls.recorded[0].data, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_snapshot_is_one_shot() {
        let (mut s, calls) = session(vec![Some(asymmetric()), Some(asymmetric())], 30.0, false);
        s.write_image("shot.png");
        assert!(s.is_writing_image());
        for _ in 0..2 {
            s.enter_frame().unwrap();
            s.exit_frame().unwrap();
        }
        assert!(!s.is_writing_image());
        assert_eq!(calls.borrow().images.len(), 1);
        assert_eq!(calls.borrow().images[0].0, PathBuf::from("shot.png"));
    }

    #[test]
    fn test_fps_estimate_follows_frame_count() {
        let frames = (0..4).map(|_| Some(asymmetric())).collect();
        let (mut s, _) = session(frames, 30.0, false);
        let t0 = Instant::now();

        s.enter_frame().unwrap();
        s.exit_frame_at(t0).unwrap();
        assert!(s.fps_estimate().is_none());

        for i in 1..4u32 {
            s.enter_frame().unwrap();
            s.exit_frame_at(t0 + Duration::from_millis(100) * i).unwrap();
        }
        // frame 4 at 0.3 s: 3 / 0.3
        let fps = s.fps_estimate().unwrap();
        assert!((fps - 10.0).abs() < 1e-9);
        assert_eq!(s.frames_elapsed(), 4);
    }

    #[test]
    fn test_unknown_device_fps_opens_writer_after_warmup() {
        let frames = (0..25).map(|_| Some(asymmetric())).collect();
        let (mut s, calls) = session(frames, 0.0, false);
        s.start_writing_video("out.avi", FourCc::I420);
        let t0 = Instant::now();

        for i in 0..25u32 {
            s.enter_frame().unwrap();
            s.exit_frame_at(t0 + Duration::from_millis(40) * i).unwrap();
            if i < 19 {
                assert!(calls.borrow().opened.is_empty(), "opened at frame {}", i + 1);
            }
        }

        let calls = calls.borrow();
        assert_eq!(calls.opened.len(), 1);
        assert!((calls.opened[0] - 25.0).abs() < 1e-6);
        // frames 20..=25 recorded
        assert_eq!(calls.recorded.len(), 6);
    }

    #[test]
    fn test_stop_writing_video() {
        let (mut s, calls) = session(vec![Some(asymmetric()), Some(asymmetric())], 30.0, false);
        s.start_writing_video("out.avi", FourCc::I420);
        s.enter_frame().unwrap();
        s.exit_frame().unwrap();
        s.stop_writing_video();
        assert!(!s.is_writing_video());
        s.enter_frame().unwrap();
        s.exit_frame().unwrap();
        assert_eq!(calls.borrow().recorded.len(), 1);
    }

    #[test]
    fn test_image_file_sink_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        ImageFileSink.write(&path, &asymmetric()).unwrap();
        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.into_raw(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_image_file_sink_unknown_extension_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.nope");
        assert!(ImageFileSink.write(&path, &asymmetric()).is_err());
    }
}
