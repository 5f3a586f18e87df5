//! FFmpeg pipeline management for cameo.
//!
//! Video files are written by an FFmpeg child process that reads raw frames
//! on stdin. This module spawns it, streams frames into it and shuts it down
//! so the container is finalized.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::camera::{Frame, FrameFormat};
use crate::recording::{FourCc, RecordingError, VideoEncoder, VideoWriter};

/// Errors that can occur during pipeline operations
#[derive(Debug)]
pub enum PipelineError {
    /// FFmpeg executable not found
    FfmpegNotFound,
    /// Failed to spawn FFmpeg process
    SpawnFailed(std::io::Error),
    /// FFmpeg process exited with non-zero status
    ProcessFailed { exit_code: Option<i32>, stderr: String },
    /// FFmpeg closed its input before the recording was stopped
    StdinClosed,
    /// I/O error during pipeline operation
    IoError(std::io::Error),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::FfmpegNotFound => {
                write!(
                    f,
                    "FFmpeg not found. Please install it (e.g. `brew install ffmpeg` or `apt install ffmpeg`)"
                )
            }
            PipelineError::SpawnFailed(e) => write!(f, "Failed to spawn FFmpeg: {}", e),
            PipelineError::ProcessFailed { exit_code, stderr } => {
                write!(f, "FFmpeg exited with code {:?}\n{}", exit_code, stderr)
            }
            PipelineError::StdinClosed => write!(f, "FFmpeg stopped accepting frames"),
            PipelineError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::SpawnFailed(e) | PipelineError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            PipelineError::FfmpegNotFound
        } else {
            PipelineError::IoError(e)
        }
    }
}

/// How long FFmpeg gets to finalize the file after its input is closed.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Output codec arguments for a FourCC.
pub fn codec_args(fourcc: FourCc) -> Vec<String> {
    let args: &[&str] = match fourcc.as_bytes() {
        b"I420" => &["-c:v", "rawvideo", "-pix_fmt", "yuv420p"],
        b"MJPG" => &["-c:v", "mjpeg", "-q:v", "3"],
        b"XVID" | b"DIVX" | b"FMP4" => &["-c:v", "mpeg4", "-q:v", "3"],
        b"H264" | b"AVC1" | b"X264" => &["-c:v", "libx264", "-pix_fmt", "yuv420p"],
        b"MP4V" => &["-c:v", "mpeg4"],
        _ => &[],
    };
    let mut args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    if matches!(fourcc.as_bytes(), b"XVID" | b"DIVX" | b"FMP4") || args.is_empty() {
        args.push("-vtag".to_string());
        args.push(fourcc.to_string());
    }
    args
}

/// Full FFmpeg argument list for encoding raw frames from stdin.
pub fn encode_args(
    path: &Path,
    fourcc: FourCc,
    fps: f64,
    size: (u32, u32),
    format: FrameFormat,
) -> Vec<String> {
    let pix_fmt = match format {
        FrameFormat::Rgb => "rgb24",
        FrameFormat::Gray => "gray",
    };
    let mut args: Vec<String> = [
        "-hide_banner",
        "-loglevel",
        "warning",
        "-y",
        "-f",
        "rawvideo",
        "-pix_fmt",
        pix_fmt,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.push("-s".to_string());
    args.push(format!("{}x{}", size.0, size.1));
    args.push("-r".to_string());
    args.push(format!("{:.3}", fps));
    args.push("-i".to_string());
    args.push("-".to_string());
    args.extend(codec_args(fourcc));
    args.push(path.to_string_lossy().into_owned());
    args
}

/// Represents a running FFmpeg process fed on stdin.
pub struct Pipeline {
    /// The FFmpeg child process
    child: Child,
    /// Raw frame input; `None` once closed
    stdin: Option<ChildStdin>,
    /// Handle for the stderr reader thread
    stderr_thread: Option<JoinHandle<Vec<String>>>,
}

impl Pipeline {
    /// Spawn a new FFmpeg process with the given arguments.
    ///
    /// # Arguments
    /// * `args` - FFmpeg command-line arguments (excluding the `ffmpeg` command itself)
    pub fn spawn<S: AsRef<str>>(args: &[S]) -> Result<Self, PipelineError> {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(args.iter().map(|a| a.as_ref()))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipelineError::FfmpegNotFound
            } else {
                PipelineError::SpawnFailed(e)
            }
        })?;

        let stdin = child.stdin.take();

        // Spawn a thread to read stderr
        let stderr = child.stderr.take();
        let stderr_thread = stderr.map(|stderr| {
            thread::spawn(move || {
                let reader = BufReader::new(stderr);
                let mut lines = Vec::new();
                for line in reader.lines() {
                    match line {
                        Ok(l) => {
                            debug!("[ffmpeg] {}", l);
                            lines.push(l);
                        }
                        Err(_) => break,
                    }
                }
                lines
            })
        });

        Ok(Pipeline {
            child,
            stdin,
            stderr_thread,
        })
    }

    /// Write raw bytes to FFmpeg's stdin.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), PipelineError> {
        let stdin = self.stdin.as_mut().ok_or(PipelineError::StdinClosed)?;
        stdin.write_all(bytes).map_err(|e| {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                PipelineError::StdinClosed
            } else {
                PipelineError::IoError(e)
            }
        })
    }

    /// Check if the process is still running.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Close stdin and wait for FFmpeg to finish writing the file.
    ///
    /// If FFmpeg doesn't exit within `timeout`, it is killed.
    pub fn shutdown(&mut self, timeout: Duration) -> Result<ExitStatus, PipelineError> {
        // EOF on stdin tells FFmpeg to flush and write the trailer
        drop(self.stdin.take());

        let start = Instant::now();
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if start.elapsed() > timeout {
                        warn!("FFmpeg did not exit within {:?}, killing it", timeout);
                        let _ = self.child.kill();
                        return self.child.wait().map_err(PipelineError::IoError);
                    }
                    thread::sleep(Duration::from_millis(20));
                }
                Err(e) => return Err(PipelineError::IoError(e)),
            }
        }
    }

    /// Get the collected stderr output after the process has finished.
    pub fn take_stderr_output(&mut self) -> Vec<String> {
        self.stderr_thread
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or_default()
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        if self.stdin.is_some() || self.is_running() {
            match self.shutdown(SHUTDOWN_TIMEOUT) {
                Ok(status) if !status.success() => {
                    let stderr = self.take_stderr_output();
                    warn!(
                        "{}",
                        PipelineError::ProcessFailed {
                            exit_code: status.code(),
                            stderr: stderr.join("\n"),
                        }
                    );
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to stop FFmpeg: {}", e),
            }
        }
    }
}

/// Opens FFmpeg-backed video writers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegEncoder;

impl VideoEncoder for FfmpegEncoder {
    fn open(
        &self,
        path: &Path,
        fourcc: FourCc,
        fps: f64,
        size: (u32, u32),
    ) -> Result<Box<dyn VideoWriter>, RecordingError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(RecordingError::InvalidFrameRate(fps));
        }
        Ok(Box::new(FfmpegWriter {
            path: path.to_path_buf(),
            fourcc,
            fps,
            size,
            pipeline: None,
        }))
    }
}

/// One video file being written by FFmpeg.
///
/// The process starts with the first frame, once the pixel layout is known.
pub struct FfmpegWriter {
    path: PathBuf,
    fourcc: FourCc,
    fps: f64,
    size: (u32, u32),
    pipeline: Option<(Pipeline, FrameFormat)>,
}

impl VideoWriter for FfmpegWriter {
    fn write(&mut self, frame: &Frame) -> Result<(), RecordingError> {
        if (frame.width, frame.height) != self.size {
            return Err(RecordingError::SizeMismatch {
                width: self.size.0,
                height: self.size.1,
                got_width: frame.width,
                got_height: frame.height,
            });
        }

        if self.pipeline.is_none() {
            let args = encode_args(&self.path, self.fourcc, self.fps, self.size, frame.format);
            debug!("ffmpeg {}", args.join(" "));
            self.pipeline = Some((Pipeline::spawn(&args)?, frame.format));
        }

        match self.pipeline.as_mut() {
            Some((pipeline, format)) if *format == frame.format => {
                pipeline.write_all(&frame.data)?;
                Ok(())
            }
            Some((_, format)) => {
                // Layout changed mid-recording; FFmpeg can't follow.
                warn!(
                    "Dropping {:?} frame in a {:?} recording",
                    frame.format, format
                );
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Global flag for handling Ctrl+C across the application
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Check if Ctrl+C has been received.
pub fn ctrlc_received() -> bool {
    CTRLC_RECEIVED.load(Ordering::SeqCst)
}

/// Set up the Ctrl+C handler.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
        log::info!("Received Ctrl+C, shutting down...");
    })
}
