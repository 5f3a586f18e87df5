//! cameo library crate.
//!
//! A webcam viewer that runs each frame through a keypress-driven filter
//! chain, shows it in a window and can save snapshots or record video.
//!
//! The frame loop is built around [`session::FrameSession`]; everything it
//! talks to (camera, window, image files, video encoder) sits behind a
//! trait so it can be driven by fakes.

pub mod app;
pub mod camera;
pub mod cli;
pub mod clock;
pub mod config;
pub mod curves;
pub mod filters;
pub mod input;
pub mod pipeline;
pub mod recording;
pub mod rects;
pub mod session;
pub mod status_bar;
pub mod tracker;
pub mod window;
