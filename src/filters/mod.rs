//! In-place frame filters and the chain that sequences them.
//!
//! - [`Kernel`]: fixed convolution kernels
//! - [`ChannelCurveFilter`]: film-emulation tone curves
//! - recolor recipes that emulate limited palettes
//! - [`StrokeEdges`]: ink-like edge darkening
//! - [`FilterChain`]: keypress-cycled slots applied in fixed order

pub mod chain;
pub mod convolution;
pub mod recolor;
pub mod stroke;
pub mod tone;

pub use chain::{
    ActiveFilter, ConvolutionVariant, FilterChain, RecolorVariant, SlotKind, SlotVariant,
    ToneCurveVariant,
};
pub use convolution::Kernel;
pub use recolor::{recolor_cmv, recolor_rc, recolor_rgv};
pub use stroke::{median_blur, FilterError, StrokeEdges};
pub use tone::{ChannelCurveFilter, CurvePreset, ValueCurveFilter};
