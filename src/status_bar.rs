//! Status line describing the filter chain.

use crate::filters::{FilterChain, SlotKind};

/// Status line shown in the window title after every keypress.
///
/// Format: `K=<convolution>,C=<curve>,R=<recolor>,S=<stroke>`. The extended
/// application labels the last field `f`.
#[derive(Debug, Clone, Default)]
pub struct StatusBar {
    /// Whether the extended label is used
    pub extended: bool,
}

impl StatusBar {
    pub fn new(extended: bool) -> Self {
        Self { extended }
    }

    pub fn format(&self, chain: &FilterChain) -> String {
        format!(
            "K={},C={},R={},{}={}",
            chain.index(SlotKind::Convolution),
            chain.index(SlotKind::ToneCurve),
            chain.index(SlotKind::Recolor),
            if self.extended { "f" } else { "S" },
            chain.stroke_enabled(),
        )
    }

    /// Longer description with variant names, for the log.
    pub fn describe(&self, chain: &FilterChain) -> String {
        use crate::filters::SlotVariant;
        format!(
            "convolution: {} | curve: {} | recolor: {} | stroke: {}",
            chain.convolution().name(),
            chain.tone_curve().name(),
            chain.recolor().name(),
            if chain.stroke_enabled() { "on" } else { "off" },
        )
    }
}
