//! The ordered, keypress-driven filter chain.
//!
//! Four slots are applied in a fixed order: convolution, tone curve, recolor,
//! edge stroke. The first three cycle through a closed list of variants whose
//! first entry disables the slot; edge stroke is a plain toggle.

use crate::camera::Frame;
use crate::curves::CurveError;

use super::convolution::Kernel;
use super::recolor::{recolor_cmv, recolor_rc, recolor_rgv};
use super::stroke::StrokeEdges;
use super::tone::{ChannelCurveFilter, CurvePreset, CROSS_PROCESS, PORTRA, PROVIA, VELVIA};

/// A closed, ordered list of variants for one slot. Index 0 is "off".
pub trait SlotVariant: Copy + PartialEq + Sized + 'static {
    const ALL: &'static [Self];

    fn name(&self) -> &'static str;

    fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    /// The following variant, wrapping back to the first.
    fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn is_none(&self) -> bool {
        self.index() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvolutionVariant {
    #[default]
    None,
    FindEdges,
    Sharpen,
    Blur,
    Emboss,
}

impl SlotVariant for ConvolutionVariant {
    const ALL: &'static [Self] = &[
        Self::None,
        Self::FindEdges,
        Self::Sharpen,
        Self::Blur,
        Self::Emboss,
    ];

    fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FindEdges => "find-edges",
            Self::Sharpen => "sharpen",
            Self::Blur => "blur",
            Self::Emboss => "emboss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToneCurveVariant {
    #[default]
    None,
    CrossProcess,
    Portra,
    Provia,
    Velvia,
}

impl ToneCurveVariant {
    fn preset(&self) -> Option<&'static CurvePreset> {
        match self {
            Self::None => None,
            Self::CrossProcess => Some(&CROSS_PROCESS),
            Self::Portra => Some(&PORTRA),
            Self::Provia => Some(&PROVIA),
            Self::Velvia => Some(&VELVIA),
        }
    }
}

impl SlotVariant for ToneCurveVariant {
    const ALL: &'static [Self] = &[
        Self::None,
        Self::CrossProcess,
        Self::Portra,
        Self::Provia,
        Self::Velvia,
    ];

    fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::CrossProcess => "cross-process",
            Self::Portra => "portra",
            Self::Provia => "provia",
            Self::Velvia => "velvia",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecolorVariant {
    #[default]
    None,
    Cmv,
    Rc,
    Rgv,
}

impl SlotVariant for RecolorVariant {
    const ALL: &'static [Self] = &[Self::None, Self::Cmv, Self::Rc, Self::Rgv];

    fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Cmv => "cmv",
            Self::Rc => "rc",
            Self::Rgv => "rgv",
        }
    }
}

/// Identifies one slot of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Convolution,
    ToneCurve,
    Recolor,
    EdgeStroke,
}

impl SlotKind {
    /// Application order.
    pub const ORDER: [SlotKind; 4] = [
        SlotKind::Convolution,
        SlotKind::ToneCurve,
        SlotKind::Recolor,
        SlotKind::EdgeStroke,
    ];
}

/// The filter currently selected in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFilter {
    Convolution(ConvolutionVariant),
    ToneCurve(ToneCurveVariant),
    Recolor(RecolorVariant),
    EdgeStroke,
}

#[derive(Debug, Clone)]
pub struct FilterChain {
    convolution: ConvolutionVariant,
    tone_curve: ToneCurveVariant,
    recolor: RecolorVariant,
    stroke_enabled: bool,

    // Built once, aligned with the variant lists (entry 0 unused).
    kernels: Vec<Option<Kernel>>,
    curves: Vec<Option<ChannelCurveFilter>>,
    stroke: StrokeEdges,
}

impl FilterChain {
    /// Every slot starts disabled.
    pub fn new() -> Result<Self, CurveError> {
        Self::with_stroke(StrokeEdges::default())
    }

    pub fn with_stroke(stroke: StrokeEdges) -> Result<Self, CurveError> {
        let kernels = ConvolutionVariant::ALL
            .iter()
            .map(|v| match v {
                ConvolutionVariant::None => None,
                ConvolutionVariant::FindEdges => Some(Kernel::find_edges()),
                ConvolutionVariant::Sharpen => Some(Kernel::sharpen()),
                ConvolutionVariant::Blur => Some(Kernel::blur()),
                ConvolutionVariant::Emboss => Some(Kernel::emboss()),
            })
            .collect();

        let curves = ToneCurveVariant::ALL
            .iter()
            .map(|v| v.preset().map(ChannelCurveFilter::from_preset).transpose())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FilterChain {
            convolution: ConvolutionVariant::None,
            tone_curve: ToneCurveVariant::None,
            recolor: RecolorVariant::None,
            stroke_enabled: false,
            kernels,
            curves,
            stroke,
        })
    }

    /// Advance a slot to its next variant, wrapping around. Edge stroke
    /// toggles.
    pub fn cycle(&mut self, kind: SlotKind) {
        match kind {
            SlotKind::Convolution => self.convolution = self.convolution.next(),
            SlotKind::ToneCurve => self.tone_curve = self.tone_curve.next(),
            SlotKind::Recolor => self.recolor = self.recolor.next(),
            SlotKind::EdgeStroke => self.stroke_enabled = !self.stroke_enabled,
        }
    }

    /// The filter active in a slot, or `None` when it is disabled.
    pub fn current(&self, kind: SlotKind) -> Option<ActiveFilter> {
        match kind {
            SlotKind::Convolution => {
                (!self.convolution.is_none()).then_some(ActiveFilter::Convolution(self.convolution))
            }
            SlotKind::ToneCurve => {
                (!self.tone_curve.is_none()).then_some(ActiveFilter::ToneCurve(self.tone_curve))
            }
            SlotKind::Recolor => {
                (!self.recolor.is_none()).then_some(ActiveFilter::Recolor(self.recolor))
            }
            SlotKind::EdgeStroke => self.stroke_enabled.then_some(ActiveFilter::EdgeStroke),
        }
    }

    /// Position of the slot in its variant list; edge stroke reads 0 or 1.
    pub fn index(&self, kind: SlotKind) -> usize {
        match kind {
            SlotKind::Convolution => self.convolution.index(),
            SlotKind::ToneCurve => self.tone_curve.index(),
            SlotKind::Recolor => self.recolor.index(),
            SlotKind::EdgeStroke => self.stroke_enabled as usize,
        }
    }

    pub fn convolution(&self) -> ConvolutionVariant {
        self.convolution
    }

    pub fn tone_curve(&self) -> ToneCurveVariant {
        self.tone_curve
    }

    pub fn recolor(&self) -> RecolorVariant {
        self.recolor
    }

    pub fn stroke_enabled(&self) -> bool {
        self.stroke_enabled
    }

    /// Run every enabled slot over `frame`, in order.
    pub fn apply_all(&self, frame: &mut Frame) {
        for kind in SlotKind::ORDER {
            match self.current(kind) {
                Some(filter) => self.apply_one(filter, frame),
                None => continue,
            }
        }
    }

    fn apply_one(&self, filter: ActiveFilter, frame: &mut Frame) {
        match filter {
            ActiveFilter::Convolution(v) => {
                if let Some(Some(kernel)) = self.kernels.get(v.index()) {
                    kernel.apply(frame);
                }
            }
            ActiveFilter::ToneCurve(v) => {
                if let Some(Some(curve)) = self.curves.get(v.index()) {
                    curve.apply(frame);
                }
            }
            ActiveFilter::Recolor(v) => match v {
                RecolorVariant::None => {}
                RecolorVariant::Cmv => recolor_cmv(frame),
                RecolorVariant::Rc => recolor_rc(frame),
                RecolorVariant::Rgv => recolor_rgv(frame),
            },
            ActiveFilter::EdgeStroke => self.stroke.apply(frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Frame {
        let mut frame = Frame::filled(8, 6, [0, 0, 0]);
        for y in 0..6 {
            for x in 0..8 {
                let v = (x * 30 + y * 7) as u8;
                frame
                    .pixel_mut(x, y)
                    .copy_from_slice(&[v, 255 - v, v / 2]);
            }
        }
        frame
    }

    #[test]
    fn test_new_chain_is_disabled() {
        let chain = FilterChain::new().unwrap();
        for kind in SlotKind::ORDER {
            assert_eq!(chain.index(kind), 0);
            assert!(chain.current(kind).is_none());
        }
    }

    #[test]
    fn test_disabled_chain_is_identity() {
        let chain = FilterChain::new().unwrap();
        let mut frame = gradient();
        let before = frame.clone();
        chain.apply_all(&mut frame);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_convolution_cycles_through_five_variants() {
        let mut chain = FilterChain::new().unwrap();
        let mut seen = vec![chain.index(SlotKind::Convolution)];
        for _ in 0..5 {
            chain.cycle(SlotKind::Convolution);
            seen.push(chain.index(SlotKind::Convolution));
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 0]);
    }

    #[test]
    fn test_cycling_len_times_returns_to_start() {
        let mut chain = FilterChain::new().unwrap();
        chain.cycle(SlotKind::ToneCurve);
        chain.cycle(SlotKind::Recolor);
        for _ in 0..ToneCurveVariant::ALL.len() {
            chain.cycle(SlotKind::ToneCurve);
        }
        for _ in 0..RecolorVariant::ALL.len() {
            chain.cycle(SlotKind::Recolor);
        }
        assert_eq!(chain.tone_curve(), ToneCurveVariant::CrossProcess);
        assert_eq!(chain.recolor(), RecolorVariant::Cmv);
    }

    #[test]
    fn test_edge_stroke_toggles() {
        let mut chain = FilterChain::new().unwrap();
        chain.cycle(SlotKind::EdgeStroke);
        assert_eq!(chain.current(SlotKind::EdgeStroke), Some(ActiveFilter::EdgeStroke));
        assert_eq!(chain.index(SlotKind::EdgeStroke), 1);
        chain.cycle(SlotKind::EdgeStroke);
        assert!(!chain.stroke_enabled());
    }

    #[test]
    fn test_current_reports_variant() {
        let mut chain = FilterChain::new().unwrap();
        chain.cycle(SlotKind::Recolor);
        chain.cycle(SlotKind::Recolor);
        assert_eq!(
            chain.current(SlotKind::Recolor),
            Some(ActiveFilter::Recolor(RecolorVariant::Rc))
        );
    }

    #[test]
    fn test_slots_apply_in_fixed_order() {
        // find-edges blacks out a flat frame; a later cross-process curve then
        // lifts blue to 20. Reversed, the curve output would be wiped out.
        let mut chain = FilterChain::new().unwrap();
        chain.cycle(SlotKind::Convolution);
        chain.cycle(SlotKind::ToneCurve);
        let mut frame = Frame::filled(4, 4, [120, 120, 120]);
        chain.apply_all(&mut frame);
        assert!(frame.data.chunks_exact(3).all(|px| px == [0, 0, 20]));
    }

    #[test]
    fn test_recolor_slot_matches_direct_call() {
        let mut chain = FilterChain::new().unwrap();
        chain.cycle(SlotKind::Recolor);
        let mut via_chain = gradient();
        chain.apply_all(&mut via_chain);
        let mut direct = gradient();
        recolor_cmv(&mut direct);
        assert_eq!(via_chain, direct);
    }

    #[test]
    fn test_variant_names() {
        assert_eq!(ConvolutionVariant::Emboss.name(), "emboss");
        assert_eq!(ToneCurveVariant::CrossProcess.name(), "cross-process");
        assert_eq!(RecolorVariant::Rgv.name(), "rgv");
        assert!(RecolorVariant::None.is_none());
    }
}
