//! Tone curves: film-emulation presets built from control points.

use crate::camera::Frame;
use crate::curves::{Curve, CurveError, LookupTable};

/// Control points for one tone-curve preset.
///
/// The value curve is applied first, then the per-channel curve.
#[derive(Debug, Clone, Copy)]
pub struct CurvePreset {
    pub value: &'static [(u8, u8)],
    pub red: &'static [(u8, u8)],
    pub green: &'static [(u8, u8)],
    pub blue: &'static [(u8, u8)],
}

pub const CROSS_PROCESS: CurvePreset = CurvePreset {
    value: &[(0, 0), (255, 255)],
    red: &[(0, 0), (56, 22), (211, 255), (255, 255)],
    green: &[(0, 0), (56, 39), (208, 226), (255, 255)],
    blue: &[(0, 20), (255, 235)],
};

pub const PORTRA: CurvePreset = CurvePreset {
    value: &[(0, 0), (23, 20), (157, 173), (255, 255)],
    red: &[(0, 0), (69, 69), (213, 218), (255, 255)],
    green: &[(0, 0), (52, 47), (189, 196), (255, 255)],
    blue: &[(0, 0), (41, 46), (231, 238), (255, 255)],
};

pub const PROVIA: CurvePreset = CurvePreset {
    value: &[],
    red: &[(0, 0), (59, 54), (202, 210), (255, 255)],
    green: &[(0, 0), (27, 21), (196, 207), (255, 255)],
    blue: &[(0, 0), (35, 35), (205, 227), (255, 255)],
};

pub const VELVIA: CurvePreset = CurvePreset {
    value: &[(0, 0), (128, 118), (221, 215), (255, 255)],
    red: &[(0, 0), (41, 28), (183, 209), (255, 255)],
    green: &[(0, 0), (25, 21), (95, 102), (255, 255)],
    blue: &[(0, 0), (25, 21), (122, 153), (255, 255)],
};

/// Separate lookup tables for R, G and B, each composed with a shared
/// value curve.
///
/// Grayscale frames only receive the value table.
#[derive(Debug, Clone)]
pub struct ChannelCurveFilter {
    value: Option<LookupTable>,
    red: Option<LookupTable>,
    green: Option<LookupTable>,
    blue: Option<LookupTable>,
}

impl ChannelCurveFilter {
    pub fn from_preset(preset: &CurvePreset) -> Result<Self, CurveError> {
        Self::from_points(preset.value, preset.red, preset.green, preset.blue)
    }

    /// Build the filter from control points. Any list with fewer than two
    /// points leaves its curve out, and a channel only gets a table when both
    /// it and the value curve exist. Without a value curve the filter does
    /// nothing.
    pub fn from_points(
        value: &[(u8, u8)],
        red: &[(u8, u8)],
        green: &[(u8, u8)],
        blue: &[(u8, u8)],
    ) -> Result<Self, CurveError> {
        let channel = |points: &[(u8, u8)]| -> Result<Option<LookupTable>, CurveError> {
            let composite = Curve::compose(Curve::from_points(points)?, Curve::from_points(value)?);
            Ok(composite.map(|c| LookupTable::from_curve(&c)))
        };

        Ok(ChannelCurveFilter {
            value: LookupTable::from_points(value)?,
            red: channel(red)?,
            green: channel(green)?,
            blue: channel(blue)?,
        })
    }

    /// Remap `frame` in place. Channels without a table are skipped.
    pub fn apply(&self, frame: &mut Frame) {
        if frame.is_gray() {
            if let Some(table) = &self.value {
                table.apply_in_place(&mut frame.data);
            }
            return;
        }

        for (channel, table) in [&self.red, &self.green, &self.blue].into_iter().enumerate() {
            if let Some(table) = table {
                table.apply_channel(&mut frame.data, channel, 3);
            }
        }
    }

    pub fn red(&self) -> Option<&LookupTable> {
        self.red.as_ref()
    }

    pub fn green(&self) -> Option<&LookupTable> {
        self.green.as_ref()
    }

    pub fn blue(&self) -> Option<&LookupTable> {
        self.blue.as_ref()
    }
}

/// One table applied to every byte of the frame, whatever its layout.
#[derive(Debug, Clone)]
pub struct ValueCurveFilter {
    table: Option<LookupTable>,
}

impl ValueCurveFilter {
    pub fn from_points(points: &[(u8, u8)]) -> Result<Self, CurveError> {
        Ok(ValueCurveFilter {
            table: LookupTable::from_points(points)?,
        })
    }

    pub fn apply(&self, frame: &mut Frame) {
        if let Some(table) = &self.table {
            table.apply_in_place(&mut frame.data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_build() {
        for preset in [CROSS_PROCESS, PORTRA, VELVIA] {
            let filter = ChannelCurveFilter::from_preset(&preset).unwrap();
            assert!(filter.red().is_some());
            assert!(filter.green().is_some());
            assert!(filter.blue().is_some());
        }
    }

    #[test]
    fn test_cross_process_blue_is_linear_lift() {
        let filter = ChannelCurveFilter::from_preset(&CROSS_PROCESS).unwrap();
        let blue = filter.blue().unwrap();
        assert_eq!(blue.get(0), 20);
        assert_eq!(blue.get(255), 235);
        assert!(blue.get(128) > 120 && blue.get(128) < 135);
    }

    #[test]
    fn test_provia_without_value_curve_leaves_frame() {
        let filter = ChannelCurveFilter::from_preset(&PROVIA).unwrap();
        assert!(filter.red().is_none());
        assert!(filter.green().is_none());
        assert!(filter.blue().is_none());

        let mut frame = Frame::filled(2, 2, [59, 27, 35]);
        let before = frame.clone();
        filter.apply(&mut frame);
        assert_eq!(frame, before);

        let mut gray = Frame::gray(2, 1, vec![59, 200]).unwrap();
        filter.apply(&mut gray);
        assert_eq!(gray.data, vec![59, 200]);
    }

    #[test]
    fn test_value_curve_is_applied_before_channel_curve() {
        // value halves, red inverts: red(value(200)) = 255 - 100
        let filter = ChannelCurveFilter::from_points(
            &[(0, 0), (255, 127)],
            &[(0, 255), (255, 0)],
            &[],
            &[],
        )
        .unwrap();
        let mut frame = Frame::filled(1, 1, [200, 200, 200]);
        filter.apply(&mut frame);
        let expected_value: f64 = 200.0 * 127.0 / 255.0;
        let expected_red = (255.0 - expected_value) as u8;
        assert_eq!(frame.pixel(0, 0)[0], expected_red);
        // no green or blue curve, so no table for them
        assert_eq!(frame.pixel(0, 0)[1], 200);
        assert_eq!(frame.pixel(0, 0)[2], 200);
    }

    #[test]
    fn test_gray_frame_uses_value_table_only() {
        let filter = ChannelCurveFilter::from_points(
            &[(0, 255), (255, 0)],
            &[(0, 0), (255, 0)],
            &[],
            &[],
        )
        .unwrap();
        let mut frame = Frame::gray(2, 1, vec![0, 255]).unwrap();
        filter.apply(&mut frame);
        assert_eq!(frame.data, vec![255, 0]);
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let filter = ChannelCurveFilter::from_points(&[], &[], &[], &[]).unwrap();
        let mut frame = Frame::filled(2, 2, [1, 2, 3]);
        let before = frame.clone();
        filter.apply(&mut frame);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_value_curve_filter_touches_every_byte() {
        let filter = ValueCurveFilter::from_points(&[(0, 255), (255, 0)]).unwrap();
        let mut frame = Frame::rgb(1, 1, vec![0, 100, 255]).unwrap();
        filter.apply(&mut frame);
        assert_eq!(frame.data, vec![255, 155, 0]);
    }
}
