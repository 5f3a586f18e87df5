//! Keyboard handling.
//!
//! Maps keys from the preview window to application commands:
//! - Space: save a snapshot
//! - Tab: start or stop recording
//! - Escape: quit
//! - C / R / K: cycle tone curve, recolor, convolution
//! - S: toggle edge stroke
//! - X: toggle face rectangles (extended mode only)

/// A key the application listens for, independent of the window backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keypress {
    Space,
    Tab,
    Escape,
    Char(char),
}

/// What a keypress asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Snapshot,
    ToggleRecording,
    Quit,
    CycleToneCurve,
    CycleRecolor,
    CycleConvolution,
    ToggleStroke,
    ToggleDebugRects,
}

/// Translate a keypress. Letters are case-insensitive; `x` only exists in
/// extended mode.
pub fn command_for(key: Keypress, extended: bool) -> Option<Command> {
    match key {
        Keypress::Space => Some(Command::Snapshot),
        Keypress::Tab => Some(Command::ToggleRecording),
        Keypress::Escape => Some(Command::Quit),
        Keypress::Char(c) => match c.to_ascii_lowercase() {
            'c' => Some(Command::CycleToneCurve),
            'r' => Some(Command::CycleRecolor),
            'k' => Some(Command::CycleConvolution),
            's' => Some(Command::ToggleStroke),
            'x' if extended => Some(Command::ToggleDebugRects),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_keys() {
        assert_eq!(command_for(Keypress::Space, false), Some(Command::Snapshot));
        assert_eq!(
            command_for(Keypress::Tab, false),
            Some(Command::ToggleRecording)
        );
        assert_eq!(command_for(Keypress::Escape, true), Some(Command::Quit));
    }

    #[test]
    fn test_letters_are_case_insensitive() {
        for c in ['c', 'C'] {
            assert_eq!(
                command_for(Keypress::Char(c), false),
                Some(Command::CycleToneCurve)
            );
        }
        assert_eq!(
            command_for(Keypress::Char('K'), false),
            Some(Command::CycleConvolution)
        );
        assert_eq!(
            command_for(Keypress::Char('r'), false),
            Some(Command::CycleRecolor)
        );
        assert_eq!(
            command_for(Keypress::Char('S'), false),
            Some(Command::ToggleStroke)
        );
    }

    #[test]
    fn test_debug_rects_only_in_extended_mode() {
        assert_eq!(command_for(Keypress::Char('x'), false), None);
        assert_eq!(
            command_for(Keypress::Char('X'), true),
            Some(Command::ToggleDebugRects)
        );
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(command_for(Keypress::Char('q'), true), None);
        assert_eq!(command_for(Keypress::Char('1'), false), None);
    }
}
