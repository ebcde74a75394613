/// How the coverage map is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Fixed-aspect map inside the dashboard card
    #[default]
    Normal,
    /// Map covers the whole viewport
    Fullscreen,
}

impl DisplayMode {
    pub fn is_fullscreen(self) -> bool {
        matches!(self, Self::Fullscreen)
    }

    /// The explicit fullscreen control: flips between the two modes.
    pub fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Fullscreen,
            Self::Fullscreen => Self::Normal,
        }
    }

    /// Escape leaves fullscreen and is a no-op otherwise. The second value
    /// reports whether the key press was consumed.
    pub fn escaped(self) -> (Self, bool) {
        match self {
            Self::Fullscreen => (Self::Normal, true),
            Self::Normal => (Self::Normal, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_normal() {
        assert_eq!(DisplayMode::default(), DisplayMode::Normal);
    }

    #[test]
    fn test_toggle_round_trip() {
        let mode = DisplayMode::Normal.toggled();
        assert!(mode.is_fullscreen());
        assert_eq!(mode.toggled(), DisplayMode::Normal);
    }

    #[test]
    fn test_escape_exits_fullscreen() {
        assert_eq!(
            DisplayMode::Fullscreen.escaped(),
            (DisplayMode::Normal, true)
        );
    }

    #[test]
    fn test_escape_in_normal_is_not_consumed() {
        assert_eq!(DisplayMode::Normal.escaped(), (DisplayMode::Normal, false));
    }
}
