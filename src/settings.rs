//! Viewer navigation settings
//!
//! The flags exposed by the settings panel. The panel mutates them; the
//! navigation mode switch reads them. Nothing else touches this struct.

/// Boolean toggles driving camera navigation.
///
/// `first_person` takes precedence over `three_person`; `gravity`,
/// `collision` and `position_easing` only have an effect while one of the
/// two person modes is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerSettings {
    pub first_person: bool,
    pub gravity: bool,
    pub collision: bool,
    pub position_easing: bool,
    pub three_person: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            first_person: false,
            gravity: false,
            collision: false,
            position_easing: false,
            three_person: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_all_off() {
        let settings = ViewerSettings::default();
        assert!(!settings.first_person);
        assert!(!settings.gravity);
        assert!(!settings.collision);
        assert!(!settings.position_easing);
        assert!(!settings.three_person);
    }
}
