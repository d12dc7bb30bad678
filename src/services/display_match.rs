//! Locating the active display mode inside the backend's mode list.

use crate::models::DisplayMode;

/// Finds the list index of the currently active display mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayModeMatcher;

impl DisplayModeMatcher {
    /// Index of the first mode matching `current` by [`DisplayMode::approx_eq`].
    ///
    /// Falls back to 0 when nothing matches (including an empty list) so a resolution
    /// dropdown always has a selection. The list is scanned in backend order and never
    /// re-sorted, so when several entries match, the backend's enumeration order decides.
    pub fn find_index(modes: &[DisplayMode], current: &DisplayMode) -> usize {
        match modes.iter().position(|mode| mode.approx_eq(current)) {
            Some(index) => index,
            None => {
                tracing::debug!(
                    "Active mode {} not in list of {} modes, selecting index 0",
                    current,
                    modes.len()
                );
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn modes() -> Vec<DisplayMode> {
        vec![
            DisplayMode::new(1920, 1080, 60.0),
            DisplayMode::new(1280, 720, 60.0),
            DisplayMode::new(1920, 1080, 144.0),
        ]
    }

    #[test]
    fn test_first_match_after_rounding() {
        let current = DisplayMode::new(1920, 1080, 60.0002);
        assert_eq!(DisplayModeMatcher::find_index(&modes(), &current), 0);
    }

    #[test]
    fn test_matches_later_entry() {
        let current = DisplayMode::new(1920, 1080, 143.9);
        assert_eq!(DisplayModeMatcher::find_index(&modes(), &current), 2);

        let current = DisplayMode::new(1280, 720, 59.94);
        assert_eq!(DisplayModeMatcher::find_index(&modes(), &current), 1);
    }

    #[test]
    fn test_empty_list_falls_back_to_zero() {
        let current = DisplayMode::new(1920, 1080, 60.0);
        assert_eq!(DisplayModeMatcher::find_index(&[], &current), 0);
    }

    #[test]
    fn test_no_match_falls_back_to_zero() {
        let current = DisplayMode::new(3840, 2160, 120.0);
        assert_eq!(DisplayModeMatcher::find_index(&modes(), &current), 0);
    }

    #[test]
    fn test_duplicates_resolve_to_first_in_backend_order() {
        let list = vec![
            DisplayMode::new(800, 600, 75.0),
            DisplayMode::new(1920, 1080, 59.94),
            DisplayMode::new(1920, 1080, 60.0),
        ];
        let current = DisplayMode::new(1920, 1080, 60.0);
        assert_eq!(DisplayModeMatcher::find_index(&list, &current), 1);
    }

    proptest! {
        #[test]
        fn prop_index_always_in_bounds_or_zero(
            entries in prop::collection::vec((1u32..4000, 1u32..3000, 24.0f64..240.0), 0..12),
            width in 1u32..4000,
            height in 1u32..3000,
            rate in 24.0f64..240.0,
        ) {
            let list: Vec<_> = entries
                .into_iter()
                .map(|(w, h, r)| DisplayMode::new(w, h, r))
                .collect();
            let index = DisplayModeMatcher::find_index(&list, &DisplayMode::new(width, height, rate));
            prop_assert!(index == 0 || index < list.len());
        }
    }
}
