//! Depth rules shared by structure sections and category groups.

/// Check whether a node at `level` (1-based) fits under `max_levels`.
pub fn level_allowed(level: u32, max_levels: Option<u32>) -> bool {
    max_levels.map_or(true, |max| level <= max)
}

/// Check that moving from `current` to `new` only widens the depth bound.
///
/// `None` means unlimited, so any change to `None` widens and any change from
/// `None` to a finite bound narrows.
pub fn check_widening(current: Option<u32>, new: Option<u32>) -> Result<(), String> {
    match (current, new) {
        (_, Some(0)) => Err("Max levels must be at least 1.".to_string()),
        (_, None) => Ok(()),
        (None, Some(n)) => Err(format!("Cannot limit an unbounded tree to {} levels.", n)),
        (Some(old), Some(n)) if n < old => {
            Err(format!("Cannot lower max levels from {} to {}.", old, n))
        }
        _ => Ok(()),
    }
}
