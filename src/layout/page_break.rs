//! # Page Break Decisions
//!
//! Table rows are unbreakable: a row either fits below the cursor on the
//! current page or moves, whole, to the next one. Rows taller than a fresh
//! page can hold are capped first, so moving always succeeds.

/// What to do with a block that is about to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Draw it on the current page.
    Place,
    /// Start a new page and draw it there.
    MoveToNextPage,
}

/// Decide whether a block of `height` starting at `y` fits above `bottom`.
pub fn decide_break(y: f64, height: f64, bottom: f64) -> BreakDecision {
    if y + height > bottom {
        BreakDecision::MoveToNextPage
    } else {
        BreakDecision::Place
    }
}

/// Cap a row to `max_height`. Returns the height to draw and whether
/// content had to be clipped.
pub fn cap_height(height: f64, max_height: f64) -> (f64, bool) {
    if height > max_height {
        (max_height, true)
    } else {
        (height, false)
    }
}
