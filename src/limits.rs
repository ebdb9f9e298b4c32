//! Column and width constants for block structure.
//!
//! CommonMark fixes these numbers; keeping them in one place keeps the
//! indentation arithmetic in the processors readable.

/// Tabs advance to the next multiple of this many columns.
pub const TAB_STOP: usize = 4;

/// Container markers and leaf block starts may be indented at most this far.
pub const MAX_MARKER_INDENT: usize = 3;

/// Indentation that turns a line into indented code.
pub const CODE_INDENT: usize = 4;

/// Maximum digits in ordered list marker (prevents big-integer parsing)
pub const MAX_LIST_MARKER_DIGITS: usize = 9;

/// More spaces than this after a list marker collapse to a single separator.
pub const MAX_SPACES_AFTER_LIST_MARKER: usize = 4;

/// Shortest run of backticks or tildes that opens a fence.
pub const MIN_FENCE_LENGTH: usize = 3;

/// Deepest ATX heading.
pub const MAX_HEADING_LEVEL: usize = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_consistent() {
        const { assert!(MAX_MARKER_INDENT < CODE_INDENT) };
        const { assert!(CODE_INDENT == TAB_STOP) };
        const { assert!(MAX_SPACES_AFTER_LIST_MARKER == CODE_INDENT) };
        const { assert!(MAX_LIST_MARKER_DIGITS <= 9) };
    }
}
