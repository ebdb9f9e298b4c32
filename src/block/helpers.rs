//! Text scanning helpers shared by the block processors.
//!
//! All indices are byte offsets. Every character these helpers look for is
//! ASCII, so slicing at a returned index always lands on a char boundary.

use std::borrow::Cow;

use crate::limits::TAB_STOP;

/// Space or tab.
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// True if the line holds nothing but spaces and tabs.
#[inline]
pub fn is_blank(line: &str) -> bool {
    line.bytes().all(is_whitespace)
}

/// Skip spaces and tabs starting at `start`.
///
/// Returns the index of the first other character (or the line length)
/// together with the skipped whitespace.
#[inline]
pub fn extract_whitespace(line: &str, start: usize) -> (usize, &str) {
    let bytes = line.as_bytes();
    let start = start.min(bytes.len());
    let mut index = start;
    while index < bytes.len() && is_whitespace(bytes[index]) {
        index += 1;
    }
    (index, &line[start..index])
}

/// Count leading occurrences of `ch` starting at `start`.
#[inline]
pub fn collect_while_character(line: &str, start: usize, ch: u8) -> usize {
    line.as_bytes()
        .get(start..)
        .map_or(0, |rest| rest.iter().take_while(|&&b| b == ch).count())
}

#[inline]
pub fn is_character_at_index(line: &str, index: usize, ch: u8) -> bool {
    line.as_bytes().get(index) == Some(&ch)
}

#[inline]
pub fn is_character_at_index_one_of(line: &str, index: usize, set: &[u8]) -> bool {
    line.as_bytes().get(index).is_some_and(|b| set.contains(b))
}

/// Whitespace at `index`, or `index` is at the end of the line.
#[inline]
pub fn is_whitespace_or_end_at(line: &str, index: usize) -> bool {
    line.as_bytes().get(index).is_none_or(|&b| is_whitespace(b))
}

/// Width in columns of `whitespace` when it begins at `start_column`.
///
/// Tabs advance to the next multiple of [`TAB_STOP`].
pub fn calculate_length(whitespace: &str, start_column: usize) -> usize {
    let mut column = start_column;
    for b in whitespace.bytes() {
        if b == b'\t' {
            column += TAB_STOP - column % TAB_STOP;
        } else {
            column += 1;
        }
    }
    column - start_column
}

/// Column of byte `index` in `text`, when `text` begins at `start_column`.
///
/// Only tabs widen; every other byte counts as one column, which holds for
/// the ASCII markers and whitespace that precede any index asked about.
#[inline]
pub fn column_at(text: &str, index: usize, start_column: usize) -> usize {
    start_column + calculate_length(&text[..index.min(text.len())], start_column)
}

/// Replace the tab at `index` with the spaces it stands for.
///
/// `start_column` is the source column of `text`'s first byte. Returns the
/// rewritten text and the index of the first inserted space; text without a
/// tab at `index` comes back unchanged.
pub fn expand_tabs_at(text: &str, index: usize, start_column: usize) -> (String, usize) {
    if !is_character_at_index(text, index, b'\t') {
        return (text.to_string(), index);
    }
    let width = calculate_length("\t", column_at(text, index, start_column));
    let mut expanded = String::with_capacity(text.len() + width);
    expanded.push_str(&text[..index]);
    expanded.extend(std::iter::repeat_n(' ', width));
    expanded.push_str(&text[index + 1..]);
    (expanded, index)
}

/// Rewrite the leading whitespace of `text` as spaces.
///
/// `start_column` is the source column of `text`'s first byte. Once a line
/// is cut after a container marker its tabs no longer sit at their own tab
/// stops, so later column arithmetic from zero needs them spelled out.
pub fn expand_leading_whitespace(text: &str, start_column: usize) -> Cow<'_, str> {
    let (index, whitespace) = extract_whitespace(text, 0);
    if !whitespace.contains('\t') {
        return Cow::Borrowed(text);
    }
    let width = calculate_length(whitespace, start_column);
    Cow::Owned(indent_with_spaces(width, &text[index..]))
}

/// Remove up to `columns` columns of leading whitespace.
///
/// A tab that straddles the cut leaves its unused columns behind as spaces.
pub fn remove_leading_columns(line: &str, columns: usize) -> String {
    let bytes = line.as_bytes();
    let mut column = 0;
    let mut index = 0;
    while index < bytes.len() && column < columns && is_whitespace(bytes[index]) {
        let width = if bytes[index] == b'\t' {
            TAB_STOP - column % TAB_STOP
        } else {
            1
        };
        if column + width > columns {
            let leftover = column + width - columns;
            let mut out = String::with_capacity(line.len() + leftover);
            out.extend(std::iter::repeat_n(' ', leftover));
            out.push_str(&line[index + 1..]);
            return out;
        }
        column += width;
        index += 1;
    }
    line[index..].to_string()
}

/// `count` spaces followed by `text`.
#[inline]
pub fn indent_with_spaces(count: usize, text: &str) -> String {
    let mut out = String::with_capacity(count + text.len());
    out.extend(std::iter::repeat_n(' ', count));
    out.push_str(text);
    out
}
