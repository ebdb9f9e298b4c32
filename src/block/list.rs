//! List starts, new items and continuation of open list items.

use log::{debug, trace};

use super::helpers::{
    calculate_length, column_at, extract_whitespace, indent_with_spaces,
    is_character_at_index_one_of, is_whitespace_or_end_at,
};
use super::leaf::LeafBlockProcessor;
use super::parser::ContainerContext;
use super::stack::{ListData, StackKind, StackToken};
use super::state::{CloseBlocks, ParserState};
use super::token::MarkdownToken;
use crate::limits::{
    CODE_INDENT, MAX_LIST_MARKER_DIGITS, MAX_MARKER_INDENT, MAX_SPACES_AFTER_LIST_MARKER,
};

/// An ordered list marker such as `12.` or `3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedListStart {
    /// Index of the `.` or `)` after the digits.
    pub delimiter_index: usize,
    pub digit_count: usize,
    /// Index of the first non-whitespace character after the marker.
    pub after_whitespace_index: usize,
}

/// Column arithmetic for a new list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListIndent {
    pub indent_level: usize,
    /// Spaces given back to the item's first line when the marker is
    /// followed by more than four of them.
    pub remaining_whitespace: usize,
    pub ws_after_marker: usize,
}

impl ListIndent {
    /// `marker_width` is zero for bullets and the digit count for ordered
    /// markers, so a bullet plus one space yields `ws_before + 2`.
    pub fn calculate(
        ws_before_marker: usize,
        ws_after_marker: usize,
        marker_width: usize,
        at_end_of_line: bool,
    ) -> Self {
        if at_end_of_line {
            return Self {
                indent_level: ws_before_marker + 2 + marker_width,
                remaining_whitespace: 0,
                ws_after_marker: 1,
            };
        }
        let indent_level = ws_before_marker + 1 + ws_after_marker + marker_width;
        if ws_after_marker > MAX_SPACES_AFTER_LIST_MARKER {
            Self {
                indent_level: indent_level - ws_after_marker + 1,
                remaining_whitespace: ws_after_marker - 1,
                ws_after_marker: 1,
            }
        } else {
            Self {
                indent_level,
                remaining_whitespace: 0,
                ws_after_marker,
            }
        }
    }
}

/// How a new marker relates to the innermost open list of its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMatchDecision {
    /// Same kind, marker and indent: another item of the open list.
    SameList,
    /// Same kind and marker at a different indent: still another item.
    SiblingItem,
    /// Far enough right to sit inside the open item.
    NestedList,
    /// Left of the enclosing item's content: try the next list out.
    OuterList,
    /// Kind or marker changed: the open list ends and a new one starts.
    DifferentList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStartOutcome {
    NotStarted,
    Started {
        /// Item content on this line, re-indented when needed.
        remaining_line: String,
        indent_level: usize,
        /// Source column where `remaining_line` begins.
        content_column: usize,
    },
}

/// A line that did not start a list item, seen while a list is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContinuation {
    pub line: String,
    /// Columns dropped from the front of the line.
    pub removed: usize,
    /// The line only continues a paragraph lazily.
    pub is_lazy: bool,
}

impl ListContinuation {
    fn unchanged(line: &str) -> Self {
        Self {
            line: line.to_string(),
            removed: 0,
            is_lazy: false,
        }
    }
}

pub struct ListBlockProcessor;

impl ListBlockProcessor {
    /// An empty item cannot interrupt a paragraph, and neither can an
    /// ordered item starting at anything other than 1. Paragraphs directly
    /// inside a list item are exempt.
    fn in_interruptible_paragraph(state: &ParserState) -> bool {
        state.stack.top().is_paragraph()
            && !state.stack.parent_of_top().is_some_and(StackToken::is_list)
    }

    /// A `-`, `+` or `*` bullet. Returns the index of the item's content.
    pub fn is_ulist_start(
        state: &ParserState,
        line: &str,
        start_index: usize,
        adj_ws: &str,
        skip_whitespace_check: bool,
    ) -> Option<usize> {
        if !(skip_whitespace_check || calculate_length(adj_ws, 0) <= MAX_MARKER_INDENT)
            || !is_character_at_index_one_of(line, start_index, b"-+*")
            || !is_whitespace_or_end_at(line, start_index + 1)
        {
            return None;
        }
        let (after_whitespace_index, _) = extract_whitespace(line, start_index + 1);
        if LeafBlockProcessor::is_thematic_break(line, start_index, adj_ws, true).is_some() {
            return None;
        }
        if Self::in_interruptible_paragraph(state) && after_whitespace_index == line.len() {
            return None;
        }
        Some(after_whitespace_index)
    }

    /// One to nine digits followed by `.` or `)`.
    pub fn is_olist_start(
        state: &ParserState,
        line: &str,
        start_index: usize,
        adj_ws: &str,
        skip_whitespace_check: bool,
    ) -> Option<OrderedListStart> {
        if !(skip_whitespace_check || calculate_length(adj_ws, 0) <= MAX_MARKER_INDENT) {
            return None;
        }
        let digits = line.as_bytes().get(start_index..)?;
        let digit_count = digits.iter().take_while(|b| b.is_ascii_digit()).count();
        if digit_count == 0 || digit_count > MAX_LIST_MARKER_DIGITS {
            return None;
        }
        let delimiter_index = start_index + digit_count;
        if !is_character_at_index_one_of(line, delimiter_index, b".)")
            || !is_whitespace_or_end_at(line, delimiter_index + 1)
        {
            return None;
        }
        let (after_whitespace_index, _) = extract_whitespace(line, delimiter_index + 1);
        if Self::in_interruptible_paragraph(state)
            && (after_whitespace_index == line.len() || &line[start_index..delimiter_index] != "1")
        {
            return None;
        }
        Some(OrderedListStart {
            delimiter_index,
            digit_count,
            after_whitespace_index,
        })
    }

    pub fn handle_ulist_block(
        state: &mut ParserState,
        line: &str,
        start_index: usize,
        extracted_whitespace: &str,
        adj_ws: &str,
        context: ContainerContext,
    ) -> ListStartOutcome {
        if Self::is_ulist_start(state, line, start_index, adj_ws, false).is_none() {
            return ListStartOutcome::NotStarted;
        }
        Self::open_list_item(
            state,
            line,
            StackKind::UnorderedList,
            start_index,
            start_index,
            0,
            extracted_whitespace,
            context,
        )
    }

    pub fn handle_olist_block(
        state: &mut ParserState,
        line: &str,
        start_index: usize,
        extracted_whitespace: &str,
        adj_ws: &str,
        context: ContainerContext,
    ) -> ListStartOutcome {
        let Some(start) = Self::is_olist_start(state, line, start_index, adj_ws, false) else {
            return ListStartOutcome::NotStarted;
        };
        Self::open_list_item(
            state,
            line,
            StackKind::OrderedList,
            start_index,
            start.delimiter_index,
            start.digit_count,
            extracted_whitespace,
            context,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn open_list_item(
        state: &mut ParserState,
        line: &str,
        kind: StackKind,
        start_index: usize,
        marker_end: usize,
        marker_width: usize,
        extracted_whitespace: &str,
        context: ContainerContext,
    ) -> ListStartOutcome {
        let (after_whitespace_index, after_whitespace) = extract_whitespace(line, marker_end + 1);
        let ws_after_marker = calculate_length(
            after_whitespace,
            column_at(line, marker_end + 1, context.column_offset),
        );
        let ws_before_marker = calculate_length(extracted_whitespace, 0) + context.list_base;

        Self::handle_list_nesting(state, context.this_bq_count);

        let indent = ListIndent::calculate(
            ws_before_marker,
            ws_after_marker,
            marker_width,
            after_whitespace_index == line.len(),
        );
        let data = ListData {
            indent_level: indent.indent_level,
            list_marker_text: line[start_index..=marker_end].to_string(),
            ws_before_marker,
            ws_after_marker: indent.ws_after_marker,
            start_index,
        };
        let position = state.position_at(column_at(line, start_index, context.column_offset));
        let list_marker = data.marker_char();
        let start_token = if kind == StackKind::OrderedList {
            MarkdownToken::OrderedListStart {
                position,
                list_marker,
                list_start: line[start_index..marker_end].to_string(),
                indent_level: indent.indent_level,
                extracted_whitespace: extracted_whitespace.to_string(),
            }
        } else {
            MarkdownToken::UnorderedListStart {
                position,
                list_marker,
                indent_level: indent.indent_level,
                extracted_whitespace: extracted_whitespace.to_string(),
            }
        };
        let item_token = MarkdownToken::NewListItem {
            position,
            indent_level: indent.indent_level,
            extracted_whitespace: extracted_whitespace.to_string(),
        };
        let entry = if kind == StackKind::OrderedList {
            StackToken::OrderedList(data)
        } else {
            StackToken::UnorderedList(data)
        };
        Self::post_list(state, entry, start_token, item_token, context.this_bq_count);

        ListStartOutcome::Started {
            remaining_line: indent_with_spaces(
                indent.remaining_whitespace,
                &line[after_whitespace_index..],
            ),
            indent_level: indent.indent_level,
            content_column: column_at(line, after_whitespace_index, context.column_offset)
                - indent.remaining_whitespace,
        }
    }

    /// Quotes opened deeper than the markers on this line end before a list
    /// item can start.
    fn handle_list_nesting(state: &mut ParserState, this_bq_count: usize) {
        while state.stack.block_quote_count() > this_bq_count {
            let Some(index) = state.stack.innermost_block_quote() else {
                break;
            };
            let tokens = state.close_open_blocks(CloseBlocks::down_to(index));
            state.document.extend(tokens);
        }
    }

    /// Compare a new list entry with an open one.
    ///
    /// `outer_indent` is the content column of the list enclosing `old` in
    /// the same block quote context, if there is one.
    pub fn compare_list_starts(
        old: &StackToken,
        outer_indent: Option<usize>,
        new: &StackToken,
    ) -> ListMatchDecision {
        let (Some(old_data), Some(new_data)) = (old.list(), new.list()) else {
            return ListMatchDecision::DifferentList;
        };
        if new_data.ws_before_marker >= old_data.indent_level {
            return ListMatchDecision::NestedList;
        }
        if outer_indent.is_some_and(|indent| new_data.ws_before_marker < indent) {
            return ListMatchDecision::OuterList;
        }
        Self::compare_markers(old, new)
    }

    /// Same list or a different one, judged on kind and marker alone.
    fn compare_markers(old: &StackToken, new: &StackToken) -> ListMatchDecision {
        let (Some(old_data), Some(new_data)) = (old.list(), new.list()) else {
            return ListMatchDecision::DifferentList;
        };
        if old.kind() != new.kind() || old_data.marker_char() != new_data.marker_char() {
            return ListMatchDecision::DifferentList;
        }
        if old_data.indent_level == new_data.indent_level {
            ListMatchDecision::SameList
        } else {
            ListMatchDecision::SiblingItem
        }
    }

    /// Place a freshly scanned list entry on the stack.
    ///
    /// An empty item already ended by a blank line cannot hold the new
    /// marker, so it is matched as a sibling or a different list instead.
    fn post_list(
        state: &mut ParserState,
        entry: StackToken,
        start_token: MarkdownToken,
        item_token: MarkdownToken,
        this_bq_count: usize,
    ) {
        let Some(last_list_index) = LeafBlockProcessor::check_for_list_in_process(state, this_bq_count)
        else {
            let tokens = state.close_open_blocks(CloseBlocks::default());
            state.document.extend(tokens);
            Self::push_list(state, entry, start_token);
            return;
        };

        let mut ended_empty_item = Self::is_empty_item_after_blank(state);
        let tokens = state.close_open_blocks(CloseBlocks::down_to(last_list_index + 1));
        state.document.extend(tokens);
        loop {
            let lists = state.stack.lists_at_level(this_bq_count);
            let Some((&index, outer)) = lists.split_last() else {
                Self::push_list(state, entry, start_token);
                return;
            };
            let outer_indent = outer
                .last()
                .and_then(|&i| state.stack.get(i))
                .and_then(StackToken::list)
                .map(|data| data.indent_level);
            let Some(old) = state.stack.get(index) else {
                Self::push_list(state, entry, start_token);
                return;
            };
            let decision = match Self::compare_list_starts(old, outer_indent, &entry) {
                ListMatchDecision::NestedList if ended_empty_item => {
                    Self::compare_markers(old, &entry)
                }
                decision => decision,
            };
            ended_empty_item = false;
            debug!(
                "line {}: list marker vs stack[{}]: {:?}",
                state.line_number, index, decision
            );
            match decision {
                ListMatchDecision::NestedList => {
                    Self::push_list(state, entry, start_token);
                    return;
                }
                ListMatchDecision::SameList | ListMatchDecision::SiblingItem => {
                    let tokens = state.close_open_blocks(CloseBlocks::down_to(index + 1));
                    state.document.extend(tokens);
                    if let (Some(slot), Some(data)) = (
                        state.stack.get_mut(index).and_then(StackToken::list_mut),
                        entry.list(),
                    ) {
                        *slot = data.clone();
                    }
                    state.document.push(item_token);
                    return;
                }
                ListMatchDecision::DifferentList => {
                    let tokens = state.close_open_blocks(CloseBlocks::down_to(index));
                    state.document.extend(tokens);
                    Self::push_list(state, entry, start_token);
                    return;
                }
                ListMatchDecision::OuterList => {
                    let tokens = state.close_open_blocks(CloseBlocks::down_to(index));
                    state.document.extend(tokens);
                }
            }
        }
    }

    fn push_list(state: &mut ParserState, entry: StackToken, start_token: MarkdownToken) {
        state.open_block(entry);
        state.document.push(start_token);
    }

    /// The innermost item opened with no content and was followed by a
    /// blank line; it cannot take more content.
    fn is_empty_item_after_blank(state: &ParserState) -> bool {
        match state.document.as_slice() {
            [.., before, last] => last.is_blank_line() && before.is_list_token(),
            _ => false,
        }
    }

    /// Decide how a line without a list marker relates to the open list
    /// items of its block quote context.
    pub fn list_in_process(
        state: &mut ParserState,
        line: &str,
        start_index: usize,
        extracted_whitespace: &str,
        this_bq_count: usize,
    ) -> ListContinuation {
        let Some(mut stack_index) =
            LeafBlockProcessor::check_for_list_in_process(state, this_bq_count)
        else {
            return ListContinuation::unchanged(line);
        };
        let leading_space_length = calculate_length(extracted_whitespace, 0);

        if Self::is_empty_item_after_blank(state) {
            debug!("line {}: empty list item ends after blank line", state.line_number);
            let tokens = state.close_open_blocks(CloseBlocks::down_to(stack_index));
            state.document.extend(tokens);
            match LeafBlockProcessor::check_for_list_in_process(state, this_bq_count) {
                Some(index) => stack_index = index,
                None => return ListContinuation::unchanged(line),
            }
        }

        let requested_indent = state
            .stack
            .get(stack_index)
            .and_then(StackToken::list)
            .map_or(0, |data| data.indent_level);
        let looks_like_list_start =
            Self::is_ulist_start(state, line, start_index, extracted_whitespace, true).is_some()
                || Self::is_olist_start(state, line, start_index, extracted_whitespace, true)
                    .is_some();
        let previous_is_blank = state.document.last().is_some_and(MarkdownToken::is_blank_line);
        let allow_list_continue =
            !(leading_space_length >= CODE_INDENT && looks_like_list_start && previous_is_blank);
        trace!(
            "line {}: leading={} requested={} allow={}",
            state.line_number,
            leading_space_length,
            requested_indent,
            allow_list_continue
        );

        if allow_list_continue && leading_space_length >= requested_indent {
            return Self::adjust_line(line, start_index, leading_space_length, requested_indent);
        }

        if state.stack.top().is_paragraph()
            && !LeafBlockProcessor::is_paragraph_interrupt(line, start_index, extracted_whitespace)
        {
            return ListContinuation {
                line: line[start_index..].to_string(),
                removed: leading_space_length,
                is_lazy: true,
            };
        }

        Self::check_for_list_closures(state, leading_space_length, this_bq_count);
        match LeafBlockProcessor::check_for_list_in_process(state, this_bq_count)
            .and_then(|index| state.stack.get(index))
            .and_then(StackToken::list)
            .map(|data| data.indent_level)
        {
            Some(indent) if leading_space_length >= indent => {
                Self::adjust_line(line, start_index, leading_space_length, indent)
            }
            _ => ListContinuation::unchanged(line),
        }
    }

    /// Close every list of the context whose items need more indentation
    /// than the line has.
    pub fn check_for_list_closures(
        state: &mut ParserState,
        leading_space_length: usize,
        this_bq_count: usize,
    ) {
        let first_unmatched = state
            .stack
            .lists_at_level(this_bq_count)
            .into_iter()
            .find(|&index| {
                state
                    .stack
                    .get(index)
                    .and_then(StackToken::list)
                    .is_some_and(|data| data.indent_level > leading_space_length)
            });
        if let Some(index) = first_unmatched {
            let tokens = state.close_open_blocks(CloseBlocks::down_to(index));
            state.document.extend(tokens);
        }
    }

    /// Strip an item's indentation, keeping any excess as spaces.
    fn adjust_line(
        line: &str,
        start_index: usize,
        leading_space_length: usize,
        indent: usize,
    ) -> ListContinuation {
        let excess = leading_space_length - indent;
        ListContinuation {
            line: indent_with_spaces(excess, &line[start_index..]),
            removed: indent,
            is_lazy: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list(kind: StackKind, marker: &str, ws_before_marker: usize, indent_level: usize) -> StackToken {
        let data = ListData {
            indent_level,
            list_marker_text: marker.to_string(),
            ws_before_marker,
            ws_after_marker: 1,
            start_index: ws_before_marker,
        };
        match kind {
            StackKind::OrderedList => StackToken::OrderedList(data),
            _ => StackToken::UnorderedList(data),
        }
    }

    fn names(state: &ParserState) -> Vec<&'static str> {
        state.document.iter().map(MarkdownToken::name).collect()
    }

    #[test]
    fn test_ulist_start() {
        let state = ParserState::new();
        assert_eq!(ListBlockProcessor::is_ulist_start(&state, "- a", 0, "", false), Some(2));
        assert_eq!(ListBlockProcessor::is_ulist_start(&state, "+", 0, "", false), Some(1));
        assert_eq!(ListBlockProcessor::is_ulist_start(&state, "-a", 0, "", false), None);
        assert_eq!(ListBlockProcessor::is_ulist_start(&state, "* * *", 0, "", false), None);
        assert_eq!(ListBlockProcessor::is_ulist_start(&state, "    - a", 4, "    ", false), None);
        assert_eq!(ListBlockProcessor::is_ulist_start(&state, "    - a", 4, "    ", true), Some(6));
    }

    #[test]
    fn test_empty_bullet_cannot_interrupt_paragraph() {
        let mut state = ParserState::new();
        state.open_block(StackToken::Paragraph { token_index: 0 });
        assert_eq!(ListBlockProcessor::is_ulist_start(&state, "-", 0, "", false), None);
        assert_eq!(ListBlockProcessor::is_ulist_start(&state, "- b", 0, "", false), Some(2));
    }

    #[test]
    fn test_olist_start() {
        let state = ParserState::new();
        let start = ListBlockProcessor::is_olist_start(&state, "12) foo", 0, "", false).unwrap();
        assert_eq!(start.delimiter_index, 2);
        assert_eq!(start.digit_count, 2);
        assert_eq!(start.after_whitespace_index, 4);
        assert!(ListBlockProcessor::is_olist_start(&state, "1234567890. a", 0, "", false).is_none());
        assert!(ListBlockProcessor::is_olist_start(&state, "1.a", 0, "", false).is_none());
        assert!(ListBlockProcessor::is_olist_start(&state, "a. b", 0, "", false).is_none());
    }

    #[test]
    fn test_olist_interrupt_needs_one() {
        let mut state = ParserState::new();
        state.open_block(StackToken::Paragraph { token_index: 0 });
        assert!(ListBlockProcessor::is_olist_start(&state, "2. b", 0, "", false).is_none());
        assert!(ListBlockProcessor::is_olist_start(&state, "1.", 0, "", false).is_none());
        assert!(ListBlockProcessor::is_olist_start(&state, "1. b", 0, "", false).is_some());
    }

    #[test]
    fn test_indent_arithmetic() {
        assert_eq!(
            ListIndent::calculate(0, 1, 0, false),
            ListIndent {
                indent_level: 2,
                remaining_whitespace: 0,
                ws_after_marker: 1
            }
        );
        assert_eq!(ListIndent::calculate(1, 2, 2, false).indent_level, 6);
        let wide = ListIndent::calculate(0, 5, 0, false);
        assert_eq!(wide.indent_level, 2);
        assert_eq!(wide.remaining_whitespace, 4);
        assert_eq!(wide.ws_after_marker, 1);
        assert_eq!(ListIndent::calculate(2, 0, 1, true).indent_level, 5);
    }

    #[test]
    fn test_compare_list_starts() {
        let open = list(StackKind::UnorderedList, "-", 0, 2);
        let same = list(StackKind::UnorderedList, "-", 0, 2);
        let shifted = list(StackKind::UnorderedList, "-", 1, 3);
        let nested = list(StackKind::UnorderedList, "-", 2, 4);
        let other = list(StackKind::UnorderedList, "*", 0, 2);
        let ordered = list(StackKind::OrderedList, "1.", 0, 3);

        assert_eq!(
            ListBlockProcessor::compare_list_starts(&open, None, &same),
            ListMatchDecision::SameList
        );
        assert_eq!(
            ListBlockProcessor::compare_list_starts(&open, None, &shifted),
            ListMatchDecision::SiblingItem
        );
        assert_eq!(
            ListBlockProcessor::compare_list_starts(&open, None, &nested),
            ListMatchDecision::NestedList
        );
        assert_eq!(
            ListBlockProcessor::compare_list_starts(&open, None, &other),
            ListMatchDecision::DifferentList
        );
        assert_eq!(
            ListBlockProcessor::compare_list_starts(&open, None, &ordered),
            ListMatchDecision::DifferentList
        );
        assert_eq!(
            ListBlockProcessor::compare_list_starts(&nested, Some(2), &same),
            ListMatchDecision::OuterList
        );
    }

    #[test]
    fn test_sibling_emits_new_item() {
        let mut state = ParserState::new();
        state.line_number = 1;
        let outcome = ListBlockProcessor::handle_ulist_block(
            &mut state,
            "- a",
            0,
            "",
            "",
            ContainerContext::default(),
        );
        assert_eq!(
            outcome,
            ListStartOutcome::Started {
                remaining_line: "a".to_string(),
                indent_level: 2,
                content_column: 2,
            }
        );
        state.line_number = 2;
        ListBlockProcessor::handle_ulist_block(&mut state, "- b", 0, "", "", ContainerContext::default());
        assert_eq!(names(&state), vec!["ulist", "li"]);
        assert_eq!(state.document[1].to_string(), "[li(2,1):2:]");
        assert_eq!(state.stack.list_count(), 1);
    }

    #[test]
    fn test_new_marker_closes_other_list() {
        let mut state = ParserState::new();
        state.line_number = 1;
        ListBlockProcessor::handle_olist_block(&mut state, "1. a", 0, "", "", ContainerContext::default());
        state.line_number = 2;
        ListBlockProcessor::handle_ulist_block(&mut state, "- b", 0, "", "", ContainerContext::default());
        assert_eq!(names(&state), vec!["olist", "end-olist", "ulist"]);
        assert_eq!(state.document[0].to_string(), "[olist(1,1):.:1:3:]");
    }

    #[test]
    fn test_wide_gap_keeps_code_indent() {
        let mut state = ParserState::new();
        state.line_number = 1;
        let outcome = ListBlockProcessor::handle_ulist_block(
            &mut state,
            "-     code",
            0,
            "",
            "",
            ContainerContext::default(),
        );
        let ListStartOutcome::Started { remaining_line, indent_level, .. } = outcome else {
            panic!("expected a list start");
        };
        assert_eq!(remaining_line, "    code");
        assert_eq!(indent_level, 2);
    }

    #[test]
    fn test_continuation_strips_item_indent() {
        let mut state = ParserState::new();
        state.open_block(list(StackKind::UnorderedList, "-", 0, 2));
        let continuation = ListBlockProcessor::list_in_process(&mut state, "      x", 6, "      ", 0);
        assert_eq!(continuation.line, "    x");
        assert_eq!(continuation.removed, 2);
        assert!(!continuation.is_lazy);
    }

    #[test]
    fn test_continuation_counts_removed_columns() {
        let mut state = ParserState::new();
        state.open_block(list(StackKind::UnorderedList, "-", 0, 2));
        let continuation = ListBlockProcessor::list_in_process(&mut state, "\tx", 1, "\t", 0);
        assert_eq!(continuation.line, "  x");
        assert_eq!(continuation.removed, 2);
    }

    #[test]
    fn test_lazy_paragraph_keeps_list_open() {
        let mut state = ParserState::new();
        state.open_block(list(StackKind::UnorderedList, "-", 0, 2));
        state.open_block(StackToken::Paragraph { token_index: 1 });
        let continuation = ListBlockProcessor::list_in_process(&mut state, "b", 0, "", 0);
        assert!(continuation.is_lazy);
        assert!(state.document.is_empty());
        assert_eq!(state.stack.list_count(), 1);
    }

    #[test]
    fn test_unindented_line_closes_lists() {
        let mut state = ParserState::new();
        state.open_block(list(StackKind::UnorderedList, "-", 0, 2));
        state.open_block(list(StackKind::UnorderedList, "-", 2, 4));
        state.document.push(MarkdownToken::BlankLine {
            position: state.position_at(0),
            extracted_whitespace: String::new(),
        });
        let continuation = ListBlockProcessor::list_in_process(&mut state, "  c", 2, "  ", 0);
        assert_eq!(continuation.line, "c");
        assert_eq!(names(&state), vec!["BLANK", "end-ulist"]);
        assert_eq!(state.stack.list_count(), 1);

        let continuation = ListBlockProcessor::list_in_process(&mut state, "d", 0, "", 0);
        assert_eq!(continuation.line, "d");
        assert_eq!(names(&state), vec!["BLANK", "end-ulist", "end-ulist"]);
        assert!(state.stack.is_empty());
    }
}
