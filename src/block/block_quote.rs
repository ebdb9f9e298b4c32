//! Block quote starts, nesting and lazy continuation.

use log::debug;

use super::helpers::{
    calculate_length, column_at, expand_leading_whitespace, expand_tabs_at, is_blank,
    is_character_at_index, is_whitespace,
};
use super::leaf::LeafBlockProcessor;
use super::stack::{StackKind, StackToken};
use super::state::{CloseBlocks, ParserState};
use super::token::MarkdownToken;
use crate::limits::MAX_MARKER_INDENT;

/// Result of scanning a run of `>` markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockQuoteCount {
    /// Block quote depth once this run is counted.
    pub this_bq_count: usize,
    /// Index just past the last consumed marker and its optional space.
    pub end_index: usize,
    /// The line, with any tab after a marker expanded to spaces.
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockQuoteOutcome {
    /// No `>` was consumed; the line goes on to list and leaf processing.
    NotStarted,
    Started {
        this_bq_count: usize,
        /// Source column where `remaining_line` begins.
        content_column: usize,
        /// What follows the markers, to be parsed inside the quote. Leading
        /// tabs are already expanded to spaces.
        remaining_line: String,
        /// The remainder was blank and a blank line token has been emitted.
        was_blank: bool,
    },
}

pub struct BlockQuoteProcessor;

impl BlockQuoteProcessor {
    /// A `>` at `start_index`, indented at most three columns.
    pub fn is_block_quote_start(line: &str, start_index: usize, adj_ws: &str) -> bool {
        calculate_length(adj_ws, 0) <= MAX_MARKER_INDENT
            && is_character_at_index(line, start_index, b'>')
    }

    /// Count the `>` markers starting at `start_index`.
    ///
    /// `this_bq_count` is the depth already matched by outer passes over the
    /// same line and `start_column` is the source column of `line`'s first
    /// byte. Inside an open fence, markers beyond the depth of the stack are
    /// fence content and are not consumed.
    pub fn count_block_quote_starts(
        line: &str,
        start_index: usize,
        this_bq_count: usize,
        stack_bq_count: usize,
        top_is_fenced: bool,
        start_column: usize,
    ) -> BlockQuoteCount {
        if top_is_fenced && this_bq_count >= stack_bq_count {
            return BlockQuoteCount {
                this_bq_count,
                end_index: start_index,
                line: line.to_string(),
            };
        }

        let mut line = line.to_string();
        let mut count = this_bq_count + 1;
        let mut index = start_index + 1;
        loop {
            if let Some(&b) = line.as_bytes().get(index) {
                if is_whitespace(b) {
                    if b == b'\t' {
                        line = expand_tabs_at(&line, index, start_column).0;
                    }
                    index += 1;
                }
            }
            if top_is_fenced && count >= stack_bq_count {
                break;
            }
            if !is_character_at_index(&line, index, b'>') {
                break;
            }
            count += 1;
            index += 1;
        }
        BlockQuoteCount {
            this_bq_count: count,
            end_index: index,
            line,
        }
    }

    /// Consume block quote markers at `start_index`, opening new quotes as
    /// needed.
    ///
    /// `column_offset` is the source column of `line`'s first byte. Start
    /// tokens for new quotes are appended to the document. A blank remainder
    /// is turned into a blank line token right away.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_block_quote_block(
        state: &mut ParserState,
        line: &str,
        start_index: usize,
        extracted_whitespace: &str,
        adj_ws: &str,
        this_bq_count: usize,
        column_offset: usize,
    ) -> BlockQuoteOutcome {
        if !Self::is_block_quote_start(line, start_index, adj_ws) {
            return BlockQuoteOutcome::NotStarted;
        }
        let stack_bq_count = state.stack.block_quote_count();
        let top_is_fenced = state.stack.top().is_fenced_code_block();
        let counted = Self::count_block_quote_starts(
            line,
            start_index,
            this_bq_count,
            stack_bq_count,
            top_is_fenced,
            column_offset,
        );
        if counted.end_index == start_index {
            return BlockQuoteOutcome::NotStarted;
        }
        debug!(
            "line {}: {} block quote marker(s), stack holds {}",
            state.line_number,
            counted.this_bq_count - this_bq_count,
            stack_bq_count
        );

        if !top_is_fenced {
            Self::ensure_stack_at_level(
                state,
                counted.this_bq_count,
                this_bq_count,
                column_at(line, start_index, column_offset),
                extracted_whitespace,
            );
        }

        let content_column = column_at(&counted.line, counted.end_index, column_offset);
        let remaining_line =
            expand_leading_whitespace(&counted.line[counted.end_index..], content_column)
                .into_owned();
        let was_blank = !top_is_fenced && is_blank(&remaining_line);
        if was_blank {
            let position = state.position_at(content_column);
            let outcome = state.handle_blank_line(&remaining_line, false, position);
            assert!(
                outcome.lines_to_requeue.is_empty(),
                "blank line inside a block quote requeued {} line(s)",
                outcome.lines_to_requeue.len()
            );
            state.document.extend(outcome.tokens);
        }

        BlockQuoteOutcome::Started {
            this_bq_count: counted.this_bq_count,
            content_column,
            remaining_line,
            was_blank,
        }
    }

    /// Open block quotes until the stack is `this_bq_count` deep.
    ///
    /// A deeper quote cannot continue a paragraph or code block, and when the
    /// markers skip past the lists of the innermost quote those lists end too.
    fn ensure_stack_at_level(
        state: &mut ParserState,
        this_bq_count: usize,
        prior_bq_count: usize,
        marker_index: usize,
        extracted_whitespace: &str,
    ) {
        let stack_bq_count = state.stack.block_quote_count();
        if this_bq_count <= stack_bq_count {
            return;
        }
        if prior_bq_count < stack_bq_count {
            let tokens = state.close_lists_at_level(stack_bq_count);
            state.document.extend(tokens);
        }
        let tokens = state.close_open_blocks(CloseBlocks {
            only_these: Some(&[StackKind::Paragraph, StackKind::IndentedCodeBlock]),
            ..CloseBlocks::default()
        });
        state.document.extend(tokens);

        let position = state.position_at(marker_index);
        for _ in state.stack.block_quote_count()..this_bq_count {
            state.open_block(StackToken::BlockQuote);
            state.document.push(MarkdownToken::BlockQuoteStart {
                position,
                extracted_whitespace: extracted_whitespace.to_string(),
            });
        }
    }

    /// A line without `>` cannot lazily continue code inside a quote, and a
    /// fence opening on such a line ends the quote first.
    pub fn check_for_lazy_handling(
        state: &mut ParserState,
        this_bq_count: usize,
        stack_bq_count: usize,
        line: &str,
        start_index: usize,
        extracted_whitespace: &str,
    ) {
        if this_bq_count != 0 || stack_bq_count == 0 {
            return;
        }
        let top_kind = state.stack.top().kind();
        let top_is_code = state.stack.top().is_code_block();
        let opens_fence =
            LeafBlockProcessor::is_fenced_code_block(line, start_index, extracted_whitespace, false)
                .is_some();
        if !top_is_code && !opens_fence {
            return;
        }
        debug!("line {}: ending quoted {:?} lazily", state.line_number, top_kind);
        let kinds = [StackKind::BlockQuote, top_kind];
        let tokens = state.close_open_blocks(CloseBlocks {
            only_these: Some(&kinds),
            include_block_quotes: true,
            ..CloseBlocks::default()
        });
        // A list on top stays for the unmatched quote closing to end.
        assert!(
            !top_is_code || !tokens.is_empty(),
            "line {}: closing quoted {:?} produced no tokens",
            state.line_number,
            top_kind
        );
        state.document.extend(tokens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::stack::ListData;
    use pretty_assertions::assert_eq;

    fn names(state: &ParserState) -> Vec<&'static str> {
        state.document.iter().map(MarkdownToken::name).collect()
    }

    #[test]
    fn test_is_block_quote_start() {
        assert!(BlockQuoteProcessor::is_block_quote_start("> a", 0, ""));
        assert!(BlockQuoteProcessor::is_block_quote_start("   > a", 3, "   "));
        assert!(!BlockQuoteProcessor::is_block_quote_start("    > a", 4, "    "));
        assert!(!BlockQuoteProcessor::is_block_quote_start("a > b", 0, ""));
    }

    #[test]
    fn test_count_nested_markers() {
        let counted = BlockQuoteProcessor::count_block_quote_starts("> > a", 0, 0, 0, false, 0);
        assert_eq!(counted.this_bq_count, 2);
        assert_eq!(counted.end_index, 4);
        assert_eq!(&counted.line[counted.end_index..], "a");

        let counted = BlockQuoteProcessor::count_block_quote_starts(">>a", 0, 0, 0, false, 0);
        assert_eq!(counted.this_bq_count, 2);
        assert_eq!(counted.end_index, 2);
    }

    #[test]
    fn test_count_expands_tab_after_marker() {
        let counted = BlockQuoteProcessor::count_block_quote_starts(">\tfoo", 0, 0, 0, false, 0);
        assert_eq!(counted.line, ">   foo");
        assert_eq!(counted.end_index, 2);
        assert_eq!(&counted.line[counted.end_index..], "  foo");
    }

    #[test]
    fn test_count_inside_fence_stops_at_stack_depth() {
        let counted = BlockQuoteProcessor::count_block_quote_starts("> > a", 0, 0, 1, true, 0);
        assert_eq!(counted.this_bq_count, 1);
        assert_eq!(counted.end_index, 2);

        let counted = BlockQuoteProcessor::count_block_quote_starts("> a", 0, 1, 1, true, 0);
        assert_eq!(counted.this_bq_count, 1);
        assert_eq!(counted.end_index, 0);
    }

    #[test]
    fn test_handle_opens_quotes_and_closes_paragraph() {
        let mut state = ParserState::new();
        state.line_number = 1;
        state.open_block(StackToken::Paragraph { token_index: 0 });
        state.document.push(MarkdownToken::Paragraph {
            position: state.position_at(0),
            extracted_whitespace: String::new(),
            indented_continuation: false,
        });

        let outcome = BlockQuoteProcessor::handle_block_quote_block(&mut state, ">> b", 0, "", "", 0, 0);
        assert_eq!(
            outcome,
            BlockQuoteOutcome::Started {
                this_bq_count: 2,
                content_column: 3,
                remaining_line: "b".to_string(),
                was_blank: false,
            }
        );
        assert_eq!(names(&state), vec!["para", "end-para", "block-quote", "block-quote"]);
        assert_eq!(state.stack.block_quote_count(), 2);
    }

    #[test]
    fn test_count_expands_tab_from_source_column() {
        let counted = BlockQuoteProcessor::count_block_quote_starts(">\tfoo", 0, 0, 0, false, 2);
        assert_eq!(counted.line, "> foo");
        assert_eq!(counted.end_index, 2);
    }

    #[test]
    fn test_handle_keeps_partial_tab_for_code() {
        let mut state = ParserState::new();
        state.line_number = 1;
        let outcome = BlockQuoteProcessor::handle_block_quote_block(&mut state, ">\t\tfoo", 0, "", "", 0, 0);
        assert_eq!(
            outcome,
            BlockQuoteOutcome::Started {
                this_bq_count: 1,
                content_column: 2,
                remaining_line: "      foo".to_string(),
                was_blank: false,
            }
        );
    }

    #[test]
    fn test_handle_blank_remainder() {
        let mut state = ParserState::new();
        state.line_number = 1;
        let outcome = BlockQuoteProcessor::handle_block_quote_block(&mut state, ">  ", 0, "", "", 0, 0);
        assert!(matches!(outcome, BlockQuoteOutcome::Started { was_blank: true, .. }));
        assert_eq!(names(&state), vec!["block-quote", "BLANK"]);
        assert_eq!(state.document[1].to_string(), "[BLANK(1,3): ]");
    }

    #[test]
    fn test_not_a_quote() {
        let mut state = ParserState::new();
        let outcome = BlockQuoteProcessor::handle_block_quote_block(&mut state, "a", 0, "", "", 0, 0);
        assert_eq!(outcome, BlockQuoteOutcome::NotStarted);
        assert!(state.document.is_empty());
    }

    #[test]
    fn test_lazy_line_ends_quoted_code() {
        let mut state = ParserState::new();
        state.open_block(StackToken::BlockQuote);
        state.open_block(StackToken::IndentedCodeBlock);
        BlockQuoteProcessor::check_for_lazy_handling(&mut state, 0, 1, "foo", 0, "");
        assert_eq!(names(&state), vec!["end-icode-block", "end-block-quote"]);
        assert!(state.stack.is_empty());
    }

    #[test]
    fn test_lazy_fence_ends_quoted_paragraph() {
        let mut state = ParserState::new();
        state.open_block(StackToken::BlockQuote);
        state.open_block(StackToken::Paragraph { token_index: 0 });
        BlockQuoteProcessor::check_for_lazy_handling(&mut state, 0, 1, "foo", 0, "");
        assert!(state.document.is_empty());

        BlockQuoteProcessor::check_for_lazy_handling(&mut state, 0, 1, "```", 0, "");
        assert_eq!(names(&state), vec!["end-para", "end-block-quote"]);
    }

    #[test]
    fn test_lazy_fence_leaves_quoted_list() {
        let mut state = ParserState::new();
        state.open_block(StackToken::BlockQuote);
        state.open_block(StackToken::UnorderedList(ListData {
            indent_level: 4,
            list_marker_text: "-".to_string(),
            ws_before_marker: 0,
            ws_after_marker: 1,
            start_index: 2,
        }));
        BlockQuoteProcessor::check_for_lazy_handling(&mut state, 0, 1, "```", 0, "");
        assert!(state.document.is_empty());
        assert_eq!(state.stack.block_quote_count(), 1);
        assert!(state.stack.top().is_list());
    }
}
