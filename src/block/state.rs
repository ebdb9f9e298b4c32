//! Mutable state threaded through one parse.

use log::debug;

use super::stack::{ContainerStack, StackKind, StackToken};
use super::token::{MarkdownToken, Position};

/// Which open blocks [`ParserState::close_open_blocks`] may pop.
///
/// The default pops leaf blocks from the top and stops at the first list or
/// block quote.
#[derive(Debug, Default, Clone, Copy)]
pub struct CloseBlocks<'a> {
    /// Stop once the stack is this deep; the entry at this index is popped.
    pub until_index: Option<usize>,
    /// Stop at the first entry whose kind is not listed.
    pub only_these: Option<&'a [StackKind]>,
    pub include_block_quotes: bool,
    pub include_lists: bool,
}

impl CloseBlocks<'_> {
    /// Everything except the document root.
    pub fn everything() -> Self {
        Self {
            include_block_quotes: true,
            include_lists: true,
            ..Self::default()
        }
    }

    /// Pop entries down to and including `index`, containers too.
    pub fn down_to(index: usize) -> Self {
        Self {
            until_index: Some(index),
            ..Self::everything()
        }
    }
}

/// Tokens produced for a blank line.
#[derive(Debug, Default)]
pub struct BlankLineOutcome {
    pub tokens: Vec<MarkdownToken>,
    /// Lines a pending construct gave back for another pass. Link reference
    /// definitions are the only producer and are not parsed, so this stays
    /// empty.
    pub lines_to_requeue: Vec<String>,
}

/// Stack, emitted tokens and line counter for one document.
#[derive(Debug, Default)]
pub struct ParserState {
    pub stack: ContainerStack,
    pub document: Vec<MarkdownToken>,
    /// 1-based number of the line being parsed.
    pub line_number: usize,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position on the current line, `column` columns in. Tabs count to
    /// their tab stop.
    #[inline]
    pub fn position_at(&self, column: usize) -> Position {
        Position::new(self.line_number, column + 1)
    }

    /// Pop open blocks from the top of the stack, returning their end tokens.
    pub fn close_open_blocks(&mut self, request: CloseBlocks<'_>) -> Vec<MarkdownToken> {
        let mut tokens = Vec::new();
        loop {
            let top = self.stack.top();
            if top.is_document() {
                break;
            }
            if request.until_index.is_some_and(|until| self.stack.len() <= until) {
                break;
            }
            if request
                .only_these
                .is_some_and(|kinds| !kinds.contains(&top.kind()))
            {
                break;
            }
            if (top.is_block_quote() && !request.include_block_quotes)
                || (top.is_list() && !request.include_lists)
            {
                break;
            }
            let Some(entry) = self.stack.pop() else {
                break;
            };
            if let Some(kind) = entry.end_kind() {
                debug!("line {}: closing {}", self.line_number, kind.name());
                tokens.push(MarkdownToken::End { kind });
            }
        }
        tokens
    }

    /// Close the lists that sit directly in the `bq_level`-th block quote,
    /// with everything nested inside them.
    pub fn close_lists_at_level(&mut self, bq_level: usize) -> Vec<MarkdownToken> {
        match self.stack.lists_at_level(bq_level).first() {
            Some(&index) => self.close_open_blocks(CloseBlocks::down_to(index)),
            None => Vec::new(),
        }
    }

    /// Handle a line holding only whitespace.
    ///
    /// An open paragraph ends; code blocks stay open. A blank line reaching
    /// here from the main loop carries no `>` at all, so every open block
    /// quote ends with it.
    pub fn handle_blank_line(
        &mut self,
        line: &str,
        from_main_transform: bool,
        position: Position,
    ) -> BlankLineOutcome {
        let mut tokens = Vec::new();
        if from_main_transform {
            if let Some(index) = self.stack.block_quote_index(0) {
                tokens.extend(self.close_open_blocks(CloseBlocks::down_to(index)));
            }
        }
        if self.stack.top().is_paragraph() {
            tokens.extend(self.close_open_blocks(CloseBlocks {
                only_these: Some(&[StackKind::Paragraph]),
                ..CloseBlocks::default()
            }));
        }
        tokens.push(MarkdownToken::BlankLine {
            position,
            extracted_whitespace: line.to_string(),
        });
        BlankLineOutcome {
            tokens,
            lines_to_requeue: Vec::new(),
        }
    }

    /// Push a block and log it.
    pub fn open_block(&mut self, token: StackToken) {
        debug!("line {}: opening {:?}", self.line_number, token.kind());
        self.stack.push(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::stack::ListData;
    use crate::block::token::BlockKind;

    fn ulist() -> StackToken {
        StackToken::UnorderedList(ListData {
            indent_level: 2,
            list_marker_text: "-".to_string(),
            ws_before_marker: 0,
            ws_after_marker: 1,
            start_index: 0,
        })
    }

    fn names(tokens: &[MarkdownToken]) -> Vec<&'static str> {
        tokens.iter().map(MarkdownToken::name).collect()
    }

    #[test]
    fn test_default_close_stops_at_containers() {
        let mut state = ParserState::new();
        state.stack.push(StackToken::BlockQuote);
        state.stack.push(ulist());
        state.stack.push(StackToken::Paragraph { token_index: 0 });

        let tokens = state.close_open_blocks(CloseBlocks::default());
        assert_eq!(names(&tokens), vec!["end-para"]);
        assert!(state.stack.top().is_list());
    }

    #[test]
    fn test_close_until_index() {
        let mut state = ParserState::new();
        state.stack.push(StackToken::BlockQuote);
        state.stack.push(ulist());
        state.stack.push(StackToken::Paragraph { token_index: 0 });

        let tokens = state.close_open_blocks(CloseBlocks::down_to(2));
        assert_eq!(names(&tokens), vec!["end-para", "end-ulist"]);
        assert!(state.stack.top().is_block_quote());

        let tokens = state.close_open_blocks(CloseBlocks::everything());
        assert_eq!(tokens, vec![MarkdownToken::End { kind: BlockKind::BlockQuote }]);
        assert!(state.stack.is_empty());
    }

    #[test]
    fn test_close_only_these() {
        let mut state = ParserState::new();
        state.stack.push(StackToken::BlockQuote);
        state.stack.push(StackToken::IndentedCodeBlock);

        let tokens = state.close_open_blocks(CloseBlocks {
            only_these: Some(&[StackKind::BlockQuote, StackKind::IndentedCodeBlock]),
            include_block_quotes: true,
            ..CloseBlocks::default()
        });
        assert_eq!(names(&tokens), vec!["end-icode-block", "end-block-quote"]);
    }

    #[test]
    fn test_blank_line_closes_paragraph_only() {
        let mut state = ParserState::new();
        state.line_number = 2;
        state.stack.push(ulist());
        state.stack.push(StackToken::Paragraph { token_index: 0 });

        let outcome = state.handle_blank_line("", false, state.position_at(0));
        assert_eq!(names(&outcome.tokens), vec!["end-para", "BLANK"]);
        assert!(outcome.lines_to_requeue.is_empty());
        assert!(state.stack.top().is_list());
    }

    #[test]
    fn test_unquoted_blank_line_ends_block_quotes() {
        let mut state = ParserState::new();
        state.stack.push(ulist());
        state.stack.push(StackToken::BlockQuote);
        state.stack.push(StackToken::Paragraph { token_index: 0 });

        let outcome = state.handle_blank_line("  ", true, state.position_at(0));
        assert_eq!(
            names(&outcome.tokens),
            vec!["end-para", "end-block-quote", "BLANK"]
        );
        assert_eq!(state.stack.len(), 2);
    }

    #[test]
    fn test_blank_line_keeps_code_open() {
        let mut state = ParserState::new();
        state.stack.push(StackToken::IndentedCodeBlock);
        let outcome = state.handle_blank_line("", true, state.position_at(0));
        assert_eq!(names(&outcome.tokens), vec!["BLANK"]);
        assert!(state.stack.top().is_indented_code_block());
    }
}
