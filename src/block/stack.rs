//! The stack of open blocks, outermost first.

use smallvec::SmallVec;

use super::token::BlockKind;

/// Fields shared by both list kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListData {
    /// Column where content of the current item starts.
    pub indent_level: usize,
    /// `-`, `+`, `*`, or digits followed by `.` / `)`.
    pub list_marker_text: String,
    pub ws_before_marker: usize,
    pub ws_after_marker: usize,
    /// Byte index of the marker within the line it was found on.
    pub start_index: usize,
}

impl ListData {
    /// Bullet character, or the delimiter of an ordered marker.
    #[inline]
    pub fn marker_char(&self) -> char {
        self.list_marker_text.chars().last().unwrap_or('-')
    }
}

/// Discriminant of a [`StackToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Document,
    BlockQuote,
    UnorderedList,
    OrderedList,
    Paragraph,
    IndentedCodeBlock,
    FencedCodeBlock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackToken {
    /// Root entry; never popped.
    Document,
    BlockQuote,
    UnorderedList(ListData),
    OrderedList(ListData),
    Paragraph {
        /// Index of the paragraph's start token in the document.
        token_index: usize,
    },
    IndentedCodeBlock,
    FencedCodeBlock {
        fence_character: char,
        fence_count: usize,
        /// Indentation of the opening fence, removed from content lines.
        indent: usize,
    },
}

impl StackToken {
    pub fn kind(&self) -> StackKind {
        match self {
            Self::Document => StackKind::Document,
            Self::BlockQuote => StackKind::BlockQuote,
            Self::UnorderedList(_) => StackKind::UnorderedList,
            Self::OrderedList(_) => StackKind::OrderedList,
            Self::Paragraph { .. } => StackKind::Paragraph,
            Self::IndentedCodeBlock => StackKind::IndentedCodeBlock,
            Self::FencedCodeBlock { .. } => StackKind::FencedCodeBlock,
        }
    }

    /// Block kind of the end token emitted when this entry is popped.
    pub fn end_kind(&self) -> Option<BlockKind> {
        match self {
            Self::Document => None,
            Self::BlockQuote => Some(BlockKind::BlockQuote),
            Self::UnorderedList(_) => Some(BlockKind::UnorderedList),
            Self::OrderedList(_) => Some(BlockKind::OrderedList),
            Self::Paragraph { .. } => Some(BlockKind::Paragraph),
            Self::IndentedCodeBlock => Some(BlockKind::IndentedCodeBlock),
            Self::FencedCodeBlock { .. } => Some(BlockKind::FencedCodeBlock),
        }
    }

    #[inline]
    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document)
    }

    #[inline]
    pub fn is_block_quote(&self) -> bool {
        matches!(self, Self::BlockQuote)
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::UnorderedList(_) | Self::OrderedList(_))
    }

    #[inline]
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Self::Paragraph { .. })
    }

    #[inline]
    pub fn is_fenced_code_block(&self) -> bool {
        matches!(self, Self::FencedCodeBlock { .. })
    }

    #[inline]
    pub fn is_indented_code_block(&self) -> bool {
        matches!(self, Self::IndentedCodeBlock)
    }

    #[inline]
    pub fn is_code_block(&self) -> bool {
        self.is_fenced_code_block() || self.is_indented_code_block()
    }

    pub fn list(&self) -> Option<&ListData> {
        match self {
            Self::UnorderedList(data) | Self::OrderedList(data) => Some(data),
            _ => None,
        }
    }

    pub fn list_mut(&mut self) -> Option<&mut ListData> {
        match self {
            Self::UnorderedList(data) | Self::OrderedList(data) => Some(data),
            _ => None,
        }
    }
}

/// Open blocks, outermost first. Index 0 is always [`StackToken::Document`].
#[derive(Debug, Clone)]
pub struct ContainerStack {
    entries: Vec<StackToken>,
}

impl Default for ContainerStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerStack {
    pub fn new() -> Self {
        let mut entries = Vec::with_capacity(16);
        entries.push(StackToken::Document);
        Self { entries }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Only the document root is open.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }

    #[inline]
    pub fn top(&self) -> &StackToken {
        &self.entries[self.entries.len() - 1]
    }

    /// Entry directly below the top, if any.
    #[inline]
    pub fn parent_of_top(&self) -> Option<&StackToken> {
        self.entries.len().checked_sub(2).map(|i| &self.entries[i])
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&StackToken> {
        self.entries.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut StackToken> {
        self.entries.get_mut(index)
    }

    #[inline]
    pub fn push(&mut self, token: StackToken) {
        self.entries.push(token);
    }

    /// Pop the innermost entry. The document root is never popped.
    pub fn pop(&mut self) -> Option<StackToken> {
        if self.entries.len() > 1 {
            self.entries.pop()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &StackToken> {
        self.entries.iter()
    }

    pub fn block_quote_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_block_quote()).count()
    }

    /// Index of the `nth` block quote counted from the outside, zero-based.
    pub fn block_quote_index(&self, nth: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_block_quote())
            .nth(nth)
            .map(|(i, _)| i)
    }

    pub fn innermost_block_quote(&self) -> Option<usize> {
        self.entries.iter().rposition(StackToken::is_block_quote)
    }

    /// Indices of the lists nested directly in the `bq_level`-th block quote
    /// (level zero is the document), outermost first.
    pub fn lists_at_level(&self, bq_level: usize) -> SmallVec<[usize; 4]> {
        let mut level = 0;
        let mut found = SmallVec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.is_block_quote() {
                level += 1;
                if level > bq_level {
                    break;
                }
            } else if entry.is_list() && level == bq_level {
                found.push(index);
            }
        }
        found
    }

    pub fn innermost_list_at_level(&self, bq_level: usize) -> Option<usize> {
        self.lists_at_level(bq_level).last().copied()
    }

    /// Number of list entries on the stack.
    pub fn list_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_list()).count()
    }
}
