//! Block-level tokens produced by the parser.

use std::fmt;

/// 1-based line and column of the first character a token covers. A tab
/// advances the column to its next tab stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line_number: usize,
    pub column_number: usize,
}

impl Position {
    #[inline]
    pub fn new(line_number: usize, column_number: usize) -> Self {
        Self {
            line_number,
            column_number,
        }
    }
}

/// Kind of block an [`MarkdownToken::End`] closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    BlockQuote,
    UnorderedList,
    OrderedList,
    Paragraph,
    AtxHeading,
    SetextHeading,
    IndentedCodeBlock,
    FencedCodeBlock,
}

impl BlockKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::BlockQuote => "block-quote",
            Self::UnorderedList => "ulist",
            Self::OrderedList => "olist",
            Self::Paragraph => "para",
            Self::AtxHeading => "atx",
            Self::SetextHeading => "setext",
            Self::IndentedCodeBlock => "icode-block",
            Self::FencedCodeBlock => "fcode-block",
        }
    }

    /// Lists and block quotes.
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, Self::BlockQuote | Self::UnorderedList | Self::OrderedList)
    }

    #[inline]
    pub fn is_list(self) -> bool {
        matches!(self, Self::UnorderedList | Self::OrderedList)
    }
}

/// A token in the document stream.
///
/// Start tokens are balanced by an [`MarkdownToken::End`] of the matching
/// [`BlockKind`]; `NewListItem`, `Text`, `ThematicBreak` and `BlankLine`
/// stand alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownToken {
    BlockQuoteStart {
        position: Position,
        extracted_whitespace: String,
    },
    UnorderedListStart {
        position: Position,
        list_marker: char,
        indent_level: usize,
        extracted_whitespace: String,
    },
    OrderedListStart {
        position: Position,
        list_marker: char,
        /// Digits exactly as written, leading zeros included.
        list_start: String,
        indent_level: usize,
        extracted_whitespace: String,
    },
    NewListItem {
        position: Position,
        indent_level: usize,
        extracted_whitespace: String,
    },
    Paragraph {
        position: Position,
        extracted_whitespace: String,
        /// A line after the first started with whitespace.
        indented_continuation: bool,
    },
    /// Paragraph, heading or code content. Lines of one block are merged
    /// with `\n` once parsing finishes.
    Text {
        position: Position,
        text: String,
    },
    AtxHeading {
        position: Position,
        level: u8,
        extracted_whitespace: String,
    },
    SetextHeading {
        position: Position,
        /// `=` for level one, `-` for level two.
        marker: char,
        extracted_whitespace: String,
        indented_continuation: bool,
        /// Leading whitespace of the underline.
        underline_whitespace: String,
    },
    ThematicBreak {
        position: Position,
        marker: char,
        extracted_whitespace: String,
    },
    IndentedCodeBlock {
        position: Position,
        extracted_whitespace: String,
    },
    FencedCodeBlock {
        position: Position,
        fence_character: char,
        fence_count: usize,
        info: String,
        extracted_whitespace: String,
    },
    BlankLine {
        position: Position,
        extracted_whitespace: String,
    },
    End {
        kind: BlockKind,
    },
}

impl MarkdownToken {
    /// Short kind name, e.g. `"ulist"` or `"end-para"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BlockQuoteStart { .. } => "block-quote",
            Self::UnorderedListStart { .. } => "ulist",
            Self::OrderedListStart { .. } => "olist",
            Self::NewListItem { .. } => "li",
            Self::Paragraph { .. } => "para",
            Self::Text { .. } => "text",
            Self::AtxHeading { .. } => "atx",
            Self::SetextHeading { .. } => "setext",
            Self::ThematicBreak { .. } => "tbreak",
            Self::IndentedCodeBlock { .. } => "icode-block",
            Self::FencedCodeBlock { .. } => "fcode-block",
            Self::BlankLine { .. } => "BLANK",
            Self::End { kind } => match kind {
                BlockKind::BlockQuote => "end-block-quote",
                BlockKind::UnorderedList => "end-ulist",
                BlockKind::OrderedList => "end-olist",
                BlockKind::Paragraph => "end-para",
                BlockKind::AtxHeading => "end-atx",
                BlockKind::SetextHeading => "end-setext",
                BlockKind::IndentedCodeBlock => "end-icode-block",
                BlockKind::FencedCodeBlock => "end-fcode-block",
            },
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Self::BlockQuoteStart { position, .. }
            | Self::UnorderedListStart { position, .. }
            | Self::OrderedListStart { position, .. }
            | Self::NewListItem { position, .. }
            | Self::Paragraph { position, .. }
            | Self::Text { position, .. }
            | Self::AtxHeading { position, .. }
            | Self::SetextHeading { position, .. }
            | Self::ThematicBreak { position, .. }
            | Self::IndentedCodeBlock { position, .. }
            | Self::FencedCodeBlock { position, .. }
            | Self::BlankLine { position, .. } => Some(*position),
            Self::End { .. } => None,
        }
    }

    #[inline]
    pub fn is_blank_line(&self) -> bool {
        matches!(self, Self::BlankLine { .. })
    }

    #[inline]
    pub fn is_list_start(&self) -> bool {
        matches!(
            self,
            Self::UnorderedListStart { .. } | Self::OrderedListStart { .. }
        )
    }

    /// List start or new list item.
    #[inline]
    pub fn is_list_token(&self) -> bool {
        self.is_list_start() || matches!(self, Self::NewListItem { .. })
    }

    /// Indent level carried by list starts and new items.
    pub fn list_indent_level(&self) -> Option<usize> {
        match self {
            Self::UnorderedListStart { indent_level, .. }
            | Self::OrderedListStart { indent_level, .. }
            | Self::NewListItem { indent_level, .. } => Some(*indent_level),
            _ => None,
        }
    }

    /// Text content, if this is a text token.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for MarkdownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        let Some(p) = self.position() else {
            return write!(f, "[{name}]");
        };
        write!(f, "[{name}({},{}):", p.line_number, p.column_number)?;
        match self {
            Self::BlockQuoteStart {
                extracted_whitespace,
                ..
            }
            | Self::Paragraph {
                extracted_whitespace,
                ..
            }
            | Self::IndentedCodeBlock {
                extracted_whitespace,
                ..
            }
            | Self::BlankLine {
                extracted_whitespace,
                ..
            } => write!(f, "{extracted_whitespace}"),
            Self::UnorderedListStart {
                list_marker,
                indent_level,
                extracted_whitespace,
                ..
            } => write!(f, "{list_marker}::{indent_level}:{extracted_whitespace}"),
            Self::OrderedListStart {
                list_marker,
                list_start,
                indent_level,
                extracted_whitespace,
                ..
            } => write!(
                f,
                "{list_marker}:{list_start}:{indent_level}:{extracted_whitespace}"
            ),
            Self::NewListItem {
                indent_level,
                extracted_whitespace,
                ..
            } => write!(f, "{indent_level}:{extracted_whitespace}"),
            Self::Text { text, .. } => write!(f, "{}:", text.replace('\n', "\\n")),
            Self::AtxHeading {
                level,
                extracted_whitespace,
                ..
            } => write!(f, "{level}:{extracted_whitespace}"),
            Self::SetextHeading {
                marker,
                extracted_whitespace,
                ..
            }
            | Self::ThematicBreak {
                marker,
                extracted_whitespace,
                ..
            } => write!(f, "{marker}:{extracted_whitespace}"),
            Self::FencedCodeBlock {
                fence_character,
                fence_count,
                info,
                extracted_whitespace,
                ..
            } => write!(
                f,
                "{fence_character}:{fence_count}:{info}:{extracted_whitespace}"
            ),
            Self::End { .. } => Ok(()),
        }?;
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_container_tokens() {
        let token = MarkdownToken::UnorderedListStart {
            position: Position::new(1, 1),
            list_marker: '-',
            indent_level: 2,
            extracted_whitespace: String::new(),
        };
        assert_eq!(token.to_string(), "[ulist(1,1):-::2:]");

        let token = MarkdownToken::OrderedListStart {
            position: Position::new(3, 2),
            list_marker: ')',
            list_start: "07".to_string(),
            indent_level: 5,
            extracted_whitespace: " ".to_string(),
        };
        assert_eq!(token.to_string(), "[olist(3,2):):07:5: ]");

        let token = MarkdownToken::BlockQuoteStart {
            position: Position::new(1, 1),
            extracted_whitespace: String::new(),
        };
        assert_eq!(token.to_string(), "[block-quote(1,1):]");
    }

    #[test]
    fn test_display_end_and_text() {
        let end = MarkdownToken::End {
            kind: BlockKind::BlockQuote,
        };
        assert_eq!(end.to_string(), "[end-block-quote]");
        assert_eq!(end.position(), None);

        let text = MarkdownToken::Text {
            position: Position::new(2, 3),
            text: "a\nb".to_string(),
        };
        assert_eq!(text.to_string(), "[text(2,3):a\\nb:]");
        assert_eq!(text.text(), Some("a\nb"));
    }

    #[test]
    fn test_list_helpers() {
        let item = MarkdownToken::NewListItem {
            position: Position::new(2, 1),
            indent_level: 4,
            extracted_whitespace: String::new(),
        };
        assert!(item.is_list_token());
        assert!(!item.is_list_start());
        assert_eq!(item.list_indent_level(), Some(4));
        assert!(BlockKind::OrderedList.is_list());
        assert!(BlockKind::BlockQuote.is_container());
        assert!(!BlockKind::Paragraph.is_container());
    }
}
