//! HTML output buffer and tag helpers.

use crate::escape;

/// Reusable HTML output buffer.
///
/// Everything written is either a static tag or escaped text taken from a
/// `&str`, so the buffer always holds valid UTF-8.
///
/// # Example
/// ```
/// use blockmark::HtmlWriter;
///
/// let mut writer = HtmlWriter::with_capacity_for(64);
/// writer.blockquote_start();
/// writer.paragraph_start();
/// writer.write_escaped_text(b"1 < 2");
/// writer.paragraph_end();
/// writer.blockquote_end();
///
/// assert_eq!(
///     writer.into_string(),
///     "<blockquote>\n<p>1 &lt; 2</p>\n</blockquote>\n"
/// );
/// ```
pub struct HtmlWriter {
    out: Vec<u8>,
}

impl HtmlWriter {
    #[inline]
    pub fn new() -> Self {
        Self {
            out: Vec::with_capacity(1024),
        }
    }

    /// Reserve for the HTML of an input of `input_len` bytes.
    ///
    /// Block HTML runs about a quarter larger than its source.
    #[inline]
    pub fn with_capacity_for(input_len: usize) -> Self {
        Self {
            out: Vec::with_capacity(input_len + input_len / 4),
        }
    }

    /// Wrap an existing buffer, appending to its contents.
    #[inline]
    pub fn from_vec(out: Vec<u8>) -> Self {
        Self { out }
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        self.out.push(b);
    }

    #[inline]
    pub fn write_escaped_text(&mut self, text: &[u8]) {
        escape::escape_text_into(&mut self.out, text);
    }

    #[inline]
    pub fn write_escaped_attr(&mut self, attr: &[u8]) {
        escape::escape_attr_into(&mut self.out, attr);
    }

    #[inline]
    pub fn newline(&mut self) {
        self.out.push(b'\n');
    }

    /// Start a new line unless the output is empty or already at one.
    ///
    /// Block elements call this before opening so that tight list items
    /// can keep their text on the `<li>` line.
    #[inline]
    pub fn ensure_newline(&mut self) {
        if self.out.last().is_some_and(|&b| b != b'\n') {
            self.out.push(b'\n');
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Clear output for reuse (keeps capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.out.clear();
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: only static tags and escaped `&str` content are written.
        unsafe { std::str::from_utf8_unchecked(&self.out) }
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.out
    }

    #[inline]
    pub fn into_string(self) -> String {
        // SAFETY: only static tags and escaped `&str` content are written.
        unsafe { String::from_utf8_unchecked(self.out) }
    }

    // --- Block elements ---

    #[inline]
    pub fn paragraph_start(&mut self) {
        self.write_str("<p>");
    }

    #[inline]
    pub fn paragraph_end(&mut self) {
        self.write_str("</p>\n");
    }

    /// Write heading start: `<hN>`
    #[inline]
    pub fn heading_start(&mut self, level: u8) {
        debug_assert!((1..=6).contains(&level));
        self.write_str("<h");
        self.write_byte(b'0' + level);
        self.write_byte(b'>');
    }

    /// Write heading end: `</hN>\n`
    #[inline]
    pub fn heading_end(&mut self, level: u8) {
        debug_assert!((1..=6).contains(&level));
        self.write_str("</h");
        self.write_byte(b'0' + level);
        self.write_str(">\n");
    }

    /// Open `<pre><code>`, with a `language-` class when the fence names one.
    ///
    /// `lang` must already have its backslash escapes and entities resolved.
    #[inline]
    pub fn code_block_start(&mut self, lang: Option<&str>) {
        match lang {
            Some(lang) if !lang.is_empty() => {
                self.write_str("<pre><code class=\"language-");
                self.write_escaped_attr(lang.as_bytes());
                self.write_str("\">");
            }
            _ => self.write_str("<pre><code>"),
        }
    }

    #[inline]
    pub fn code_block_end(&mut self) {
        self.write_str("</code></pre>\n");
    }

    #[inline]
    pub fn thematic_break(&mut self) {
        self.write_str("<hr />\n");
    }

    #[inline]
    pub fn blockquote_start(&mut self) {
        self.write_str("<blockquote>\n");
    }

    #[inline]
    pub fn blockquote_end(&mut self) {
        self.write_str("</blockquote>\n");
    }

    #[inline]
    pub fn ul_start(&mut self) {
        self.write_str("<ul>\n");
    }

    #[inline]
    pub fn ul_end(&mut self) {
        self.write_str("</ul>\n");
    }

    /// Write `<ol>\n`, or `<ol start="N">\n` when the list does not start at one.
    #[inline]
    pub fn ol_start(&mut self, start: Option<u32>) {
        match start {
            Some(n) if n != 1 => {
                self.write_str("<ol start=\"");
                self.write_u32(n);
                self.write_str("\">\n");
            }
            _ => self.write_str("<ol>\n"),
        }
    }

    #[inline]
    pub fn ol_end(&mut self) {
        self.write_str("</ol>\n");
    }

    #[inline]
    pub fn li_start(&mut self) {
        self.write_str("<li>");
    }

    #[inline]
    pub fn li_end(&mut self) {
        self.write_str("</li>\n");
    }

    /// Write line break: `<br />\n`
    #[inline]
    pub fn line_break(&mut self) {
        self.write_str("<br />\n");
    }

    fn write_u32(&mut self, mut n: u32) {
        if n == 0 {
            self.write_byte(b'0');
            return;
        }

        let mut buf = [0u8; 10];
        let mut i = buf.len();
        while n > 0 {
            i -= 1;
            buf[i] = b'0' + (n % 10) as u8;
            n /= 10;
        }
        self.write_bytes(&buf[i..]);
    }
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Write for HtmlWriter {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.out.extend_from_slice(s.as_bytes());
        Ok(())
    }
}
