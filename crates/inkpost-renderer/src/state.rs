//! State structs tracking context during event processing.

use pulldown_cmark::Alignment;

use crate::html::escape_html;

/// State for tracking code block rendering.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    /// Whether we're inside a code block.
    active: bool,
    /// Language of current code block (e.g., "rust", "python").
    language: Option<String>,
    /// Buffer for code block content.
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block with optional language.
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the current code block and return (language, content).
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    /// Whether we're inside the table header row.
    in_head: bool,
    /// Column alignments for current table.
    alignments: Vec<Alignment>,
    /// Current column index in table row.
    cell_index: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Get the alignment style for the current cell.
    pub(crate) fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt_text: String,
    /// Source and title of the image being captured.
    pending: Option<(String, String)>,
}

impl ImageState {
    pub(crate) fn start(&mut self, src: String, title: String) {
        self.active = true;
        self.alt_text.clear();
        self.pending = Some((src, title));
    }

    /// End image capture and return (src, title, alt).
    pub(crate) fn end(&mut self) -> Option<(String, String, String)> {
        self.active = false;
        let alt = std::mem::take(&mut self.alt_text);
        self.pending.take().map(|(src, title)| (src, title, alt))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Captured link label, collected until the link closes.
pub(crate) struct CapturedLink {
    pub(crate) href: String,
    /// Plain text of the label.
    pub(crate) text: String,
    /// Rendered markup of the label.
    pub(crate) html: String,
}

/// State for tracking link label capture.
///
/// Links do not nest in `CommonMark`, so one slot is enough.
#[derive(Default)]
pub(crate) struct LinkState {
    current: Option<CapturedLink>,
}

impl LinkState {
    pub(crate) fn start(&mut self, href: String) {
        self.current = Some(CapturedLink {
            href,
            text: String::new(),
            html: String::new(),
        });
    }

    pub(crate) fn end(&mut self) -> Option<CapturedLink> {
        self.current.take()
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Append label text to both buffers.
    pub(crate) fn push_text(&mut self, text: &str) {
        if let Some(link) = &mut self.current {
            link.text.push_str(text);
            link.html.push_str(&escape_html(text));
        }
    }

    /// Markup buffer of the label being captured.
    pub(crate) fn html_buffer(&mut self) -> Option<&mut String> {
        self.current.as_mut().map(|link| &mut link.html)
    }

    /// Append to the plain-text buffer only.
    pub(crate) fn push_plain(&mut self, text: &str) {
        if let Some(link) = &mut self.current {
            link.text.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_state() {
        let mut code = CodeBlockState::default();
        code.start(Some("rust".to_owned()));
        assert!(code.is_active());
        code.push_str("fn main() {}\n");
        let (lang, content) = code.end();
        assert!(!code.is_active());
        assert_eq!(lang.as_deref(), Some("rust"));
        assert_eq!(content, "fn main() {}\n");
    }

    #[test]
    fn test_table_alignment() {
        let mut table = TableState::default();
        table.start(vec![Alignment::Left, Alignment::None, Alignment::Right]);
        assert_eq!(table.current_alignment_style(), r#" style="text-align:left""#);
        table.next_cell();
        assert_eq!(table.current_alignment_style(), "");
        table.next_cell();
        assert_eq!(table.current_alignment_style(), r#" style="text-align:right""#);
        table.next_cell();
        assert_eq!(table.current_alignment_style(), "");
    }

    #[test]
    fn test_image_state() {
        let mut image = ImageState::default();
        image.start("a.png".to_owned(), String::new());
        image.push_str("alt ");
        image.push_str("text");
        assert_eq!(
            image.end(),
            Some(("a.png".to_owned(), String::new(), "alt text".to_owned()))
        );
        assert!(!image.is_active());
    }

    #[test]
    fn test_link_state_captures_text_and_markup() {
        let mut link = LinkState::default();
        link.start("https://example.com".to_owned());
        link.push_text("a < ");
        if let Some(html) = link.html_buffer() {
            html.push_str("<em>");
        }
        link.push_text("b");
        link.push_plain("");
        let captured = link.end().unwrap();
        assert_eq!(captured.href, "https://example.com");
        assert_eq!(captured.text, "a < b");
        assert_eq!(captured.html, "a &lt; <em>b");
        assert!(!link.is_active());
    }
}
