//! Block scanner.
//!
//! Walks the source line by line and replaces every directive an extension
//! recognises with a placeholder comment on its own line, so the remaining
//! document can be parsed by pulldown-cmark in one piece.
//!
//! Directives are only looked for where a block can start. Code (fenced or
//! indented) and ATX headings pass through untouched. Blockquote markers and
//! list item indentation are set aside before matching, and the following
//! lines of a directive are read with the same container prefix removed, so
//! `> :::dialogue` works inside a quote and indented blocks work inside list
//! items.

use std::borrow::Cow;

use crate::context::RenderContext;
use crate::extension::BoxedExtension;
use crate::token::Token;

/// An open code fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: u8,
    len: usize,
    /// Blockquote depth the fence was opened at.
    depth: usize,
}

impl Fence {
    /// Three or more backticks or tildes; a backtick info string may not
    /// contain backticks.
    fn open(content: &str, depth: usize) -> Option<Self> {
        let marker = *content.as_bytes().first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }

        let len = content.bytes().take_while(|&b| b == marker).count();
        if len < 3 || (marker == b'`' && content[len..].contains('`')) {
            return None;
        }
        Some(Self { marker, len, depth })
    }

    fn closed_by(self, content: &str) -> bool {
        let run = content.bytes().take_while(|&b| b == self.marker).count();
        run >= self.len && content[run..].trim().is_empty()
    }
}

/// Block role of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineKind {
    /// Inside a fenced or indented code block, fence lines included.
    Code,
    Heading,
    Blank,
    /// A line where a block may start.
    Text {
        /// Bytes of blockquote and list syntax before the block content.
        prefix: usize,
        /// Prefix that following lines of the same container carry.
        continuation: String,
    },
}

/// Tracks enough block structure to classify lines one at a time.
#[derive(Debug, Default)]
pub(crate) struct BlockContext {
    fence: Option<Fence>,
    /// The previous line continues a paragraph, so indentation is not code.
    paragraph: bool,
    quote_depth: usize,
    /// Content columns of the open list items, innermost last.
    lists: Vec<usize>,
}

impl BlockContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_paragraph(&mut self, open: bool) {
        self.paragraph = open;
    }

    /// Classify the next line and update the tracked structure.
    pub(crate) fn classify(&mut self, line: &str) -> LineKind {
        if let Some(fence) = self.fence {
            let (quote_len, depth) = quote_prefix(line, fence.depth);
            if depth == fence.depth {
                if fence.closed_by(line[quote_len..].trim_start()) {
                    self.fence = None;
                }
                return LineKind::Code;
            }
            self.fence = None;
        }

        let (quote_len, depth) = quote_prefix(line, usize::MAX);
        if depth != self.quote_depth {
            self.quote_depth = depth;
            self.lists.clear();
        }

        let rest = &line[quote_len..];
        if rest.trim().is_empty() {
            self.paragraph = false;
            return LineKind::Blank;
        }

        let (indent, indent_len) = leading_columns(rest);
        while self.lists.last().is_some_and(|&column| column > indent) {
            self.lists.pop();
        }
        let container = self.lists.last().copied().unwrap_or(0);
        if indent - container >= 4 && !self.paragraph {
            return LineKind::Code;
        }

        let quote = &line[..quote_len];
        let content = &rest[indent_len..];
        if indent - container < 4 {
            if let Some(fence) = Fence::open(content, depth) {
                self.fence = Some(fence);
                self.paragraph = false;
                return LineKind::Code;
            }
            if is_atx_heading(content) {
                self.paragraph = false;
                return LineKind::Heading;
            }
            if let Some(width) = list_marker(content) {
                let column = indent + width;
                self.lists.push(column);
                self.paragraph = true;
                let line_len = line.trim_end_matches(['\n', '\r']).len();
                return LineKind::Text {
                    prefix: (quote_len + indent_len + width).min(line_len),
                    continuation: format!("{quote}{}", " ".repeat(column)),
                };
            }
        }

        self.paragraph = true;
        LineKind::Text {
            prefix: quote_len + column_offset(rest, container),
            continuation: format!("{quote}{}", " ".repeat(container)),
        }
    }
}

/// Byte length and depth of the leading blockquote markers, at most `max` deep.
fn quote_prefix(line: &str, max: usize) -> (usize, usize) {
    let bytes = line.as_bytes();
    let mut len = 0;
    let mut depth = 0;
    while depth < max {
        let spaces = bytes[len..].iter().take_while(|&&b| b == b' ').count();
        if spaces > 3 || bytes.get(len + spaces) != Some(&b'>') {
            break;
        }
        len += spaces + 1;
        if matches!(bytes.get(len), Some(b' ' | b'\t')) {
            len += 1;
        }
        depth += 1;
    }
    (len, depth)
}

/// Indentation width in columns (tabs stop at multiples of 4) and in bytes.
fn leading_columns(s: &str) -> (usize, usize) {
    let mut columns = 0;
    let mut bytes = 0;
    for b in s.bytes() {
        match b {
            b' ' => columns += 1,
            b'\t' => columns += 4 - columns % 4,
            _ => break,
        }
        bytes += 1;
    }
    (columns, bytes)
}

/// Byte offset in `s` once `column` columns of indentation are consumed.
fn column_offset(s: &str, column: usize) -> usize {
    let mut columns = 0;
    let mut bytes = 0;
    for b in s.bytes() {
        if columns >= column {
            break;
        }
        match b {
            b' ' => columns += 1,
            b'\t' => columns += 4 - columns % 4,
            _ => break,
        }
        bytes += 1;
    }
    bytes
}

fn is_atx_heading(content: &str) -> bool {
    let hashes = content.bytes().take_while(|&b| b == b'#').count();
    (1..=6).contains(&hashes)
        && matches!(
            content.as_bytes().get(hashes),
            None | Some(b' ' | b'\t' | b'\n' | b'\r')
        )
}

fn is_thematic_break(content: &str) -> bool {
    let body = content.trim_end();
    let Some(marker) = body.chars().next() else {
        return false;
    };
    matches!(marker, '-' | '*' | '_')
        && body.chars().all(|c| c == marker || c == ' ' || c == '\t')
        && body.chars().filter(|&c| c == marker).count() >= 3
}

/// Width of a list marker plus the spaces after it.
fn list_marker(content: &str) -> Option<usize> {
    if is_thematic_break(content) {
        return None;
    }

    let bytes = content.as_bytes();
    let marker_len = match bytes.first()? {
        b'-' | b'*' | b'+' => 1,
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 || !matches!(bytes.get(digits), Some(b'.' | b')')) {
                return None;
            }
            digits + 1
        }
        _ => return None,
    };

    let spaces = bytes[marker_len..].iter().take_while(|&&b| b == b' ').count();
    match bytes.get(marker_len + spaces) {
        None | Some(b'\n' | b'\r') => Some(marker_len + 1),
        Some(_) if spaces == 0 => None,
        Some(_) if spaces > 4 => Some(marker_len + 1),
        Some(_) => Some(marker_len + spaces),
    }
}

/// Directive source with container prefixes removed.
struct View<'a> {
    text: Cow<'a, str>,
    /// `(view offset, source offset)` at the start of each line.
    lines: Vec<(usize, usize)>,
}

impl<'a> View<'a> {
    /// Content from `start` on, followed by every next line that carries
    /// `continuation`.
    fn new(source: &'a str, start: usize, line_end: usize, continuation: &str) -> Self {
        if continuation.is_empty() {
            return Self {
                text: Cow::Borrowed(&source[start..]),
                lines: vec![(0, start)],
            };
        }

        let mut text = source[start..line_end].to_owned();
        let mut lines = vec![(0, start)];
        let mut pos = line_end;
        for line in source[line_end..].split_inclusive('\n') {
            let Some(rest) = strip_continuation(line, continuation) else {
                break;
            };
            lines.push((text.len(), pos + line.len() - rest.len()));
            text.push_str(rest);
            pos += line.len();
        }

        Self {
            text: Cow::Owned(text),
            lines,
        }
    }

    fn to_source(&self, offset: usize) -> usize {
        let line = self.lines.partition_point(|&(view, _)| view <= offset) - 1;
        let (view, source) = self.lines[line];
        source + (offset - view)
    }
}

/// A container line without its prefix, or its line ending when the line is
/// blank inside the container.
fn strip_continuation<'l>(line: &'l str, continuation: &str) -> Option<&'l str> {
    if let Some(rest) = line.strip_prefix(continuation) {
        return Some(rest);
    }
    let body = line.trim_end();
    (body == continuation.trim_end()).then(|| &line[body.len()..])
}

/// Replace recognised directives with placeholders.
///
/// Returns the remaining markdown and the rendered block for each placeholder.
pub(crate) fn scan_blocks(
    extensions: &mut [&mut BoxedExtension],
    source: &str,
    ctx: &mut RenderContext<'_>,
) -> (String, Vec<String>) {
    let mut markdown = String::with_capacity(source.len());
    let mut blocks = Vec::new();
    let mut structure = BlockContext::new();
    let mut pos = 0;
    // Container prefix owed to the rest of a line after an inline directive.
    let mut carry: Option<String> = None;

    while pos < source.len() {
        let line_end = source[pos..]
            .find('\n')
            .map_or(source.len(), |i| pos + i + 1);
        let line = &source[pos..line_end];

        let (prefix, continuation, carried) = match carry.take() {
            Some(continuation) => {
                if line.trim().is_empty() {
                    pos = line_end;
                    continue;
                }
                (leading_columns(line).1, continuation, true)
            }
            None => match structure.classify(line) {
                LineKind::Text {
                    prefix,
                    continuation,
                } => (prefix, continuation, false),
                LineKind::Code | LineKind::Heading | LineKind::Blank => {
                    markdown.push_str(line);
                    pos = line_end;
                    continue;
                }
            },
        };
        let lead = if carried {
            continuation.as_str()
        } else {
            &line[..prefix]
        };
        let content = &line[prefix..];

        let candidates = block_candidates(extensions, content);
        let found = if candidates.is_empty() {
            None
        } else {
            let view = View::new(source, pos + prefix, line_end, &continuation);
            next_block(extensions, &candidates, &view.text)
                .map(|(offset, index, token)| (offset, index, token, view))
        };
        let Some((offset, index, token, view)) = found else {
            markdown.push_str(lead);
            markdown.push_str(content);
            structure.set_paragraph(true);
            pos = line_end;
            continue;
        };

        let raw_len = token.raw().map_or(0, str::len);
        let html = extensions[index].render(&token, ctx).unwrap_or_default();

        markdown.push_str(lead);
        let before = content[..offset].trim_end();
        if !before.is_empty() {
            markdown.push_str(before);
            markdown.push('\n');
            markdown.push_str(&continuation);
        }
        markdown.push_str(&ctx.sentinel().block_placeholder(blocks.len()));
        markdown.push('\n');
        blocks.push(html);
        structure.set_paragraph(false);

        pos = view.to_source(offset + raw_len);
        if !source[..pos].ends_with('\n') {
            carry = Some(continuation);
        }
    }

    (markdown, blocks)
}

/// Start offsets in `content` claimed by an extension, by offset and then
/// registration order.
fn block_candidates(extensions: &[&mut BoxedExtension], content: &str) -> Vec<(usize, usize)> {
    let mut candidates: Vec<(usize, usize)> = extensions
        .iter()
        .enumerate()
        .filter_map(|(index, extension)| {
            extension
                .start(content)
                .filter(|&offset| offset < content.len() && content.is_char_boundary(offset))
                .map(|offset| (offset, index))
        })
        .collect();
    candidates.sort_unstable();
    candidates
}

/// First candidate that tokenizes and consumes input.
fn next_block(
    extensions: &[&mut BoxedExtension],
    candidates: &[(usize, usize)],
    view: &str,
) -> Option<(usize, usize, Token)> {
    candidates.iter().find_map(|&(offset, index)| {
        let token = extensions[index].tokenize(&view[offset..])?;
        let consumed = token.raw().is_some_and(|raw| !raw.is_empty());
        consumed.then_some((offset, index, token))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(prefix: usize, continuation: &str) -> LineKind {
        LineKind::Text {
            prefix,
            continuation: continuation.to_owned(),
        }
    }

    fn classify_all(source: &str) -> Vec<LineKind> {
        let mut structure = BlockContext::new();
        source
            .split_inclusive('\n')
            .map(|line| structure.classify(line))
            .collect()
    }

    #[test]
    fn test_backtick_fence() {
        assert_eq!(
            classify_all("```markdown\n:::dialogue\n```\nafter\n"),
            vec![LineKind::Code, LineKind::Code, LineKind::Code, text(0, "")]
        );
    }

    #[test]
    fn test_fence_needs_same_marker_and_length() {
        assert_eq!(
            classify_all("````\n~~~\n```\n`````\nafter"),
            vec![
                LineKind::Code,
                LineKind::Code,
                LineKind::Code,
                LineKind::Code,
                text(0, "")
            ]
        );
    }

    #[test]
    fn test_closing_fence_with_info_string_does_not_close() {
        assert_eq!(
            classify_all("```\n```rust\nstill code\n"),
            vec![LineKind::Code, LineKind::Code, LineKind::Code]
        );
    }

    #[test]
    fn test_backtick_info_with_backtick_is_not_fence() {
        assert_eq!(classify_all("``` a`b\n"), vec![text(0, "")]);
        assert_eq!(classify_all("``inline``\n"), vec![text(0, "")]);
    }

    #[test]
    fn test_indented_code_only_outside_paragraph() {
        assert_eq!(
            classify_all("    code\ntext\n    continued\n\n    code"),
            vec![
                LineKind::Code,
                text(0, ""),
                text(0, ""),
                LineKind::Blank,
                LineKind::Code
            ]
        );
    }

    #[test]
    fn test_atx_heading() {
        assert_eq!(
            classify_all("# Title\n###### Six\n####### Seven\n#tag\n"),
            vec![
                LineKind::Heading,
                LineKind::Heading,
                text(0, ""),
                text(0, "")
            ]
        );
    }

    #[test]
    fn test_blockquote_prefix() {
        assert_eq!(
            classify_all("> quoted\n>> deeper\n>\n"),
            vec![text(2, "> "), text(3, ">> "), LineKind::Blank]
        );
    }

    #[test]
    fn test_fence_inside_blockquote() {
        assert_eq!(
            classify_all("> ```\n> :::dialogue\n> ```\n> after\n"),
            vec![
                LineKind::Code,
                LineKind::Code,
                LineKind::Code,
                text(2, "> ")
            ]
        );
    }

    #[test]
    fn test_quoted_fence_line_inside_top_level_fence() {
        assert_eq!(
            classify_all("```\n> ```\n```\n"),
            vec![LineKind::Code, LineKind::Code, LineKind::Code]
        );
    }

    #[test]
    fn test_list_item_content_column() {
        assert_eq!(
            classify_all("- item\n\n  para\n1.  first\n    nested\nback\n"),
            vec![
                text(2, "  "),
                LineKind::Blank,
                text(2, "  "),
                text(4, "    "),
                text(4, "    "),
                text(0, "")
            ]
        );
    }

    #[test]
    fn test_code_inside_list_item() {
        assert_eq!(
            classify_all("- item\n\n      code\n"),
            vec![text(2, "  "), LineKind::Blank, LineKind::Code]
        );
    }

    #[test]
    fn test_thematic_break_is_not_list() {
        assert_eq!(
            classify_all("- - -\n  after\n"),
            vec![text(0, ""), text(0, "")]
        );
    }

    #[test]
    fn test_view_strips_continuation() {
        let source = "> :::dialogue\n> A: hi\n>\n> :::\nafter\n";
        let view = View::new(source, 2, 14, "> ");
        assert_eq!(view.text, ":::dialogue\nA: hi\n\n:::\n");
        assert_eq!(view.to_source(0), 2);
        assert_eq!(view.to_source(12), source.find("A: hi").unwrap());
        assert_eq!(
            view.to_source(view.text.len() - 1),
            source.find("\nafter").unwrap()
        );
    }

    #[test]
    fn test_view_borrows_at_top_level() {
        let source = "a\n:::gallery\nx\n:::\n";
        let view = View::new(source, 2, 13, "");
        assert!(matches!(view.text, Cow::Borrowed(":::gallery\nx\n:::\n")));
        assert_eq!(view.to_source(5), 7);
    }
}
