//! Block directives.
//!
//! Body-bearing directives share one fence grammar:
//!
//! ```text
//! :::name [optional title]
//! body lines
//! :::
//! ```
//!
//! The opener must start a block: column zero, or the content column of a
//! blockquote or list item. The body runs to the first following line that
//! starts with `:::`. A block without a closing marker is not a
//! directive and stays plain markdown.
//!
//! The sequence-title banner uses a compact single-line form instead:
//! `:::seqtitle 01 $ Title:::`.

mod dialogue;
mod image_block;
mod seqtitle;

pub use dialogue::DialogueDirective;
pub use image_block::ImageBlockDirective;
pub use seqtitle::SeqTitleDirective;

/// A matched body-bearing block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockMatch<'a> {
    /// Consumed span, from the opener through the closing `:::`.
    pub(crate) raw: &'a str,
    /// Trimmed title, `None` when absent or blank.
    pub(crate) title: Option<String>,
    /// Text between the opener line and the closing line.
    pub(crate) body: &'a str,
}

/// Offset of the first line in `src` that opens a `name` block.
pub(crate) fn find_block_start(src: &str, name: &str) -> Option<usize> {
    std::iter::once(0)
        .chain(src.match_indices('\n').map(|(i, _)| i + 1))
        .filter(|&offset| offset < src.len())
        .find(|&offset| opener_rest(&src[offset..], name).is_some())
}

/// Match a complete `name` block at the start of `src`.
pub(crate) fn match_block<'a>(src: &'a str, name: &str) -> Option<BlockMatch<'a>> {
    let rest = opener_rest(src, name)?;
    let rest = skip_inline_ws(rest);

    let (title, rest) = match rest.strip_prefix('[') {
        Some(bracketed) => {
            let end = bracketed.find(']')?;
            let title = &bracketed[..end];
            if title.is_empty() || title.contains('\n') {
                return None;
            }
            (Some(title.trim()), &bracketed[end + 1..])
        }
        None => (None, rest),
    };

    let rest = skip_inline_ws(rest).strip_prefix('\n')?;
    let header_len = src.len() - rest.len();

    let close = header_len + rest.find("\n:::")?;
    let raw_end = close + "\n:::".len();

    Some(BlockMatch {
        raw: &src[..raw_end],
        title: title.filter(|t| !t.is_empty()).map(ToOwned::to_owned),
        body: &src[header_len..close],
    })
}

/// Text following `:::name` when `src` opens a `name` block.
fn opener_rest<'a>(src: &'a str, name: &str) -> Option<&'a str> {
    let rest = src.strip_prefix(":::")?;
    let rest = skip_inline_ws(rest).strip_prefix(name)?;
    match rest.chars().next() {
        None | Some(' ' | '\t' | '\n' | '[') => Some(rest),
        Some(_) => None,
    }
}

fn skip_inline_ws(s: &str) -> &str {
    s.trim_start_matches([' ', '\t'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_match_block_without_title() {
        let src = ":::gallery\n![a](a.png)\n:::\nafter";
        let block = match_block(src, "gallery").unwrap();
        assert_eq!(block.raw, ":::gallery\n![a](a.png)\n:::");
        assert_eq!(block.title, None);
        assert_eq!(block.body, "![a](a.png)");
    }

    #[test]
    fn test_match_block_with_title() {
        let src = "::: dialogue [ Chat log ]  \nA: hi\nB: hey\n:::";
        let block = match_block(src, "dialogue").unwrap();
        assert_eq!(block.title.as_deref(), Some("Chat log"));
        assert_eq!(block.body, "A: hi\nB: hey");
        assert_eq!(block.raw, src);
    }

    #[test]
    fn test_blank_title_is_none() {
        let block = match_block(":::gallery[   ]\nx\n:::", "gallery").unwrap();
        assert_eq!(block.title, None);
    }

    #[test]
    fn test_empty_brackets_rejected() {
        assert_eq!(match_block(":::gallery[]\nx\n:::", "gallery"), None);
    }

    #[test]
    fn test_unterminated_rejected() {
        assert_eq!(match_block(":::dialogue\nA: hi\n", "dialogue"), None);
        assert_eq!(match_block(":::dialogue\n:::", "dialogue"), None);
    }

    #[test]
    fn test_empty_body() {
        let block = match_block(":::dialogue\n\n:::", "dialogue").unwrap();
        assert_eq!(block.body, "");
    }

    #[test]
    fn test_name_must_end() {
        assert_eq!(match_block(":::galleryx\nx\n:::", "gallery"), None);
        assert_eq!(find_block_start(":::galleryx\n", "gallery"), None);
    }

    #[test]
    fn test_text_after_title_rejected() {
        assert_eq!(match_block(":::gallery [t] extra\nx\n:::", "gallery"), None);
    }

    #[test]
    fn test_raw_plus_rest_reconstructs_source() {
        let src = ":::longimage\n![a](a.png)\n:::\n\nNext paragraph\n";
        let block = match_block(src, "longimage").unwrap();
        let rest = &src[block.raw.len()..];
        assert_eq!(format!("{}{rest}", block.raw), src);
    }

    #[test]
    fn test_find_block_start_at_line_start_only() {
        assert_eq!(find_block_start("text\n:::gallery\n", "gallery"), Some(5));
        assert_eq!(find_block_start("text :::gallery\n", "gallery"), None);
        assert_eq!(find_block_start(":::gallery", "gallery"), Some(0));
    }
}
