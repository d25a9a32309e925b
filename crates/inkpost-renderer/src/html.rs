//! HTML helpers shared by the baseline renderer and the directives.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

/// Matches one complete `<img ...>` element in rendered markup.
static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<img\b[^>]*>").expect("valid img regex"));

/// Escape text for use in HTML content or double-quoted attributes.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_html`].
///
/// Only the four entities produced by [`escape_html`] are decoded, so
/// `unescape_html(&escape_html(s)) == s` for every input.
#[must_use]
pub(crate) fn unescape_html(s: &str) -> String {
    const ENTITIES: [(&str, char); 4] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
    ];

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Write an `<img>` element.
pub(crate) fn image(src: &str, alt: &str, title: &str, out: &mut String) {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escape_html(title))
    };
    write!(
        out,
        r#"<img src="{}"{title_attr} alt="{}">"#,
        escape_html(src),
        escape_html(alt)
    )
    .unwrap();
}

/// Collect every `<img>` element of `html`, in document order.
pub(crate) fn extract_images(html: &str) -> Vec<&str> {
    IMG_TAG.find_iter(html).map(|m| m.as_str()).collect()
}

/// Append an inline `style` attribute to an `<img>` element.
pub(crate) fn with_style(img_tag: &str, style: &str) -> String {
    let (head, close) = match img_tag.strip_suffix("/>") {
        Some(head) => (head.trim_end(), " />"),
        None => (img_tag.strip_suffix('>').unwrap_or(img_tag), ">"),
    };
    format!(r#"{head} style="{style}"{close}"#)
}
