//! Link rendering and the footnote list.
//!
//! | link | direct mode | footnote mode |
//! |---|---|---|
//! | `mailto:` | label as plain text | label as plain text |
//! | first-party platform URL | anchor | anchor |
//! | anything else | anchor | anchor + `<sup>[n]</sup>`, target listed at the end |

use std::fmt::Write;

use crate::context::RenderContext;
use crate::extension::{Extension, NestedRender};
use crate::html::escape_html;
use crate::options::LinkStyle;
use crate::token::{LinkToken, Token};

/// Renders inline links and appends the footnote list.
///
/// Stateless: the targets seen during a pass live in the
/// [`RenderContext`](crate::RenderContext) of that pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkExtension;

impl LinkExtension {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Extension for LinkExtension {
    fn name(&self) -> &'static str {
        "link"
    }

    fn render(&mut self, token: &Token, ctx: &mut RenderContext<'_>) -> Option<String> {
        let Token::Link(link) = token else {
            return None;
        };
        Some(render_link(link, ctx))
    }

    fn post_process(
        &mut self,
        html: &mut String,
        ctx: &RenderContext<'_>,
        _nested: &mut dyn NestedRender,
    ) {
        if ctx.link_style() != LinkStyle::Footnote || ctx.links().is_empty() {
            return;
        }

        html.push_str(r#"<section class="footnotes"><hr><ol>"#);
        for record in ctx.links().records() {
            write!(html, "<li>{}&nbsp;↩</li>", escape_html(&record.href)).unwrap();
        }
        html.push_str("</ol></section>");

        tracing::debug!(count = ctx.links().len(), "Appended footnotes");
    }
}

fn render_link(link: &LinkToken, ctx: &mut RenderContext<'_>) -> String {
    if link.href.starts_with("mailto:") {
        return escape_html(&link.text);
    }

    let footnote =
        ctx.link_style() == LinkStyle::Footnote && !ctx.options().is_platform_url(&link.href);
    let sup = if footnote {
        let index = ctx.links_mut().push(link.href.as_str());
        format!("<sup>[{index}]</sup>")
    } else {
        String::new()
    };

    format!(
        r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}{sup}</a>"#,
        escape_html(&link.href),
        link.content
    )
}
