//! Sequence-title banner: `:::seqtitle 01 $ Getting started:::`.

use std::collections::HashMap;
use std::fmt::Write;

use crate::context::RenderContext;
use crate::extension::Extension;
use crate::html::escape_html;
use crate::token::{SeqTitleToken, Token};

const OPEN: &str = ":::seqtitle";
const CLOSE: &str = ":::";
const SEPARATOR: char = '$';

/// Renders numbered section banners.
///
/// Output for each `(seq, title)` pair is memoized for the lifetime of the
/// instance; [`clear_cache`](Extension::clear_cache) drops it.
#[derive(Debug, Default)]
pub struct SeqTitleDirective {
    cache: HashMap<(String, String), String>,
}

impl SeqTitleDirective {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Extension for SeqTitleDirective {
    fn name(&self) -> &'static str {
        "seqtitle"
    }

    fn start(&self, src: &str) -> Option<usize> {
        src.find(OPEN)
    }

    fn tokenize(&self, src: &str) -> Option<Token> {
        let rest = src.strip_prefix(OPEN)?;
        let end = rest.find(CLOSE)?;
        let content = &rest[..end];
        if content.contains('\n') {
            return None;
        }

        let (seq, title) = content.split_once(SEPARATOR)?;
        let seq = seq.trim();
        let title = title.trim();
        if seq.is_empty() || title.is_empty() {
            return None;
        }

        Some(Token::SeqTitle(SeqTitleToken {
            raw: src[..OPEN.len() + end + CLOSE.len()].to_owned(),
            seq: seq.to_owned(),
            title: title.to_owned(),
        }))
    }

    fn render(&mut self, token: &Token, _ctx: &mut RenderContext<'_>) -> Option<String> {
        let Token::SeqTitle(token) = token else {
            return None;
        };

        let html = self
            .cache
            .entry((token.seq.clone(), token.title.clone()))
            .or_insert_with(|| render_banner(&token.seq, &token.title));
        Some(html.clone())
    }

    fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

fn render_banner(seq: &str, title: &str) -> String {
    let mut out = String::new();
    write!(
        out,
        r#"<section class="seqtitle-container"><div class="seqtitle-seq">{}</div><div class="seqtitle-title">{}</div></section>"#,
        escape_html(seq),
        escape_html(title)
    )
    .unwrap();
    out
}
