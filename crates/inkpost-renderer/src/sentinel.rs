//! Sentinel markers for deferred substitution.
//!
//! Two kinds of markers live in intermediate markup, both HTML comments so
//! that pulldown-cmark passes them through as HTML blocks:
//!
//! - **Block placeholders** (`<!--STEM:block:N-->`) stand in for rendered
//!   directive fragments while the rest of the document goes through the
//!   baseline renderer.
//! - **Body sentinels** (`<!--STEM:KIND:start-->` … `<!--STEM:KIND:end-->`)
//!   bracket an escaped raw directive body that a postprocess stage renders
//!   later.
//!
//! The stem is chosen per render pass so that it never occurs in the source.

use std::fmt::Write;

use crate::RenderError;
use crate::html::{escape_html, unescape_html};

const BASE_STEM: &str = "inkpost-sentinel";

/// Marker factory for one render pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sentinel {
    stem: String,
}

impl Sentinel {
    /// Pick a marker stem that does not collide with `source`.
    ///
    /// # Example
    ///
    /// ```
    /// use inkpost_renderer::Sentinel;
    ///
    /// assert_eq!(Sentinel::for_source("plain text").stem(), "inkpost-sentinel");
    /// assert_eq!(Sentinel::for_source("inkpost-sentinel").stem(), "inkpost-sentinel-1");
    /// ```
    #[must_use]
    pub fn for_source(source: &str) -> Self {
        let mut stem = BASE_STEM.to_owned();
        let mut suffix = 0usize;
        while source.contains(&stem) {
            suffix += 1;
            stem = format!("{BASE_STEM}-{suffix}");
        }
        Self { stem }
    }

    /// The marker stem shared by every marker of this pass.
    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Placeholder comment for the `index`-th rendered block.
    #[must_use]
    pub fn block_placeholder(&self, index: usize) -> String {
        format!("<!--{}:block:{index}-->", self.stem)
    }

    /// Wrap a raw body in a start/end marker pair.
    ///
    /// The body is HTML-escaped so an unresolved block shows up as raw text.
    #[must_use]
    pub fn wrap(&self, kind: &str, body: &str) -> String {
        let mut out = String::with_capacity(body.len() + 2 * self.stem.len() + 32);
        write!(
            out,
            "{}{}{}",
            self.start_marker(kind),
            escape_html(body),
            self.end_marker(kind)
        )
        .unwrap();
        out
    }

    fn start_marker(&self, kind: &str) -> String {
        format!("<!--{}:{kind}:start-->", self.stem)
    }

    fn end_marker(&self, kind: &str) -> String {
        format!("<!--{}:{kind}:end-->", self.stem)
    }

    /// Replace block placeholders with their rendered fragments.
    ///
    /// A newline directly after a placeholder is dropped with it.
    /// Placeholders with an unknown index are left in place.
    pub(crate) fn splice_blocks(&self, html: &mut String, blocks: &[String]) {
        if blocks.is_empty() {
            return;
        }

        let prefix = format!("<!--{}:block:", self.stem);
        let mut result =
            String::with_capacity(html.len() + blocks.iter().map(String::len).sum::<usize>());
        let mut remaining = html.as_str();

        while let Some(start) = remaining.find(&prefix) {
            result.push_str(&remaining[..start]);
            let after = &remaining[start + prefix.len()..];

            let Some(close) = after.find("-->") else {
                result.push_str(&remaining[start..]);
                remaining = "";
                break;
            };

            let end = start + prefix.len() + close + 3;
            match after[..close].parse::<usize>().ok().and_then(|i| blocks.get(i)) {
                Some(block) => {
                    result.push_str(block);
                    // The placeholder line's own newline goes with it
                    remaining = remaining[end..].strip_prefix('\n').unwrap_or(&remaining[end..]);
                }
                None => {
                    result.push_str(&remaining[start..end]);
                    remaining = &remaining[end..];
                }
            }
        }

        result.push_str(remaining);
        *html = result;
    }

    /// Resolve every `kind` sentinel pair in `html`.
    ///
    /// `resolve` receives the unescaped raw body and returns the replacement
    /// for the whole marked region. On error the region is left untouched.
    /// Pairs are resolved front to back; each one completes before the next
    /// is looked up.
    pub(crate) fn resolve<F>(&self, html: &mut String, kind: &'static str, mut resolve: F)
    where
        F: FnMut(&str) -> Result<String, RenderError>,
    {
        let start_marker = self.start_marker(kind);
        let end_marker = self.end_marker(kind);

        if !html.contains(&start_marker) {
            return;
        }

        let mut result = String::with_capacity(html.len());
        let mut remaining = html.as_str();
        let mut consumed = 0;

        while let Some(start) = remaining.find(&start_marker) {
            result.push_str(&remaining[..start]);

            let body_start = start + start_marker.len();
            let Some(body_len) = remaining[body_start..].find(&end_marker) else {
                let err = RenderError::UnterminatedSentinel {
                    kind,
                    offset: consumed + start,
                };
                tracing::warn!(error = %err, "Leaving sentinel unresolved");
                result.push_str(&remaining[start..]);
                remaining = "";
                break;
            };

            let body_end = body_start + body_len;
            let region_end = body_end + end_marker.len();
            let body = unescape_html(&remaining[body_start..body_end]);

            match resolve(&body) {
                Ok(replacement) => result.push_str(&replacement),
                Err(err) => {
                    tracing::warn!(kind, error = %err, "Leaving directive body unresolved");
                    result.push_str(&remaining[start..region_end]);
                }
            }

            consumed += region_end;
            remaining = &remaining[region_end..];
        }

        result.push_str(remaining);
        *html = result;
    }
}
