//! Render pipeline: block scan, baseline render, postprocess stages.
//!
//! One pass over a document runs in three steps:
//!
//! 1. **Block scan**: the source is walked line by line (code and headings
//!    are skipped, blockquote and list prefixes set aside) and every
//!    directive an extension recognises is rendered and replaced with a
//!    placeholder comment on its own line.
//! 2. **Baseline render**: the remaining markdown is parsed by pulldown-cmark
//!    in one piece; links go to the extensions, image sources to the
//!    resolver. Rendered directive blocks are spliced back in afterwards.
//! 3. **Postprocess**: every extension's stage runs over the whole document,
//!    in registration order. Stages that need markdown rendered (gallery and
//!    long-image bodies) get a nested renderer made of all other extensions.

use std::borrow::Cow;

use crate::RenderError;
use crate::context::RenderContext;
use crate::directive::{DialogueDirective, ImageBlockDirective, SeqTitleDirective};
use crate::embed::rewrite_embeds;
use crate::extension::{BoxedExtension, Extension, NestedRender};
use crate::link::LinkExtension;
use crate::options::{LinkStyle, RenderOptions};
use crate::renderer::{InlineHooks, MarkdownRenderer};
use crate::resource::{KeepReferences, ResourceResolver};
use crate::scan::scan_blocks;
use crate::token::Token;

/// Markdown renderer with registered extensions.
///
/// Per-document state lives in a [`RenderContext`] created for every pass;
/// only extension caches survive between passes. Concurrent documents need
/// separate pipelines.
///
/// # Example
///
/// ```
/// use inkpost_renderer::{LinkStyle, Pipeline, RenderOptions};
///
/// let options = RenderOptions::default().with_link_style(LinkStyle::Footnote);
/// let mut pipeline = Pipeline::standard(options);
///
/// let html = pipeline.render(":::seqtitle 01 $ Intro:::\n\nSee [docs](https://example.com).");
/// assert!(html.starts_with(r#"<section class="seqtitle-container">"#));
/// assert!(html.contains("<sup>[1]</sup>"));
/// assert!(html.ends_with("<li>https://example.com&nbsp;↩</li></ol></section>"));
/// ```
pub struct Pipeline {
    options: RenderOptions,
    resolver: Box<dyn ResourceResolver>,
    extensions: Vec<BoxedExtension>,
}

impl Pipeline {
    /// Create a pipeline without extensions.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            resolver: Box::new(KeepReferences),
            extensions: Vec::new(),
        }
    }

    /// Create a pipeline with every built-in extension.
    ///
    /// Registration order (and so postprocess order) is dialogue, gallery,
    /// long image, sequence title, link.
    #[must_use]
    pub fn standard(options: RenderOptions) -> Self {
        Self::new(options)
            .with_extension(DialogueDirective::new())
            .with_extension(ImageBlockDirective::gallery())
            .with_extension(ImageBlockDirective::long_image())
            .with_extension(SeqTitleDirective::new())
            .with_extension(LinkExtension::new())
    }

    /// Register an extension after the existing ones.
    #[must_use]
    pub fn with_extension<E: Extension + 'static>(mut self, extension: E) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Set the resolver for local image references.
    #[must_use]
    pub fn with_resolver<R: ResourceResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a document: block scan, baseline render and every postprocess stage.
    pub fn render(&mut self, source: &str) -> String {
        let source = normalize_line_endings(source);
        let ctx_source: &str = &source;
        let mut ctx = RenderContext::new(&self.options, self.resolver.as_ref(), ctx_source);

        let mut html = {
            let mut extensions: Vec<&mut BoxedExtension> = self.extensions.iter_mut().collect();
            render_pass(&mut extensions, ctx_source, &mut ctx, self.options.gfm)
        };

        for index in 0..self.extensions.len() {
            let (before, rest) = self.extensions.split_at_mut(index);
            let Some((stage, after)) = rest.split_first_mut() else {
                break;
            };

            let mut nested = NestedPass {
                extensions: before.iter_mut().chain(after.iter_mut()).collect(),
                options: &self.options,
                resolver: self.resolver.as_ref(),
            };
            stage.post_process(&mut html, &ctx, &mut nested);
        }

        tracing::debug!(
            extensions = self.extensions.len(),
            links = ctx.links().len(),
            bytes = html.len(),
            "Rendered document"
        );
        html
    }

    /// Render without postprocessing.
    ///
    /// Deferred directive bodies stay wrapped in sentinel markers.
    pub fn render_fragment(&mut self, source: &str) -> String {
        let source = normalize_line_endings(source);
        let mut ctx = RenderContext::new(&self.options, self.resolver.as_ref(), &source);
        let mut extensions: Vec<&mut BoxedExtension> = self.extensions.iter_mut().collect();
        render_pass(&mut extensions, &source, &mut ctx, self.options.gfm)
    }

    /// Drop memoized output of every extension.
    pub fn clear_caches(&mut self) {
        for extension in &mut self.extensions {
            extension.clear_cache();
        }
    }

    /// Total number of memoized entries across extensions.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.extensions.iter().map(|e| e.cache_size()).sum()
    }
}

fn normalize_line_endings(source: &str) -> Cow<'_, str> {
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(source)
    }
}

/// Block scan plus baseline render; no postprocessing.
fn render_pass(
    extensions: &mut [&mut BoxedExtension],
    source: &str,
    ctx: &mut RenderContext<'_>,
    gfm: bool,
) -> String {
    let (markdown, blocks) = scan_blocks(extensions, source, ctx);
    let markdown = rewrite_embeds(&markdown);

    let mut html = {
        let mut hooks = PassHooks {
            extensions: &mut *extensions,
            ctx: &mut *ctx,
        };
        MarkdownRenderer::new(&mut hooks)
            .with_gfm(gfm)
            .render_markdown(&markdown)
    };
    ctx.sentinel().splice_blocks(&mut html, &blocks);

    if !blocks.is_empty() {
        tracing::debug!(blocks = blocks.len(), "Rendered directive blocks");
    }
    html
}

/// Routes links to the extensions and images to the resolver.
struct PassHooks<'p, 'x, 'c> {
    extensions: &'p mut [&'x mut BoxedExtension],
    ctx: &'p mut RenderContext<'c>,
}

impl InlineHooks for PassHooks<'_, '_, '_> {
    fn render_link(&mut self, token: &Token) -> Option<String> {
        for extension in self.extensions.iter_mut() {
            if let Some(html) = extension.render(token, self.ctx) {
                return Some(html);
            }
        }
        None
    }

    fn resolve_image(&self, src: &str) -> Option<String> {
        self.ctx.resolver().resolve(src)
    }
}

/// Nested renderer handed to a postprocess stage.
///
/// Holds every extension except the stage itself. Each call gets a fresh
/// context in direct link mode, so nested links are never footnoted. Never
/// returns an error; the `Result` belongs to the [`NestedRender`] seam.
struct NestedPass<'p, 'x> {
    extensions: Vec<&'x mut BoxedExtension>,
    options: &'p RenderOptions,
    resolver: &'p dyn ResourceResolver,
}

impl NestedRender for NestedPass<'_, '_> {
    fn render_nested(&mut self, markdown: &str) -> Result<String, RenderError> {
        let mut ctx = RenderContext::new(self.options, self.resolver, markdown)
            .with_link_style(LinkStyle::Direct);
        Ok(render_pass(
            &mut self.extensions,
            markdown,
            &mut ctx,
            self.options.gfm,
        ))
    }
}
