//! Extension trait.
//!
//! An extension contributes any of three hooks to a [`Pipeline`](crate::Pipeline):
//!
//! 1. **Tokenize**: [`start`](Extension::start) locates a candidate block in
//!    the source and [`tokenize`](Extension::tokenize) turns it into a [`Token`].
//! 2. **Render**: [`render`](Extension::render) turns a token into markup.
//!    Block tokens are rendered by the extension that produced them; link
//!    tokens are offered to every extension in registration order.
//! 3. **Postprocess**: [`post_process`](Extension::post_process) runs once per
//!    completed pass over the whole document, in registration order.

use crate::RenderError;
use crate::context::RenderContext;
use crate::token::Token;

/// Entry point for rendering markdown from inside a postprocess stage.
///
/// The pipeline hands each stage a renderer that uses every other extension
/// and a fresh render context. Nothing is postprocessed inside it.
pub trait NestedRender {
    /// Render `markdown` in isolation and return the markup.
    fn render_nested(&mut self, markdown: &str) -> Result<String, RenderError>;
}

/// A pipeline extension.
///
/// # Thread Safety
///
/// Extensions implement `Send` only (not `Sync`) since each document pass
/// takes the pipeline by `&mut`.
///
/// # Example
///
/// ```
/// use inkpost_renderer::{Extension, Pipeline, RenderContext, RenderOptions, Token};
///
/// struct ShoutLinks;
///
/// impl Extension for ShoutLinks {
///     fn name(&self) -> &'static str { "shout" }
///
///     fn render(&mut self, token: &Token, _ctx: &mut RenderContext<'_>) -> Option<String> {
///         let Token::Link(link) = token else { return None };
///         Some(link.text.to_uppercase())
///     }
/// }
///
/// let mut pipeline = Pipeline::new(RenderOptions::default()).with_extension(ShoutLinks);
/// assert_eq!(pipeline.render("[quiet](https://example.com)"), "<p>QUIET</p>");
/// ```
pub trait Extension: Send {
    /// Extension name used in logs (e.g., "gallery").
    fn name(&self) -> &'static str;

    /// Byte offset of the first candidate block in `src`, if any.
    ///
    /// The pipeline passes one line at a time and only calls
    /// [`tokenize`](Self::tokenize) at a reported offset.
    fn start(&self, _src: &str) -> Option<usize> {
        None
    }

    /// Match a block at the very beginning of `src`.
    ///
    /// Returns `None` when the text is not a complete, valid block; the
    /// pipeline then tries other extensions or treats it as markdown.
    fn tokenize(&self, _src: &str) -> Option<Token> {
        None
    }

    /// Render a token, or `None` to leave it to the next extension.
    fn render(&mut self, _token: &Token, _ctx: &mut RenderContext<'_>) -> Option<String> {
        None
    }

    /// Transform the fully rendered document.
    fn post_process(
        &mut self,
        _html: &mut String,
        _ctx: &RenderContext<'_>,
        _nested: &mut dyn NestedRender,
    ) {
    }

    /// Drop memoized output.
    fn clear_cache(&mut self) {}

    /// Number of memoized entries.
    fn cache_size(&self) -> usize {
        0
    }
}

/// Boxed extension as stored by the pipeline.
pub type BoxedExtension = Box<dyn Extension>;
