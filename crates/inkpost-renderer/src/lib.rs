//! Markdown renderer with directive extensions for article publishing.
//!
//! This crate renders markdown to inline-styled HTML through a [`Pipeline`]
//! of [`Extension`]s layered over a pulldown-cmark baseline renderer.
//!
//! # Directives
//!
//! - `:::dialogue [title]`: chat thread, one `speaker: text` per line
//! - `:::gallery [title]`: images in a horizontal scroll strip
//! - `:::longimage [title]`: images in a vertically scrolling panel
//! - `:::seqtitle 01 $ Title:::`: numbered section banner
//!
//! Links are handled by [`LinkExtension`], which can number external links
//! and list their targets as footnotes ([`LinkStyle::Footnote`]).
//!
//! # Deferred bodies
//!
//! Gallery and long-image bodies are markdown that must go through the full
//! pipeline, including resource resolution. The render phase wraps each body
//! in [`Sentinel`] markers; after the whole document is rendered, the
//! postprocess stage renders the body in isolation and splices the styled
//! images back in.
//!
//! # Example
//!
//! ```
//! use inkpost_renderer::{Pipeline, RenderOptions};
//!
//! let mut pipeline = Pipeline::standard(RenderOptions::default())
//!     .with_resolver(|reference: &str| Some(format!("https://cdn.example/{reference}")));
//!
//! let html = pipeline
//!     .render(":::gallery [Holiday]\n![beach](beach.png)\n![hills](hills.png)\n:::");
//! assert_eq!(html.matches("<img").count(), 2);
//! assert!(html.contains(r#"src="https://cdn.example/beach.png""#));
//! ```

mod context;
pub mod directive;
mod embed;
mod error;
mod extension;
mod html;
mod link;
mod options;
mod pipeline;
mod renderer;
mod resource;
mod scan;
mod sentinel;
mod state;
mod token;

pub use context::{LinkAccumulator, LinkRecord, RenderContext};
pub use directive::{DialogueDirective, ImageBlockDirective, SeqTitleDirective};
pub use error::RenderError;
pub use extension::{BoxedExtension, Extension, NestedRender};
pub use html::escape_html;
pub use link::LinkExtension;
pub use options::{DEFAULT_PLATFORM_PREFIXES, LinkStyle, RenderOptions};
pub use pipeline::Pipeline;
pub use resource::{KeepReferences, ResourceResolver};
pub use sentinel::Sentinel;
pub use token::{DialogueToken, ImageBlockToken, LinkToken, Message, SeqTitleToken, Token};
