//! Per-pass render state.
//!
//! A [`RenderContext`] is created fresh at the start of every render pass and
//! threaded through every extension call. It owns the pass-scoped link
//! accumulator, so nothing from one document leaks into the next.

use crate::options::{LinkStyle, RenderOptions};
use crate::resource::ResourceResolver;
use crate::sentinel::Sentinel;

/// A link target recorded for the footnote list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRecord {
    /// Link target as written.
    pub href: String,
    /// 1-based position in insertion order.
    pub index: usize,
}

/// Link targets seen during one render pass, in insertion order.
///
/// Duplicates are kept: the same target linked twice gets two indices.
#[derive(Clone, Debug, Default)]
pub struct LinkAccumulator {
    records: Vec<LinkRecord>,
}

impl LinkAccumulator {
    /// Record a target and return its 1-based index.
    pub fn push(&mut self, href: impl Into<String>) -> usize {
        let index = self.records.len() + 1;
        self.records.push(LinkRecord {
            href: href.into(),
            index,
        });
        index
    }

    /// Recorded targets in insertion order.
    #[must_use]
    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// State shared by all extensions during one render pass.
pub struct RenderContext<'a> {
    options: &'a RenderOptions,
    link_style: LinkStyle,
    resolver: &'a dyn ResourceResolver,
    sentinel: Sentinel,
    links: LinkAccumulator,
}

impl<'a> RenderContext<'a> {
    /// Create the context for rendering `source`.
    #[must_use]
    pub fn new(
        options: &'a RenderOptions,
        resolver: &'a dyn ResourceResolver,
        source: &str,
    ) -> Self {
        Self {
            options,
            link_style: options.link_style,
            resolver,
            sentinel: Sentinel::for_source(source),
            links: LinkAccumulator::default(),
        }
    }

    /// Override the link style for this pass only.
    #[must_use]
    pub fn with_link_style(mut self, link_style: LinkStyle) -> Self {
        self.link_style = link_style;
        self
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        self.options
    }

    /// Effective link style of this pass.
    #[must_use]
    pub fn link_style(&self) -> LinkStyle {
        self.link_style
    }

    #[must_use]
    pub fn resolver(&self) -> &dyn ResourceResolver {
        self.resolver
    }

    /// Marker factory of this pass.
    #[must_use]
    pub fn sentinel(&self) -> &Sentinel {
        &self.sentinel
    }

    #[must_use]
    pub fn links(&self) -> &LinkAccumulator {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut LinkAccumulator {
        &mut self.links
    }
}
