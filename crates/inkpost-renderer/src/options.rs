//! Render options shared by every extension.

/// How external links are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LinkStyle {
    /// Links are rendered inline; targets stay hidden behind the link text.
    #[default]
    Direct,
    /// Links get a superscript index and their targets are listed at the end.
    Footnote,
}

/// First-party URL prefixes that are always rendered as direct links.
pub const DEFAULT_PLATFORM_PREFIXES: &[&str] =
    &["https://mp.weixin.qq.com/mp", "https://mp.weixin.qq.com/s"];

/// Options for one [`Pipeline`](crate::Pipeline).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Link rendering mode.
    pub link_style: LinkStyle,
    /// URL prefixes never converted to footnotes.
    pub platform_prefixes: Vec<String>,
    /// Enable GitHub Flavored Markdown extensions (tables, strikethrough, task lists).
    pub gfm: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            link_style: LinkStyle::default(),
            platform_prefixes: DEFAULT_PLATFORM_PREFIXES
                .iter()
                .map(|&p| p.to_owned())
                .collect(),
            gfm: true,
        }
    }
}

impl RenderOptions {
    /// Set the link rendering mode.
    #[must_use]
    pub fn with_link_style(mut self, link_style: LinkStyle) -> Self {
        self.link_style = link_style;
        self
    }

    /// Replace the first-party platform prefixes.
    #[must_use]
    pub fn with_platform_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platform_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Check whether `href` belongs to a first-party platform.
    #[must_use]
    pub fn is_platform_url(&self, href: &str) -> bool {
        self.platform_prefixes
            .iter()
            .any(|prefix| href.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert_eq!(options.link_style, LinkStyle::Direct);
        assert!(options.gfm);
        assert_eq!(options.platform_prefixes.len(), 2);
    }

    #[test]
    fn test_is_platform_url() {
        let options = RenderOptions::default();
        assert!(options.is_platform_url("https://mp.weixin.qq.com/s/abc"));
        assert!(options.is_platform_url("https://mp.weixin.qq.com/mp/profile"));
        assert!(!options.is_platform_url("https://example.com"));
    }

    #[test]
    fn test_custom_prefixes() {
        let options =
            RenderOptions::default().with_platform_prefixes(["https://blog.example.com/"]);
        assert!(options.is_platform_url("https://blog.example.com/post"));
        assert!(!options.is_platform_url("https://mp.weixin.qq.com/s/abc"));
    }

    #[test]
    fn test_builder() {
        let options = RenderOptions::default()
            .with_link_style(LinkStyle::Footnote)
            .with_gfm(false);
        assert_eq!(options.link_style, LinkStyle::Footnote);
        assert!(!options.gfm);
    }
}
