//! Image block directives: `:::gallery` and `:::longimage`.
//!
//! Both directives defer their body. The render phase emits the styled card
//! with the raw body wrapped in sentinel markers; the postprocess phase
//! renders each body in isolation, keeps only the produced `<img>` elements
//! and splices them back styled for the block kind.

use std::fmt::Write;

use super::{find_block_start, match_block};
use crate::context::RenderContext;
use crate::extension::{Extension, NestedRender};
use crate::html::{escape_html, extract_images, with_style};
use crate::token::{ImageBlockToken, Token};

const CARD_OPEN: &str = r#"<section style="margin: 1.5em 8px 2em; padding: 16px; background: linear-gradient(135deg, rgba(200, 100, 66, 0.02), rgba(250, 249, 245, 0.95)); border: 1px solid rgba(200, 100, 66, 0.15); border-radius: 12px; box-shadow: 0 3px 12px rgba(200, 100, 66, 0.08); position: relative; overflow: hidden;">"#;

const GALLERY_IMG_STYLE: &str =
    "width: 100%; height: auto; max-height: 400px; object-fit: contain; border-radius: 8px; display: block; margin: 0 auto;";

const LONG_IMAGE_IMG_STYLE: &str =
    "width: 100%; height: auto; object-fit: contain; display: block; margin: 0 auto; border-radius: 8px;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// Horizontal scroll-snap strip of fixed-width items.
    Gallery,
    /// Single vertical scroll region capped at `80vh`.
    LongImage,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Self::Gallery => "gallery",
            Self::LongImage => "longimage",
        }
    }

    /// Markup around the sentinel pair inside the card.
    fn frame(self) -> (&'static str, &'static str) {
        match self {
            Self::Gallery => (
                r#"<section class="gallery" style="margin: 0; padding: 0; box-sizing: border-box;">"#,
                "</section>",
            ),
            Self::LongImage => (
                concat!(
                    r#"<section class="longimage" style="margin: 0; padding: 0; box-sizing: border-box;">"#,
                    r#"<section style="display: block; width: 100%; vertical-align: top; overflow-x: hidden; overflow-y: auto; max-height: 80vh; padding: 0; box-sizing: border-box; scroll-behavior: smooth;">"#,
                    r#"<section style="text-align: center; margin: 0; padding: 0; box-sizing: border-box;">"#,
                ),
                "</section></section></section>",
            ),
        }
    }

    /// Replacement markup for the images of one resolved body.
    fn arrange(self, images: &[&str]) -> String {
        match self {
            Self::Gallery => {
                let mut out = String::from(concat!(
                    r#"<section style="display: inline-block; width: 100%; vertical-align: top; overflow-x: auto; scroll-snap-type: x mandatory; overflow-y: hidden; padding-right: 3px; padding-left: 3px; box-sizing: border-box;">"#,
                    r#"<section style="width: auto; min-width: 100%; box-sizing: border-box; display: flex; justify-content: flex-start; align-items: center; gap: 8px; flex-wrap: nowrap; overflow-x: auto;">"#,
                ));
                for img in images {
                    write!(
                        out,
                        concat!(
                            r#"<div class="gallery-item" style="display: inline-block; width: 100%; vertical-align: middle; box-sizing: border-box; flex: 0 0 auto; min-width: 280px; max-width: 350px; scroll-snap-align: start;">"#,
                            r#"<section style="box-sizing: border-box;"><section style="text-align: center; margin: 0 8px;">{}</section></section>"#,
                            "</div>"
                        ),
                        with_style(img, GALLERY_IMG_STYLE)
                    )
                    .unwrap();
                }
                out.push_str("</section></section>");
                out
            }
            Self::LongImage => images
                .iter()
                .map(|img| with_style(img, LONG_IMAGE_IMG_STYLE))
                .collect(),
        }
    }
}

/// Gallery or long-image block.
#[derive(Debug, Clone, Copy)]
pub struct ImageBlockDirective {
    kind: Kind,
}

impl ImageBlockDirective {
    /// `:::gallery`: images side by side in a horizontal scroll strip.
    #[must_use]
    pub fn gallery() -> Self {
        Self {
            kind: Kind::Gallery,
        }
    }

    /// `:::longimage`: images stacked in a vertically scrolling panel.
    #[must_use]
    pub fn long_image() -> Self {
        Self {
            kind: Kind::LongImage,
        }
    }

    fn render_block(self, token: &ImageBlockToken, ctx: &RenderContext<'_>) -> String {
        let (frame_open, frame_close) = self.kind.frame();
        let mut out = String::with_capacity(2048 + token.body.len());
        out.push_str(CARD_OPEN);
        out.push_str(frame_open);
        out.push_str(&ctx.sentinel().wrap(self.kind.name(), &token.body));
        out.push_str(frame_close);

        if let Some(title) = &token.title {
            write!(
                out,
                concat!(
                    r#"<section style="text-align: center; font-size: 12px; color: rgba(200, 100, 66, 0.9); margin: 12px 0 0; padding: 10px 16px; background: linear-gradient(135deg, rgba(200, 100, 66, 0.06), rgba(200, 100, 66, 0.12)); border: 1px solid rgba(200, 100, 66, 0.25); border-radius: 12px; font-family: 'PingFang SC', -apple-system-font, BlinkMacSystemFont, 'Helvetica Neue', 'Hiragino Sans GB', 'Microsoft YaHei UI', 'Microsoft YaHei', Arial, sans-serif; font-weight: 500; letter-spacing: 0.5px; box-shadow: 0 2px 8px rgba(200, 100, 66, 0.1); backdrop-filter: blur(6px);">"#,
                    r#"<p style="margin: 0; text-align: center; box-sizing: border-box;"><span style="font-size: 12px; color: inherit;">{}</span></p>"#,
                    "</section>"
                ),
                escape_html(title)
            )
            .unwrap();
        }

        out.push_str("</section>");
        out
    }
}

impl Extension for ImageBlockDirective {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn start(&self, src: &str) -> Option<usize> {
        find_block_start(src, self.kind.name())
    }

    fn tokenize(&self, src: &str) -> Option<Token> {
        let block = match_block(src, self.kind.name())?;
        let token = ImageBlockToken {
            raw: block.raw.to_owned(),
            title: block.title,
            body: block.body.to_owned(),
        };
        Some(match self.kind {
            Kind::Gallery => Token::Gallery(token),
            Kind::LongImage => Token::LongImage(token),
        })
    }

    fn render(&mut self, token: &Token, ctx: &mut RenderContext<'_>) -> Option<String> {
        match (self.kind, token) {
            (Kind::Gallery, Token::Gallery(block)) | (Kind::LongImage, Token::LongImage(block)) => {
                Some(self.render_block(block, ctx))
            }
            _ => None,
        }
    }

    fn post_process(
        &mut self,
        html: &mut String,
        ctx: &RenderContext<'_>,
        nested: &mut dyn NestedRender,
    ) {
        let kind = self.kind;
        let mut resolved = 0usize;
        ctx.sentinel().resolve(html, kind.name(), |body| {
            let rendered = nested.render_nested(body)?;
            let images = extract_images(&rendered);
            resolved += 1;
            if images.is_empty() {
                tracing::debug!(kind = kind.name(), "Directive body has no images");
                return Ok(String::new());
            }
            Ok(kind.arrange(&images))
        });

        if resolved > 0 {
            tracing::debug!(kind = kind.name(), blocks = resolved, "Resolved image blocks");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderError;
    use crate::options::RenderOptions;
    use crate::resource::KeepReferences;
    use pretty_assertions::assert_eq;

    /// Turns every body line into an image element.
    struct LineImages;

    impl NestedRender for LineImages {
        fn render_nested(&mut self, markdown: &str) -> Result<String, RenderError> {
            Ok(markdown
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| format!(r#"<p><img src="{line}" alt=""></p>"#))
                .collect())
        }
    }

    struct Failing;

    impl NestedRender for Failing {
        fn render_nested(&mut self, _markdown: &str) -> Result<String, RenderError> {
            Err(RenderError::nested("gallery", "parser exploded"))
        }
    }

    fn render(
        directive: &mut ImageBlockDirective,
        src: &str,
        ctx: &mut RenderContext<'_>,
    ) -> String {
        let token = directive.tokenize(src).unwrap();
        directive.render(&token, ctx).unwrap()
    }

    #[test]
    fn test_tokenize_kinds() {
        let gallery = ImageBlockDirective::gallery().tokenize(":::gallery\n![a](a.png)\n:::");
        assert!(matches!(gallery, Some(Token::Gallery(_))));

        let long =
            ImageBlockDirective::long_image().tokenize(":::longimage [Long]\n![a](a.png)\n:::");
        let Some(Token::LongImage(token)) = long else {
            panic!("expected long image token");
        };
        assert_eq!(token.title.as_deref(), Some("Long"));
        assert_eq!(token.body, "![a](a.png)");
    }

    #[test]
    fn test_gallery_does_not_match_longimage() {
        assert_eq!(ImageBlockDirective::gallery().tokenize(":::longimage\nx\n:::"), None);
        assert_eq!(ImageBlockDirective::gallery().start(":::longimage\n"), None);
    }

    #[test]
    fn test_render_wraps_body_in_sentinels() {
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&options, &KeepReferences, "");
        let html = render(
            &mut ImageBlockDirective::gallery(),
            ":::gallery [Trip]\n![a](a.png)\n:::",
            &mut ctx,
        );

        assert!(html.contains(
            "<!--inkpost-sentinel:gallery:start-->![a](a.png)<!--inkpost-sentinel:gallery:end-->"
        ));
        assert!(html.contains(">Trip</span>"));
    }

    #[test]
    fn test_render_ignores_other_tokens() {
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&options, &KeepReferences, "");
        let token = ImageBlockDirective::gallery()
            .tokenize(":::gallery\nx\n:::")
            .unwrap();
        assert_eq!(ImageBlockDirective::long_image().render(&token, &mut ctx), None);
    }

    #[test]
    fn test_gallery_post_process() {
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&options, &KeepReferences, "");
        let mut directive = ImageBlockDirective::gallery();
        let mut html = render(&mut directive, ":::gallery\na.png\nb.png\n:::", &mut ctx);

        directive.post_process(&mut html, &ctx, &mut LineImages);

        assert!(!html.contains("inkpost-sentinel"));
        assert_eq!(html.matches("gallery-item").count(), 2);
        assert!(html.contains("scroll-snap-type: x mandatory"));
        assert!(html.contains(&format!(r#"<img src="a.png" alt="" style="{GALLERY_IMG_STYLE}">"#)));
        assert!(!html.contains("<p>"));
    }

    #[test]
    fn test_long_image_post_process() {
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&options, &KeepReferences, "");
        let mut directive = ImageBlockDirective::long_image();
        let mut html = render(&mut directive, ":::longimage\nlong.png\n:::", &mut ctx);

        directive.post_process(&mut html, &ctx, &mut LineImages);

        assert!(html.contains("max-height: 80vh"));
        assert!(html.contains(&format!(
            r#"<img src="long.png" alt="" style="{LONG_IMAGE_IMG_STYLE}">"#
        )));
        assert_eq!(html.matches("<img").count(), 1);
    }

    #[test]
    fn test_no_images_resolves_to_nothing() {
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&options, &KeepReferences, "");
        let mut directive = ImageBlockDirective::gallery();
        let mut html = render(&mut directive, ":::gallery\n\n:::", &mut ctx);

        directive.post_process(&mut html, &ctx, &mut LineImages);

        assert!(!html.contains("inkpost-sentinel"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_nested_failure_leaves_raw_body() {
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&options, &KeepReferences, "");
        let mut directive = ImageBlockDirective::gallery();
        let mut html = render(&mut directive, ":::gallery\n![a](<a b.png>)\n:::", &mut ctx);
        let before = html.clone();

        directive.post_process(&mut html, &ctx, &mut Failing);

        assert_eq!(html, before);
        assert!(html.contains("![a](&lt;a b.png&gt;)"));
    }

    #[test]
    fn test_post_process_only_own_kind() {
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&options, &KeepReferences, "");
        let mut long = ImageBlockDirective::long_image();
        let mut html = render(&mut long, ":::longimage\nx.png\n:::", &mut ctx);
        let before = html.clone();

        ImageBlockDirective::gallery().post_process(&mut html, &ctx, &mut LineImages);

        assert_eq!(html, before);
    }
}
