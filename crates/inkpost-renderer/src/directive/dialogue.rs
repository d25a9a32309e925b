//! Dialogue directive: `:::dialogue [title]` with one `speaker: text` per line.

use std::fmt::Write;

use super::{find_block_start, match_block};
use crate::context::RenderContext;
use crate::extension::Extension;
use crate::html::escape_html;
use crate::token::{DialogueToken, Message, Token};

const NAME: &str = "dialogue";

const FONT: &str = "font-family: 'PingFang SC', -apple-system-font, BlinkMacSystemFont, 'Helvetica Neue', 'Hiragino Sans GB', 'Microsoft YaHei UI', 'Microsoft YaHei', Arial, sans-serif;";

/// Renders chat-style message threads.
///
/// Messages alternate sides: even positions are incoming (left), odd
/// positions outgoing (right). Message text is displayed literally.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialogueDirective;

impl DialogueDirective {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Extension for DialogueDirective {
    fn name(&self) -> &'static str {
        NAME
    }

    fn start(&self, src: &str) -> Option<usize> {
        find_block_start(src, NAME)
    }

    fn tokenize(&self, src: &str) -> Option<Token> {
        let block = match_block(src, NAME)?;
        Some(Token::Dialogue(DialogueToken {
            raw: block.raw.to_owned(),
            title: block.title,
            messages: parse_messages(block.body),
        }))
    }

    fn render(&mut self, token: &Token, _ctx: &mut RenderContext<'_>) -> Option<String> {
        match token {
            Token::Dialogue(dialogue) => Some(render_dialogue(dialogue)),
            _ => None,
        }
    }
}

/// Parse every `speaker: content` line of a body; other lines are dropped.
///
/// Both the ASCII colon and the full-width colon (`：`) separate speaker from
/// content.
pub(crate) fn parse_messages(body: &str) -> Vec<Message> {
    body.lines().filter_map(parse_message).collect()
}

fn parse_message(line: &str) -> Option<Message> {
    let (speaker, content) = line.trim().split_once([':', '：'])?;
    let speaker = speaker.trim();
    let content = content.trim();
    if speaker.is_empty() || content.is_empty() {
        return None;
    }
    Some(Message {
        speaker: speaker.to_owned(),
        content: content.to_owned(),
    })
}

/// Render a dialogue thread. No messages render to an empty string.
pub(crate) fn render_dialogue(token: &DialogueToken) -> String {
    if token.messages.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(2048 * token.messages.len());
    out.push_str(r#"<section class="dialogue" style="margin: 1.5em 8px 2em; padding: 20px; background: linear-gradient(135deg, rgba(246, 246, 246, 0.5) 0%, rgba(255, 255, 255, 0.95) 100%); border: 1px solid rgba(0, 0, 0, 0.05); border-radius: 12px; box-shadow: 0 3px 12px rgba(0, 0, 0, 0.06); position: relative; overflow: hidden; box-sizing: border-box;">"#);

    if let Some(title) = &token.title {
        write!(
            out,
            r#"<section class="dialogue-title" style="text-align: center; margin: 0 0 20px 0; padding: 12px; background: linear-gradient(135deg, rgba(7, 193, 96, 0.08), rgba(7, 193, 96, 0.12)); border-radius: 10px; border: 1px solid rgba(7, 193, 96, 0.2); box-sizing: border-box;"><p style="margin: 0; font-size: 16px; color: #07C160; font-weight: 600; {FONT} box-sizing: border-box;">{}</p></section>"#,
            escape_html(title)
        )
        .unwrap();
    }

    out.push_str(r#"<section style="padding: 10px 0; box-sizing: border-box;">"#);
    for (index, message) in token.messages.iter().enumerate() {
        if index % 2 == 0 {
            render_incoming(message, &mut out);
        } else {
            render_outgoing(message, &mut out);
        }
    }
    out.push_str("</section></section>");
    out
}

fn avatar_letter(speaker: &str) -> String {
    speaker
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

fn render_incoming(message: &Message, out: &mut String) {
    let speaker = escape_html(&message.speaker);
    let avatar = escape_html(&avatar_letter(&message.speaker));
    let content = escape_html(&message.content);

    write!(
        out,
        concat!(
            r#"<section class="dialogue-message dialogue-left" style="display: flex; justify-content: flex-start; align-items: flex-start; margin: 12px 0; box-sizing: border-box;">"#,
            r#"<section style="flex: 0 0 auto; margin-right: 10px; box-sizing: border-box;">"#,
            r#"<section style="width: 36px; height: 36px; border-radius: 50%; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); display: flex; align-items: center; justify-content: center; color: white; font-size: 14px; font-weight: bold; box-sizing: border-box;">{avatar}</section>"#,
            "</section>",
            r#"<section style="flex: 0 1 auto; max-width: 70%; box-sizing: border-box;">"#,
            r#"<section style="font-size: 12px; color: rgba(100, 100, 100, 0.7); margin: 0 0 4px 8px; {font} box-sizing: border-box;">{speaker}</section>"#,
            r#"<section style="padding: 10px 14px; background: #ffffff; border-radius: 8px; box-shadow: 0 2px 8px rgba(0, 0, 0, 0.08); position: relative; word-wrap: break-word; box-sizing: border-box;">"#,
            r#"<span style="font-size: 15px; color: #333; line-height: 1.6; {font}">{content}</span>"#,
            r#"<section style="position: absolute; left: -6px; top: 12px; width: 0; height: 0; border-right: 8px solid #ffffff; border-top: 6px solid transparent; border-bottom: 6px solid transparent; box-sizing: border-box;"></section>"#,
            "</section></section></section>"
        ),
        avatar = avatar,
        font = FONT,
        speaker = speaker,
        content = content,
    )
    .unwrap();
}

fn render_outgoing(message: &Message, out: &mut String) {
    let speaker = escape_html(&message.speaker);
    let avatar = escape_html(&avatar_letter(&message.speaker));
    let content = escape_html(&message.content);

    write!(
        out,
        concat!(
            r#"<section class="dialogue-message dialogue-right" style="display: flex; justify-content: flex-end; align-items: flex-start; margin: 12px 0; box-sizing: border-box;">"#,
            r#"<section style="flex: 0 1 auto; max-width: 70%; box-sizing: border-box;">"#,
            r#"<section style="font-size: 12px; color: rgba(100, 100, 100, 0.7); margin: 0 8px 4px 0; text-align: right; {font} box-sizing: border-box;">{speaker}</section>"#,
            r#"<section style="padding: 10px 14px; background: linear-gradient(135deg, #07C160 0%, #06AE56 100%); border-radius: 8px; box-shadow: 0 2px 8px rgba(7, 193, 96, 0.2); position: relative; word-wrap: break-word; box-sizing: border-box; margin-left: auto;">"#,
            r#"<span style="font-size: 15px; color: #fff; line-height: 1.6; {font}">{content}</span>"#,
            r#"<section style="position: absolute; right: -6px; top: 12px; width: 0; height: 0; border-left: 8px solid #07C160; border-top: 6px solid transparent; border-bottom: 6px solid transparent; box-sizing: border-box;"></section>"#,
            "</section></section>",
            r#"<section style="flex: 0 0 auto; margin-left: 10px; box-sizing: border-box;">"#,
            r#"<section style="width: 36px; height: 36px; border-radius: 50%; background: linear-gradient(135deg, #f093fb 0%, #f5576c 100%); display: flex; align-items: center; justify-content: center; color: white; font-size: 14px; font-weight: bold; box-sizing: border-box;">{avatar}</section>"#,
            "</section></section>"
        ),
        avatar = avatar,
        font = FONT,
        speaker = speaker,
        content = content,
    )
    .unwrap();
}
