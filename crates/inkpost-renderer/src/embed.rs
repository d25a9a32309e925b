//! Obsidian-style image embeds.
//!
//! `![[cat.png]]`, `![[cat.png|A cat]]` and `![[cat.png|200x150]]` are
//! rewritten to standard image syntax before parsing. Embeds inside code
//! blocks are left alone.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::resource::is_size_suffix;
use crate::scan::{BlockContext, LineKind};

static EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[\[([^\]|\n]+)(?:\|([^\]\n]*))?\]\]").expect("valid embed regex")
});

/// Rewrite image embeds in `source` to `![alt](<target>)`.
pub(crate) fn rewrite_embeds(source: &str) -> Cow<'_, str> {
    if !source.contains("![[") {
        return Cow::Borrowed(source);
    }

    let mut result = String::with_capacity(source.len());
    let mut structure = BlockContext::new();

    for line in source.split_inclusive('\n') {
        if structure.classify(line) == LineKind::Code {
            result.push_str(line);
        } else {
            result.push_str(&EMBED.replace_all(line, replace_embed));
        }
    }

    Cow::Owned(result)
}

fn replace_embed(caps: &Captures<'_>) -> String {
    let target = caps[1].trim();
    match caps.get(2).map(|m| m.as_str().trim()) {
        Some(param) if is_size_suffix(param) => format!("![](<{target}|{param}>)"),
        Some(alt) => format!("![{alt}](<{target}>)"),
        None => format!("![](<{target}>)"),
    }
}
