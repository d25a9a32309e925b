//! Tokens produced by extension tokenizers.

/// One dialogue line: `speaker: content`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Speaker label, trimmed and non-empty.
    pub speaker: String,
    /// Message text, trimmed and non-empty. Displayed literally.
    pub content: String,
}

/// A `:::dialogue` block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogueToken {
    /// Exact consumed source span.
    pub raw: String,
    pub title: Option<String>,
    /// Messages in source order; position parity drives alternation.
    pub messages: Vec<Message>,
}

/// A `:::gallery` or `:::longimage` block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBlockToken {
    /// Exact consumed source span.
    pub raw: String,
    pub title: Option<String>,
    /// Unparsed markdown body, rendered during postprocess.
    pub body: String,
}

/// A `:::seqtitle<seq>$<title>:::` banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeqTitleToken {
    /// Exact consumed source span.
    pub raw: String,
    /// Ordinal label, trimmed and non-empty.
    pub seq: String,
    /// Banner title, trimmed and non-empty.
    pub title: String,
}

/// An inline link collected by the baseline renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkToken {
    /// Link target as written.
    pub href: String,
    /// Plain text of the label.
    pub text: String,
    /// Rendered markup of the label.
    pub content: String,
}

/// Token handed from a tokenizer to a renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Dialogue(DialogueToken),
    Gallery(ImageBlockToken),
    LongImage(ImageBlockToken),
    SeqTitle(SeqTitleToken),
    Link(LinkToken),
}

impl Token {
    /// Exact source span consumed by a block token.
    ///
    /// Link tokens come from the baseline parser and carry no span.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Dialogue(token) => Some(&token.raw),
            Self::Gallery(token) | Self::LongImage(token) => Some(&token.raw),
            Self::SeqTitle(token) => Some(&token.raw),
            Self::Link(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_of_block_tokens() {
        let token = Token::SeqTitle(SeqTitleToken {
            raw: ":::seqtitle 01$Intro:::".to_owned(),
            seq: "01".to_owned(),
            title: "Intro".to_owned(),
        });
        assert_eq!(token.raw(), Some(":::seqtitle 01$Intro:::"));
    }

    #[test]
    fn test_link_has_no_raw() {
        let token = Token::Link(LinkToken {
            href: "https://example.com".to_owned(),
            text: "example".to_owned(),
            content: "example".to_owned(),
        });
        assert_eq!(token.raw(), None);
    }
}
