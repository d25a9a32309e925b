//! Error types for the rendering pipeline.
//!
//! None of these escape [`Pipeline::render`](crate::Pipeline::render): the
//! postprocess stages log them and leave the affected block unresolved.

/// Error raised while resolving a deferred directive body.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The nested render of a directive body failed.
    #[error("nested render of {kind} body failed: {message}")]
    Nested {
        /// Directive kind whose body was being rendered (e.g. "gallery").
        kind: &'static str,
        /// Failure description from the nested renderer.
        message: String,
    },

    /// A sentinel start marker has no matching end marker.
    #[error("unterminated {kind} sentinel at byte {offset}")]
    UnterminatedSentinel {
        /// Directive kind of the sentinel.
        kind: &'static str,
        /// Byte offset of the start marker in the rendered markup.
        offset: usize,
    },
}

impl RenderError {
    /// Create a nested render error for the given directive kind.
    #[must_use]
    pub fn nested(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Nested {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_display() {
        let err = RenderError::nested("gallery", "boom");
        assert_eq!(err.to_string(), "nested render of gallery body failed: boom");
    }

    #[test]
    fn test_unterminated_display() {
        let err = RenderError::UnterminatedSentinel {
            kind: "longimage",
            offset: 42,
        };
        assert_eq!(err.to_string(), "unterminated longimage sentinel at byte 42");
    }
}
