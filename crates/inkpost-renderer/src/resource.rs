//! Resource path resolution for local image references.

/// Resolves local resource references (e.g. `assets/cat.png`) to URLs.
///
/// Implemented for closures, so hosts can pass a lookup function directly:
///
/// ```
/// use inkpost_renderer::ResourceResolver;
///
/// let resolver = |reference: &str| Some(format!("app://vault/{reference}"));
/// assert_eq!(resolver.resolve("cat.png").as_deref(), Some("app://vault/cat.png"));
/// ```
pub trait ResourceResolver: Send + Sync {
    /// Resolve a reference, or `None` to keep it as written.
    fn resolve(&self, reference: &str) -> Option<String>;
}

impl<F> ResourceResolver for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn resolve(&self, reference: &str) -> Option<String> {
        self(reference)
    }
}

/// Resolver that leaves every reference unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeepReferences;

impl ResourceResolver for KeepReferences {
    fn resolve(&self, _reference: &str) -> Option<String> {
        None
    }
}

/// Check whether an image source already is a fetchable URL.
pub(crate) fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://") || src.starts_with("data:")
}

/// Strip a trailing size suffix (`|200`, `|200x150`, `|50%`) from an image source.
pub(crate) fn strip_size_suffix(src: &str) -> &str {
    let Some((path, size)) = src.rsplit_once('|') else {
        return src;
    };
    if path.is_empty() || !is_size_suffix(size) {
        return src;
    }
    path
}

/// Check for an image size parameter: `200`, `200x150` or `50%`.
pub(crate) fn is_size_suffix(size: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    if let Some(percent) = size.strip_suffix('%') {
        return all_digits(percent);
    }
    match size.split_once('x') {
        Some((width, height)) => all_digits(width) && all_digits(height),
        None => all_digits(size),
    }
}
