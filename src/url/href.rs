use crate::UrlError;
use url::Url;

/// Classification of an anchor `href` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrefKind {
    /// Missing or blank
    Empty,
    /// Relative reference into the same site
    Internal,
    /// Carries its own scheme or is protocol-relative (`//host/...`)
    Absolute,
    /// `mailto:` link
    Mailto,
    /// `tel:` link
    Tel,
}

impl HrefKind {
    /// Returns true if the link points into the cloned site
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Classifies an anchor `href`
///
/// # Examples
///
/// ```
/// use site_clone::url::{classify_href, HrefKind};
///
/// assert_eq!(classify_href("/about"), HrefKind::Internal);
/// assert_eq!(classify_href("https://other.com/"), HrefKind::Absolute);
/// assert_eq!(classify_href("mailto:a@b.com"), HrefKind::Mailto);
/// ```
pub fn classify_href(href: &str) -> HrefKind {
    let href = href.trim();

    if href.is_empty() {
        return HrefKind::Empty;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("mailto:") {
        return HrefKind::Mailto;
    }
    if lower.starts_with("tel:") {
        return HrefKind::Tel;
    }
    if href.starts_with("//") || Url::parse(href).is_ok() {
        return HrefKind::Absolute;
    }

    HrefKind::Internal
}

/// Strips one leading `/` from an internal href
pub fn strip_leading_slash(href: &str) -> &str {
    href.strip_prefix('/').unwrap_or(href)
}

/// Computes the local navigation target for an anchor `href`
///
/// Returns `None` for hrefs that are left alone (empty, absolute, `mailto:`,
/// `tel:`). `/` maps to `/{folder}/index.html`; anything else has one leading
/// `/` stripped, `.html` appended unless already present, and is placed under
/// `/{folder}/`.
///
/// Paths that already carry another extension, or a query or fragment, go
/// through the same rule unchanged (`/feed.xml` becomes `/{folder}/feed.xml.html`).
pub fn local_nav_href(href: &str, folder: &str) -> Option<String> {
    let href = href.trim();

    if !classify_href(href).is_internal() {
        return None;
    }

    if href == "/" {
        return Some(format!("/{}/index.html", folder));
    }

    let path = strip_leading_slash(href);
    if path.ends_with(".html") {
        Some(format!("/{}/{}", folder, path))
    } else {
        Some(format!("/{}/{}.html", folder, path))
    }
}

/// Resolves a resource or link reference against the page that declared it
///
/// Handles relative paths, absolute paths, protocol-relative references, and
/// already absolute URLs. Only HTTP(S) results are accepted.
pub fn resolve_url(base: &Url, reference: &str) -> Result<Url, UrlError> {
    let resolved = base
        .join(reference.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))?;

    match resolved.scheme() {
        "http" | "https" => Ok(resolved),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}
