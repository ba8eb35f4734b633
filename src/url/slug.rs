use std::collections::HashSet;
use url::Url;

/// Slug used for the root page and host-like segments
pub const INDEX_SLUG: &str = "index";

/// Derives a page slug from the last non-empty segment of the URL path
///
/// Falls back to `index` when the path is empty or `/`, or when the segment
/// begins with `www`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_clone::url::slug_for;
///
/// assert_eq!(slug_for(&Url::parse("https://example.com/").unwrap()), "index");
/// assert_eq!(slug_for(&Url::parse("https://example.com/docs/intro/").unwrap()), "intro");
/// ```
pub fn slug_for(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("");

    if segment.is_empty() || segment.starts_with("www") {
        INDEX_SLUG.to_string()
    } else {
        segment.to_string()
    }
}

/// Suffix separating a page's inline-style files from its linked stylesheets
const INLINE_SUFFIX: &str = "-inline";

/// Hands out unique slugs within one job
///
/// The first page to claim a slug keeps it; later claims get `-2`, `-3`, ...
/// appended. Besides exact matches, a slug clashes with another one that
/// differs only by a trailing `-inline`: `news` names its inline styles
/// `css/news-inline-style{n}.css`, the same files `news-inline` would use for
/// its linked stylesheets.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    claimed: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slug for `url`, disambiguating on collision
    pub fn claim(&mut self, url: &Url) -> String {
        let base = slug_for(url);
        let mut candidate = base.clone();
        let mut count = 1;

        while self.clashes(&candidate) {
            count += 1;
            candidate = format!("{}-{}", base, count);
        }

        self.claimed.insert(candidate.clone());
        candidate
    }

    /// Returns true if pages named `candidate` and an already claimed slug
    /// would produce a common output path
    fn clashes(&self, candidate: &str) -> bool {
        self.claimed.contains(candidate)
            || candidate
                .strip_suffix(INLINE_SUFFIX)
                .is_some_and(|stem| self.claimed.contains(stem))
            || self
                .claimed
                .contains(&format!("{}{}", candidate, INLINE_SUFFIX))
    }
}
