use crate::UrlError;
use url::Url;

/// Suffix appended to the host label to form the clone's root folder
const FOLDER_SUFFIX: &str = "-clone";

/// Derives the clone's root folder name from the seed URL
///
/// The host is lowercased, a leading `www.` is stripped, and the first
/// dot-delimited label gets `-clone` appended. The result is the same for
/// every page of one job and for repeated runs against the same seed.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_clone::url::folder_name;
///
/// let url = Url::parse("https://www.example.com/about").unwrap();
/// assert_eq!(folder_name(&url).unwrap(), "example-clone");
/// ```
pub fn folder_name(seed: &Url) -> Result<String, UrlError> {
    let host = seed
        .host_str()
        .map(|h| h.to_lowercase())
        .ok_or(UrlError::MissingHost)?;

    let host = host.strip_prefix("www.").unwrap_or(&host);
    let label = host.split('.').next().unwrap_or(host);

    if label.is_empty() {
        return Err(UrlError::MissingHost);
    }

    Ok(format!("{}{}", label, FOLDER_SUFFIX))
}
