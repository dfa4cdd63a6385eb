use tracing::warn;
use url::Url;

use qxweb_core::routes::COMPARE_PATH;

/// URL query parameter carrying the selection on the comparison page.
pub const QUERY_PARAM: &str = "companies";

/// Build an absolute sharing link for the given ordered id list, or an
/// empty string when nothing is selected.
pub fn sharing_link(origin: &Url, ids: &[&str]) -> String {
    if ids.is_empty() {
        return String::new();
    }
    let mut link = origin.clone();
    link.set_path(COMPARE_PATH);
    link.set_query(Some(&format!("{QUERY_PARAM}={}", ids.join(","))));
    link.to_string()
}

/// Split a comma-joined parameter value into ids, dropping empty
/// segments (`"a,,b"` and `"a, b"` both yield two ids).
pub fn split_ids(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract the ordered id list from a full sharing link. Malformed links
/// yield an empty list rather than an error.
pub fn ids_from_url(link: &str) -> Vec<String> {
    let parsed = match Url::parse(link) {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, "unparseable sharing link");
            return Vec::new();
        }
    };
    parsed
        .query_pairs()
        .find(|(key, _)| key == QUERY_PARAM)
        .map(|(_, value)| split_ids(&value))
        .unwrap_or_default()
}
