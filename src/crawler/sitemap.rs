//! Sitemap `<loc>` parsing

use crate::crawler::parser::decode_entities;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static LOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<loc>(.*?)</loc>").expect("valid loc regex"));

/// Returns the sitemap URLs that fall inside the scope path
///
/// Entries are trimmed and entity references such as `&amp;` are decoded. The result keeps sitemap
/// order and contains each URL once.
///
/// # Example
///
/// ```
/// use anchor_watch::crawler::parse_sitemap_locs;
///
/// let xml = "<urlset><url><loc>https://docs.example.org/a</loc></url>\
///            <url><loc>https://blog.example.org/b</loc></url></urlset>";
/// let urls = parse_sitemap_locs(xml, "https://docs.example.org");
/// assert_eq!(urls, vec!["https://docs.example.org/a".to_string()]);
/// ```
pub fn parse_sitemap_locs(xml: &str, scope_path: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    LOC_RE
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str().trim()).into_owned())
        .filter(|loc| loc.starts_with(scope_path))
        .filter(|loc| seen.insert(loc.clone()))
        .collect()
}
