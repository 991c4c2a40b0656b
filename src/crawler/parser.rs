//! Content extraction from page markup
//!
//! This module extracts from a page:
//! - The page title
//! - Anchor links (href values carrying a fragment)
//! - Normal links (`<a>` href values without a fragment)
//! - Anchor targets (`id` and `name` attribute values)
//!
//! Two extractors sit behind the [`ContentExtractor`] trait: a lightweight
//! pattern matcher (the default) and a structural parse built on `scraper`.
//! [`extract_page`] applies the shared cleanup (normalization, denylist,
//! absolute-link detection) on top of either one.

use crate::config::{ExtractorKind, RunSettings};
use crate::state::PageRecord;
use crate::url::absolutize_link;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));

static ANCHOR_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]*?#[^"]+?)""#).expect("valid anchor link regex"));

static NORMAL_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##"<a [^>]*?href="([^"#]+?)""##).expect("valid normal link regex"));

static TARGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\b(?:name|id)="([^"]*)""#).expect("valid target regex"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(amp|quot|apos|lt|gt|#[0-9]+|#[xX][0-9a-fA-F]+);").expect("valid entity regex")
});

/// Decodes the character references that show up in attribute values
///
/// Covers the named XML entities and numeric references; anything else is
/// left as written.
pub(crate) fn decode_entities(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }

    ENTITY_RE.replace_all(value, |caps: &Captures| {
        let entity = &caps[1];
        let decoded = match entity {
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "lt" => Some('<'),
            "gt" => Some('>'),
            _ => {
                let number = &entity[1..];
                let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => number.parse().ok(),
                };
                code.and_then(char::from_u32)
            }
        };

        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Links as authored in the markup, before any cleanup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLinks {
    pub anchor: Vec<String>,
    pub normal: Vec<String>,
}

/// Why a page could not be turned into a [`PageRecord`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no <title> element found")]
    MissingTitle,
}

/// Pulls title, links and anchor targets out of page markup
pub trait ContentExtractor: Send + Sync {
    /// Text of the first `<title>` element, trimmed
    fn title(&self, markup: &str) -> Option<String>;

    /// Anchor links and normal links in document order
    fn raw_links(&self, markup: &str) -> RawLinks;

    /// Every `id` and `name` attribute value
    fn anchor_targets(&self, markup: &str) -> HashSet<String>;
}

/// Regex-based extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl ContentExtractor for PatternExtractor {
    fn title(&self, markup: &str) -> Option<String> {
        TITLE_RE
            .captures(markup)
            .and_then(|caps| caps.get(1))
            .map(|m| decode_entities(m.as_str().trim()).into_owned())
    }

    fn raw_links(&self, markup: &str) -> RawLinks {
        let capture_all = |re: &Regex| -> Vec<String> {
            re.captures_iter(markup)
                .filter_map(|caps| caps.get(1))
                .map(|m| decode_entities(m.as_str()).into_owned())
                .collect()
        };

        RawLinks {
            anchor: capture_all(&ANCHOR_LINK_RE),
            normal: capture_all(&NORMAL_LINK_RE),
        }
    }

    fn anchor_targets(&self, markup: &str) -> HashSet<String> {
        TARGET_RE
            .captures_iter(markup)
            .filter_map(|caps| caps.get(1))
            .map(|m| decode_entities(m.as_str()).into_owned())
            .collect()
    }
}

/// Structural extractor built on an HTML parse
///
/// Tolerates single-quoted and unquoted attributes, which the pattern
/// extractor does not see.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomExtractor;

impl ContentExtractor for DomExtractor {
    fn title(&self, markup: &str) -> Option<String> {
        let document = Html::parse_document(markup);
        let title_selector = Selector::parse("title").ok()?;

        document
            .select(&title_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
    }

    fn raw_links(&self, markup: &str) -> RawLinks {
        let document = Html::parse_document(markup);
        let mut links = RawLinks::default();

        if let Ok(href_selector) = Selector::parse("[href]") {
            for element in document.select(&href_selector) {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };

                match href.find('#') {
                    Some(pos) if pos + 1 < href.len() => links.anchor.push(href.to_string()),
                    Some(_) => {}
                    None if element.value().name() == "a" && !href.is_empty() => {
                        links.normal.push(href.to_string())
                    }
                    None => {}
                }
            }
        }

        links
    }

    fn anchor_targets(&self, markup: &str) -> HashSet<String> {
        let document = Html::parse_document(markup);
        let mut targets = HashSet::new();

        if let Ok(selector) = Selector::parse("[id], [name]") {
            for element in document.select(&selector) {
                for attr in ["id", "name"] {
                    if let Some(value) = element.value().attr(attr) {
                        targets.insert(value.to_string());
                    }
                }
            }
        }

        targets
    }
}

/// Returns the extractor selected in the configuration
pub fn extractor_for(kind: ExtractorKind) -> Box<dyn ContentExtractor> {
    match kind {
        ExtractorKind::Pattern => Box::new(PatternExtractor),
        ExtractorKind::Dom => Box::new(DomExtractor),
    }
}

/// Extracts a cleaned-up [`PageRecord`] from page markup
///
/// # Cleanup Rules
///
/// - Both link kinds are absolutized against the page URL and the domain
/// - Anchor links matching the anchor denylist are dropped
/// - Kept anchor links authored as absolute URLs inside the domain are
///   recorded in `absolute_links`
///
/// This is a pure function of its inputs: the same markup, URL and settings
/// always give the same record.
///
/// # Errors
///
/// * `ExtractError::MissingTitle` - The markup has no `<title>` element
pub fn extract_page(
    extractor: &dyn ContentExtractor,
    markup: &str,
    page_url: &str,
    settings: &RunSettings,
) -> Result<PageRecord, ExtractError> {
    let title = extractor.title(markup).ok_or(ExtractError::MissingTitle)?;
    let raw = extractor.raw_links(markup);
    let domain = settings.scope.domain();

    let mut anchor_links = Vec::with_capacity(raw.anchor.len());
    let mut absolute_links = Vec::new();
    for authored in &raw.anchor {
        let link = absolutize_link(authored, page_url, domain);
        if settings.anchor_denylist.matches(&link) {
            tracing::trace!("Denylisted anchor link on {}: {}", page_url, link);
            continue;
        }

        if authored.starts_with(domain) {
            absolute_links.push(link.clone());
        }
        anchor_links.push(link);
    }

    let normal_links = raw
        .normal
        .iter()
        .map(|authored| absolutize_link(authored, page_url, domain))
        .collect();

    Ok(PageRecord {
        url: page_url.to_string(),
        title,
        anchor_links,
        normal_links,
        anchor_targets: extractor.anchor_targets(markup),
        absolute_links,
    })
}
