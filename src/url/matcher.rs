use crate::config::LinkPattern;
use crate::ConfigError;
use regex::Regex;

/// A single compiled denylist rule
#[derive(Debug, Clone)]
enum Rule {
    Prefix(String),
    Contains(String),
    Regex(Regex),
}

impl Rule {
    fn matches(&self, link: &str) -> bool {
        match self {
            Self::Prefix(prefix) => link.starts_with(prefix.as_str()),
            Self::Contains(needle) => link.contains(needle.as_str()),
            Self::Regex(re) => re.is_match(link),
        }
    }
}

/// A compiled set of link patterns that are excluded from validation
///
/// A link is denied if it is longer than the configured maximum length or if
/// any of the patterns matches it.
///
/// # Examples
///
/// ```
/// use anchor_watch::config::LinkPattern;
/// use anchor_watch::url::Denylist;
///
/// let denylist = Denylist::compile(
///     &[
///         LinkPattern::Prefix("mailto:".to_string()),
///         LinkPattern::Regex(r"woff2?$".to_string()),
///     ],
///     None,
/// )
/// .unwrap();
///
/// assert!(denylist.matches("mailto:docs@example.org"));
/// assert!(denylist.matches("https://fonts.example.net/a.woff2"));
/// assert!(!denylist.matches("https://docs.example.org/a"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Denylist {
    rules: Vec<Rule>,
    max_length: Option<usize>,
}

impl Denylist {
    /// Compiles configured patterns into a denylist
    ///
    /// # Returns
    ///
    /// * `Ok(Denylist)` - All patterns compiled
    /// * `Err(ConfigError::InvalidPattern)` - A regex pattern failed to compile
    pub fn compile(patterns: &[LinkPattern], max_length: Option<usize>) -> Result<Self, ConfigError> {
        let rules = patterns
            .iter()
            .map(|pattern| match pattern {
                LinkPattern::Prefix(p) => Ok(Rule::Prefix(p.clone())),
                LinkPattern::Contains(c) => Ok(Rule::Contains(c.clone())),
                LinkPattern::Regex(r) => Regex::new(r)
                    .map(Rule::Regex)
                    .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", r, e))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules, max_length })
    }

    /// Returns true if the link must be left out of validation
    pub fn matches(&self, link: &str) -> bool {
        if self.max_length.is_some_and(|max| link.len() > max) {
            return true;
        }
        self.rules.iter().any(|rule| rule.matches(link))
    }

    /// Number of pattern rules (the length limit is not counted)
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no pattern rules and no length limit
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.max_length.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DenylistConfig;

    #[test]
    fn test_prefix_match() {
        let denylist =
            Denylist::compile(&[LinkPattern::Prefix("https://app.diagrams.net".into())], None)
                .unwrap();
        assert!(denylist.matches("https://app.diagrams.net/#Hsome%2Fdiagram"));
        assert!(!denylist.matches("https://docs.example.org/app.diagrams.net"));
    }

    #[test]
    fn test_contains_match() {
        let denylist =
            Denylist::compile(&[LinkPattern::Contains("/misc/satisfaction-levels".into())], None)
                .unwrap();
        assert!(denylist.matches("https://docs.example.org/misc/satisfaction-levels#high"));
        assert!(!denylist.matches("https://docs.example.org/misc/other#high"));
    }

    #[test]
    fn test_length_limit() {
        let denylist = Denylist::compile(&[], Some(2048)).unwrap();
        let long = format!("https://viewer.example.net/#{}", "a".repeat(2100));
        assert!(denylist.matches(&long));
        assert!(!denylist.matches("https://docs.example.org/a#b"));
    }

    #[test]
    fn test_invalid_regex() {
        let result = Denylist::compile(&[LinkPattern::Regex("(unclosed".into())], None);
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_empty_denylist_matches_nothing() {
        let denylist = Denylist::default();
        assert!(denylist.is_empty());
        assert!(!denylist.matches("mailto:x@example.org"));
    }

    #[test]
    fn test_default_normal_denylist() {
        let config = DenylistConfig::default();
        let denylist = Denylist::compile(&config.normal_links, None).unwrap();

        assert!(denylist.matches("mailto:docs@example.org"));
        assert!(denylist.matches("http://localhost:3000/app"));
        assert!(denylist.matches("https://127.0.0.1/x"));
        assert!(denylist.matches("https://fonts.cdnfonts.com/css/inter"));
        assert!(denylist.matches("https://docs.example.org/fonts/inter.woff2"));
        assert!(denylist.matches("https://api.example.net/users/%7Bid%7D"));
        assert!(denylist.matches("https://example.com/"));
        assert!(denylist.matches("https://www.example.org/page"));
        assert!(denylist.matches("https://twitter.com/someone"));

        // Only the reserved placeholder hosts are denied, not real subdomains
        assert!(!denylist.matches("https://docs.example.org/missing-page"));
        assert!(!denylist.matches("https://github.com/rust-lang/rust"));
    }

    #[test]
    fn test_default_anchor_denylist() {
        let config = DenylistConfig::default();
        let denylist =
            Denylist::compile(&config.anchor_links, Some(config.max_anchor_link_length)).unwrap();

        assert!(denylist.matches("https://viewer.diagrams.net/#R7V1bc"));
        assert!(denylist.matches("https://app.getpostman.com/run-collection/123#abc"));
        assert!(denylist.matches("https://learning.postman.com/docs/#intro"));
        assert!(!denylist.matches("https://docs.example.org/b#sec"));
    }
}
