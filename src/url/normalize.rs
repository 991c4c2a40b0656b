use url::Url;

/// Turns a link as authored in a page into the form the validator works with
///
/// # Normalization Rules
///
/// 1. Fragment-only links (`#id`) are kept as they are (in-page anchors)
/// 2. Links with a scheme (`https:`, `mailto:`, ...) are kept as they are
/// 3. Protocol-relative links (`//host/x`) get the domain's protocol
/// 4. Domain-relative links (`/x`) are prefixed with the domain
/// 5. Any other relative reference (`../x`, `x.html#y`) is resolved against
///    the page URL, with a trailing slash ensured on the page URL first
///
/// # Examples
///
/// ```
/// use anchor_watch::url::absolutize_link;
///
/// let domain = "https://docs.example.org";
/// let page = "https://docs.example.org/guide/intro";
///
/// assert_eq!(absolutize_link("/api", page, domain), "https://docs.example.org/api");
/// assert_eq!(absolutize_link("../setup#install", page, domain), "https://docs.example.org/guide/setup#install");
/// assert_eq!(absolutize_link("#top", page, domain), "#top");
/// ```
pub fn absolutize_link(link: &str, page_url: &str, domain: &str) -> String {
    if link.starts_with('#') || has_scheme(link) {
        return link.to_string();
    }

    if let Some(rest) = link.strip_prefix("//") {
        let protocol = if domain.starts_with("http://") {
            "http"
        } else {
            "https"
        };
        return format!("{}://{}", protocol, rest);
    }

    if link.starts_with('/') {
        return format!("{}{}", domain, link);
    }

    let base = if page_url.ends_with('/') {
        page_url.to_string()
    } else {
        format!("{}/", page_url)
    };

    match Url::parse(&base).and_then(|base_url| base_url.join(link)) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            tracing::debug!("Cannot resolve {} against {}: {}", link, base, e);
            format!("{}{}", base, link)
        }
    }
}

/// Splits a link at its first `#` into the base URL and the fragment
///
/// The fragment is returned without the `#`. Links without a fragment yield
/// an empty fragment.
pub fn split_fragment(link: &str) -> (&str, &str) {
    match link.split_once('#') {
        Some((base, fragment)) => (base, fragment),
        None => (link, ""),
    }
}

/// Returns true if the link starts with a URI scheme such as `https:` or `mailto:`
fn has_scheme(link: &str) -> bool {
    let Some(colon) = link.find(':') else {
        return false;
    };
    let scheme = &link[..colon];

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
}
