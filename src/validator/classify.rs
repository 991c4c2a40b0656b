use crate::url::{split_fragment, Scope};

/// Where an anchor link points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorClass<'a> {
    /// `#id` on the same page
    InPage { fragment: &'a str },

    /// A page inside the scope
    Internal { base: &'a str, fragment: &'a str },

    /// Anything else
    External { base: &'a str, fragment: &'a str },
}

/// Classifies an anchor link relative to the scope
///
/// In-page links start with `#`. Internal links start with the scope path
/// (domain plus folder). Everything else is external, including links to the
/// same domain outside the folder.
pub fn classify_anchor<'a>(link: &'a str, scope: &Scope) -> AnchorClass<'a> {
    if let Some(fragment) = link.strip_prefix('#') {
        return AnchorClass::InPage { fragment };
    }

    let (base, fragment) = split_fragment(link);
    if scope.contains(link) {
        AnchorClass::Internal { base, fragment }
    } else {
        AnchorClass::External { base, fragment }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Scope {
        Scope::new("docs.example.org", "guide").unwrap()
    }

    #[test]
    fn test_in_page() {
        assert_eq!(
            classify_anchor("#sec1", &scope()),
            AnchorClass::InPage { fragment: "sec1" }
        );
    }

    #[test]
    fn test_internal() {
        assert_eq!(
            classify_anchor("https://docs.example.org/guide/b#missing", &scope()),
            AnchorClass::Internal {
                base: "https://docs.example.org/guide/b",
                fragment: "missing"
            }
        );
    }

    #[test]
    fn test_same_domain_outside_folder_is_external() {
        assert!(matches!(
            classify_anchor("https://docs.example.org/blog/post#c", &scope()),
            AnchorClass::External { .. }
        ));
    }

    #[test]
    fn test_external() {
        assert_eq!(
            classify_anchor("https://other.org/x#y", &scope()),
            AnchorClass::External {
                base: "https://other.org/x",
                fragment: "y"
            }
        );
    }

    #[test]
    fn test_split_at_first_hash() {
        assert_eq!(
            classify_anchor("https://other.org/x#y#z", &scope()),
            AnchorClass::External {
                base: "https://other.org/x",
                fragment: "y#z"
            }
        );
    }
}
