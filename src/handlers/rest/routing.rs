const COLLECTION: &str = "notes";

/// What a request path refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<'a> {
    /// `/` or `/notes`
    Collection,
    /// `/notes/{id}`
    Item(&'a str),
}

impl<'a> Target<'a> {
    /// Classifies `path`, ignoring empty segments. `None` for any other shape.
    pub fn parse(path: &'a str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | [COLLECTION] => Some(Self::Collection),
            [COLLECTION, id] => Some(Self::Item(*id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_paths() {
        assert_eq!(Target::parse("/"), Some(Target::Collection));
        assert_eq!(Target::parse(""), Some(Target::Collection));
        assert_eq!(Target::parse("/notes"), Some(Target::Collection));
        assert_eq!(Target::parse("/notes/"), Some(Target::Collection));
        assert_eq!(Target::parse("//notes//"), Some(Target::Collection));
    }

    #[test]
    fn test_item_paths() {
        assert_eq!(Target::parse("/notes/abc"), Some(Target::Item("abc")));
        assert_eq!(Target::parse("/notes//abc/"), Some(Target::Item("abc")));
    }

    #[test]
    fn test_encoded_separator_stays_in_id() {
        assert_eq!(Target::parse("/notes/a%2Fb"), Some(Target::Item("a%2Fb")));
        assert_eq!(Target::parse("/notes/a%20b"), Some(Target::Item("a%20b")));
    }

    #[test]
    fn test_unknown_paths() {
        assert_eq!(Target::parse("/unknown"), None);
        assert_eq!(Target::parse("/unknown/path"), None);
        assert_eq!(Target::parse("/notes/abc/extra"), None);
        assert_eq!(Target::parse("/Notes"), None);
    }
}
