use crate::models::session::ContentSource;

/// Result of asking the model for a structured object.
///
/// `Fallback` carries fixed placeholder content plus the reason the model's
/// reply was not usable. Both variants hold a `T` so the pipeline can keep
/// going; callers that care whether the content is real check `source()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Structured<T> {
    Parsed(T),
    Fallback { value: T, reason: String },
}

impl<T> Structured<T> {
    pub fn source(&self) -> ContentSource {
        match self {
            Structured::Parsed(_) => ContentSource::Model,
            Structured::Fallback { .. } => ContentSource::Fallback,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Structured::Fallback { .. })
    }

    /// Why the model's reply was replaced, if it was.
    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Structured::Parsed(_) => None,
            Structured::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Structured::Parsed(value) | Structured::Fallback { value, .. } => value,
        }
    }

    pub fn into_parts(self) -> (T, ContentSource) {
        let source = self.source();
        match self {
            Structured::Parsed(value) | Structured::Fallback { value, .. } => (value, source),
        }
    }
}

/// First `max_chars` characters of `text`. Counts chars, not bytes.
pub fn prefix_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_reports_model_source() {
        let outcome = Structured::Parsed(7);
        assert_eq!(outcome.source(), ContentSource::Model);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.fallback_reason(), None);
        assert_eq!(outcome.into_parts(), (7, ContentSource::Model));
    }

    #[test]
    fn test_fallback_reports_fallback_source() {
        let outcome = Structured::Fallback {
            value: "placeholder",
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert!(outcome.is_degraded());
        assert_eq!(
            outcome.fallback_reason(),
            Some("expected value at line 1 column 1")
        );
        assert_eq!(*outcome.value(), "placeholder");
        assert_eq!(outcome.into_parts().1, ContentSource::Fallback);
    }

    #[test]
    fn test_prefix_chars_respects_char_boundaries() {
        assert_eq!(prefix_chars("héllo", 2), "hé");
        assert_eq!(prefix_chars("short", 100), "short");
        assert_eq!(prefix_chars("", 3), "");
    }
}
