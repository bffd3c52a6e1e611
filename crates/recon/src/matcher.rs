/// Wildcard search over displayed result values.
///
/// Grammar, case-insensitive on both sides:
/// `*text*` contains, `*text` ends with, `text*` starts with, `text` exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPattern {
    Contains(String),
    EndsWith(String),
    StartsWith(String),
    Exact(String),
}

impl SearchPattern {
    pub fn parse(pattern: &str) -> Self {
        let lower = pattern.to_lowercase();
        if lower.len() >= 2 && lower.starts_with('*') && lower.ends_with('*') {
            return Self::Contains(lower[1..lower.len() - 1].to_string());
        }
        if let Some(rest) = lower.strip_prefix('*') {
            return Self::EndsWith(rest.to_string());
        }
        if let Some(rest) = lower.strip_suffix('*') {
            return Self::StartsWith(rest.to_string());
        }
        Self::Exact(lower)
    }

    pub fn is_match(&self, value: &str) -> bool {
        let value = value.to_lowercase();
        match self {
            Self::Contains(text) => value.contains(text.as_str()),
            Self::EndsWith(text) => value.ends_with(text.as_str()),
            Self::StartsWith(text) => value.starts_with(text.as_str()),
            Self::Exact(text) => value == *text,
        }
    }

    /// True if any value of the row satisfies the pattern.
    pub fn matches_row<S: AsRef<str>>(&self, row_values: &[S]) -> bool {
        row_values.iter().any(|v| self.is_match(v.as_ref()))
    }
}

/// True if any of `row_values` matches `pattern`.
///
/// An empty pattern means "no filtering"; that is the caller's decision,
/// here it is just an exact match against "".
pub fn matches<S: AsRef<str>>(row_values: &[S], pattern: &str) -> bool {
    SearchPattern::parse(pattern).matches_row(row_values)
}
