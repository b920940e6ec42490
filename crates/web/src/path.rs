//! Path patterns and the parameters they capture.
//!
//! A pattern is a `/`-separated list of segments, each either a literal or a named
//! parameter written `:name`. Matching is anchored at the start of the path and always
//! ends on a segment boundary, so `/a` matches `/a` and `/a/b` but never `/ab`.
//!
//! Whatever the pattern did not consume is the remainder. A remainder of exactly `/` is
//! treated as empty, which makes `/foo/` and `/foo` behave the same for nested chains.

use crate::RouteError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path pattern such as `/users/:id/posts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compiles a pattern. Empty segments are ignored, so `""`, `"/"` and `"//"` all
    /// compile to the root pattern that matches every path.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] for a `:` without a name or a parameter name
    /// used twice.
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let mut segments = Vec::new();

        for segment in pattern.split('/').filter(|s| !s.is_empty()) {
            let Some(name) = segment.strip_prefix(':') else {
                segments.push(Segment::Literal(segment.to_string()));
                continue;
            };

            if name.is_empty() {
                return Err(RouteError::invalid_pattern(pattern, "parameter without a name"));
            }
            if segments.iter().any(|s| matches!(s, Segment::Param(existing) if existing == name)) {
                return Err(RouteError::invalid_pattern(pattern, format!("parameter :{name} used twice")));
            }
            segments.push(Segment::Param(name.to_string()));
        }

        Ok(Self { raw: pattern.to_string(), segments })
    }

    /// The pattern as it was registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this pattern matches every path without consuming anything.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Matches `path` against this pattern, allowing a remainder.
    pub fn matches<'a, 'p>(&'a self, path: &'p str) -> Option<PathMatch<'a, 'p>> {
        let mut rest = path.strip_prefix('/').unwrap_or(path);
        let mut params = Vec::new();

        for segment in &self.segments {
            let (component, tail) = rest.split_once('/').unwrap_or((rest, ""));
            if component.is_empty() {
                return None;
            }

            match segment {
                Segment::Literal(literal) if literal == component => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.push((name.as_str(), component)),
            }
            rest = tail;
        }

        let matched = path[..path.len() - rest.len()].trim_end_matches('/');
        let remainder = if rest == "/" { "" } else { rest };
        Some(PathMatch { matched, remainder, params })
    }
}

/// The outcome of a successful [`PathPattern::matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch<'a, 'p> {
    matched: &'p str,
    remainder: &'p str,
    params: Vec<(&'a str, &'p str)>,
}

impl<'a, 'p> PathMatch<'a, 'p> {
    /// The consumed prefix of the path, without a trailing slash.
    pub fn matched(&self) -> &'p str {
        self.matched
    }

    /// What is left of the path, without its leading slash. Empty when the whole path
    /// was consumed.
    pub fn remainder(&self) -> &'p str {
        self.remainder
    }

    #[inline]
    pub fn is_exact(&self) -> bool {
        self.remainder.is_empty()
    }

    pub fn params(&self) -> &[(&'a str, &'p str)] {
        &self.params
    }
}

/// Path parameters captured along the route of a request.
///
/// Parameters captured by enclosing chains come first. When a nested pattern reuses a
/// name, [`PathParams::get`] returns the innermost value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.params.iter().rev().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub(crate) fn extend_from(&mut self, matched: &PathMatch<'_, '_>) {
        self.params.extend(matched.params().iter().map(|(name, value)| ((*name).to_string(), (*value).to_string())));
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self { params: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}
