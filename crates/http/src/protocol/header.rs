//! Ordered, case-insensitive header storage.
//!
//! Header names are stored in their canonical upper-case form. A header keeps a single
//! value until a continuation line or a repeated name adds another one, at which point it
//! is promoted to an ordered list.

use std::slice;

/// The value(s) recorded for one header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValues {
    Single(String),
    Multi(Vec<String>),
}

impl HeaderValues {
    /// Appends a value, promoting a single value to a list.
    pub fn push(&mut self, value: String) {
        match self {
            HeaderValues::Single(first) => {
                let first = std::mem::take(first);
                *self = HeaderValues::Multi(vec![first, value]);
            }
            HeaderValues::Multi(values) => values.push(value),
        }
    }

    /// Returns the first recorded value.
    pub fn first(&self) -> &str {
        match self {
            HeaderValues::Single(value) => value,
            HeaderValues::Multi(values) => values.first().map_or("", String::as_str),
        }
    }

    /// Returns the value if exactly one was recorded.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            HeaderValues::Single(value) => Some(value),
            HeaderValues::Multi(_) => None,
        }
    }

    #[inline]
    pub fn is_multi(&self) -> bool {
        matches!(self, HeaderValues::Multi(_))
    }

    pub fn len(&self) -> usize {
        match self {
            HeaderValues::Single(_) => 1,
            HeaderValues::Multi(values) => values.len(),
        }
    }

    /// Always false, a header has at least one value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values = match self {
            HeaderValues::Single(value) => slice::from_ref(value),
            HeaderValues::Multi(values) => values.as_slice(),
        };
        values.iter().map(String::as_str)
    }

    /// Joins every value with `", "`, the way a list-valued field is folded on the wire.
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(", ")
    }
}

impl From<&str> for HeaderValues {
    fn from(value: &str) -> Self {
        HeaderValues::Single(value.to_string())
    }
}

impl From<String> for HeaderValues {
    fn from(value: String) -> Self {
        HeaderValues::Single(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for HeaderValues {
    fn from(values: Vec<S>) -> Self {
        HeaderValues::Multi(values.into_iter().map(Into::into).collect())
    }
}

/// Request headers in arrival order, keyed by upper-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, HeaderValues)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks a header up by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&HeaderValues> {
        self.entries.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, values)| values)
    }

    /// Shortcut for the first value of a header.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).map(HeaderValues::first)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValues)> {
        self.entries.iter().map(|(key, values)| (key.as_str(), values))
    }

    /// Records `values` under `name`, merging into an existing entry as a list.
    ///
    /// `name` is upper-cased here so every stored key is canonical.
    pub fn append<I>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        let name = name.to_ascii_uppercase();
        let mut values = values.into_iter();

        let index = match self.entries.iter().position(|(key, _)| *key == name) {
            Some(index) => index,
            None => {
                let Some(first) = values.next() else {
                    return;
                };
                self.entries.push((name, HeaderValues::Single(first)));
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[index].1;
        for value in values {
            entry.push(value);
        }
    }
}
