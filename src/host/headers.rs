// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Ordered header collections
//!
//! Hosts hand headers over in three shapes. They are normalized once into
//! [`Headers`], an insertion-ordered list with case-insensitive lookup, so
//! nothing downstream inspects the original shape again.

use serde::{Deserialize, Serialize};

/// Insertion-ordered header list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, keeping earlier values of the same name
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every value of `name` with a single one.
    ///
    /// The first matching entry keeps its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(index) => {
                self.entries[index].1 = value;
                let mut seen = 0usize;
                self.entries.retain(|(k, _)| {
                    if k.eq_ignore_ascii_case(&name) {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Value of `name`, multiple values joined with `, `
    pub fn get(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .entries
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    /// Whether `name` is present
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Remove every value of `name`
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a raw `name: value` block (CRLF or LF separated)
    pub fn parse_raw_block(block: &str) -> Self {
        let entries = block
            .lines()
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().to_string()))
            })
            .collect();

        Self { entries }
    }

    /// Render as a raw block, one `name: value\r\n` line per entry
    pub fn to_raw_block(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}: {}\r\n", k, v))
            .collect()
    }

    /// Owned pairs in insertion order
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries.clone()
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a (String, String);
    type IntoIter = std::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// The three shapes a host may declare request headers in
#[derive(Debug, Clone, PartialEq)]
pub enum HeadersInit {
    /// A headers object
    Headers(Headers),
    /// An array of `[name, value]` pairs
    Pairs(Vec<(String, String)>),
    /// A plain mapping, entries in declaration order
    Map(Vec<(String, String)>),
}

impl HeadersInit {
    /// Mapping shape from declared entries.
    ///
    /// A repeated key overwrites the earlier value and keeps its position.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut map: Vec<(String, String)> = Vec::new();
        for (key, value) in entries {
            let (key, value) = (key.into(), value.into());
            match map.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => map.push((key, value)),
            }
        }
        HeadersInit::Map(map)
    }

    /// Normalize into an ordered header list.
    ///
    /// Pairs with an empty name or value and mapping entries with an empty
    /// value are skipped.
    pub fn into_headers(self) -> Headers {
        match self {
            HeadersInit::Headers(headers) => headers,
            HeadersInit::Pairs(pairs) => pairs
                .into_iter()
                .filter(|(k, v)| !k.is_empty() && !v.is_empty())
                .collect(),
            HeadersInit::Map(map) => map.into_iter().filter(|(_, v)| !v.is_empty()).collect(),
        }
    }
}

impl From<Headers> for HeadersInit {
    fn from(headers: Headers) -> Self {
        HeadersInit::Headers(headers)
    }
}

impl From<Vec<(String, String)>> for HeadersInit {
    fn from(pairs: Vec<(String, String)>) -> Self {
        HeadersInit::Pairs(pairs)
    }
}
