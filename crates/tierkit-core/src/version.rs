use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A recipe version as written in `config.yml`.
///
/// Recipe versions are free-form (`2.1`, `3.0.6`, `0.18.8.rc1`), so ordering
/// compares `.`/`-`/`+` separated segments: numeric segments numerically,
/// anything else lexically, numeric before non-numeric, and a strict prefix
/// before the longer version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecipeVersion(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Numeric(u64),
    Text(&'a str),
}

impl RecipeVersion {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        self.0
            .split(['.', '-', '+'])
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.parse::<u64>() {
                Ok(value) => Segment::Numeric(value),
                Err(_) => Segment::Text(segment),
            })
    }
}

fn compare_segments(left: Segment<'_>, right: Segment<'_>) -> Ordering {
    match (left, right) {
        (Segment::Numeric(a), Segment::Numeric(b)) => a.cmp(&b),
        (Segment::Numeric(_), Segment::Text(_)) => Ordering::Less,
        (Segment::Text(_), Segment::Numeric(_)) => Ordering::Greater,
        (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
    }
}

impl Ord for RecipeVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.segments();
        let mut right = other.segments();
        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) => match compare_segments(a, b) {
                    Ordering::Equal => continue,
                    unequal => return unequal,
                },
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                // "1.0" and "1-0" share segments; fall back to the raw text so
                // Ord stays consistent with Eq.
                (None, None) => return self.0.cmp(&other.0),
            }
        }
    }
}

impl PartialOrd for RecipeVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RecipeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecipeVersion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecipeVersion {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Serialize for RecipeVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecipeVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}
