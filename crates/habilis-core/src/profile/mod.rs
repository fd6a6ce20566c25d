//! Personality profiles and their resolution from quiz answers.
//!
//! A quiz run produces one [`ProfileLabel`] per question. The resolver
//! counts them into a [`ProfileTally`], picks the most frequent label
//! (breaking ties with a fixed [`TieBreakPriority`]) and maps it to the
//! catalog product recommended for that profile.

mod resolver;
mod tally;

pub use resolver::{map_to_recommendation, resolve, ProfileResolver, Resolution};
pub use tally::ProfileTally;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque profile identifier, e.g. `logical`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileLabel(String);

impl ProfileLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileLabel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProfileLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Catalog key of a recommended product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRef(pub u64);

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static profile -> product lookup.
pub type ProfileMapping = BTreeMap<ProfileLabel, ProductRef>;

/// Total order used only to break ties between equally voted profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TieBreakPriority(Vec<ProfileLabel>);

impl TieBreakPriority {
    pub fn new(order: impl IntoIterator<Item = impl Into<ProfileLabel>>) -> Self {
        Self(order.into_iter().map(Into::into).collect())
    }

    pub fn labels(&self) -> &[ProfileLabel] {
        &self.0
    }

    /// First label in priority order for which `pred` holds.
    pub fn first_matching(&self, pred: impl Fn(&ProfileLabel) -> bool) -> Option<&ProfileLabel> {
        self.0.iter().find(|label| pred(*label))
    }
}

impl<'a> IntoIterator for &'a TieBreakPriority {
    type Item = &'a ProfileLabel;
    type IntoIter = std::slice::Iter<'a, ProfileLabel>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
