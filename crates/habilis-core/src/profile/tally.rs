use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ProfileLabel;

/// Per-profile answer counts for a single quiz run.
///
/// Built fresh from an answer sequence; the counts always sum to the number
/// of answers that were counted. A deserialized tally rebuilds `total` from
/// the counts and drops zero entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TallyRecord")]
pub struct ProfileTally {
    counts: BTreeMap<ProfileLabel, usize>,
    total: usize,
}

#[derive(Deserialize)]
struct TallyRecord {
    counts: BTreeMap<ProfileLabel, usize>,
}

impl From<TallyRecord> for ProfileTally {
    fn from(record: TallyRecord) -> Self {
        let counts: BTreeMap<ProfileLabel, usize> = record
            .counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .collect();
        let total = counts.values().sum();
        Self { counts, total }
    }
}

impl ProfileTally {
    pub fn from_answers<'a>(answers: impl IntoIterator<Item = &'a ProfileLabel>) -> Self {
        let mut tally = Self::default();
        for answer in answers {
            tally.record(answer);
        }
        tally
    }

    pub fn record(&mut self, label: &ProfileLabel) {
        *self.counts.entry(label.clone()).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, label: &ProfileLabel) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Highest count reached by any label, 0 when empty.
    pub fn max_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Every label whose count equals [`Self::max_count`], in label order.
    pub fn leaders(&self) -> Vec<&ProfileLabel> {
        let max = self.max_count();
        if max == 0 {
            return Vec::new();
        }
        self.counts
            .iter()
            .filter(|(_, count)| **count == max)
            .map(|(label, _)| label)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProfileLabel, usize)> {
        self.counts.iter().map(|(label, &count)| (label, count))
    }
}
