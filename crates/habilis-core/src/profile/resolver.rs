//! Dominant-profile resolution.
//!
//! ## Rules
//!
//! 1. Count answers per label.
//! 2. The label with the strictly highest count wins.
//! 3. On a tie, the first tied label in the tie-break priority wins.
//!
//! Ties never fall back to a default profile: a tie that the priority
//! cannot break is reported as [`ResolveError::PriorityGap`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ProductRef, ProfileLabel, ProfileMapping, ProfileTally, TieBreakPriority};
use crate::error::{ConfigError, ResolveError};

/// Pick the dominant profile of `answers`.
///
/// # Errors
///
/// [`ResolveError::IncompleteInput`] when `answers` is empty, and
/// [`ResolveError::PriorityGap`] when a tie involves only labels that are
/// absent from `priority`.
pub fn resolve(
    answers: &[ProfileLabel],
    priority: &TieBreakPriority,
) -> Result<ProfileLabel, ResolveError> {
    let tally = ProfileTally::from_answers(answers);
    winner(&tally, priority)
}

fn winner(tally: &ProfileTally, priority: &TieBreakPriority) -> Result<ProfileLabel, ResolveError> {
    let leaders = tally.leaders();
    match leaders.as_slice() {
        [] => Err(ResolveError::IncompleteInput),
        [only] => Ok((*only).clone()),
        tied => priority
            .first_matching(|label| tied.contains(&label))
            .cloned()
            .ok_or_else(|| ResolveError::PriorityGap {
                winners: tied.iter().map(|l| (*l).clone()).collect(),
            }),
    }
}

/// Look up the product recommended for `profile`.
///
/// # Errors
///
/// [`ResolveError::MissingMapping`] when the mapping has no entry for it.
pub fn map_to_recommendation(
    profile: &ProfileLabel,
    mapping: &ProfileMapping,
) -> Result<ProductRef, ResolveError> {
    mapping
        .get(profile)
        .copied()
        .ok_or_else(|| ResolveError::MissingMapping(profile.clone()))
}

/// Outcome of a completed quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub profile: ProfileLabel,
    pub product: ProductRef,
    pub tally: ProfileTally,
}

/// Tie-break priority and product mapping, validated together.
///
/// Construction checks that both cover the same label universe, so a
/// resolver obtained from [`ProfileResolver::new`] can only fail on an
/// empty answer list or on labels outside that universe.
#[derive(Debug, Clone)]
pub struct ProfileResolver {
    priority: TieBreakPriority,
    mapping: ProfileMapping,
}

impl ProfileResolver {
    /// Validate and bundle `priority` with `mapping`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicatePriority`] if a label is listed twice,
    /// [`ConfigError::Unmapped`] if a prioritized label has no product, and
    /// [`ConfigError::Unprioritized`] if a mapped label is not prioritized.
    pub fn new(priority: TieBreakPriority, mapping: ProfileMapping) -> Result<Self, ConfigError> {
        let mut seen = BTreeSet::new();
        for label in &priority {
            if !seen.insert(label) {
                return Err(ConfigError::DuplicatePriority(label.clone()));
            }
            if !mapping.contains_key(label) {
                return Err(ConfigError::Unmapped(label.clone()));
            }
        }
        if let Some(label) = mapping.keys().find(|label| !seen.contains(label)) {
            return Err(ConfigError::Unprioritized(label.clone()));
        }

        Ok(Self { priority, mapping })
    }

    pub fn priority(&self) -> &TieBreakPriority {
        &self.priority
    }

    pub fn mapping(&self) -> &ProfileMapping {
        &self.mapping
    }

    pub fn knows(&self, label: &ProfileLabel) -> bool {
        self.mapping.contains_key(label)
    }

    pub fn resolve(&self, answers: &[ProfileLabel]) -> Result<ProfileLabel, ResolveError> {
        resolve(answers, &self.priority)
    }

    /// Winner of an already counted tally.
    pub fn resolve_tally(&self, tally: &ProfileTally) -> Result<ProfileLabel, ResolveError> {
        winner(tally, &self.priority)
    }

    pub fn recommend(&self, profile: &ProfileLabel) -> Result<ProductRef, ResolveError> {
        map_to_recommendation(profile, &self.mapping)
    }

    /// Resolve `answers` and attach the recommended product.
    pub fn resolution(&self, answers: &[ProfileLabel]) -> Result<Resolution, ResolveError> {
        let tally = ProfileTally::from_answers(answers);
        let profile = winner(&tally, &self.priority)?;
        let product = self.recommend(&profile)?;

        tracing::debug!(
            answers = ?answers,
            tally = ?tally,
            profile = %profile,
            product = %product,
            "resolved quiz profile"
        );

        Ok(Resolution {
            profile,
            product,
            tally,
        })
    }
}
