//! Keyword-overlap matcher.
//!
//! Scores every dataset entry by how many distinct lowercase words its prompt
//! shares with the user's message. The scan keeps the first entry with the
//! highest score; whether that entry is accepted depends on [`MatchPolicy`].

use crate::dataset::DatasetEntry;
use std::collections::HashSet;

/// Threshold used when no policy is configured
pub const DEFAULT_MIN_OVERLAP: usize = 2;

/// Acceptance rule applied to the best-scoring entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Accept the best entry even at score 0, so any non-empty dataset answers
    AlwaysBest,
    /// Accept the best entry only when it shares at least this many words
    MinOverlap(usize),
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy::MinOverlap(DEFAULT_MIN_OVERLAP)
    }
}

impl MatchPolicy {
    pub fn accepts(&self, score: usize) -> bool {
        match self {
            MatchPolicy::AlwaysBest => true,
            MatchPolicy::MinOverlap(min) => score >= *min,
        }
    }
}

/// Best entry and its overlap score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub entry: DatasetEntry,
    pub score: usize,
}

/// Lowercased whitespace-delimited words, deduplicated
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// Number of distinct words shared by the two token sets
pub fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> usize {
    a.intersection(b).count()
}

/// Pick the highest-overlap entry for `utterance`.
///
/// Ties go to the earliest entry: the best is replaced only on a strict
/// improvement.
pub fn best_match(
    utterance: &str,
    entries: &[DatasetEntry],
    policy: MatchPolicy,
) -> Option<MatchResult> {
    let user_tokens = tokenize(utterance);

    let mut best: Option<(&DatasetEntry, usize)> = None;
    for entry in entries {
        let score = overlap(&user_tokens, &tokenize(&entry.prompt));
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((entry, score)),
        }
    }

    let (entry, score) = best?;
    if !policy.accepts(score) {
        return None;
    }

    Some(MatchResult {
        entry: entry.clone(),
        score,
    })
}
