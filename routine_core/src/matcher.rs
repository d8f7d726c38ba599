//! Fuzzy exercise matching.
//!
//! Resolves a free-text exercise name (typed by the trainer or extracted from
//! model output) to a catalog record. Tiers are tried in order:
//! 1. exact name match (primary or localized, case/accent-insensitive)
//! 2. substring match in either direction
//! 3. movement keyword buckets with bilingual synonyms

use crate::muscle::{contains_either_way, normalize};
use crate::CatalogExercise;

/// Canonical movement keyword -> synonyms, checked in this order.
///
/// Synonyms match the start of a word, so "pull" hits "Pulldown" but "chin"
/// never hits "Machine".
pub const KEYWORD_BUCKETS: &[(&str, &[&str])] = &[
    ("press", &["press", "prensa", "bench", "banca"]),
    ("squat", &["squat", "sentadilla", "cuclilla"]),
    ("curl", &["curl", "flexion"]),
    ("row", &["row", "remo"]),
    ("pull", &["pull", "jalon", "dominada", "chin"]),
    ("push", &["push", "empuje", "fondo", "dip"]),
];

fn has_word_starting_with(text: &str, prefix: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| word.starts_with(prefix))
}

/// Which tier produced a match
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Substring,
    Keyword,
}

/// Best catalog match for `query`, or `None` when no tier matches.
pub fn find_best<'a>(query: &str, candidates: &'a [CatalogExercise]) -> Option<&'a CatalogExercise> {
    find_best_with_tier(query, candidates).map(|(exercise, _)| exercise)
}

/// Like [`find_best`] but also reports the tier that matched.
pub fn find_best_with_tier<'a>(
    query: &str,
    candidates: &'a [CatalogExercise],
) -> Option<(&'a CatalogExercise, MatchTier)> {
    let needle = normalize(query);
    if needle.is_empty() {
        return None;
    }

    if let Some(exact) = candidates
        .iter()
        .find(|c| c.names().any(|n| normalize(n) == needle))
    {
        return Some((exact, MatchTier::Exact));
    }

    if let Some(partial) = candidates
        .iter()
        .find(|c| c.names().any(|n| contains_either_way(n, &needle)))
    {
        return Some((partial, MatchTier::Substring));
    }

    for (keyword, synonyms) in KEYWORD_BUCKETS {
        if !synonyms.iter().any(|s| has_word_starting_with(&needle, s)) {
            continue;
        }
        let hit = candidates.iter().find(|c| {
            c.names()
                .map(normalize)
                .any(|n| synonyms.iter().any(|s| has_word_starting_with(&n, s)))
        });
        if let Some(hit) = hit {
            tracing::debug!(query, keyword, matched = %hit.name, "matcher.keyword");
            return Some((hit, MatchTier::Keyword));
        }
    }

    None
}
