//! Article-to-image association.
//!
//! Resolution order, first hit wins:
//!
//! 1. exact key
//! 2. numbered variants `<slug>-1` .. `<slug>-4`
//! 3. longest key that is a prefix of the slug
//! 4. token-overlap score, accepted at [`MIN_FUZZY_SCORE`] or above
//!
//! Ties in steps 3 and 4 go to the lexicographically smallest key.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::index::ImageIndex;

/// Numbered variants tried after the exact key
pub const SUFFIX_VARIANTS: std::ops::RangeInclusive<u32> = 1..=4;

/// Tokens shorter than this are connector words and ignored by scoring
pub const MIN_TOKEN_LEN: usize = 3;

/// Lowest fuzzy score accepted as a match
pub const MIN_FUZZY_SCORE: i64 = 12;

const COMMON_TOKEN_WEIGHT: i64 = 10;
const FIRST_TOKEN_BONUS: i64 = 3;
const SECOND_TOKEN_BONUS: i64 = 2;

/// Which rule produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Suffix(u32),
    Prefix,
    Fuzzy(i64),
}

/// A resolved image for an article slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMatch<'a> {
    pub key: &'a str,
    pub path: &'a Path,
    pub kind: MatchKind,
}

/// Find the best image for `slug`, returning only the path
pub fn match_image<'a>(index: &'a ImageIndex, slug: &str) -> Option<&'a Path> {
    find_match(index, slug).map(|m| m.path)
}

/// Find the best image for `slug` along with the rule that matched
pub fn find_match<'a>(index: &'a ImageIndex, slug: &str) -> Option<ImageMatch<'a>> {
    if slug.is_empty() {
        return None;
    }

    exact(index, slug)
        .or_else(|| suffix_variant(index, slug))
        .or_else(|| longest_prefix(index, slug))
        .or_else(|| best_token_overlap(index, slug))
}

fn first_candidate<'a>(
    key: &'a str,
    paths: &'a [PathBuf],
    kind: MatchKind,
) -> Option<ImageMatch<'a>> {
    paths.first().map(|path| ImageMatch {
        key,
        path: path.as_path(),
        kind,
    })
}

fn exact<'a>(index: &'a ImageIndex, slug: &str) -> Option<ImageMatch<'a>> {
    index
        .get_entry(slug)
        .and_then(|(key, paths)| first_candidate(key, paths, MatchKind::Exact))
}

fn suffix_variant<'a>(index: &'a ImageIndex, slug: &str) -> Option<ImageMatch<'a>> {
    SUFFIX_VARIANTS.into_iter().find_map(|n| {
        index
            .get_entry(&format!("{}-{}", slug, n))
            .and_then(|(key, paths)| first_candidate(key, paths, MatchKind::Suffix(n)))
    })
}

fn longest_prefix<'a>(index: &'a ImageIndex, slug: &str) -> Option<ImageMatch<'a>> {
    let mut best: Option<(&'a str, &'a [PathBuf])> = None;

    for (key, paths) in index.iter() {
        if key.is_empty() || !slug.starts_with(key) {
            continue;
        }
        if best.map_or(true, |(current, _)| key.len() > current.len()) {
            best = Some((key, paths));
        }
    }

    best.and_then(|(key, paths)| first_candidate(key, paths, MatchKind::Prefix))
}

fn best_token_overlap<'a>(index: &'a ImageIndex, slug: &str) -> Option<ImageMatch<'a>> {
    let mut best: Option<(i64, &'a str, &'a [PathBuf])> = None;

    for (key, paths) in index.iter() {
        let Some(score) = token_score(slug, key) else {
            continue;
        };
        if best.map_or(true, |(current, _, _)| score > current) {
            best = Some((score, key, paths));
        }
    }

    match best {
        Some((score, key, paths)) if score >= MIN_FUZZY_SCORE => {
            first_candidate(key, paths, MatchKind::Fuzzy(score))
        }
        _ => None,
    }
}

fn tokens(slug: &str) -> Vec<&str> {
    slug.split('-')
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .collect()
}

/// Token-overlap score between an article slug and an image key.
///
/// `10 * common - |count difference| + 3 (first tokens equal) + 2 (second tokens equal)`,
/// over hyphen-separated tokens of at least [`MIN_TOKEN_LEN`] characters.
/// Returns `None` when the two share no token.
pub fn token_score(slug: &str, key: &str) -> Option<i64> {
    let slug_tokens = tokens(slug);
    let key_tokens = tokens(key);

    let slug_set: BTreeSet<&str> = slug_tokens.iter().copied().collect();
    let key_set: BTreeSet<&str> = key_tokens.iter().copied().collect();
    let common = slug_set.intersection(&key_set).count() as i64;
    if common == 0 {
        return None;
    }

    let count_diff = (slug_tokens.len() as i64 - key_tokens.len() as i64).abs();
    let mut score = COMMON_TOKEN_WEIGHT * common - count_diff;

    if slug_tokens.first() == key_tokens.first() {
        score += FIRST_TOKEN_BONUS;
    }
    if slug_tokens.len() > 1 && slug_tokens.get(1) == key_tokens.get(1) {
        score += SECOND_TOKEN_BONUS;
    }

    Some(score)
}
