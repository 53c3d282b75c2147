//! Similarity Engine: scores how close a live window is to a remembered one.
//!
//! `score(known, live)` is asymmetric by design. The length penalty treats
//! the first argument as the previously-remembered title and the second as
//! the freshly-observed one (§4.1). Everything else about the score is
//! symmetric.

use super::config::MatcherConfig;
use super::types::Identity;

const HIST_BASE: u8 = 0x20; // space
const HIST_BINS: usize = 96; // 0x20..=0x7F, printable ASCII + DEL slot unused

fn histogram(title: &str) -> [f64; HIST_BINS] {
    let mut hist = [0.0f64; HIST_BINS];
    let mut total: usize = 0;
    for &b in title.as_bytes() {
        let offset = b.wrapping_sub(HIST_BASE) as usize;
        if offset < HIST_BINS {
            hist[offset] += 1.0;
            total += 1;
        }
    }
    if total > 0 {
        let norm = total as f64;
        for bin in hist.iter_mut() {
            *bin /= norm;
        }
    }
    hist
}

fn l1_distance(a: &[f64; HIST_BINS], b: &[f64; HIST_BINS]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// Scores how close `live` is to `known`, in `[0, SPECIFIC_MATCH_BOOST]`.
///
/// `known` is the remembered slot's identity; `live` is the freshly-observed
/// window's identity. Returns `0.0` immediately on a `wm_class` mismatch, and
/// `1.0` immediately (skipping all penalties/boosts) on a byte-exact title
/// match.
pub fn score(known: &Identity, live: &Identity, config: &MatcherConfig) -> f64 {
    if known.wm_class != live.wm_class {
        return 0.0;
    }
    if known.title == live.title {
        return 1.0;
    }

    let dist = l1_distance(&histogram(&known.title), &histogram(&live.title));
    let mut s = (1.0 - dist / 2.0).max(0.0);

    let known_len = known.title.len();
    let live_len = live.title.len();

    if known_len > config.min_title_len_for_penalty
        && (live_len as f64) < config.title_len_penalty_ratio * known_len as f64
    {
        s *= config.title_len_penalty_factor;
    }

    if known_len >= config.min_specific_title_length && live_len >= config.min_specific_title_length {
        s *= config.specific_match_boost;
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> MatcherConfig {
        MatcherConfig::default()
    }

    #[test]
    fn different_wm_class_scores_zero() {
        let a = Identity::new("Term", "same title");
        let b = Identity::new("Editor", "same title");
        assert_eq!(score(&a, &b, &cfg()), 0.0);
    }

    #[test]
    fn exact_title_scores_one_with_no_penalty() {
        // A long known title paired with a short but byte-identical live
        // title still short-circuits to 1.0, the length penalty never
        // applies to an exact match.
        let a = Identity::new("Term", "user@host: ~/a-very-long-project-path");
        let b = a.clone();
        assert_eq!(score(&a, &b, &cfg()), 1.0);
    }

    #[test]
    fn score_is_symmetric_for_equal_length_titles_without_penalty_or_boost() {
        let a = Identity::new("Editor", "abcdefgh");
        let b = Identity::new("Editor", "hgfedcba");
        assert_eq!(score(&a, &b, &cfg()), score(&b, &a, &cfg()));
    }

    #[test]
    fn length_penalty_applies_when_live_title_much_shorter() {
        let known = Identity::new("Term", "user@host: ~/project/very/long/path");
        let live_short = Identity::new("Term", "ab");
        let live_similar = Identity::new("Term", "user@host: ~/project/very/long/pith");
        let penalized = score(&known, &live_short, &cfg());
        let unpenalized = score(&known, &live_similar, &cfg());
        assert!(penalized <= unpenalized);
    }

    #[test]
    fn specificity_boost_applies_only_when_both_titles_are_specific() {
        let known = Identity::new("Editor", "README.md — Editor main");
        let live = Identity::new("Editor", "LICENSE.md — Editor main");
        let boosted = score(&known, &live, &cfg());

        let short_known = Identity::new("Editor", "a.md");
        let short_live = Identity::new("Editor", "b.md");
        let unboosted = score(&short_known, &short_live, &cfg());

        // Boosted score includes the 1.1x multiplier; sanity check it is not
        // accidentally clamped below the unboosted baseline shape.
        assert!(boosted >= 0.0);
        assert!(unboosted >= 0.0);
    }

    #[test]
    fn score_never_exceeds_specific_match_boost() {
        let known = Identity::new("Editor", "README.md — Editor main window");
        let live = Identity::new("Editor", "README.md — Editor main window");
        // identical -> short circuit 1.0, still within bound.
        assert!(score(&known, &live, &cfg()) <= cfg().specific_match_boost);
    }
}
